//! CLI administration tool for the auth service.
//!
//! # Usage
//!
//! ```bash
//! # Issue a token for a user (reads JWT_SECRET)
//! cargo run --bin admin -- token issue --user-id 0b6f... --role admin --expiry 3600
//!
//! # Verify a token and print its claims
//! cargo run --bin admin -- token inspect eyJhbGciOi...
//!
//! # Look up a user by id or email (reads DATABASE_URL)
//! cargo run --bin admin -- user show jane@example.com
//! ```

use todo_auth::domain::auth::{AuthError, TokenPayload, TokenProvider};
use todo_auth::domain::entities::Role;
use todo_auth::domain::repositories::{UserFilter, UserRepository};
use todo_auth::infrastructure::persistence::PgUserRepository;
use todo_auth::infrastructure::security::JwtTokenProvider;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing the auth service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Issue and inspect bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Inspect user records
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Sign a token for a user
    Issue {
        /// Subject user id
        #[arg(short, long)]
        user_id: Uuid,

        /// Role embedded in the token
        #[arg(short, long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,

        /// Lifetime in seconds
        #[arg(short, long, default_value_t = 3600)]
        expiry: i64,
    },

    /// Verify a token and print its claims
    Inspect {
        /// Raw token (without the `Bearer ` prefix)
        token: String,
    },
}

/// User subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Show a user by id or email
    Show {
        /// User id or email
        id_or_email: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action)?,
        Commands::User { action } => handle_user_action(action).await?,
    }

    Ok(())
}

fn token_provider() -> Result<JwtTokenProvider> {
    let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");
    Ok(JwtTokenProvider::new(&secret))
}

/// Dispatches token commands.
fn handle_token_action(action: TokenAction) -> Result<()> {
    let provider = token_provider()?;

    match action {
        TokenAction::Issue {
            user_id,
            role,
            expiry,
        } => issue_token(&provider, user_id, role.into(), expiry),
        TokenAction::Inspect { token } => {
            inspect_token(&provider, &token);
            Ok(())
        }
    }
}

fn issue_token(provider: &JwtTokenProvider, user_id: Uuid, role: Role, expiry: i64) -> Result<()> {
    let token = provider
        .generate(TokenPayload::new(user_id, role), expiry)
        .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;

    println!("{}", "🔑 Token issued".bright_blue().bold());
    println!();
    println!("  User:    {}", user_id.to_string().cyan());
    println!("  Role:    {}", role.to_string().cyan());
    println!("  Expires: {}", format_timestamp(token.expires_at).cyan());
    println!();
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token.token.bright_yellow()
    );
    println!();

    Ok(())
}

fn inspect_token(provider: &JwtTokenProvider, token: &str) {
    match provider.validate(token) {
        Ok(payload) => {
            println!("{}", "✅ Token is valid".green().bold());
            println!("  User: {}", payload.user_id.to_string().cyan());
            println!("  Role: {}", payload.role.to_string().cyan());
        }
        Err(AuthError::ExpiredToken) => println!("{}", "⌛ Token has expired".yellow().bold()),
        Err(AuthError::InvalidSignature) => {
            println!("{}", "❌ Signature does not match JWT_SECRET".red().bold())
        }
        Err(e) => println!("{} {}", "❌ Invalid token:".red().bold(), e),
    }
}

/// Dispatches user commands.
async fn handle_user_action(action: UserAction) -> Result<()> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let repo = PgUserRepository::new(Arc::new(pool));

    match action {
        UserAction::Show { id_or_email } => {
            let filter = match Uuid::parse_str(&id_or_email) {
                Ok(id) => UserFilter::Id(id),
                Err(_) => UserFilter::Email(id_or_email),
            };

            let user = repo
                .get_user(filter)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load user: {}", e))?;

            println!("{}", "👤 User".bright_blue().bold());
            println!("  ID:     {}", user.id.to_string().cyan());
            println!("  Email:  {}", user.email.cyan());
            println!("  Name:   {} {}", user.first_name, user.last_name);
            println!("  Role:   {}", user.role.to_string().cyan());

            let status = user.status.to_string();
            if user.is_deleted() {
                println!("  Status: {}", status.red().bold());
            } else {
                println!("  Status: {}", status.green());
            }
        }
    }

    Ok(())
}

fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

//! HS256 JWT implementation of [`TokenProvider`].

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::auth::{AuthError, Token, TokenPayload, TokenProvider};
use crate::domain::entities::Role;

/// Claims carried inside the signed token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    exp: i64,
}

/// Signs tokens with a process-wide HMAC secret.
///
/// Keys are derived once at construction; the provider is read-only afterwards and
/// can be shared freely between request workers.
pub struct JwtTokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `exp <= now` below, without leeway.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenProvider for JwtTokenProvider {
    fn generate(&self, payload: TokenPayload, expiry_seconds: i64) -> Result<Token, AuthError> {
        let exp = Utc::now().timestamp().saturating_add(expiry_seconds);

        let claims = Claims {
            sub: payload.user_id,
            role: payload.role,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;

        debug!(user_id = %payload.user_id, exp, "Issued token");

        Ok(Token {
            token,
            expires_at: exp,
        })
    }

    fn validate(&self, token: &str) -> Result<TokenPayload, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedToken,
            }
        })?;

        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(TokenPayload::new(data.claims.sub, data.claims.role))
    }
}

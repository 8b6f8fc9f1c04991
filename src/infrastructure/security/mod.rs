//! Token signing and password hashing.

mod jwt_provider;
mod password;

pub use jwt_provider::JwtTokenProvider;
pub use password::{Hasher, SALT_LEN, Sha256Hasher, generate_salt, hash_password, verify_password};

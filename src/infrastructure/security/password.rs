//! Password hashing used by registration and login.

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of generated salts.
pub const SALT_LEN: usize = 50;

const SALT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Hashes a salted password for comparison with the stored hash.
pub trait Hasher: Send + Sync {
    fn hash(&self, data: &str) -> String;
}

/// SHA-256 hasher producing 64-character lowercase hex digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, data: &str) -> String {
        hex::encode(Sha256::digest(data.as_bytes()))
    }
}

/// Hashes `password` concatenated with `salt`, the format stored in `users.password`.
pub fn hash_password(hasher: &dyn Hasher, password: &str, salt: &str) -> String {
    hasher.hash(&format!("{}{}", password, salt))
}

/// Checks `password` against a stored hash without short-circuiting on the first
/// differing byte.
pub fn verify_password(hasher: &dyn Hasher, password: &str, salt: &str, stored_hash: &str) -> bool {
    let computed = hash_password(hasher, password, salt);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Generates a random alphanumeric salt of [`SALT_LEN`] characters.
pub fn generate_salt() -> String {
    let mut rng = rand::rng();

    (0..SALT_LEN)
        .map(|_| SALT_CHARSET[rng.random_range(0..SALT_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_hex() {
        let hash1 = Sha256Hasher.hash("secret");
        let hash2 = Sha256Hasher.hash("secret");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_changes_hash() {
        assert_ne!(
            hash_password(&Sha256Hasher, "secret", "salt-a"),
            hash_password(&Sha256Hasher, "secret", "salt-b")
        );
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_password(&Sha256Hasher, "secret", "pepper");

        assert!(verify_password(&Sha256Hasher, "secret", "pepper", &stored));
        assert!(!verify_password(&Sha256Hasher, "Secret", "pepper", &stored));
        assert!(!verify_password(&Sha256Hasher, "secret", "salt", &stored));
        // Truncated or empty stored hashes never match.
        assert!(!verify_password(&Sha256Hasher, "secret", "pepper", &stored[..10]));
        assert!(!verify_password(&Sha256Hasher, "secret", "pepper", ""));
    }

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        assert_eq!(salt1.len(), SALT_LEN);
        assert!(salt1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(salt1, salt2);
    }
}

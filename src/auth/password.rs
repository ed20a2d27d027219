//! Password hashing.
//!
//! bcrypt, one-way; raw passwords are hashed before they reach any storage
//! backend and are never stored or returned.

/// Hash a raw password for storage.
pub fn hash_password(raw: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(raw, bcrypt::DEFAULT_COST)
}

/// Compare a raw password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch rather than an error; login
/// reports it the same as a wrong password.
pub fn verify_password(raw: &str, hash: &str) -> bool {
    bcrypt::verify(raw, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("secret1", "not-a-bcrypt-hash"));
    }
}

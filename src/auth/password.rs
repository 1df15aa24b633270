use crate::error::{Error, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Argon2 with a fresh OS-random salt, rendered as a PHC string for
/// storage alongside the identity row.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// A mismatch is an `Ok(false)`, not an error; only an unparseable stored
/// hash is, since that means the row itself is corrupt.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| Error::Internal(format!("Stored credential hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_self_verifying() {
        let first = hash_password("open sesame").unwrap();
        let second = hash_password("open sesame").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("open sesame", &first).unwrap());
        assert!(!verify_password("open Sesame", &first).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(Error::Internal(_))
        ));
    }
}

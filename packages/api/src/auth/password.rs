//! Argon2id password hashes in PHC string form, as stored in
//! `users.password_hash`.

use argon2::password_hash::{self, rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
    #[error("password verification failed: {0}")]
    Verify(password_hash::Error),
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Check `password` against a stored PHC hash. A wrong password is
/// `Ok(false)`; an unparseable hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_password_verifies() {
        let hash = hash_password("modeler").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(verify_password("modeler", &hash), Ok(true));
        assert_eq!(verify_password("Modeler", &hash), Ok(false));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_cleartext_column_is_malformed_hash() {
        assert!(matches!(
            verify_password("demo", "demo"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}

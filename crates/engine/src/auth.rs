//! Password hashing and verification.
//!
//! Every stored credential is a salted argon2 hash in PHC string format.
//! Verification goes through [`PasswordVerifier`], which compares digests in
//! constant time.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

pub(crate) fn hash_password(plain: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(plain: &str, stored: &str) -> ResultEngine<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|err| EngineError::PasswordHash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Burns one hash computation so a login attempt against an unknown username
/// costs the same as a wrong password against a real one.
pub(crate) fn burn_verification(plain: &str) {
    let _ = hash_password(plain);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("Abc123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Abc123", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("Abc123").unwrap();
        assert!(!verify_password("Abc124", &hash).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("Abc123", "plaintext-left-behind").unwrap_err();
        assert!(matches!(err, EngineError::PasswordHash(_)));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("Abc123").unwrap();
        let b = hash_password("Abc123").unwrap();
        assert_ne!(a, b);
    }
}

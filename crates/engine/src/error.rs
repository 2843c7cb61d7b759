//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidFormat`] thrown when a username or password fails validation.
//! - [`AlreadyExists`] thrown when a username is already registered.
//! - [`InvalidCredentials`] thrown on any failed login attempt.
//!
//!  [`InvalidFormat`]: EngineError::InvalidFormat
//!  [`AlreadyExists`]: EngineError::AlreadyExists
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid {0}")]
    InvalidFormat(String),
    #[error("\"{0}\" already present!")]
    AlreadyExists(String),
    /// Unknown username and wrong password are reported identically so a
    /// caller cannot probe which usernames exist.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("not logged in")]
    Unauthenticated,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidFormat(a), Self::InvalidFormat(b)) => a == b,
            (Self::AlreadyExists(a), Self::AlreadyExists(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Unauthenticated, Self::Unauthenticated) => true,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

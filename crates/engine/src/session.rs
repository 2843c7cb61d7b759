//! The process-local authentication gate.
//!
//! [`Identity`] is the opaque proof of a successful login: only
//! `Engine::authenticate` constructs one, and every ledger or recurrence
//! operation demands a reference to it. [`Session`] holds at most one
//! identity for the lifetime of a run, replacing the global logged-in flag
//! style of session tracking.

use crate::{EngineError, ResultEngine};

/// Proof that a user authenticated during this run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub(crate) fn new(username: String) -> Self {
        Self { username }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Holds the identity of the currently logged-in user, if any.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Identity>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `identity` the active one, replacing any previous login.
    pub fn login(&mut self, identity: Identity) {
        self.current = Some(identity);
    }

    /// Ends the session, returning the identity that was active.
    pub fn logout(&mut self) -> Option<Identity> {
        self.current.take()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// The active identity, or [`EngineError::Unauthenticated`] when nobody
    /// is logged in.
    pub fn identity(&self) -> ResultEngine<&Identity> {
        self.current.as_ref().ok_or(EngineError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_is_unauthenticated() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.identity().unwrap_err(), EngineError::Unauthenticated);
    }

    #[test]
    fn login_then_logout_clears_identity() {
        let mut session = Session::new();
        session.login(Identity::new("alice".to_string()));
        assert_eq!(session.identity().unwrap().username(), "alice");

        let evicted = session.logout();
        assert_eq!(evicted.map(|id| id.username().to_string()), Some("alice".to_string()));
        assert!(session.identity().is_err());
    }
}

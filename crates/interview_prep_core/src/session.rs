//! crates/interview_prep_core/src/session.rs
//!
//! The Session Store: who is signed in for one application root.

use crate::domain::UserRef;
use serde::Serialize;

/// Serializable view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub identity: Option<UserRef>,
    pub authenticated: bool,
}

/// Holds the authenticated identity. The authenticated flag is derived from the
/// identity, so `authenticated == identity.is_some()` in every reachable state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    identity: Option<UserRef>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, identity: UserRef) {
        self.identity = Some(identity);
    }

    pub fn logout(&mut self) {
        self.identity = None;
    }

    pub fn set_identity(&mut self, identity: Option<UserRef>) {
        self.identity = identity;
    }

    pub fn identity(&self) -> Option<&UserRef> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn snapshot(&self) -> Session {
        Session {
            identity: self.identity.clone(),
            authenticated: self.is_authenticated(),
        }
    }
}

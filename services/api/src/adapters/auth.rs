//! services/api/src/adapters/auth.rs
//!
//! A stand-in for the external identity provider. It implements the
//! `AuthenticationService` port by waiting a fixed delay and echoing back an
//! identity; passwords are accepted and discarded.

use async_trait::async_trait;
use interview_prep_core::{
    domain::UserRef,
    ports::{AuthenticationService, PortError, PortResult},
};
use std::time::Duration;
use tracing::info;

const DEMO_USER_ID: &str = "1";
const DEMO_USER_NAME: &str = "John Doe";

#[derive(Clone)]
pub struct MockAuthAdapter {
    delay: Duration,
}

impl MockAuthAdapter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl AuthenticationService for MockAuthAdapter {
    async fn authenticate(&self, email: &str, _password: &str) -> PortResult<UserRef> {
        let email = require("email", email)?;
        tokio::time::sleep(self.delay).await;
        info!("Mock login accepted for {}", email);
        Ok(UserRef::new(DEMO_USER_ID, DEMO_USER_NAME, email))
    }

    async fn register(&self, name: &str, email: &str, _password: &str) -> PortResult<UserRef> {
        let name = require("name", name)?;
        let email = require("email", email)?;
        tokio::time::sleep(self.delay).await;
        info!("Mock signup accepted for {}", email);
        Ok(UserRef::new(DEMO_USER_ID, name, email))
    }
}

fn require<'a>(field: &str, value: &'a str) -> PortResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortError::Unexpected(format!("{} is required", field)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn login_returns_demo_identity_after_delay() {
        let auth = MockAuthAdapter::new(Duration::from_millis(1000));
        let start = tokio::time::Instant::now();
        let user = auth.authenticate("a@b.com", "whatever").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(user.id, "1");
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "a@b.com");
    }

    #[tokio::test]
    async fn signup_keeps_given_name() {
        let auth = MockAuthAdapter::new(Duration::ZERO);
        let user = auth.register("Asha", "asha@example.com", "pw").await.unwrap();
        assert_eq!(user.name, "Asha");
        assert!(auth.register(" ", "asha@example.com", "pw").await.is_err());
    }
}

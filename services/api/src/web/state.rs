//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-client contexts.

use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use interview_prep_core::{
    domain::{AuthGrant, UserRef},
    ports::{AuthenticationService, CatalogService, CriteriaExtractionService},
    SelectionStore, SessionStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CatalogService>,
    pub auth: Arc<dyn AuthenticationService>,
    pub extractor: Arc<dyn CriteriaExtractionService>,
    pub clients: ClientRegistry,
}

//=========================================================================================
// ClientContext (One Per Signed-In Client)
//=========================================================================================

/// The stores owned by one application root, i.e. one signed-in client.
#[derive(Debug, Default)]
pub struct ClientContext {
    pub session: SessionStore,
    pub selection: SelectionStore,
}

pub type ClientHandle = Arc<Mutex<ClientContext>>;

/// What the auth middleware attaches to a request once the token checks out.
#[derive(Clone)]
pub struct AuthedClient {
    pub token: String,
    pub context: ClientHandle,
}

/// Session token lifetime (30 days). The auth cookie carries the same `Max-Age`.
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

struct ClientEntry {
    context: ClientHandle,
    issued_at: DateTime<Utc>,
}

/// Maps issued session tokens to their client contexts.
///
/// Tokens expire `max_age` after they were issued, like the cookie that carries them.
/// Expired entries are evicted on lookup and swept whenever a new token is issued.
#[derive(Clone)]
pub struct ClientRegistry {
    inner: Arc<RwLock<HashMap<String, ClientEntry>>>,
    max_age: Duration,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::with_max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    /// Issues a fresh token for `user` and mounts a logged-in context behind it.
    pub async fn open(&self, user: UserRef) -> AuthGrant {
        self.open_at(user, Utc::now()).await
    }

    pub async fn resolve(&self, token: &str) -> Option<ClientHandle> {
        self.resolve_at(token, Utc::now()).await
    }

    async fn open_at(&self, user: UserRef, now: DateTime<Utc>) -> AuthGrant {
        let token = Uuid::new_v4().to_string();
        let mut context = ClientContext::default();
        context.session.login(user.clone());

        let mut clients = self.inner.write().await;
        let before = clients.len();
        clients.retain(|_, entry| !self.is_expired(entry, now));
        let swept = before - clients.len();
        if swept > 0 {
            debug!("Swept {} expired client sessions.", swept);
        }
        clients.insert(
            token.clone(),
            ClientEntry {
                context: Arc::new(Mutex::new(context)),
                issued_at: now,
            },
        );
        AuthGrant { token, user }
    }

    async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<ClientHandle> {
        {
            let clients = self.inner.read().await;
            let entry = clients.get(token)?;
            if !self.is_expired(entry, now) {
                return Some(entry.context.clone());
            }
        }

        let expired = {
            let mut clients = self.inner.write().await;
            // Re-check under the write lock; the token may have been closed meanwhile.
            match clients.get(token) {
                Some(entry) if self.is_expired(entry, now) => clients.remove(token),
                _ => None,
            }
        };
        if let Some(entry) = expired {
            debug!("Evicted expired client session.");
            entry.context.lock().await.session.logout();
        }
        None
    }

    fn is_expired(&self, entry: &ClientEntry, now: DateTime<Utc>) -> bool {
        now - entry.issued_at >= self.max_age
    }

    /// Logs the context out and forgets the token. Returns false for unknown tokens.
    pub async fn close(&self, token: &str) -> bool {
        let removed = self.inner.write().await.remove(token);
        match removed {
            Some(entry) => {
                entry.context.lock().await.session.logout();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_resolve_close() {
        let registry = ClientRegistry::new();
        let grant = registry
            .open(UserRef::new("1", "John Doe", "john@example.com"))
            .await;

        let handle = registry.resolve(&grant.token).await.unwrap();
        {
            let context = handle.lock().await;
            assert!(context.session.is_authenticated());
            assert_eq!(context.selection.role(), None);
        }

        assert!(registry.close(&grant.token).await);
        assert!(registry.resolve(&grant.token).await.is_none());
        assert!(!handle.lock().await.session.is_authenticated());
        assert!(!registry.close(&grant.token).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn tokens_are_isolated() {
        let registry = ClientRegistry::new();
        let a = registry.open(UserRef::new("1", "A", "a@example.com")).await;
        let b = registry.open(UserRef::new("1", "B", "b@example.com")).await;
        assert_ne!(a.token, b.token);

        registry
            .resolve(&a.token)
            .await
            .unwrap()
            .lock()
            .await
            .selection
            .set_role(Some("SDE".to_string()));

        let b_ctx = registry.resolve(&b.token).await.unwrap();
        assert_eq!(b_ctx.lock().await.selection.role(), None);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn expired_tokens_are_evicted() {
        let registry = ClientRegistry::with_max_age(Duration::hours(1));
        let issued = Utc::now();
        let grant = registry
            .open_at(UserRef::new("1", "John Doe", "john@example.com"), issued)
            .await;

        let handle = registry
            .resolve_at(&grant.token, issued + Duration::minutes(59))
            .await
            .unwrap();
        assert!(handle.lock().await.session.is_authenticated());

        let later = issued + Duration::hours(1);
        assert!(registry.resolve_at(&grant.token, later).await.is_none());
        assert!(registry.is_empty().await);
        assert!(!handle.lock().await.session.is_authenticated());
        assert!(!registry.close(&grant.token).await);
    }

    #[tokio::test]
    async fn repeated_logins_do_not_accumulate() {
        let registry = ClientRegistry::with_max_age(Duration::hours(1));
        let start = Utc::now();
        for i in 0..100 {
            registry
                .open_at(
                    UserRef::new("1", "John Doe", "john@example.com"),
                    start + Duration::minutes(i * 10),
                )
                .await;
        }
        // Only the logins from the last hour survive the sweep.
        assert_eq!(registry.len().await, 6);
    }
}

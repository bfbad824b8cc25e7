//! Session bootstrap: resolve the current user, load their context and
//! publish the outcome in the application registry.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::context::UserContext;
use crate::error::{ContextError, ContextResult};
use crate::report::{ErrorChannel, ReportingStore, CHANNEL_LOG, TOPIC_ERROR};
use crate::store::ContextPersistence;
use crate::types::RequestOptions;

/// Registry key under which the session's context outcome is published.
pub const USER_CONTEXT_KEY: &str = "context:user_context";

/// The user of the current session, as seen by the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub name: String,

    /// Headers to forward on every cache request (e.g. auth).
    pub headers: BTreeMap<String, String>,
}

/// Source of the current session's user.
#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn current_user(&self) -> ContextResult<CurrentUser>;
}

#[async_trait]
impl UserProvider for CurrentUser {
    async fn current_user(&self) -> ContextResult<CurrentUser> {
        Ok(self.clone())
    }
}

/// Outcome of loading a context, as published in the registry.
pub type ContextOutcome = ContextResult<UserContext>;

/// Process-wide key → outcome map. Each key is written once.
#[derive(Debug, Default)]
pub struct AppRegistry {
    entries: RwLock<HashMap<String, ContextOutcome>>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `outcome` under `key`.
    ///
    /// Returns [`ContextError::AlreadyRegistered`] if `key` is taken.
    pub async fn register(&self, key: &str, outcome: ContextOutcome) -> ContextResult<()> {
        match self.entries.write().await.entry(key.to_string()) {
            Entry::Occupied(_) => Err(ContextError::AlreadyRegistered {
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                debug!(key = %key, ok = outcome.is_ok(), "registering context outcome");
                slot.insert(outcome);
                Ok(())
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<ContextOutcome> {
        self.entries.read().await.get(key).cloned()
    }

    /// The outcome registered by [`UserContextController::run`].
    pub async fn user_context(&self) -> Option<ContextOutcome> {
        self.get(USER_CONTEXT_KEY).await
    }
}

/// Loads the session's user context through an error-reporting store.
#[derive(Debug)]
pub struct UserContextController<S, C> {
    store: ReportingStore<S, C>,
}

impl<S, C> UserContextController<S, C>
where
    S: ContextPersistence,
    C: ErrorChannel,
{
    pub fn new(store: S, channel: C) -> Self {
        Self {
            store: ReportingStore::new(store, channel),
        }
    }

    /// The reporting store; saving through it reports failures.
    pub fn store(&self) -> &ReportingStore<S, C> {
        &self.store
    }

    pub async fn load(&self, user: &str, options: &RequestOptions) -> ContextResult<UserContext> {
        self.store.load(user, options).await
    }

    /// Resolve the current user, load their context and register the
    /// outcome under [`USER_CONTEXT_KEY`].
    ///
    /// A failed load is reported, registered as a failed outcome and
    /// returned. The caller decides whether the session can continue.
    pub async fn run<P>(&self, provider: &P, registry: &AppRegistry) -> ContextResult<UserContext>
    where
        P: UserProvider + ?Sized,
    {
        let user = provider.current_user().await?;
        let options = RequestOptions::with_headers(user.headers);

        let outcome = self.load(&user.name, &options).await;
        if let Err(err) = &outcome {
            self.store.channel().dispatch(err, TOPIC_ERROR, CHANNEL_LOG);
        }

        registry.register(USER_CONTEXT_KEY, outcome.clone()).await?;
        if outcome.is_ok() {
            info!(user = %user.name, "user context registered");
        }
        outcome
    }
}

//! Remote user-context store.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;
use url::Url;

use crate::codec;
use crate::context::UserContext;
use crate::error::{ContextError, ContextResult};
use crate::types::{RequestOptions, StoreConfig, CONTEXT_CACHE_PATH};

mod http;

use http::{HttpBackend, RecordOutcome};

pub const STORE_USER_AGENT: &str = concat!("waltz-context/", env!("CARGO_PKG_VERSION"));

/// Load/save/delete contract for user-context records.
#[async_trait]
pub trait ContextPersistence: Send + Sync {
    /// Load the context for `user`, falling back to the default context when
    /// the cache has no record.
    async fn load(&self, user: &str, options: &RequestOptions) -> ContextResult<UserContext>;

    /// Overwrite the stored record with `context`.
    async fn save(&self, context: &UserContext, options: &RequestOptions) -> ContextResult<()>;

    /// Ask the cache to drop the record for `user`.
    async fn delete(&self, user: &str, options: &RequestOptions) -> ContextResult<DeleteResponse>;
}

/// Raw answer to a delete request. The status is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    pub status: u16,
    pub body: String,
}

impl DeleteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP-backed user-context store.
#[derive(Debug, Clone)]
pub struct ContextStore {
    http: HttpBackend,
}

impl ContextStore {
    pub fn new(config: StoreConfig) -> ContextResult<Self> {
        let endpoint = endpoint_url(&config.url)?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(STORE_USER_AGENT));

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| ContextError::Network {
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            http: HttpBackend { client, endpoint },
        })
    }

    pub fn from_env() -> ContextResult<Self> {
        Self::new(StoreConfig::from_env())
    }

    /// Full URL of the user-context cache endpoint.
    pub fn endpoint(&self) -> &str {
        self.http.endpoint.as_str()
    }
}

#[async_trait]
impl ContextPersistence for ContextStore {
    async fn load(&self, user: &str, options: &RequestOptions) -> ContextResult<UserContext> {
        debug!(url = %self.http.endpoint, user = %user, "loading user context");

        let text = match self.http.fetch_record(user, options).await? {
            RecordOutcome::Found(text) => text,
            RecordOutcome::NotFound => {
                debug!(user = %user, "using default user context");
                codec::encode(&UserContext::default_for(user))?
            }
        };

        codec::decode(&text)
    }

    async fn save(&self, context: &UserContext, options: &RequestOptions) -> ContextResult<()> {
        debug!(url = %self.http.endpoint, user = %context.user, "saving user context");

        let data = codec::encode(context)?;
        self.http.submit_record(&context.user, &data, options).await
    }

    async fn delete(&self, user: &str, options: &RequestOptions) -> ContextResult<DeleteResponse> {
        debug!(url = %self.http.endpoint, user = %user, "deleting user context");

        self.http.submit_delete(user, options).await
    }
}

fn endpoint_url(base: &str) -> ContextResult<Url> {
    let raw = format!("{}{}", base.trim_end_matches('/'), CONTEXT_CACHE_PATH);
    Url::parse(&raw).map_err(|e| ContextError::Config {
        message: format!("invalid user context url {:?}: {}", raw, e),
    })
}

//! Per-user context record backed by a remote user-context cache.
//!
//! A [`UserContext`] carries the Tango hosts a user works with, their device
//! filter patterns and a free-form extension bag. This crate provides:
//!
//! - The hierarchical [`DeviceFilter`] (domain → family → member cascading)
//! - The stored record encoding (base64 of the JSON record)
//! - [`ContextStore`], an HTTP client for load/save/delete against the cache
//! - [`ReportingStore`], which reports failed saves to an [`ErrorChannel`]
//! - Session bootstrap via [`UserContextController`] and [`AppRegistry`]
//!
//! # Quick Start
//!
//! ```no_run
//! use waltz_context::{ContextPersistence, ContextStore, RequestOptions, StoreConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = ContextStore::new(StoreConfig::from_env())?;
//! let options = RequestOptions::new().with_header("x-waltz-user", "alice");
//!
//! // A user with no stored record gets the default context.
//! let mut context = store.load("alice", &options).await?;
//! context.add_tango_host("tango-host:10000");
//! context.save(&store, &options).await?;
//!
//! let filter = context.to_device_filter();
//! for domain in filter.domain_filters() {
//!     println!("{}", domain);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `WALTZ_CONTEXT_URL` | Base URL of the cache server (default: `http://localhost:8080`) |
//! | `WALTZ_CONTEXT_TIMEOUT` | Request timeout in seconds (default: none) |

pub mod codec;
pub mod context;
pub mod error;
pub mod filter;
pub mod report;
pub mod session;
pub mod store;
pub mod types;

// Re-export main types
pub use context::UserContext;
pub use error::{ContextError, ContextResult};
pub use filter::{DeviceFilter, UNIVERSAL_PATTERN, WILDCARD};
pub use report::{ErrorChannel, ReportingStore, TracingChannel, CHANNEL_LOG, TOPIC_ERROR};
pub use session::{
    AppRegistry, ContextOutcome, CurrentUser, UserContextController, UserProvider,
    USER_CONTEXT_KEY,
};
pub use store::{ContextPersistence, ContextStore, DeleteResponse, STORE_USER_AGENT};
pub use types::{RequestOptions, StoreConfig, CONTEXT_CACHE_PATH};

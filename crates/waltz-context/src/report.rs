//! Error reporting around a [`ContextPersistence`] implementation.
//!
//! [`ReportingStore`] wraps a store and an [`ErrorChannel`]. A failed save is
//! dispatched to the channel once and then returned to the caller unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::context::UserContext;
use crate::error::{ContextError, ContextResult};
use crate::store::{ContextPersistence, DeleteResponse};
use crate::types::RequestOptions;

/// Topic for error notifications.
pub const TOPIC_ERROR: &str = "error";

/// Channel carrying log notifications.
pub const CHANNEL_LOG: &str = "channel:log";

/// Sink for failures that should be surfaced without altering control flow.
pub trait ErrorChannel: Send + Sync {
    fn dispatch(&self, error: &ContextError, topic: &str, channel: &str);
}

impl<C: ErrorChannel + ?Sized> ErrorChannel for Arc<C> {
    fn dispatch(&self, error: &ContextError, topic: &str, channel: &str) {
        (**self).dispatch(error, topic, channel)
    }
}

/// Error channel that writes to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChannel;

impl ErrorChannel for TracingChannel {
    fn dispatch(&self, err: &ContextError, topic: &str, channel: &str) {
        error!(error = %err, topic = %topic, channel = %channel, "user context failure");
    }
}

/// Store decorator that reports failed saves to an [`ErrorChannel`].
#[derive(Debug, Clone)]
pub struct ReportingStore<S, C> {
    inner: S,
    channel: C,
}

impl<S, C> ReportingStore<S, C>
where
    S: ContextPersistence,
    C: ErrorChannel,
{
    pub fn new(inner: S, channel: C) -> Self {
        Self { inner, channel }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}

#[async_trait]
impl<S, C> ContextPersistence for ReportingStore<S, C>
where
    S: ContextPersistence,
    C: ErrorChannel,
{
    async fn load(&self, user: &str, options: &RequestOptions) -> ContextResult<UserContext> {
        self.inner.load(user, options).await
    }

    async fn save(&self, context: &UserContext, options: &RequestOptions) -> ContextResult<()> {
        let result = self.inner.save(context, options).await;
        if let Err(err) = &result {
            self.channel.dispatch(err, TOPIC_ERROR, CHANNEL_LOG);
        }
        result
    }

    async fn delete(&self, user: &str, options: &RequestOptions) -> ContextResult<DeleteResponse> {
        self.inner.delete(user, options).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingChannel {
        seen: Mutex<Vec<(String, String, String)>>,
    }

    impl ErrorChannel for RecordingChannel {
        fn dispatch(&self, error: &ContextError, topic: &str, channel: &str) {
            self.seen.lock().unwrap().push((
                error.to_string(),
                topic.to_string(),
                channel.to_string(),
            ));
        }
    }

    /// In-memory store whose saves and loads can be made to fail.
    struct FakeStore {
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl ContextPersistence for FakeStore {
        async fn load(&self, user: &str, _: &RequestOptions) -> ContextResult<UserContext> {
            match self.fail_with {
                Some(status) => Err(ContextError::Load {
                    user: user.to_string(),
                    status,
                    status_text: String::new(),
                }),
                None => Ok(UserContext::default_for(user)),
            }
        }

        async fn save(&self, context: &UserContext, _: &RequestOptions) -> ContextResult<()> {
            match self.fail_with {
                Some(status) => Err(ContextError::Save {
                    user: context.user.clone(),
                    status,
                    status_text: "Internal Server Error".to_string(),
                }),
                None => Ok(()),
            }
        }

        async fn delete(&self, _: &str, _: &RequestOptions) -> ContextResult<DeleteResponse> {
            Ok(DeleteResponse {
                status: self.fail_with.unwrap_or(200),
                body: String::new(),
            })
        }
    }

    fn reporting(fail_with: Option<u16>) -> ReportingStore<FakeStore, Arc<RecordingChannel>> {
        ReportingStore::new(FakeStore { fail_with }, Arc::new(RecordingChannel::default()))
    }

    #[tokio::test]
    async fn test_failed_save_is_reported_once_and_returned() {
        let store = reporting(Some(500));
        let context = UserContext::default_for("alice");

        let err = context
            .save(&store, &RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        let seen = store.channel().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, err.to_string());
        assert_eq!(seen[0].1, TOPIC_ERROR);
        assert_eq!(seen[0].2, CHANNEL_LOG);
    }

    #[tokio::test]
    async fn test_successful_save_returns_same_context() {
        let store = reporting(None);
        let context = UserContext::default_for("alice");

        let saved = context.save(&store, &RequestOptions::new()).await.unwrap();

        assert!(std::ptr::eq(saved, &context));
        assert!(store.channel().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_and_delete_are_not_reported() {
        let store = reporting(Some(503));
        let options = RequestOptions::new();

        assert!(store.load("alice", &options).await.is_err());
        let response = store.delete("alice", &options).await.unwrap();

        assert_eq!(response.status, 503);
        assert!(store.channel().seen.lock().unwrap().is_empty());
    }
}

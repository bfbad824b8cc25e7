//! Error types for the user-context store.

/// User-context errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Remote cache rejected a load with a status other than 2xx/404.
    #[error("failed to load UserContext[{user}] due to {status}: {status_text}")]
    Load {
        user: String,
        status: u16,
        status_text: String,
    },

    /// Remote cache rejected a save.
    #[error("failed to save UserContext[{user}] due to {status}: {status_text}")]
    Save {
        user: String,
        status: u16,
        status_text: String,
    },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Persisted record could not be decoded.
    #[error("invalid user context payload: {message}")]
    Decode { message: String },

    /// A forwarded header is not valid HTTP.
    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Registry key was already written.
    #[error("context already registered: {key}")]
    AlreadyRegistered { key: String },
}

impl ContextError {
    /// HTTP status carried by transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Load { status, .. } | Self::Save { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn payload(message: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for ContextError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for user-context operations.
pub type ContextResult<T> = Result<T, ContextError>;

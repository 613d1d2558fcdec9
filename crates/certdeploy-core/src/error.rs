//! Error types for certificate deployment.

use thiserror::Error;

use crate::provider::Taxonomy;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config `{0}` is required")]
    MissingConfig(String),

    #[error("invalid config `{field}`: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("unknown {taxonomy} provider '{id}'")]
    UnknownProvider { taxonomy: Taxonomy, id: String },

    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),

    #[error("failed to upload certificate file: {0}")]
    Upload(Box<Error>),

    #[error("failed to execute sdk request '{operation}': {cause}")]
    Platform {
        operation: String,
        cause: PlatformError,
    },

    #[error("unexpected deployment job status: {0}")]
    UnexpectedJobStatus(String),

    #[error("deployment job finished with {failed} of {total} sub-tasks failed")]
    JobFailed { failed: u64, total: u64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{}", join_messages(.0))]
    Partial(Vec<Error>),

    #[error("{context}: {cause}")]
    Context { context: String, cause: Box<Error> },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure reported by a vendor transport.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to send request: {0}")]
    Request(String),

    #[error("unexpected status code: {status}, resp: {body}")]
    Status { status: u16, body: String },

    #[error("code='{code}', message='{message}'")]
    Api {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl Error {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingConfig(field.into())
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn platform(operation: impl Into<String>, cause: PlatformError) -> Self {
        Self::Platform {
            operation: operation.into(),
            cause,
        }
    }

    /// Wrap this error with the name of the action that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            cause: Box::new(self),
        }
    }

    /// Join per-resource failures. Returns `None` when there are none and
    /// unwraps a single failure.
    pub fn join(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Partial(errors)),
        }
    }

    /// Strips `Context` and `Upload` wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::Context { cause, .. } | Self::Upload(cause) => cause.root(),
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Self::Cancelled)
    }

    /// Configuration problems are detected before any platform call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root(),
            Self::MissingConfig(_) | Self::InvalidConfig { .. } | Self::UnknownProvider { .. }
        )
    }

    pub fn is_platform(&self) -> bool {
        matches!(self.root(), Self::Platform { .. })
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, Error>;

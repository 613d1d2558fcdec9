//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("KDL parse error: {0}")]
    Parse(#[from] kdl::KdlError),

    #[error("config `{0}` is required")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to decode {provider} config: {message}")]
    Decode { provider: String, message: String },

    #[error("duplicate definition: {0}")]
    Duplicate(String),

    #[error("unsupported deployment provider '{0}'")]
    UnsupportedProvider(String),

    #[error("unresolved variable: ${{{0}}}")]
    UnresolvedVariable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for certdeploy_core::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingField(field) => Self::MissingConfig(field),
            ConfigError::InvalidValue { field, message } => Self::InvalidConfig { field, message },
            ConfigError::Decode { provider, message } => Self::InvalidConfig {
                field: provider,
                message,
            },
            other => Self::InvalidConfig {
                field: "config".to_string(),
                message: other.to_string(),
            },
        }
    }
}

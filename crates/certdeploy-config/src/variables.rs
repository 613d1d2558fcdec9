//! Variable interpolation for configuration files.
//!
//! Supports variables like:
//! - `${env.VAR_NAME}` - Environment variable
//! - `${name}` - Custom variable
//!
//! Credentials are usually kept out of access files this way:
//! `secretKey "${env.TENCENTCLOUD_SECRET_KEY}"`.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::{ConfigError, ConfigResult};

// Regex for matching ${...} variables
static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}").unwrap()
});

/// Values available for interpolation.
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    pub env: HashMap<String, String>,
    pub custom: HashMap<String, String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context populated from the current process environment.
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
            custom: HashMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.custom.insert(name.to_string(), value.into());
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, var_name: &str) -> Option<&str> {
        let parts: Vec<&str> = var_name.split('.').collect();

        match parts.as_slice() {
            ["env", name] => self.env.get(*name).map(|s| s.as_str()),
            [name] => self.custom.get(*name).map(|s| s.as_str()),
            _ => None,
        }
    }

    /// Interpolate all variables in a string. Unknown variables are an error:
    /// a literal `${...}` must never reach a platform as a credential.
    pub fn interpolate(&self, input: &str) -> ConfigResult<String> {
        if let Some(missing) = VAR_REGEX
            .captures_iter(input)
            .map(|caps| caps[1].to_string())
            .find(|name| self.resolve(name).is_none())
        {
            return Err(ConfigError::UnresolvedVariable(missing));
        }

        Ok(VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                self.resolve(&caps[1]).unwrap_or_default().to_string()
            })
            .to_string())
    }

    /// Interpolate every string inside a JSON value, in place.
    pub fn interpolate_value(&self, value: &mut Value) -> ConfigResult<()> {
        match value {
            Value::String(s) => {
                *s = self.interpolate(s)?;
            }
            Value::Array(items) => {
                for item in items {
                    self.interpolate_value(item)?;
                }
            }
            Value::Object(map) => {
                for item in map.values_mut() {
                    self.interpolate_value(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

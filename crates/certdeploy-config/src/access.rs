//! Typed credential configuration per access kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ConfigError, ConfigResult, Secret};
use certdeploy_core::provider::access;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TencentCloudAccessConfig {
    pub secret_id: String,
    pub secret_key: Secret,
}

impl TencentCloudAccessConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        require("secretId", &self.secret_id)?;
        require_secret("secretKey", &self.secret_key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AliyunAccessConfig {
    pub access_key_id: String,
    pub access_key_secret: Secret,
    pub resource_group_id: String,
}

impl AliyunAccessConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        require("accessKeyId", &self.access_key_id)?;
        require_secret("accessKeySecret", &self.access_key_secret)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KongAccessConfig {
    pub server_url: String,
    pub api_token: Secret,
    pub allow_insecure_connections: bool,
}

impl KongAccessConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        require("serverUrl", &self.server_url)?;
        url::Url::parse(&self.server_url)
            .map_err(|e| ConfigError::invalid("serverUrl", e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetlifyAccessConfig {
    pub api_token: Secret,
}

impl NetlifyAccessConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        require_secret("apiToken", &self.api_token)
    }
}

/// Credential configuration of the access kinds used by the built-in deployers.
#[derive(Debug, Clone)]
pub enum AccessConfig {
    Aliyun(AliyunAccessConfig),
    Kong(KongAccessConfig),
    Netlify(NetlifyAccessConfig),
    TencentCloud(TencentCloudAccessConfig),
}

impl AccessConfig {
    /// Decode an access record's fields for the given access kind.
    pub fn decode(kind: &str, config: &Map<String, Value>) -> ConfigResult<Self> {
        let value = Value::Object(config.clone());
        let decoded = match kind {
            access::ALIYUN => Self::Aliyun(decode_as(kind, value)?),
            access::KONG => Self::Kong(decode_as(kind, value)?),
            access::NETLIFY => Self::Netlify(decode_as(kind, value)?),
            access::TENCENTCLOUD => Self::TencentCloud(decode_as(kind, value)?),
            other => {
                return Err(ConfigError::invalid(
                    "provider",
                    format!("unsupported access provider '{}'", other),
                ));
            }
        };
        Ok(decoded)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            Self::Aliyun(c) => c.validate(),
            Self::Kong(c) => c.validate(),
            Self::Netlify(c) => c.validate(),
            Self::TencentCloud(c) => c.validate(),
        }
    }
}

pub(crate) fn decode_as<T: serde::de::DeserializeOwned>(provider: &str, value: Value) -> ConfigResult<T> {
    serde_json::from_value(value).map_err(|e| ConfigError::Decode {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn require(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    Ok(())
}

pub(crate) fn require_secret(field: &str, value: &Secret) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    Ok(())
}

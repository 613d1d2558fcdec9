//! Typed deployer configuration, one struct per deployment provider.
//!
//! A deployer config is decoded fresh for every invocation from the node's
//! `providerConfig` merged with the fields of the access record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::access::{decode_as, require};
use crate::de::string_list;
use crate::{
    AliyunAccessConfig, ConfigError, ConfigResult, KongAccessConfig, NetlifyAccessConfig,
    TencentCloudAccessConfig,
};
use certdeploy_core::ProviderIdentifier;
use certdeploy_core::provider::deployment;

/// Resource types of the SSL update job that accept a region constraint.
pub const REGION_SCOPED_RESOURCE_TYPES: &[&str] =
    &["apigateway", "clb", "cos", "tcb", "tke", "tse", "waf"];

/// Tencent Cloud CDN and ECDN share one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TencentCloudCdnConfig {
    #[serde(flatten)]
    pub access: TencentCloudAccessConfig,
    pub endpoint: String,
    /// Accelerated domain; `*.` matches every domain bound to the certificate.
    pub domain: String,
}

impl TencentCloudCdnConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        require("domain", &self.domain)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TencentCloudCssConfig {
    #[serde(flatten)]
    pub access: TencentCloudAccessConfig,
    pub endpoint: String,
    /// Playback domain.
    pub domain: String,
}

impl TencentCloudCssConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        require("domain", &self.domain)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TencentCloudSslUpdateConfig {
    #[serde(flatten)]
    pub access: TencentCloudAccessConfig,
    pub endpoint: String,
    /// Certificate currently bound to the cloud resources.
    pub certificate_id: String,
    /// Replace the content of the old certificate, keeping its id.
    pub is_replaced: bool,
    #[serde(deserialize_with = "string_list")]
    pub resource_types: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub resource_regions: Vec<String>,
}

impl TencentCloudSslUpdateConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        require("certificateId", &self.certificate_id)?;
        if self.resource_types.is_empty() {
            return Err(ConfigError::MissingField("resourceTypes".to_string()));
        }
        Ok(())
    }

    /// Region constraints per resource type. Empty unless both lists are
    /// non-empty; only region-scoped resource types are included.
    pub fn resource_type_regions(&self) -> Vec<(String, Vec<String>)> {
        if self.resource_types.is_empty() || self.resource_regions.is_empty() {
            return Vec::new();
        }

        self.resource_types
            .iter()
            .filter(|t| REGION_SCOPED_RESOURCE_TYPES.contains(&t.as_str()))
            .map(|t| (t.clone(), self.resource_regions.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AliyunDdosConfig {
    #[serde(flatten)]
    pub access: AliyunAccessConfig,
    pub region: String,
    /// Website domain of the forwarding rule.
    pub domain: String,
}

impl AliyunDdosConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        require("domain", &self.domain)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KongConfig {
    #[serde(flatten)]
    pub access: KongAccessConfig,
    pub resource_type: String,
    pub workspace: String,
    /// Required when the resource type is `certificate`.
    pub certificate_id: String,
}

impl KongConfig {
    pub const RESOURCE_TYPE_CERTIFICATE: &'static str = "certificate";

    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        match self.resource_type.as_str() {
            Self::RESOURCE_TYPE_CERTIFICATE => require("certificateId", &self.certificate_id),
            other => Err(ConfigError::invalid(
                "resourceType",
                format!("unsupported resource type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetlifySiteConfig {
    #[serde(flatten)]
    pub access: NetlifyAccessConfig,
    pub site_id: String,
}

impl NetlifySiteConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.access.validate()?;
        require("siteId", &self.site_id)
    }
}

/// Deployer configuration keyed by deployment provider identifier.
#[derive(Debug, Clone)]
pub enum DeployerConfig {
    AliyunDdos(AliyunDdosConfig),
    Kong(KongConfig),
    NetlifySite(NetlifySiteConfig),
    TencentCloudCdn(TencentCloudCdnConfig),
    TencentCloudCss(TencentCloudCssConfig),
    TencentCloudEcdn(TencentCloudCdnConfig),
    TencentCloudSslUpdate(TencentCloudSslUpdateConfig),
}

impl DeployerConfig {
    /// Decode the merged configuration for a deployment provider. Fails on
    /// shape mismatches; required fields are checked by [`Self::validate`].
    pub fn decode(provider: ProviderIdentifier, merged: Map<String, Value>) -> ConfigResult<Self> {
        let id = provider.as_str();
        let value = Value::Object(merged);
        let config = match id {
            deployment::ALIYUN_DDOS => Self::AliyunDdos(decode_as(id, value)?),
            deployment::KONG => Self::Kong(decode_as(id, value)?),
            deployment::NETLIFY_SITE => Self::NetlifySite(decode_as(id, value)?),
            deployment::TENCENTCLOUD_CDN => Self::TencentCloudCdn(decode_as(id, value)?),
            deployment::TENCENTCLOUD_CSS => Self::TencentCloudCss(decode_as(id, value)?),
            deployment::TENCENTCLOUD_ECDN => Self::TencentCloudEcdn(decode_as(id, value)?),
            deployment::TENCENTCLOUD_SSL_UPDATE => {
                Self::TencentCloudSslUpdate(decode_as(id, value)?)
            }
            other => return Err(ConfigError::UnsupportedProvider(other.to_string())),
        };
        Ok(config)
    }

    /// Provider identifier this config belongs to.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::AliyunDdos(_) => deployment::ALIYUN_DDOS,
            Self::Kong(_) => deployment::KONG,
            Self::NetlifySite(_) => deployment::NETLIFY_SITE,
            Self::TencentCloudCdn(_) => deployment::TENCENTCLOUD_CDN,
            Self::TencentCloudCss(_) => deployment::TENCENTCLOUD_CSS,
            Self::TencentCloudEcdn(_) => deployment::TENCENTCLOUD_ECDN,
            Self::TencentCloudSslUpdate(_) => deployment::TENCENTCLOUD_SSL_UPDATE,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            Self::AliyunDdos(c) => c.validate(),
            Self::Kong(c) => c.validate(),
            Self::NetlifySite(c) => c.validate(),
            Self::TencentCloudCdn(c) | Self::TencentCloudEcdn(c) => c.validate(),
            Self::TencentCloudCss(c) => c.validate(),
            Self::TencentCloudSslUpdate(c) => c.validate(),
        }
    }
}

/// Merge the node's provider configuration with the access record's fields.
/// Credential fields from the access record take precedence.
pub fn merge_config(access: &Map<String, Value>, provider_config: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = provider_config.clone();
    for (key, value) in access {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use certdeploy_core::Taxonomy;
    use serde_json::json;

    fn identifier(id: &str) -> ProviderIdentifier {
        ProviderIdentifier::resolve(Taxonomy::Deployment, id).unwrap()
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_decode_cdn_from_merged_config() {
        let merged = merge_config(
            &map(json!({ "secretId": "AKID", "secretKey": "key" })),
            &map(json!({ "domain": "*.example.com", "endpoint": "cdn.intl.tencentcloudapi.com" })),
        );
        let config = DeployerConfig::decode(identifier("tencentcloud-cdn"), merged).unwrap();
        assert_eq!(config.provider(), "tencentcloud-cdn");
        config.validate().unwrap();

        match config {
            DeployerConfig::TencentCloudCdn(c) => {
                assert_eq!(c.access.secret_id, "AKID");
                assert_eq!(c.domain, "*.example.com");
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_access_fields_win_on_merge() {
        let merged = merge_config(
            &map(json!({ "secretId": "from-access" })),
            &map(json!({ "secretId": "from-node", "domain": "a.example.com" })),
        );
        assert_eq!(merged["secretId"], "from-access");
        assert_eq!(merged["domain"], "a.example.com");
    }

    #[test]
    fn test_empty_domain_is_missing() {
        let config = DeployerConfig::decode(
            identifier("tencentcloud-css"),
            map(json!({ "secretId": "AKID", "secretKey": "key", "domain": "" })),
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "domain"));
    }

    #[test]
    fn test_css_accepts_wildcard() {
        let config = DeployerConfig::decode(
            identifier("tencentcloud-css"),
            map(json!({ "secretId": "AKID", "secretKey": "key", "domain": "*.example.com" })),
        )
        .unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_domain_syntax_is_left_to_the_platform() {
        for id in ["tencentcloud-cdn", "tencentcloud-css", "aliyun-ddos"] {
            let config = DeployerConfig::decode(
                identifier(id),
                map(json!({
                    "secretId": "AKID",
                    "secretKey": "key",
                    "accessKeyId": "id",
                    "accessKeySecret": "secret",
                    "domain": "直播.example.com"
                })),
            )
            .unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_ssl_update_lists_and_regions() {
        let config = DeployerConfig::decode(
            identifier("tencentcloud-sslupdate"),
            map(json!({
                "secretId": "AKID",
                "secretKey": "key",
                "certificateId": "old-cert",
                "isReplaced": true,
                "resourceTypes": "clb;cdn;waf",
                "resourceRegions": ["ap-guangzhou", "ap-shanghai"]
            })),
        )
        .unwrap();
        config.validate().unwrap();

        let DeployerConfig::TencentCloudSslUpdate(c) = config else {
            panic!("unexpected config variant");
        };
        assert!(c.is_replaced);
        assert_eq!(c.resource_types, vec!["clb", "cdn", "waf"]);

        let regions = c.resource_type_regions();
        let types: Vec<&str> = regions.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(types, vec!["clb", "waf"]);
        assert_eq!(regions[0].1, vec!["ap-guangzhou", "ap-shanghai"]);
    }

    #[test]
    fn test_ssl_update_regions_need_both_lists() {
        let config = TencentCloudSslUpdateConfig {
            resource_types: vec!["clb".to_string()],
            ..Default::default()
        };
        assert!(config.resource_type_regions().is_empty());
    }

    #[test]
    fn test_ssl_update_requires_resource_types() {
        let config = DeployerConfig::decode(
            identifier("tencentcloud-sslupdate"),
            map(json!({ "secretId": "AKID", "secretKey": "key", "certificateId": "c" })),
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "resourceTypes"));
    }

    #[test]
    fn test_kong_resource_type() {
        let base = json!({ "serverUrl": "https://kong.example.com:8001", "apiToken": "t" });

        let mut fields = map(base.clone());
        fields.insert("resourceType".to_string(), json!("service"));
        let config = DeployerConfig::decode(identifier("kong"), fields).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported resource type 'service'"));

        let mut fields = map(base);
        fields.insert("resourceType".to_string(), json!("certificate"));
        let config = DeployerConfig::decode(identifier("kong"), fields).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "certificateId"));
    }

    #[test]
    fn test_unsupported_provider() {
        let err = DeployerConfig::decode(identifier("apisix"), Map::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedProvider(id) if id == "apisix"));
    }

    #[test]
    fn test_wrong_type_fails_decode() {
        let err = DeployerConfig::decode(
            identifier("tencentcloud-sslupdate"),
            map(json!({ "isReplaced": "maybe" })),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }
}

//! Tencent Cloud Streaming Services (`live`, 2018-08-01).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Credential, TencentCloudClient};
use crate::http::ApiResult;

pub const SERVICE: &str = "live";
pub const VERSION: &str = "2018-08-01";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LiveCertDomainInfo {
    pub domain_name: String,
    /// 1 enables HTTPS for the domain.
    pub status: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyLiveDomainCertBindingsRequest {
    pub domain_infos: Vec<LiveCertDomainInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cert_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModifyLiveDomainCertBindingsResponse {
    pub mismatched_domain_names: Option<Vec<String>>,
    pub request_id: Option<String>,
}

#[async_trait]
pub trait LiveApi: Send + Sync {
    async fn modify_live_domain_cert_bindings(
        &self,
        request: &ModifyLiveDomainCertBindingsRequest,
    ) -> ApiResult<ModifyLiveDomainCertBindingsResponse>;
}

#[derive(Debug, Clone)]
pub struct LiveClient {
    inner: TencentCloudClient,
}

impl LiveClient {
    pub fn new(credential: Credential, endpoint: &str) -> ApiResult<Self> {
        Ok(Self {
            inner: TencentCloudClient::new(credential, SERVICE, VERSION, endpoint)?,
        })
    }
}

#[async_trait]
impl LiveApi for LiveClient {
    async fn modify_live_domain_cert_bindings(
        &self,
        request: &ModifyLiveDomainCertBindingsRequest,
    ) -> ApiResult<ModifyLiveDomainCertBindingsResponse> {
        self.inner.call("ModifyLiveDomainCertBindings", request).await
    }
}

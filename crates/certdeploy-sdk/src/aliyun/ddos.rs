//! Alibaba Cloud Anti-DDoS Proxy (`ddoscoo`, 2020-01-01).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AliyunClient, Credential, DEFAULT_REGION};
use crate::http::ApiResult;

pub const VERSION: &str = "2020-01-01";

pub fn endpoint_for(region: &str) -> String {
    let region = if region.is_empty() { DEFAULT_REGION } else { region };
    format!("ddoscoo.{}.aliyuncs.com", region)
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssociateWebCertRequest {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AssociateWebCertResponse {
    pub request_id: Option<String>,
}

#[async_trait]
pub trait DdosApi: Send + Sync {
    async fn associate_web_cert(
        &self,
        request: &AssociateWebCertRequest,
    ) -> ApiResult<AssociateWebCertResponse>;
}

#[derive(Debug, Clone)]
pub struct DdosClient {
    inner: AliyunClient,
}

impl DdosClient {
    pub fn new(credential: Credential, region: &str) -> ApiResult<Self> {
        Ok(Self {
            inner: AliyunClient::new(credential, VERSION, &endpoint_for(region))?,
        })
    }
}

#[async_trait]
impl DdosApi for DdosClient {
    async fn associate_web_cert(
        &self,
        request: &AssociateWebCertRequest,
    ) -> ApiResult<AssociateWebCertResponse> {
        self.inner.call("AssociateWebCert", request).await
    }
}

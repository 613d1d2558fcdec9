//! Alibaba Cloud Certificate Management Service (`cas`, 2020-04-07).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AliyunClient, Credential, DEFAULT_REGION};
use crate::http::ApiResult;
use certdeploy_core::Secret;

pub const VERSION: &str = "2020-04-07";

/// Endpoint of the certificate store in `region`.
pub fn endpoint_for(region: &str) -> String {
    if region.is_empty() || region == DEFAULT_REGION {
        "cas.aliyuncs.com".to_string()
    } else {
        format!("cas.{}.aliyuncs.com", region)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserCertificateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// `UPLOAD` restricts the listing to uploaded certificates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CertificateOrder {
    pub certificate_id: Option<i64>,
    pub name: Option<String>,
    pub common_name: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListUserCertificateOrderResponse {
    pub certificate_order_list: Option<Vec<CertificateOrder>>,
    pub total_count: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadUserCertificateRequest {
    pub name: String,
    pub cert: String,
    pub key: Secret,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UploadUserCertificateResponse {
    pub cert_id: Option<i64>,
    pub request_id: Option<String>,
}

#[async_trait]
pub trait CasApi: Send + Sync {
    async fn list_user_certificate_order(
        &self,
        request: &ListUserCertificateOrderRequest,
    ) -> ApiResult<ListUserCertificateOrderResponse>;

    async fn upload_user_certificate(
        &self,
        request: &UploadUserCertificateRequest,
    ) -> ApiResult<UploadUserCertificateResponse>;
}

#[derive(Debug, Clone)]
pub struct CasClient {
    inner: AliyunClient,
}

impl CasClient {
    pub fn new(credential: Credential, region: &str) -> ApiResult<Self> {
        Ok(Self {
            inner: AliyunClient::new(credential, VERSION, &endpoint_for(region))?,
        })
    }

    /// Client against an explicit endpoint.
    pub fn with_endpoint(credential: Credential, endpoint: &str) -> ApiResult<Self> {
        Ok(Self {
            inner: AliyunClient::new(credential, VERSION, endpoint)?,
        })
    }
}

#[async_trait]
impl CasApi for CasClient {
    async fn list_user_certificate_order(
        &self,
        request: &ListUserCertificateOrderRequest,
    ) -> ApiResult<ListUserCertificateOrderResponse> {
        self.inner.call("ListUserCertificateOrder", request).await
    }

    async fn upload_user_certificate(
        &self,
        request: &UploadUserCertificateRequest,
    ) -> ApiResult<UploadUserCertificateResponse> {
        self.inner.call("UploadUserCertificate", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_for_region() {
        assert_eq!(endpoint_for(""), "cas.aliyuncs.com");
        assert_eq!(endpoint_for("cn-hangzhou"), "cas.aliyuncs.com");
        assert_eq!(endpoint_for("ap-southeast-1"), "cas.ap-southeast-1.aliyuncs.com");
    }

    #[test]
    fn test_list_response_decodes() {
        let response: ListUserCertificateOrderResponse = serde_json::from_str(
            r#"{"RequestId":"r","TotalCount":1,"CertificateOrderList":[{"CertificateId":1234,"Name":"certdeploy-abc","CommonName":"example.com"}]}"#,
        )
        .unwrap();
        let list = response.certificate_order_list.unwrap();
        assert_eq!(list[0].certificate_id, Some(1234));
        assert_eq!(list[0].name.as_deref(), Some("certdeploy-abc"));
    }
}

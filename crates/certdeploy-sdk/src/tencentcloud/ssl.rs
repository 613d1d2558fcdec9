//! Tencent Cloud SSL certificate service (`ssl`, 2019-12-05).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Credential, TencentCloudClient};
use crate::http::ApiResult;
use certdeploy_core::Secret;

pub const SERVICE: &str = "ssl";
pub const VERSION: &str = "2019-12-05";
pub const INTL_ENDPOINT: &str = "ssl.intl.tencentcloudapi.com";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadCertificateRequest {
    pub certificate_public_key: String,
    pub certificate_private_key: Secret,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// `false` asks the platform to return the id of an identical
    /// certificate instead of creating a new one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UploadCertificateResponse {
    pub certificate_id: Option<String>,
    pub repeat_cert_id: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTypeRegions {
    pub resource_type: String,
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateCertificateInstanceRequest {
    pub old_certificate_id: String,
    pub certificate_id: String,
    pub resource_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_types_regions: Vec<ResourceTypeRegions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateCertificateInstanceResponse {
    pub deploy_record_id: Option<u64>,
    /// 1 once the job has started.
    pub deploy_status: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadUpdateCertificateInstanceRequest {
    pub old_certificate_id: String,
    pub certificate_public_key: String,
    pub certificate_private_key: Secret,
    pub resource_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_types_regions: Vec<ResourceTypeRegions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UploadUpdateCertificateInstanceResponse {
    pub deploy_record_id: Option<i64>,
    pub deploy_status: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeHostUpdateRecordDetailRequest {
    pub deploy_record_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeHostUpdateRecordDetailResponse {
    pub total_count: Option<i64>,
    pub running_total_count: Option<i64>,
    pub success_total_count: Option<i64>,
    pub failed_total_count: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeHostUploadUpdateRecordDetailRequest {
    pub deploy_record_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UploadUpdateRecordDetail {
    pub total_count: Option<i64>,
    pub running_total_count: Option<i64>,
    pub success_total_count: Option<i64>,
    pub failed_total_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeHostUploadUpdateRecordDetailResponse {
    pub deploy_record_detail: Option<Vec<UploadUpdateRecordDetail>>,
    pub request_id: Option<String>,
}

/// SSL certificate service operations.
#[async_trait]
pub trait SslApi: Send + Sync {
    async fn upload_certificate(
        &self,
        request: &UploadCertificateRequest,
    ) -> ApiResult<UploadCertificateResponse>;

    async fn update_certificate_instance(
        &self,
        request: &UpdateCertificateInstanceRequest,
    ) -> ApiResult<UpdateCertificateInstanceResponse>;

    async fn upload_update_certificate_instance(
        &self,
        request: &UploadUpdateCertificateInstanceRequest,
    ) -> ApiResult<UploadUpdateCertificateInstanceResponse>;

    async fn describe_host_update_record_detail(
        &self,
        request: &DescribeHostUpdateRecordDetailRequest,
    ) -> ApiResult<DescribeHostUpdateRecordDetailResponse>;

    async fn describe_host_upload_update_record_detail(
        &self,
        request: &DescribeHostUploadUpdateRecordDetailRequest,
    ) -> ApiResult<DescribeHostUploadUpdateRecordDetailResponse>;
}

#[derive(Debug, Clone)]
pub struct SslClient {
    inner: TencentCloudClient,
}

impl SslClient {
    pub fn new(credential: Credential, endpoint: &str) -> ApiResult<Self> {
        Ok(Self {
            inner: TencentCloudClient::new(credential, SERVICE, VERSION, endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        self.inner.endpoint()
    }
}

#[async_trait]
impl SslApi for SslClient {
    async fn upload_certificate(
        &self,
        request: &UploadCertificateRequest,
    ) -> ApiResult<UploadCertificateResponse> {
        self.inner.call("UploadCertificate", request).await
    }

    async fn update_certificate_instance(
        &self,
        request: &UpdateCertificateInstanceRequest,
    ) -> ApiResult<UpdateCertificateInstanceResponse> {
        self.inner.call("UpdateCertificateInstance", request).await
    }

    async fn upload_update_certificate_instance(
        &self,
        request: &UploadUpdateCertificateInstanceRequest,
    ) -> ApiResult<UploadUpdateCertificateInstanceResponse> {
        self.inner.call("UploadUpdateCertificateInstance", request).await
    }

    async fn describe_host_update_record_detail(
        &self,
        request: &DescribeHostUpdateRecordDetailRequest,
    ) -> ApiResult<DescribeHostUpdateRecordDetailResponse> {
        self.inner.call("DescribeHostUpdateRecordDetail", request).await
    }

    async fn describe_host_upload_update_record_detail(
        &self,
        request: &DescribeHostUploadUpdateRecordDetailRequest,
    ) -> ApiResult<DescribeHostUploadUpdateRecordDetailResponse> {
        self.inner
            .call("DescribeHostUploadUpdateRecordDetail", request)
            .await
    }
}

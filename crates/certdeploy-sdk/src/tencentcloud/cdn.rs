//! Tencent Cloud CDN (`cdn`, 2018-06-06) and ECDN (`ecdn`, 2019-10-12).
//!
//! Both products expose the same domain configuration calls. Certificate to
//! domain lookup always goes through the CDN service, scoped by product.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Credential, TencentCloudClient};
use crate::http::ApiResult;

pub const CDN_SERVICE: &str = "cdn";
pub const CDN_VERSION: &str = "2018-06-06";
pub const ECDN_SERVICE: &str = "ecdn";
pub const ECDN_VERSION: &str = "2019-10-12";

/// Which acceleration product a client manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdnProduct {
    Cdn,
    Ecdn,
}

impl CdnProduct {
    /// Value of the `Product` parameter of `DescribeCertDomains`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cdn => "cdn",
            Self::Ecdn => "ecdn",
        }
    }

    fn service(self) -> (&'static str, &'static str) {
        match self {
            Self::Cdn => (CDN_SERVICE, CDN_VERSION),
            Self::Ecdn => (ECDN_SERVICE, ECDN_VERSION),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertDomainsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeCertDomainsResponse {
    pub domains: Option<Vec<String>>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainFilter {
    pub name: String,
    pub value: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainsConfigRequest {
    pub offset: i64,
    pub limit: i64,
    pub filters: Vec<DomainFilter>,
}

impl DescribeDomainsConfigRequest {
    /// Exact lookup of a single domain.
    pub fn for_domain(domain: &str) -> Self {
        Self {
            offset: 0,
            limit: 1,
            filters: vec![DomainFilter {
                name: "domain".to_string(),
                value: vec![domain.to_string()],
            }],
        }
    }
}

/// Server certificate reference of an HTTPS configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerCert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerCert {
    pub fn with_id(cert_id: impl Into<String>) -> Self {
        Self {
            cert_id: Some(cert_id.into()),
            extra: Map::new(),
        }
    }
}

/// HTTPS configuration of a domain. Fields not modelled here are carried
/// through unchanged so an update keeps the existing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Https {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_info: Option<ServerCert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DomainDetail {
    pub domain: String,
    pub https: Option<Https>,
}

impl DomainDetail {
    pub fn bound_cert_id(&self) -> Option<&str> {
        self.https
            .as_ref()
            .and_then(|h| h.cert_info.as_ref())
            .and_then(|c| c.cert_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeDomainsConfigResponse {
    pub domains: Vec<DomainDetail>,
    pub total_number: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateDomainConfigRequest {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https: Option<Https>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateDomainConfigResponse {
    pub request_id: Option<String>,
}

/// Domain configuration operations of an acceleration product.
#[async_trait]
pub trait CdnApi: Send + Sync {
    fn product(&self) -> CdnProduct;

    async fn describe_cert_domains(
        &self,
        request: &DescribeCertDomainsRequest,
    ) -> ApiResult<DescribeCertDomainsResponse>;

    async fn describe_domains_config(
        &self,
        request: &DescribeDomainsConfigRequest,
    ) -> ApiResult<DescribeDomainsConfigResponse>;

    async fn update_domain_config(
        &self,
        request: &UpdateDomainConfigRequest,
    ) -> ApiResult<UpdateDomainConfigResponse>;
}

#[derive(Debug, Clone)]
pub struct CdnClient {
    product: CdnProduct,
    cdn: TencentCloudClient,
    domains: TencentCloudClient,
}

impl CdnClient {
    /// `endpoint` applies to the product's own service.
    pub fn new(credential: Credential, endpoint: &str, product: CdnProduct) -> ApiResult<Self> {
        let (service, version) = product.service();
        let cdn_endpoint = match product {
            CdnProduct::Cdn => endpoint,
            CdnProduct::Ecdn => "",
        };
        Ok(Self {
            product,
            cdn: TencentCloudClient::new(credential.clone(), CDN_SERVICE, CDN_VERSION, cdn_endpoint)?,
            domains: TencentCloudClient::new(credential, service, version, endpoint)?,
        })
    }
}

#[async_trait]
impl CdnApi for CdnClient {
    fn product(&self) -> CdnProduct {
        self.product
    }

    async fn describe_cert_domains(
        &self,
        request: &DescribeCertDomainsRequest,
    ) -> ApiResult<DescribeCertDomainsResponse> {
        self.cdn.call("DescribeCertDomains", request).await
    }

    async fn describe_domains_config(
        &self,
        request: &DescribeDomainsConfigRequest,
    ) -> ApiResult<DescribeDomainsConfigResponse> {
        self.domains.call("DescribeDomainsConfig", request).await
    }

    async fn update_domain_config(
        &self,
        request: &UpdateDomainConfigRequest,
    ) -> ApiResult<UpdateDomainConfigResponse> {
        self.domains.call("UpdateDomainConfig", request).await
    }
}

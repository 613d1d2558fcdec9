//! Netlify API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{self, ApiResult, request_error};
use certdeploy_core::{PlatformError, Secret};

pub const BASE_URL: &str = "https://api.netlify.com/api/v1";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionSiteTlsCertificateParams {
    pub certificate: String,
    pub key: Secret,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_certificates: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SniCertificate {
    pub state: Option<String>,
    pub domains: Vec<String>,
    pub expires_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[async_trait]
pub trait NetlifyApi: Send + Sync {
    async fn provision_site_tls_certificate(
        &self,
        site_id: &str,
        params: &ProvisionSiteTlsCertificateParams,
    ) -> ApiResult<SniCertificate>;
}

#[derive(Debug, Clone)]
pub struct NetlifyClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: Secret,
}

impl NetlifyClient {
    pub fn new(api_token: Secret) -> ApiResult<Self> {
        Self::with_base_url(BASE_URL, api_token)
    }

    pub fn with_base_url(base_url: &str, api_token: Secret) -> ApiResult<Self> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| PlatformError::Request(format!("invalid base url: {}", e)))?;
        Ok(Self {
            http: http::build_client(false)?,
            base_url,
            api_token,
        })
    }
}

#[async_trait]
impl NetlifyApi for NetlifyClient {
    async fn provision_site_tls_certificate(
        &self,
        site_id: &str,
        params: &ProvisionSiteTlsCertificateParams,
    ) -> ApiResult<SniCertificate> {
        let url = self
            .base_url
            .join(&format!("sites/{}/ssl", urlencoding::encode(site_id)))
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let query = http::to_params(params)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_token.expose())
            .query(&query)
            .send()
            .await
            .map_err(request_error)?;

        let (_, body) = http::read_body(response).await?;
        http::decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_provision_site_tls_certificate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sites/site-1/ssl"))
            .and(header("Authorization", "Bearer token"))
            .and(query_param("certificate", "LEAF"))
            .and(query_param("key", "KEY"))
            .and(query_param("ca_certificates", "CHAIN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": "custom",
                "domains": ["example.com"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NetlifyClient::with_base_url(
            &format!("{}/api/v1", server.uri()),
            Secret::new("token"),
        )
        .unwrap();
        let cert = client
            .provision_site_tls_certificate(
                "site-1",
                &ProvisionSiteTlsCertificateParams {
                    certificate: "LEAF".to_string(),
                    key: Secret::new("KEY"),
                    ca_certificates: "CHAIN".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(cert.state.as_deref(), Some("custom"));
        assert_eq!(cert.domains, vec!["example.com"]);
    }
}

//! Kong Admin API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{self, ApiResult, request_error};
use certdeploy_core::{PlatformError, Secret};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cert: String,
    #[serde(default, skip_serializing)]
    pub key: Secret,
    #[serde(default)]
    pub snis: Vec<String>,
}

/// Request body of a certificate upsert. Separate from [`Certificate`] so the
/// key is only ever serialized outbound.
#[derive(Serialize)]
struct CertificateBody<'a> {
    cert: &'a str,
    key: &'a str,
    snis: &'a [String],
}

#[async_trait]
pub trait KongApi: Send + Sync {
    /// Create or replace the certificate with the given id.
    async fn upsert_certificate(&self, certificate: &Certificate) -> ApiResult<Certificate>;
}

#[derive(Debug, Clone)]
pub struct KongClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: Secret,
}

impl KongClient {
    /// Requests go to `<server_url>/<workspace>` when a workspace is set.
    pub fn new(
        server_url: &str,
        workspace: &str,
        api_token: Secret,
        allow_insecure: bool,
    ) -> ApiResult<Self> {
        Ok(Self {
            http: http::build_client(allow_insecure)?,
            base_url: base_url(server_url, workspace)?,
            api_token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn base_url(server_url: &str, workspace: &str) -> ApiResult<Url> {
    let mut base = server_url.trim().trim_end_matches('/').to_string();
    if !workspace.is_empty() {
        base = format!("{}/{}", base, urlencoding::encode(workspace));
    }
    Url::parse(&format!("{}/", base))
        .map_err(|e| PlatformError::Request(format!("invalid server url '{}': {}", server_url, e)))
}

#[async_trait]
impl KongApi for KongClient {
    async fn upsert_certificate(&self, certificate: &Certificate) -> ApiResult<Certificate> {
        let id = certificate
            .id
            .as_deref()
            .ok_or_else(|| PlatformError::Request("certificate id is required".to_string()))?;
        let url = self
            .base_url
            .join(&format!("certificates/{}", urlencoding::encode(id)))
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let mut request = self.http.put(url).json(&CertificateBody {
            cert: &certificate.cert,
            key: certificate.key.expose(),
            snis: &certificate.snis,
        });
        if !self.api_token.is_empty() {
            request = request.header("Kong-Admin-Token", self.api_token.expose());
        }

        let response = request.send().await.map_err(request_error)?;
        let (_, body) = http::read_body(response).await?;
        http::decode(&body)
    }
}

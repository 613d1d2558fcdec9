//! Alibaba Cloud OpenAPI transport (RPC style, ACS3-HMAC-SHA256).

pub mod cas;
pub mod ddos;
pub mod sign;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

use crate::http::{self, ApiResult, request_error};
use certdeploy_core::{PlatformError, Secret};
use sign::SignRequest;

pub const DEFAULT_REGION: &str = "cn-hangzhou";

#[derive(Debug, Clone)]
pub struct Credential {
    pub access_key_id: String,
    pub access_key_secret: Secret,
}

impl Credential {
    pub fn new(access_key_id: impl Into<String>, access_key_secret: Secret) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret,
        }
    }
}

/// Client for one Alibaba Cloud product endpoint.
#[derive(Debug, Clone)]
pub struct AliyunClient {
    http: reqwest::Client,
    credential: Credential,
    version: &'static str,
    endpoint: Url,
}

impl AliyunClient {
    pub fn new(credential: Credential, version: &'static str, endpoint: &str) -> ApiResult<Self> {
        Ok(Self {
            http: http::build_client(false)?,
            credential,
            version,
            endpoint: http::endpoint_url(endpoint, endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Invoke an RPC action; request fields are sent as query parameters.
    pub async fn call<Req, Resp>(&self, action: &str, request: &Req) -> ApiResult<Resp>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let query = http::to_params(request)?;
        let payload_sha256 = sign::sha256_hex(b"");

        let headers = BTreeMap::from([
            ("host".to_string(), http::host_header(&self.endpoint)),
            ("x-acs-action".to_string(), action.to_string()),
            ("x-acs-content-sha256".to_string(), payload_sha256.clone()),
            (
                "x-acs-date".to_string(),
                Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            (
                "x-acs-signature-nonce".to_string(),
                Uuid::new_v4().simple().to_string(),
            ),
            ("x-acs-version".to_string(), self.version.to_string()),
        ]);

        let authorization = sign::authorization(
            &self.credential.access_key_id,
            self.credential.access_key_secret.expose(),
            &SignRequest {
                method: "POST",
                query: &query,
                headers: &headers,
                payload_sha256: &payload_sha256,
            },
        )?;

        let mut url = self.endpoint.clone();
        if !query.is_empty() {
            url.set_query(Some(&sign::canonical_query(&query)));
        }

        tracing::trace!(action, endpoint = %self.endpoint, "sending aliyun request");

        let mut builder = self.http.post(url).header("Authorization", authorization);
        for (name, value) in headers.iter().filter(|(name, _)| name.as_str() != "host") {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_error)?;
        parse_response(status, &body)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    if !(200..300).contains(&status) {
        return Err(match serde_json::from_str::<ApiError>(body) {
            Ok(err) => PlatformError::Api {
                code: err.code,
                message: err.message,
                request_id: err.request_id,
            },
            Err(_) => PlatformError::Status {
                status,
                body: body.to_string(),
            },
        });
    }

    http::decode(body)
}

/// Region the certificate store is addressed in: mainland regions share the
/// `cn-hangzhou` store, everything else uses `ap-southeast-1`.
pub fn cas_region_for(region: &str) -> &'static str {
    if region.is_empty() || region.starts_with("cn-") {
        DEFAULT_REGION
    } else {
        "ap-southeast-1"
    }
}

//! Tencent Cloud API 3.0 transport.
//!
//! Every product is a JSON-over-POST RPC surface signed with TC3-HMAC-SHA256.
//! Responses are wrapped in a `Response` object that carries either the
//! result fields or an `Error`.

pub mod cdn;
pub mod live;
pub mod sign;
pub mod ssl;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::http::{self, ApiResult, request_error};
use certdeploy_core::{PlatformError, Secret};
use sign::SignRequest;

pub const DOMAIN_SUFFIX: &str = "tencentcloudapi.com";
pub const INTL_DOMAIN_SUFFIX: &str = "intl.tencentcloudapi.com";

#[derive(Debug, Clone)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: Secret,
}

impl Credential {
    pub fn new(secret_id: impl Into<String>, secret_key: Secret) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key,
        }
    }
}

/// Client for one Tencent Cloud product.
#[derive(Debug, Clone)]
pub struct TencentCloudClient {
    http: reqwest::Client,
    credential: Credential,
    service: &'static str,
    version: &'static str,
    endpoint: Url,
}

impl TencentCloudClient {
    /// An empty endpoint means `<service>.tencentcloudapi.com`.
    pub fn new(
        credential: Credential,
        service: &'static str,
        version: &'static str,
        endpoint: &str,
    ) -> ApiResult<Self> {
        let default_host = format!("{}.{}", service, DOMAIN_SUFFIX);
        Ok(Self {
            http: http::build_client(false)?,
            credential,
            service,
            version,
            endpoint: http::endpoint_url(endpoint, &default_host)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Invoke an action and decode the fields of its `Response` object.
    pub async fn call<Req, Resp>(&self, action: &str, request: &Req) -> ApiResult<Resp>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let payload =
            serde_json::to_string(request).map_err(|e| PlatformError::Decode(e.to_string()))?;
        let timestamp = Utc::now().timestamp();
        let host = http::host_header(&self.endpoint);
        let authorization = sign::authorization(
            &self.credential.secret_id,
            self.credential.secret_key.expose(),
            &SignRequest {
                service: self.service,
                host: &host,
                action,
                payload: &payload,
                timestamp,
            },
        )?;

        tracing::trace!(service = self.service, action, "sending tencentcloud request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("Authorization", authorization)
            .header("Content-Type", sign::CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", self.version)
            .body(payload)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_error)?;
        parse_response(status, &body)
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    code: String,
    message: String,
}

fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&status) => {
            return Err(PlatformError::Status {
                status,
                body: body.to_string(),
            });
        }
        Err(e) => return Err(PlatformError::Decode(e.to_string())),
    };

    if let Some(error) = envelope.response.get("Error") {
        let error: ApiError = serde_json::from_value(error.clone())
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        return Err(PlatformError::Api {
            code: error.code,
            message: error.message,
            request_id: envelope
                .response
                .get("RequestId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        });
    }

    if !(200..300).contains(&status) {
        return Err(PlatformError::Status {
            status,
            body: body.to_string(),
        });
    }

    serde_json::from_value(envelope.response).map_err(|e| PlatformError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Pong {
        value: String,
        request_id: String,
    }

    fn credential() -> Credential {
        Credential::new("AKID", Secret::new("key"))
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"Response":{"Error":{"Code":"AuthFailure.SignatureFailure","Message":"bad signature"},"RequestId":"req-1"}}"#;
        let err = parse_response::<Value>(200, body).unwrap_err();
        match err {
            PlatformError::Api {
                code,
                message,
                request_id,
            } => {
                assert_eq!(code, "AuthFailure.SignatureFailure");
                assert_eq!(message, "bad signature");
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_json_failure() {
        let err = parse_response::<Value>(502, "bad gateway").unwrap_err();
        assert!(matches!(err, PlatformError::Status { status: 502, .. }));

        let err = parse_response::<Value>(200, "not json").unwrap_err();
        assert!(matches!(err, PlatformError::Decode(_)));
    }

    #[test]
    fn test_default_endpoint() {
        let client = TencentCloudClient::new(credential(), "ssl", "2019-12-05", "").unwrap();
        assert_eq!(client.endpoint().as_str(), "https://ssl.tencentcloudapi.com/");
    }

    #[tokio::test]
    async fn test_call_sends_signed_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "Ping"))
            .and(header("X-TC-Version", "2019-12-05"))
            .and(header_exists("X-TC-Timestamp"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Response": { "Value": "pong", "RequestId": "req-2" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            TencentCloudClient::new(credential(), "ssl", "2019-12-05", &server.uri()).unwrap();
        let pong: Pong = client.call("Ping", &serde_json::json!({})).await.unwrap();
        assert_eq!(pong.value, "pong");
        assert_eq!(pong.request_id, "req-2");
    }
}

//! Shared HTTP plumbing for the vendor clients.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use certdeploy_core::PlatformError;

pub type ApiResult<T> = std::result::Result<T, PlatformError>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!("certdeploy/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used by one vendor client.
pub fn build_client(allow_insecure: bool) -> ApiResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(allow_insecure)
        .build()
        .map_err(|e| PlatformError::Request(e.to_string()))
}

/// Resolve a configured endpoint. A bare host gets `https://`; an empty
/// endpoint falls back to `default_host`.
pub fn endpoint_url(endpoint: &str, default_host: &str) -> ApiResult<Url> {
    let endpoint = endpoint.trim();
    let endpoint = if endpoint.is_empty() {
        default_host
    } else {
        endpoint
    };

    let raw = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };

    Url::parse(&raw).map_err(|e| PlatformError::Request(format!("invalid endpoint '{}': {}", raw, e)))
}

/// The `Host` header value for a URL, including a non-default port.
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

pub(crate) fn request_error(err: reqwest::Error) -> PlatformError {
    PlatformError::Request(err.to_string())
}

/// Read a response body, failing on non-2xx statuses with the body attached.
pub async fn read_body(response: reqwest::Response) -> ApiResult<(u16, String)> {
    let status = response.status();
    let body = response.text().await.map_err(request_error)?;
    if !status.is_success() {
        return Err(PlatformError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok((status.as_u16(), body))
}

pub fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|e| PlatformError::Decode(e.to_string()))
}

/// Flatten a request struct into string parameters, skipping nulls.
/// Lists become `Name.1`, `Name.2`, ...
pub fn to_params<T: Serialize + ?Sized>(request: &T) -> ApiResult<BTreeMap<String, String>> {
    let value = serde_json::to_value(request).map_err(|e| PlatformError::Decode(e.to_string()))?;
    let mut params = BTreeMap::new();
    if let Value::Object(map) = value {
        for (key, value) in map {
            flatten_param(&mut params, key, value);
        }
    }
    Ok(params)
}

fn flatten_param(params: &mut BTreeMap<String, String>, key: String, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            params.insert(key, s);
        }
        Value::Array(items) => {
            for (i, item) in items.into_iter().enumerate() {
                flatten_param(params, format!("{}.{}", key, i + 1), item);
            }
        }
        Value::Object(map) => {
            for (child, value) in map {
                flatten_param(params, format!("{}.{}", key, child), value);
            }
        }
        other => {
            params.insert(key, other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let url = endpoint_url("", "ssl.tencentcloudapi.com").unwrap();
        assert_eq!(url.as_str(), "https://ssl.tencentcloudapi.com/");

        let url = endpoint_url("cdn.intl.tencentcloudapi.com", "cdn.tencentcloudapi.com").unwrap();
        assert_eq!(host_header(&url), "cdn.intl.tencentcloudapi.com");

        let url = endpoint_url("http://127.0.0.1:8080", "unused").unwrap();
        assert_eq!(host_header(&url), "127.0.0.1:8080");
    }

    #[test]
    fn test_to_params_flattens() {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Req {
            domain: String,
            cert_id: Option<i64>,
            key: Option<String>,
            tags: Vec<String>,
        }

        let params = to_params(&Req {
            domain: "example.com".to_string(),
            cert_id: Some(42),
            key: None,
            tags: vec!["a".to_string(), "b".to_string()],
        })
        .unwrap();

        assert_eq!(params["Domain"], "example.com");
        assert_eq!(params["CertId"], "42");
        assert!(!params.contains_key("Key"));
        assert_eq!(params["Tags.1"], "a");
        assert_eq!(params["Tags.2"], "b");
    }
}

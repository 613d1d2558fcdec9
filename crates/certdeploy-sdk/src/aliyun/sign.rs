//! ACS3-HMAC-SHA256 request signing.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::http::ApiResult;
use certdeploy_core::PlatformError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// Inputs of one signed call. Header names must be lowercase.
#[derive(Debug, Clone)]
pub struct SignRequest<'a> {
    pub method: &'a str,
    pub query: &'a BTreeMap<String, String>,
    pub headers: &'a BTreeMap<String, String>,
    pub payload_sha256: &'a str,
}

/// Compute the `Authorization` header value.
pub fn authorization(
    access_key_id: &str,
    access_key_secret: &str,
    req: &SignRequest<'_>,
) -> ApiResult<String> {
    let canonical_headers: String = req
        .headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v.trim()))
        .collect();
    let signed_headers = req
        .headers
        .keys()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n/\n{}\n{}\n{}\n{}",
        req.method,
        canonical_query(req.query),
        canonical_headers,
        signed_headers,
        req.payload_sha256,
    );
    let string_to_sign = format!("{}\n{}", ALGORITHM, sha256_hex(canonical_request.as_bytes()));

    let mut mac = HmacSha256::new_from_slice(access_key_secret.as_bytes())
        .map_err(|e| PlatformError::Request(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!(
        "{} Credential={},SignedHeaders={},Signature={}",
        ALGORITHM, access_key_id, signed_headers, signature
    ))
}

/// Sorted, RFC 3986 percent-encoded query string.
pub fn canonical_query(query: &BTreeMap<String, String>) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

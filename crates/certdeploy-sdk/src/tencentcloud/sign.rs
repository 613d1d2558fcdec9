//! TC3-HMAC-SHA256 request signing.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::http::ApiResult;
use certdeploy_core::PlatformError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Inputs of one signed call.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    pub service: &'a str,
    pub host: &'a str,
    pub action: &'a str,
    pub payload: &'a str,
    /// Unix timestamp, seconds.
    pub timestamp: i64,
}

/// Compute the `Authorization` header value.
pub fn authorization(secret_id: &str, secret_key: &str, req: &SignRequest<'_>) -> ApiResult<String> {
    let date = DateTime::from_timestamp(req.timestamp, 0)
        .ok_or_else(|| PlatformError::Request(format!("invalid timestamp {}", req.timestamp)))?
        .format("%Y-%m-%d")
        .to_string();

    let canonical_request = format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\nx-tc-action:{}\n\n{}\n{}",
        CONTENT_TYPE,
        req.host,
        req.action.to_lowercase(),
        SIGNED_HEADERS,
        sha256_hex(req.payload.as_bytes()),
    );

    let credential_scope = format!("{}/{}/tc3_request", date, req.service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        req.timestamp,
        credential_scope,
        sha256_hex(canonical_request.as_bytes()),
    );

    let secret_date = hmac_sha256(format!("TC3{}", secret_key).as_bytes(), date.as_bytes())?;
    let secret_service = hmac_sha256(&secret_date, req.service.as_bytes())?;
    let secret_signing = hmac_sha256(&secret_service, b"tc3_request")?;
    let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, secret_id, credential_scope, SIGNED_HEADERS, signature
    ))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> ApiResult<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| PlatformError::Request(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

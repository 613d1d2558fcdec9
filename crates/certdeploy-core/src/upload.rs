//! Upload manager trait.
//!
//! Upload managers put a certificate into a cloud family's certificate store
//! and hand back the id that activation calls on the same family refer to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cancel::CancellationToken;
use crate::{CertificateMaterial, Logger, Result};

/// Outcome of a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Platform-assigned certificate id.
    pub cert_id: String,
    /// Name the certificate is stored under, when the platform has one.
    pub cert_name: Option<String>,
    /// Whether the platform already held identical material.
    pub reused: bool,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl UploadResult {
    pub fn new(cert_id: impl Into<String>) -> Self {
        Self {
            cert_id: cert_id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.cert_name = Some(name.into());
        self
    }

    pub fn reused(mut self, reused: bool) -> Self {
        self.reused = reused;
        self
    }
}

/// Trait for certificate store upload managers.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Replace the logging sink. Defaults to discarding.
    fn set_logger(&mut self, logger: Logger);

    /// Upload the material, reusing an existing store entry where the platform
    /// allows it. Malformed PEM fails before any network call; platform errors
    /// are returned as-is and never retried.
    async fn upload(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<UploadResult>;
}

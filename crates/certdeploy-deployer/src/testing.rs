//! Fixtures shared by the provider tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use certdeploy_core::{
    CancellationToken, CertificateMaterial, Logger, Result, UploadResult, Uploader,
};

pub const CHAIN: &str = include_str!("../../../testdata/chain.pem");
pub const KEY: &str = include_str!("../../../testdata/privkey.pem");

pub fn material() -> CertificateMaterial {
    CertificateMaterial::new(CHAIN, KEY)
}

/// Upload manager that always hands back the same id.
#[derive(Clone)]
pub struct StaticUploader {
    pub cert_id: String,
    pub calls: Arc<AtomicUsize>,
}

impl StaticUploader {
    pub fn new(cert_id: &str) -> Self {
        Self {
            cert_id: cert_id.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for StaticUploader {
    fn set_logger(&mut self, _: Logger) {}

    async fn upload(
        &self,
        _: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<UploadResult> {
        material.validate()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UploadResult::new(self.cert_id.clone()))
    }
}

//! Tencent Cloud SSL certificate store.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_core::{
    CancellationToken, CertificateMaterial, Error, Logger, PlatformError, Result, UploadResult,
    Uploader, cancel,
};
use certdeploy_sdk::tencentcloud::ssl::{self, SslApi, SslClient, UploadCertificateRequest};
use certdeploy_sdk::tencentcloud::{Credential, INTL_DOMAIN_SUFFIX};

/// SSL endpoint matching the site of a product endpoint: international
/// product endpoints upload to the international SSL endpoint.
pub fn endpoint_for(product_endpoint: &str) -> &'static str {
    if product_endpoint.trim_end_matches('/').ends_with(INTL_DOMAIN_SUFFIX) {
        ssl::INTL_ENDPOINT
    } else {
        ""
    }
}

pub struct TencentCloudSslUploader {
    client: Arc<dyn SslApi>,
    logger: Logger,
}

impl TencentCloudSslUploader {
    pub fn new(credential: Credential, endpoint: &str) -> Result<Self> {
        let client = SslClient::new(credential, endpoint)
            .map_err(|e| Error::platform("ssl.NewClient", e))?;
        Ok(Self::with_client(Arc::new(client)))
    }

    pub fn with_client(client: Arc<dyn SslApi>) -> Self {
        Self {
            client,
            logger: Logger::default(),
        }
    }

    /// The SSL client, shared with deployers that talk to the same service.
    pub fn client(&self) -> Arc<dyn SslApi> {
        self.client.clone()
    }
}

#[async_trait]
impl Uploader for TencentCloudSslUploader {
    fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    async fn upload(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<UploadResult> {
        material.validate()?;

        self.logger
            .scope(async {
                cancel::check(cancel)?;

                let request = UploadCertificateRequest {
                    certificate_public_key: material.certificate_pem().to_string(),
                    certificate_private_key: material.private_key_pem().into(),
                    repeatable: Some(false),
                    ..Default::default()
                };
                let response = cancel::run(cancel, async {
                    self.client
                        .upload_certificate(&request)
                        .await
                        .map_err(|e| Error::platform("ssl.UploadCertificate", e))
                })
                .await?;
                tracing::debug!(?request, ?response, "sdk request 'ssl.UploadCertificate'");

                let result = match response.repeat_cert_id.filter(|id| !id.is_empty()) {
                    Some(id) => UploadResult::new(id).reused(true),
                    None => match response.certificate_id.filter(|id| !id.is_empty()) {
                        Some(id) => UploadResult::new(id),
                        None => {
                            return Err(Error::platform(
                                "ssl.UploadCertificate",
                                PlatformError::Decode("response has no certificate id".to_string()),
                            ));
                        }
                    },
                };

                tracing::info!(cert_id = %result.cert_id, reused = result.reused, "upload succeeded");
                Ok::<_, Error>(result)
            })
            .await
    }
}

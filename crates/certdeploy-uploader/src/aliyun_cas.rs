//! Alibaba Cloud Certificate Management Service.
//!
//! CAS does not deduplicate uploads itself. Certificates are stored under a
//! name derived from the leaf fingerprint and looked up by that name first.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_core::{
    CancellationToken, CertificateMaterial, Error, Logger, PlatformError, Result, UploadResult,
    Uploader, cancel,
};
use certdeploy_sdk::aliyun::cas::{
    CasApi, CasClient, ListUserCertificateOrderRequest, UploadUserCertificateRequest,
};
use certdeploy_sdk::aliyun::{Credential, cas_region_for};

const NAME_PREFIX: &str = "certdeploy";

/// Store name of a certificate with the given leaf fingerprint.
pub fn certificate_name(fingerprint: &str) -> String {
    let len = fingerprint.len().min(16);
    format!("{}-{}", NAME_PREFIX, &fingerprint[..len])
}

pub struct AliyunCasUploader {
    client: Arc<dyn CasApi>,
    resource_group_id: Option<String>,
    logger: Logger,
}

impl AliyunCasUploader {
    /// `region` is the region of the consuming product; the store region is
    /// derived from it.
    pub fn new(credential: Credential, region: &str) -> Result<Self> {
        let client = CasClient::new(credential, cas_region_for(region))
            .map_err(|e| Error::platform("cas.NewClient", e))?;
        Ok(Self::with_client(Arc::new(client)))
    }

    pub fn with_client(client: Arc<dyn CasApi>) -> Self {
        Self {
            client,
            resource_group_id: None,
            logger: Logger::default(),
        }
    }

    pub fn with_resource_group(mut self, resource_group_id: impl Into<String>) -> Self {
        let id = resource_group_id.into();
        self.resource_group_id = (!id.is_empty()).then_some(id);
        self
    }

    async fn find_existing(&self, cancel: &CancellationToken, name: &str) -> Result<Option<i64>> {
        let request = ListUserCertificateOrderRequest {
            keyword: Some(name.to_string()),
            order_type: Some("UPLOAD".to_string()),
            show_size: Some(10),
            current_page: Some(1),
            resource_group_id: self.resource_group_id.clone(),
        };
        let response = cancel::run(cancel, async {
            self.client
                .list_user_certificate_order(&request)
                .await
                .map_err(|e| Error::platform("cas.ListUserCertificateOrder", e))
        })
        .await?;
        tracing::debug!(?request, ?response, "sdk request 'cas.ListUserCertificateOrder'");

        Ok(response
            .certificate_order_list
            .unwrap_or_default()
            .into_iter()
            .find(|order| order.name.as_deref() == Some(name))
            .and_then(|order| order.certificate_id))
    }
}

#[async_trait]
impl Uploader for AliyunCasUploader {
    fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    async fn upload(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<UploadResult> {
        material.validate()?;
        let name = certificate_name(&material.fingerprint()?);

        self.logger
            .scope(async {
                cancel::check(cancel)?;

                if let Some(id) = self.find_existing(cancel, &name).await? {
                    tracing::info!(cert_id = id, cert_name = %name, "certificate already uploaded");
                    return Ok(UploadResult::new(id.to_string())
                        .with_name(name)
                        .reused(true));
                }

                cancel::check(cancel)?;
                let request = UploadUserCertificateRequest {
                    name: name.clone(),
                    cert: material.certificate_pem().to_string(),
                    key: material.private_key_pem().into(),
                    resource_group_id: self.resource_group_id.clone(),
                };
                let response = cancel::run(cancel, async {
                    self.client
                        .upload_user_certificate(&request)
                        .await
                        .map_err(|e| Error::platform("cas.UploadUserCertificate", e))
                })
                .await?;
                tracing::debug!(?request, ?response, "sdk request 'cas.UploadUserCertificate'");

                let id = response.cert_id.ok_or_else(|| {
                    Error::platform(
                        "cas.UploadUserCertificate",
                        PlatformError::Decode("response has no certificate id".to_string()),
                    )
                })?;

                tracing::info!(cert_id = id, cert_name = %name, "upload succeeded");
                Ok::<_, Error>(UploadResult::new(id.to_string()).with_name(name))
            })
            .await
    }
}

//! Alibaba Cloud Anti-DDoS Proxy.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_config::AliyunDdosConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{
    CancellationToken, CertificateMaterial, DeploymentResult, Deployer, Error, Logger, Result,
    Uploader, cancel,
};
use certdeploy_sdk::aliyun::ddos::{AssociateWebCertRequest, DdosApi, DdosClient};
use certdeploy_sdk::aliyun::Credential;
use certdeploy_uploader::AliyunCasUploader;

use super::upload;

pub struct AliyunDdosDeployer {
    config: AliyunDdosConfig,
    uploader: Box<dyn Uploader>,
    client: Arc<dyn DdosApi>,
    logger: Logger,
}

impl AliyunDdosDeployer {
    pub fn new(config: AliyunDdosConfig) -> Result<Self> {
        let credential = Credential::new(
            config.access.access_key_id.clone(),
            config.access.access_key_secret.clone(),
        );
        let uploader = AliyunCasUploader::new(credential.clone(), &config.region)?
            .with_resource_group(config.access.resource_group_id.clone());
        let client = DdosClient::new(credential, &config.region)
            .map_err(|e| Error::platform("ddoscoo.NewClient", e))?;
        Ok(Self::with_clients(config, Box::new(uploader), Arc::new(client)))
    }

    pub fn with_clients(
        config: AliyunDdosConfig,
        uploader: Box<dyn Uploader>,
        client: Arc<dyn DdosApi>,
    ) -> Self {
        Self {
            config,
            uploader,
            client,
            logger: Logger::default(),
        }
    }
}

#[async_trait]
impl Deployer for AliyunDdosDeployer {
    fn name(&self) -> &'static str {
        deployment::ALIYUN_DDOS
    }

    fn set_logger(&mut self, logger: Logger) {
        self.uploader.set_logger(logger.clone());
        self.logger = logger;
    }

    async fn deploy(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<DeploymentResult> {
        self.config.validate()?;

        self.logger
            .scope(async {
                let uploaded = upload(self.uploader.as_ref(), cancel, material).await?;
                let cert_id = uploaded.cert_id.parse::<i64>().map_err(|_| {
                    Error::Upload(Box::new(Error::Internal(format!(
                        "certificate id '{}' is not numeric",
                        uploaded.cert_id
                    ))))
                })?;

                cancel::check(cancel)?;
                let request = AssociateWebCertRequest {
                    domain: self.config.domain.clone(),
                    cert_id: Some(cert_id),
                };
                let response = cancel::run(cancel, async {
                    self.client
                        .associate_web_cert(&request)
                        .await
                        .map_err(|e| Error::platform("ddoscoo.AssociateWebCert", e))
                })
                .await?;
                tracing::debug!(?request, ?response, "sdk request 'ddoscoo.AssociateWebCert'");

                let mut result = DeploymentResult::with_upload(uploaded);
                result.deployed.push(self.config.domain.clone());
                Ok::<_, Error>(result)
            })
            .await
    }
}

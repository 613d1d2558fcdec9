//! Tencent Cloud Streaming Services (CSS).

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_config::TencentCloudCssConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{
    CancellationToken, CertificateMaterial, DeploymentResult, Deployer, Error, Logger, Result,
    Uploader, cancel,
};
use certdeploy_sdk::tencentcloud::live::{
    LiveApi, LiveCertDomainInfo, LiveClient, ModifyLiveDomainCertBindingsRequest,
};
use certdeploy_uploader::TencentCloudSslUploader;
use certdeploy_uploader::tencentcloud_ssl::endpoint_for;

use super::{tencentcloud_credential, upload};

pub struct TencentCloudCssDeployer {
    config: TencentCloudCssConfig,
    uploader: Box<dyn Uploader>,
    client: Arc<dyn LiveApi>,
    logger: Logger,
}

impl TencentCloudCssDeployer {
    pub fn new(config: TencentCloudCssConfig) -> Result<Self> {
        let credential = tencentcloud_credential(&config.access);
        let uploader = TencentCloudSslUploader::new(credential.clone(), endpoint_for(&config.endpoint))?;
        let client = LiveClient::new(credential, &config.endpoint)
            .map_err(|e| Error::platform("live.NewClient", e))?;
        Ok(Self::with_clients(config, Box::new(uploader), Arc::new(client)))
    }

    pub fn with_clients(
        config: TencentCloudCssConfig,
        uploader: Box<dyn Uploader>,
        client: Arc<dyn LiveApi>,
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
impl Deployer for TencentCloudCssDeployer {
    fn name(&self) -> &'static str {
        deployment::TENCENTCLOUD_CSS
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

                cancel::check(cancel)?;
                let request = ModifyLiveDomainCertBindingsRequest {
                    domain_infos: vec![LiveCertDomainInfo {
                        domain_name: self.config.domain.clone(),
                        status: 1,
                    }],
                    cloud_cert_id: Some(uploaded.cert_id.clone()),
                };
                let response = cancel::run(cancel, async {
                    self.client
                        .modify_live_domain_cert_bindings(&request)
                        .await
                        .map_err(|e| Error::platform("live.ModifyLiveDomainCertBindings", e))
                })
                .await?;
                tracing::debug!(?request, ?response, "sdk request 'live.ModifyLiveDomainCertBindings'");

                let mut result = DeploymentResult::with_upload(uploaded);
                result.deployed.push(self.config.domain.clone());
                Ok::<_, Error>(result)
            })
            .await
    }
}

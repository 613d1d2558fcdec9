//! Netlify site certificates.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_config::NetlifySiteConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{
    CancellationToken, CertificateMaterial, DeploymentResult, Deployer, Error, Logger, Result,
    cancel,
};
use certdeploy_sdk::netlify::{NetlifyApi, NetlifyClient, ProvisionSiteTlsCertificateParams};

pub struct NetlifySiteDeployer {
    config: NetlifySiteConfig,
    client: Arc<dyn NetlifyApi>,
    logger: Logger,
}

impl NetlifySiteDeployer {
    pub fn new(config: NetlifySiteConfig) -> Result<Self> {
        let client = NetlifyClient::new(config.access.api_token.clone())
            .map_err(|e| Error::platform("netlify.NewClient", e))?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: NetlifySiteConfig, client: Arc<dyn NetlifyApi>) -> Self {
        Self {
            config,
            client,
            logger: Logger::default(),
        }
    }
}

#[async_trait]
impl Deployer for NetlifySiteDeployer {
    fn name(&self) -> &'static str {
        deployment::NETLIFY_SITE
    }

    fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    async fn deploy(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<DeploymentResult> {
        self.config.validate()?;
        material.validate()?;
        let (leaf, intermediates) = material.split_chain()?;

        self.logger
            .scope(async {
                cancel::check(cancel)?;
                let params = ProvisionSiteTlsCertificateParams {
                    certificate: leaf,
                    key: material.private_key_pem().into(),
                    ca_certificates: intermediates,
                };
                let response = cancel::run(cancel, async {
                    self.client
                        .provision_site_tls_certificate(&self.config.site_id, &params)
                        .await
                        .map_err(|e| Error::platform("netlify.provisionSiteTLSCertificate", e))
                })
                .await?;
                tracing::debug!(site_id = %self.config.site_id, ?params, ?response, "sdk request 'netlify.provisionSiteTLSCertificate'");

                Ok::<_, Error>(DeploymentResult {
                    deployed: vec![self.config.site_id.clone()],
                    ..Default::default()
                })
            })
            .await
    }
}

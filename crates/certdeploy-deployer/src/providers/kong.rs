//! Kong gateway certificates.
//!
//! The PEM material is sent as-is; the certificate's SNIs are taken from the
//! DNS names of the leaf.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_config::KongConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{
    CancellationToken, CertificateMaterial, DeploymentResult, Deployer, Error, Logger, Result,
    cancel,
};
use certdeploy_sdk::kong::{Certificate, KongApi, KongClient};

pub struct KongDeployer {
    config: KongConfig,
    client: Arc<dyn KongApi>,
    logger: Logger,
}

impl KongDeployer {
    pub fn new(config: KongConfig) -> Result<Self> {
        let client = KongClient::new(
            &config.access.server_url,
            &config.workspace,
            config.access.api_token.clone(),
            config.access.allow_insecure_connections,
        )
        .map_err(|e| Error::platform("kong.NewClient", e))?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: KongConfig, client: Arc<dyn KongApi>) -> Self {
        Self {
            config,
            client,
            logger: Logger::default(),
        }
    }
}

#[async_trait]
impl Deployer for KongDeployer {
    fn name(&self) -> &'static str {
        deployment::KONG
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
        let leaf = material.leaf()?;

        self.logger
            .scope(async {
                cancel::check(cancel)?;
                let certificate = Certificate {
                    id: Some(self.config.certificate_id.clone()),
                    cert: material.certificate_pem().to_string(),
                    key: material.private_key_pem().into(),
                    snis: leaf.dns_names.clone(),
                };
                let response = cancel::run(cancel, async {
                    self.client
                        .upsert_certificate(&certificate)
                        .await
                        .map_err(|e| Error::platform("kong.UpdateCertificate", e))
                })
                .await?;
                tracing::debug!(request = ?certificate, ?response, "sdk request 'kong.UpdateCertificate'");

                Ok::<_, Error>(DeploymentResult {
                    deployed: vec![self.config.certificate_id.clone()],
                    ..Default::default()
                })
            })
            .await
    }
}

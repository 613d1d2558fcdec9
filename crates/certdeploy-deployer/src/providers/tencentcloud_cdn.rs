//! Tencent Cloud CDN and ECDN.
//!
//! The certificate is uploaded to the SSL store, then bound to every target
//! domain. A `*.` domain targets all domains the platform associates with the
//! uploaded certificate.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_config::TencentCloudCdnConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{
    CancellationToken, CertificateMaterial, DeploymentResult, Deployer, Error, Logger, Result,
    Uploader, cancel,
};
use certdeploy_sdk::tencentcloud::cdn::{
    CdnApi, CdnClient, CdnProduct, DescribeCertDomainsRequest, DescribeDomainsConfigRequest,
    Https, ServerCert, UpdateDomainConfigRequest,
};
use certdeploy_uploader::TencentCloudSslUploader;
use certdeploy_uploader::tencentcloud_ssl::endpoint_for;

use super::{tencentcloud_credential, upload};

pub struct TencentCloudCdnDeployer {
    config: TencentCloudCdnConfig,
    uploader: Box<dyn Uploader>,
    client: Arc<dyn CdnApi>,
    logger: Logger,
}

impl TencentCloudCdnDeployer {
    pub fn new(config: TencentCloudCdnConfig, product: CdnProduct) -> Result<Self> {
        let credential = tencentcloud_credential(&config.access);
        let uploader = TencentCloudSslUploader::new(credential.clone(), endpoint_for(&config.endpoint))?;
        let client = CdnClient::new(credential, &config.endpoint, product)
            .map_err(|e| Error::platform(format!("{}.NewClient", product.as_str()), e))?;
        Ok(Self::with_clients(config, Box::new(uploader), Arc::new(client)))
    }

    pub fn with_clients(
        config: TencentCloudCdnConfig,
        uploader: Box<dyn Uploader>,
        client: Arc<dyn CdnApi>,
    ) -> Self {
        Self {
            config,
            uploader,
            client,
            logger: Logger::default(),
        }
    }

    fn operation(&self, action: &str) -> String {
        format!("{}.{}", self.client.product().as_str(), action)
    }

    async fn resolve_domains(&self, cancel: &CancellationToken, cert_id: &str) -> Result<Vec<String>> {
        if !self.config.domain.starts_with("*.") {
            return Ok(vec![self.config.domain.clone()]);
        }

        let request = DescribeCertDomainsRequest {
            cert_id: Some(cert_id.to_string()),
            product: Some(self.client.product().as_str().to_string()),
        };
        let response = cancel::run(cancel, async {
            self.client
                .describe_cert_domains(&request)
                .await
                .map_err(|e| Error::platform("cdn.DescribeCertDomains", e))
        })
        .await?;
        tracing::debug!(?request, ?response, "sdk request 'cdn.DescribeCertDomains'");

        Ok(response.domains.unwrap_or_default())
    }

    /// Bind the certificate to one domain. Returns `false` when the domain
    /// already uses it.
    async fn deploy_domain(
        &self,
        cancel: &CancellationToken,
        domain: &str,
        cert_id: &str,
    ) -> Result<bool> {
        let request = DescribeDomainsConfigRequest::for_domain(domain);
        let response = cancel::run(cancel, async {
            self.client
                .describe_domains_config(&request)
                .await
                .map_err(|e| Error::platform(self.operation("DescribeDomainsConfig"), e))
        })
        .await?;
        tracing::debug!(?request, ?response, "sdk request '{}'", self.operation("DescribeDomainsConfig"));

        let Some(detail) = response.domains.into_iter().next() else {
            return Err(Error::NotFound(format!("domain {}", domain)));
        };

        if detail.bound_cert_id() == Some(cert_id) {
            tracing::info!(domain, cert_id, "domain already uses the certificate");
            return Ok(false);
        }

        let https = match detail.https {
            Some(mut https) => {
                https.ssl_status = None;
                https.cert_info = Some(ServerCert::with_id(cert_id));
                https
            }
            None => Https {
                switch: Some("on".to_string()),
                cert_info: Some(ServerCert::with_id(cert_id)),
                ..Default::default()
            },
        };
        let request = UpdateDomainConfigRequest {
            domain: domain.to_string(),
            https: Some(https),
        };
        let response = cancel::run(cancel, async {
            self.client
                .update_domain_config(&request)
                .await
                .map_err(|e| Error::platform(self.operation("UpdateDomainConfig"), e))
        })
        .await?;
        tracing::debug!(?request, ?response, "sdk request '{}'", self.operation("UpdateDomainConfig"));

        Ok(true)
    }
}

#[async_trait]
impl Deployer for TencentCloudCdnDeployer {
    fn name(&self) -> &'static str {
        match self.client.product() {
            CdnProduct::Cdn => deployment::TENCENTCLOUD_CDN,
            CdnProduct::Ecdn => deployment::TENCENTCLOUD_ECDN,
        }
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

                let domains = self.resolve_domains(cancel, &uploaded.cert_id).await?;
                if domains.is_empty() {
                    tracing::info!("no {} domains to deploy", self.client.product().as_str());
                } else {
                    tracing::info!(?domains, "found {} domains to deploy", self.client.product().as_str());
                }

                let mut result = DeploymentResult::with_upload(uploaded.clone());
                let mut errors = Vec::new();
                for domain in domains {
                    cancel::check(cancel)?;
                    match self.deploy_domain(cancel, &domain, &uploaded.cert_id).await {
                        Ok(true) => result.deployed.push(domain),
                        Ok(false) => result.skipped.push(domain),
                        Err(e) if e.is_cancelled() => return Err(e),
                        Err(e) => {
                            tracing::warn!(domain = %domain, error = %e, "failed to deploy domain");
                            errors.push(e.context(format!("domain {}", domain)));
                        }
                    }
                }

                match Error::join(errors) {
                    Some(err) => Err(err),
                    None => Ok::<_, Error>(result),
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticUploader, material};
    use certdeploy_core::{PlatformError, Secret};
    use certdeploy_config::TencentCloudAccessConfig;
    use certdeploy_sdk::ApiResult;
    use certdeploy_sdk::tencentcloud::cdn::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockCdn {
        cert_domains: Vec<String>,
        bound: HashMap<String, String>,
        failing: Vec<String>,
        ecdn: bool,
        cancel_on_update: Option<CancellationToken>,
        updates: Mutex<Vec<UpdateDomainConfigRequest>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CdnApi for MockCdn {
        fn product(&self) -> CdnProduct {
            if self.ecdn { CdnProduct::Ecdn } else { CdnProduct::Cdn }
        }

        async fn describe_cert_domains(
            &self,
            request: &DescribeCertDomainsRequest,
        ) -> ApiResult<DescribeCertDomainsResponse> {
            self.calls.lock().unwrap().push("DescribeCertDomains".to_string());
            assert_eq!(request.product.as_deref(), Some(self.product().as_str()));
            Ok(DescribeCertDomainsResponse {
                domains: Some(self.cert_domains.clone()),
                ..Default::default()
            })
        }

        async fn describe_domains_config(
            &self,
            request: &DescribeDomainsConfigRequest,
        ) -> ApiResult<DescribeDomainsConfigResponse> {
            let domain = request.filters[0].value[0].clone();
            self.calls
                .lock()
                .unwrap()
                .push(format!("DescribeDomainsConfig {}", domain));
            let https = self.bound.get(&domain).map(|id| Https {
                switch: Some("on".to_string()),
                cert_info: Some(ServerCert::with_id(id.clone())),
                ssl_status: Some("deployed".to_string()),
                ..Default::default()
            });
            Ok(DescribeDomainsConfigResponse {
                domains: vec![DomainDetail { domain, https }],
                ..Default::default()
            })
        }

        async fn update_domain_config(
            &self,
            request: &UpdateDomainConfigRequest,
        ) -> ApiResult<UpdateDomainConfigResponse> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("UpdateDomainConfig {}", request.domain));
            if self.failing.contains(&request.domain) {
                return Err(PlatformError::Api {
                    code: "ResourceUnavailable".to_string(),
                    message: "domain is locked".to_string(),
                    request_id: None,
                });
            }
            self.updates.lock().unwrap().push(request.clone());
            if let Some(cancel) = &self.cancel_on_update {
                cancel.cancel();
            }
            Ok(UpdateDomainConfigResponse::default())
        }
    }

    fn config(domain: &str) -> TencentCloudCdnConfig {
        TencentCloudCdnConfig {
            access: TencentCloudAccessConfig {
                secret_id: "AKID".to_string(),
                secret_key: Secret::new("key"),
            },
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_wildcard_skips_bound_domain() {
        let mock = Arc::new(MockCdn {
            cert_domains: vec!["a.example.com".into(), "b.example.com".into(), "c.example.com".into()],
            bound: HashMap::from([("a.example.com".to_string(), "new-cert".to_string())]),
            ..Default::default()
        });
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("*.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );

        let result = deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap();

        assert_eq!(result.skipped, vec!["a.example.com"]);
        assert_eq!(result.deployed, vec!["b.example.com", "c.example.com"]);
        let updated: Vec<String> = mock
            .updates
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.domain.clone())
            .collect();
        assert_eq!(updated, vec!["b.example.com", "c.example.com"]);
    }

    #[tokio::test]
    async fn test_partial_failure_is_joined() {
        let mock = Arc::new(MockCdn {
            cert_domains: vec!["a.example.com".into(), "b.example.com".into(), "c.example.com".into()],
            bound: HashMap::from([("a.example.com".to_string(), "new-cert".to_string())]),
            failing: vec!["b.example.com".into()],
            ..Default::default()
        });
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("*.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );

        let err = deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("b.example.com"));
        assert!(message.contains("'cdn.UpdateDomainConfig'"));
        assert!(!message.contains("c.example.com"));

        let calls = mock.calls.lock().unwrap();
        let c_updates = calls
            .iter()
            .filter(|c| *c == "UpdateDomainConfig c.example.com")
            .count();
        assert_eq!(c_updates, 1);
    }

    #[tokio::test]
    async fn test_single_domain_switches_https_on() {
        let mock = Arc::new(MockCdn::default());
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("www.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );

        deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap();

        let calls = mock.calls.lock().unwrap();
        assert!(!calls.iter().any(|c| c == "DescribeCertDomains"));
        let updates = mock.updates.lock().unwrap();
        let https = updates[0].https.as_ref().unwrap();
        assert_eq!(https.switch.as_deref(), Some("on"));
        assert_eq!(https.cert_info, Some(ServerCert::with_id("new-cert")));
    }

    #[tokio::test]
    async fn test_rebind_clears_ssl_status() {
        let mock = Arc::new(MockCdn {
            bound: HashMap::from([("www.example.com".to_string(), "old-cert".to_string())]),
            ..Default::default()
        });
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("www.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );

        deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap();

        let updates = mock.updates.lock().unwrap();
        let https = updates[0].https.as_ref().unwrap();
        assert_eq!(https.ssl_status, None);
        assert_eq!(https.cert_info, Some(ServerCert::with_id("new-cert")));
    }

    #[tokio::test]
    async fn test_missing_domain_makes_no_calls() {
        let mock = Arc::new(MockCdn::default());
        let uploader = StaticUploader::new("new-cert");
        let deployer = TencentCloudCdnDeployer::with_clients(
            config(""),
            Box::new(uploader.clone()),
            mock.clone(),
        );

        let err = deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "config `domain` is required");
        assert_eq!(uploader.calls(), 0);
        assert!(mock.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_domain_lookup() {
        let mock = Arc::new(MockCdn {
            cert_domains: vec!["a.example.com".into(), "b.example.com".into()],
            ..Default::default()
        });
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("*.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = deployer.deploy(&cancel, &material()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(mock.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_first_domain_stops_the_loop() {
        let cancel = CancellationToken::new();
        let mock = Arc::new(MockCdn {
            cert_domains: vec!["a.example.com".into(), "b.example.com".into()],
            cancel_on_update: Some(cancel.clone()),
            ..Default::default()
        });
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("*.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );

        let err = deployer.deploy(&cancel, &material()).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        let calls = mock.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                "DescribeCertDomains",
                "DescribeDomainsConfig a.example.com",
                "UpdateDomainConfig a.example.com",
            ]
        );
    }

    #[tokio::test]
    async fn test_ecdn_scopes_lookup_and_operations() {
        let mock = Arc::new(MockCdn {
            cert_domains: vec!["a.example.com".into(), "b.example.com".into()],
            failing: vec!["b.example.com".into()],
            ecdn: true,
            ..Default::default()
        });
        let deployer = TencentCloudCdnDeployer::with_clients(
            config("*.example.com"),
            Box::new(StaticUploader::new("new-cert")),
            mock.clone(),
        );
        assert_eq!(deployer.name(), "tencentcloud-ecdn");

        let err = deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'ecdn.UpdateDomainConfig'"));
        assert!(message.contains("b.example.com"));

        let calls = mock.calls.lock().unwrap();
        assert_eq!(calls[0], "DescribeCertDomains");
        let updates = mock.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].domain, "a.example.com");
    }
}

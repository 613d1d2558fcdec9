//! Constructor registry for deployment providers.

use std::collections::BTreeMap;

use certdeploy_config::DeployerConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{Deployer, Error, Result};
use certdeploy_sdk::tencentcloud::cdn::CdnProduct;

use crate::providers::{
    AliyunDdosDeployer, KongDeployer, NetlifySiteDeployer, TencentCloudCdnDeployer,
    TencentCloudCssDeployer, TencentCloudSslUpdateDeployer,
};

/// Builds a deployer from its decoded configuration.
pub type Constructor = fn(DeployerConfig) -> Result<Box<dyn Deployer>>;

/// Deployment provider constructors keyed by identifier.
#[derive(Clone)]
pub struct Registry {
    constructors: BTreeMap<&'static str, Constructor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registry with every built-in deployment provider.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(deployment::ALIYUN_DDOS, aliyun_ddos);
        registry.register(deployment::KONG, kong);
        registry.register(deployment::NETLIFY_SITE, netlify_site);
        registry.register(deployment::TENCENTCLOUD_CDN, tencentcloud_cdn);
        registry.register(deployment::TENCENTCLOUD_CSS, tencentcloud_css);
        registry.register(deployment::TENCENTCLOUD_ECDN, tencentcloud_cdn);
        registry.register(deployment::TENCENTCLOUD_SSL_UPDATE, tencentcloud_sslupdate);
        registry
    }

    pub fn register(&mut self, provider: &'static str, constructor: Constructor) {
        self.constructors.insert(provider, constructor);
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.constructors.contains_key(provider)
    }

    /// Registered identifiers in ASCII order.
    pub fn providers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    pub fn create(&self, config: DeployerConfig) -> Result<Box<dyn Deployer>> {
        let provider = config.provider();
        let constructor = self.constructors.get(provider).ok_or_else(|| {
            Error::invalid("provider", format!("no deployer registered for '{}'", provider))
        })?;
        constructor(config)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn mismatch(expected: &str, config: &DeployerConfig) -> Error {
    Error::Internal(format!(
        "{} constructor received {} config",
        expected,
        config.provider()
    ))
}

fn aliyun_ddos(config: DeployerConfig) -> Result<Box<dyn Deployer>> {
    match config {
        DeployerConfig::AliyunDdos(c) => Ok(Box::new(AliyunDdosDeployer::new(c)?)),
        other => Err(mismatch(deployment::ALIYUN_DDOS, &other)),
    }
}

fn kong(config: DeployerConfig) -> Result<Box<dyn Deployer>> {
    match config {
        DeployerConfig::Kong(c) => Ok(Box::new(KongDeployer::new(c)?)),
        other => Err(mismatch(deployment::KONG, &other)),
    }
}

fn netlify_site(config: DeployerConfig) -> Result<Box<dyn Deployer>> {
    match config {
        DeployerConfig::NetlifySite(c) => Ok(Box::new(NetlifySiteDeployer::new(c)?)),
        other => Err(mismatch(deployment::NETLIFY_SITE, &other)),
    }
}

fn tencentcloud_cdn(config: DeployerConfig) -> Result<Box<dyn Deployer>> {
    match config {
        DeployerConfig::TencentCloudCdn(c) => {
            Ok(Box::new(TencentCloudCdnDeployer::new(c, CdnProduct::Cdn)?))
        }
        DeployerConfig::TencentCloudEcdn(c) => {
            Ok(Box::new(TencentCloudCdnDeployer::new(c, CdnProduct::Ecdn)?))
        }
        other => Err(mismatch(deployment::TENCENTCLOUD_CDN, &other)),
    }
}

fn tencentcloud_css(config: DeployerConfig) -> Result<Box<dyn Deployer>> {
    match config {
        DeployerConfig::TencentCloudCss(c) => Ok(Box::new(TencentCloudCssDeployer::new(c)?)),
        other => Err(mismatch(deployment::TENCENTCLOUD_CSS, &other)),
    }
}

fn tencentcloud_sslupdate(config: DeployerConfig) -> Result<Box<dyn Deployer>> {
    match config {
        DeployerConfig::TencentCloudSslUpdate(c) => {
            Ok(Box::new(TencentCloudSslUpdateDeployer::new(c)?))
        }
        other => Err(mismatch(deployment::TENCENTCLOUD_SSL_UPDATE, &other)),
    }
}

//! Deploy node orchestration.
//!
//! Turns a workflow deploy node into a deployer bound to one certificate:
//! the node's access record is fetched, its fields are merged with the
//! node's provider configuration, and the result is decoded into the typed
//! configuration the registry constructs the provider from.

use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use certdeploy_config::{AccessConfig, DeployerConfig, merge_config};
use certdeploy_core::{
    AccessRepository, CancellationToken, CertificateMaterial, Deployer, DeploymentResult, Error,
    Logger, NodeType, ProviderIdentifier, Result, Taxonomy, WorkflowNode,
};

use crate::registry::Registry;

/// Builds [`NodeDeployer`]s from deploy nodes.
#[derive(Clone)]
pub struct DeployerFactory {
    repository: Arc<dyn AccessRepository>,
    registry: Arc<Registry>,
    logger: Logger,
}

impl DeployerFactory {
    pub fn new(repository: Arc<dyn AccessRepository>) -> Self {
        Self {
            repository,
            registry: Arc::new(Registry::builtin()),
            logger: Logger::default(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Logger installed into every deployer built by this factory.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Decode a deploy node's configuration without constructing a deployer.
    pub async fn resolve_config(&self, node: &WorkflowNode) -> Result<DeployerConfig> {
        if node.node_type != NodeType::Deploy {
            return Err(Error::invalid("type", "node type is not deploy"));
        }

        let provider = node.provider();
        if provider.is_empty() {
            return Err(Error::missing(WorkflowNode::PROVIDER));
        }
        let provider = ProviderIdentifier::canonical(Taxonomy::Deployment, provider)?;

        let access_id = node.provider_access_id();
        let access = self
            .repository
            .get_by_id(access_id)
            .await
            .map_err(|e| e.context(format!("failed to get access #{} record", access_id)))?;

        let access_kind = ProviderIdentifier::canonical(Taxonomy::Access, &access.provider)?;
        if access_kind.as_str() != provider.access_kind() {
            return Err(Error::invalid(
                WorkflowNode::PROVIDER_ACCESS_ID,
                format!(
                    "access #{} is a '{}' credential, '{}' needs '{}'",
                    access.id,
                    access_kind,
                    provider,
                    provider.access_kind()
                ),
            ));
        }

        AccessConfig::decode(access_kind.as_str(), &access.config)
            .and_then(|c| c.validate())
            .map_err(|e| Error::from(e).context(format!("invalid access #{} record", access.id)))?;

        let merged = merge_config(&access.config, &node.provider_config());
        let config = DeployerConfig::decode(provider, merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the deployer for `node`, bound to `material`.
    pub async fn for_node(
        &self,
        node: &WorkflowNode,
        material: CertificateMaterial,
    ) -> Result<NodeDeployer> {
        let config = self.resolve_config(node).await?;
        let provider = config.provider();
        let mut deployer = self.registry.create(config)?;
        deployer.set_logger(self.logger.clone());

        tracing::debug!(node = %node.id, provider, "deployer created");
        Ok(NodeDeployer {
            node_id: node.id.clone(),
            provider,
            deployer,
            material,
        })
    }
}

/// Build the deployer for a deploy node with the built-in registry.
pub async fn new_with_deploy_node(
    repository: Arc<dyn AccessRepository>,
    node: &WorkflowNode,
    material: CertificateMaterial,
) -> Result<NodeDeployer> {
    DeployerFactory::new(repository)
        .for_node(node, material)
        .await
}

/// A deployer bound to one node and one certificate.
pub struct NodeDeployer {
    node_id: String,
    provider: &'static str,
    deployer: Box<dyn Deployer>,
    material: CertificateMaterial,
}

impl NodeDeployer {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Deploy the bound certificate.
    pub async fn deploy(&self, cancel: &CancellationToken) -> Result<DeploymentResult> {
        // v7 so ids of consecutive runs sort by start time
        let deployment_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "deploy",
            node = %self.node_id,
            provider = self.provider,
            deployment_id = %deployment_id,
        );

        async {
            match self.material.leaf() {
                Ok(leaf) => tracing::info!(
                    serial = %leaf.serial,
                    not_after = leaf.not_after,
                    "deployment started"
                ),
                Err(_) => tracing::info!("deployment started"),
            }
            match self.deployer.deploy(cancel, &self.material).await {
                Ok(result) => {
                    tracing::info!(
                        deployed = result.deployed.len(),
                        skipped = result.skipped.len(),
                        "deployment finished"
                    );
                    Ok(result)
                }
                Err(e) => {
                    tracing::error!(error = %e, "deployment failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

//! CLI command implementations.

pub mod deploy;
pub mod providers;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use certdeploy_config::{VariableContext, load_document};
use certdeploy_core::NodeType;
use certdeploy_deployer::{DeployerFactory, FileAccessRepository};

/// Access files to read; the node file when none are given.
pub(crate) fn access_paths(node: &Path, access: Vec<PathBuf>) -> Vec<PathBuf> {
    if access.is_empty() {
        vec![node.to_path_buf()]
    } else {
        access
    }
}

/// Outcome of resolving one deploy node: its provider id or the error.
pub(crate) type NodeCheck = (String, certdeploy_core::Result<&'static str>);

/// Resolve every deploy node of the document without touching the network.
pub(crate) async fn check_nodes(
    node_path: &Path,
    access: Vec<PathBuf>,
    vars: VariableContext,
) -> Result<Vec<NodeCheck>> {
    let document = load_document(node_path, &vars)
        .with_context(|| format!("Failed to load {}", node_path.display()))?;

    let repository = FileAccessRepository::new(access_paths(node_path, access), vars);
    let factory = DeployerFactory::new(Arc::new(repository));

    let mut checks = Vec::new();
    for node in document.nodes.iter().filter(|n| n.node_type == NodeType::Deploy) {
        let outcome = factory.resolve_config(node).await.map(|c| c.provider());
        checks.push((node.id.clone(), outcome));
    }
    Ok(checks)
}

pub async fn validate(node_path: &Path, access: Vec<PathBuf>) -> Result<()> {
    let checks = check_nodes(node_path, access, VariableContext::from_env()).await?;

    let mut failures = 0;
    for (id, outcome) in &checks {
        match outcome {
            Ok(provider) => println!("✓ {} ({})", id, provider),
            Err(e) => {
                failures += 1;
                println!("✗ {}: {}", id, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} node(s) failed validation", failures);
    }
    println!("Configuration is valid");
    Ok(())
}

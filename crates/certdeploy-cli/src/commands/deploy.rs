//! Certificate deployment command.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use certdeploy_config::{VariableContext, load_document};
use certdeploy_core::{CancellationToken, CertificateMaterial, Logger};
use certdeploy_deployer::{DeployerFactory, FileAccessRepository};

pub struct DeployArgs {
    pub node: PathBuf,
    pub access: Vec<PathBuf>,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub node_id: Option<String>,
    pub timeout: Option<u64>,
    pub json: bool,
}

pub async fn run(args: DeployArgs) -> Result<()> {
    let vars = VariableContext::from_env();
    let document = load_document(&args.node, &vars)
        .with_context(|| format!("Failed to load {}", args.node.display()))?;
    let node = document.node(args.node_id.as_deref())?.clone();

    let certificate = tokio::fs::read_to_string(&args.cert)
        .await
        .with_context(|| format!("Failed to read certificate: {}", args.cert.display()))?;
    let private_key = tokio::fs::read_to_string(&args.key)
        .await
        .with_context(|| format!("Failed to read private key: {}", args.key.display()))?;

    let repository = FileAccessRepository::new(super::access_paths(&args.node, args.access), vars);
    let factory = DeployerFactory::new(Arc::new(repository)).with_logger(Logger::current());
    let deployer = factory
        .for_node(&node, CertificateMaterial::new(certificate, private_key))
        .await
        .with_context(|| format!("Failed to prepare node '{}'", node.id))?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling deployment");
                cancel.cancel();
            }
        });
    }
    if let Some(secs) = args.timeout {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!(timeout_secs = secs, "timeout reached, cancelling deployment");
            cancel.cancel();
        });
    }

    let result = deployer
        .deploy(&cancel)
        .await
        .with_context(|| format!("Deployment of node '{}' failed", node.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Deployed node '{}' via {}", deployer.node_id(), deployer.provider());
    if let Some(upload) = &result.upload {
        let reused = if upload.reused { " (reused)" } else { "" };
        println!("  certificate: {}{}", upload.cert_id, reused);
    }
    for resource in &result.deployed {
        println!("  ✓ {}", resource);
    }
    for resource in &result.skipped {
        println!("  = {} (already up to date)", resource);
    }
    if let Some(job) = &result.job {
        println!(
            "  job {}: {} succeeded, {} failed, {} total",
            job.handle, job.progress.succeeded, job.progress.failed, job.progress.total
        );
    }
    Ok(())
}

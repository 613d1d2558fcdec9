//! Deployer trait and deployment types.
//!
//! Deployers activate a certificate on one kind of hosting target (CDN, load
//! balancer, gateway, certificate store, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::upload::UploadResult;
use crate::{CertificateMaterial, Logger, Result};

/// Handle to an asynchronous platform job. Lives for one deploy call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentJobHandle(pub String);

impl std::fmt::Display for DeploymentJobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sub-task counters of an asynchronous platform job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub running: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub total: u64,
}

impl JobProgress {
    /// Every sub-task has either succeeded or failed.
    pub fn is_complete(&self) -> bool {
        self.succeeded + self.failed == self.total
    }
}

/// Final state of an asynchronous platform job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub handle: DeploymentJobHandle,
    pub progress: JobProgress,
    /// Number of status polls issued.
    pub polls: u32,
}

/// Result of a successful deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    /// Certificate store entry used, for upload-then-reference deployers.
    pub upload: Option<UploadResult>,
    /// Resources that received the certificate.
    pub deployed: Vec<String>,
    /// Resources already bound to the certificate.
    pub skipped: Vec<String>,
    pub job: Option<JobOutcome>,
}

impl DeploymentResult {
    pub fn with_upload(upload: UploadResult) -> Self {
        Self {
            upload: Some(upload),
            ..Default::default()
        }
    }
}

/// Trait for deployers.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Provider identifier this deployer implements.
    fn name(&self) -> &'static str;

    /// Replace the logging sink, including that of any owned upload manager.
    fn set_logger(&mut self, logger: Logger);

    /// Deploy the certificate. Required configuration is checked before any
    /// platform call.
    async fn deploy(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<DeploymentResult>;
}

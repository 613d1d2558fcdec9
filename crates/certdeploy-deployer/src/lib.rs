//! Certificate deployment to hosting platforms.
//!
//! Provides:
//! - Deployment providers for Tencent Cloud, Alibaba Cloud, Kong and Netlify
//! - The async job driver used by job-based platforms
//! - A constructor registry keyed by provider identifier
//! - The facade that turns a deploy node into a ready-to-run deployer

pub mod facade;
pub mod job;
pub mod providers;
pub mod registry;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use certdeploy_core::{Deployer, DeploymentResult};
pub use facade::{DeployerFactory, NodeDeployer, new_with_deploy_node};
pub use job::{JobBackend, JobDriver, JobState, Sleeper, Submission, TokioSleeper};
pub use registry::Registry;
pub use repository::FileAccessRepository;

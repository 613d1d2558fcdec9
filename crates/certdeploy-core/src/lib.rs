//! Core types and traits for certificate deployment.
//!
//! This crate contains:
//! - Provider identifier registry
//! - Certificate material and PEM parsing
//! - Uploader and Deployer traits
//! - Access records, workflow nodes and redacted secrets
//! - Scoped logger and cancellation helpers

pub mod access;
pub mod cancel;
pub mod certificate;
pub mod deployer;
pub mod error;
pub mod logger;
pub mod provider;
pub mod secret;
pub mod upload;
pub mod workflow;

pub use access::{AccessRecord, AccessRepository, MemoryAccessRepository};
pub use cancel::CancellationToken;
pub use certificate::{CertificateMaterial, LeafCertificate};
pub use deployer::{DeploymentJobHandle, DeploymentResult, Deployer, JobOutcome, JobProgress};
pub use error::{Error, PlatformError, Result};
pub use logger::Logger;
pub use provider::{ProviderIdentifier, Taxonomy};
pub use secret::Secret;
pub use upload::{UploadResult, Uploader};
pub use workflow::{NodeType, WorkflowNode};

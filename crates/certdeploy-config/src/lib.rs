//! Configuration for certificate deployment.
//!
//! This crate handles:
//! - Typed access credentials per access kind
//! - Typed deployer configuration per deployment provider
//! - KDL files describing deploy nodes and access records
//! - Variable interpolation

pub mod access;
pub mod de;
pub mod deployer;
pub mod document;
pub mod error;
pub mod variables;

pub use access::{
    AccessConfig, AliyunAccessConfig, KongAccessConfig, NetlifyAccessConfig,
    TencentCloudAccessConfig,
};
pub use deployer::{
    AliyunDdosConfig, DeployerConfig, KongConfig, NetlifySiteConfig, TencentCloudCdnConfig,
    TencentCloudCssConfig, TencentCloudSslUpdateConfig, merge_config,
};
pub use document::{ConfigDocument, load_document, parse_document, parse_document_with};
pub use error::{ConfigError, ConfigResult};
pub use certdeploy_core::Secret;
pub use variables::VariableContext;

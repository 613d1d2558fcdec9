//! Vendor API clients used by upload managers and deployers.
//!
//! Every product is exposed as an `async_trait` so callers can substitute
//! their own implementation; the concrete clients speak HTTP through
//! `reqwest`. Errors are reported as [`certdeploy_core::PlatformError`].

pub mod aliyun;
pub mod http;
pub mod kong;
pub mod netlify;
pub mod tencentcloud;

pub use http::ApiResult;

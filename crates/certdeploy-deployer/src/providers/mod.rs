//! Deployment providers, one module per deployment target.

pub mod aliyun_ddos;
pub mod kong;
pub mod netlify_site;
pub mod tencentcloud_cdn;
pub mod tencentcloud_css;
pub mod tencentcloud_sslupdate;

pub use aliyun_ddos::AliyunDdosDeployer;
pub use kong::KongDeployer;
pub use netlify_site::NetlifySiteDeployer;
pub use tencentcloud_cdn::TencentCloudCdnDeployer;
pub use tencentcloud_css::TencentCloudCssDeployer;
pub use tencentcloud_sslupdate::TencentCloudSslUpdateDeployer;

use certdeploy_config::TencentCloudAccessConfig;
use certdeploy_core::{CancellationToken, CertificateMaterial, Error, Result, UploadResult, Uploader};
use certdeploy_sdk::tencentcloud::Credential as TencentCloudCredential;

/// Upload through `uploader`, wrapping failures as upload errors.
pub(crate) async fn upload(
    uploader: &dyn Uploader,
    cancel: &CancellationToken,
    material: &CertificateMaterial,
) -> Result<UploadResult> {
    let result = uploader.upload(cancel, material).await.map_err(|e| match e {
        // Input and cancellation errors stay as they are.
        Error::MalformedCertificate(_) | Error::Cancelled => e,
        other => Error::Upload(Box::new(other)),
    })?;
    tracing::info!(cert_id = %result.cert_id, "ssl certificate uploaded");
    Ok(result)
}

pub(crate) fn tencentcloud_credential(access: &TencentCloudAccessConfig) -> TencentCloudCredential {
    TencentCloudCredential::new(access.secret_id.clone(), access.secret_key.clone())
}

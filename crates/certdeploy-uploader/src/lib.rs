//! Upload managers.
//!
//! An upload manager puts a certificate into one cloud family's certificate
//! store and returns the id that the family's activation calls refer to.

pub mod aliyun_cas;
pub mod tencentcloud_ssl;

pub use aliyun_cas::AliyunCasUploader;
pub use tencentcloud_ssl::TencentCloudSslUploader;

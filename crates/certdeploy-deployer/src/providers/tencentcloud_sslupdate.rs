//! Tencent Cloud SSL certificate update.
//!
//! Swaps a certificate on every cloud resource that uses it, through the SSL
//! service's background update job. With `isReplaced` the content of the old
//! certificate is replaced in place; otherwise the new certificate is
//! uploaded and resources are moved from the old id to the new one.

use async_trait::async_trait;
use std::sync::Arc;

use certdeploy_config::TencentCloudSslUpdateConfig;
use certdeploy_core::provider::deployment;
use certdeploy_core::{
    CancellationToken, CertificateMaterial, DeploymentJobHandle, DeploymentResult, Deployer,
    Error, JobProgress, Logger, Result, UploadResult, Uploader,
};
use certdeploy_sdk::tencentcloud::ssl::{
    DescribeHostUpdateRecordDetailRequest, DescribeHostUploadUpdateRecordDetailRequest,
    ResourceTypeRegions, SslApi, SslClient, UpdateCertificateInstanceRequest,
    UploadUpdateCertificateInstanceRequest,
};
use certdeploy_uploader::TencentCloudSslUploader;

use super::{tencentcloud_credential, upload};
use crate::job::{JobBackend, JobDriver, Sleeper, Submission, TokioSleeper};

/// `DeployStatus` of a job the platform has started.
const DEPLOY_STATUS_STARTED: i64 = 1;

const RECORD_DETAIL_LIMIT: i64 = 200;

pub struct TencentCloudSslUpdateDeployer {
    config: TencentCloudSslUpdateConfig,
    uploader: Box<dyn Uploader>,
    client: Arc<dyn SslApi>,
    sleeper: Arc<dyn Sleeper>,
    logger: Logger,
}

impl TencentCloudSslUpdateDeployer {
    pub fn new(config: TencentCloudSslUpdateConfig) -> Result<Self> {
        let credential = tencentcloud_credential(&config.access);
        let client = SslClient::new(credential, &config.endpoint)
            .map_err(|e| Error::platform("ssl.NewClient", e))?;
        let client: Arc<dyn SslApi> = Arc::new(client);
        let uploader = TencentCloudSslUploader::with_client(client.clone());
        Ok(Self::with_clients(config, Box::new(uploader), client))
    }

    pub fn with_clients(
        config: TencentCloudSslUpdateConfig,
        uploader: Box<dyn Uploader>,
        client: Arc<dyn SslApi>,
    ) -> Self {
        Self {
            config,
            uploader,
            client,
            sleeper: Arc::new(TokioSleeper),
            logger: Logger::default(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn resource_types_regions(&self) -> Vec<ResourceTypeRegions> {
        self.config
            .resource_type_regions()
            .into_iter()
            .map(|(resource_type, regions)| ResourceTypeRegions {
                resource_type,
                regions,
            })
            .collect()
    }
}

#[async_trait]
impl Deployer for TencentCloudSslUpdateDeployer {
    fn name(&self) -> &'static str {
        deployment::TENCENTCLOUD_SSL_UPDATE
    }

    fn set_logger(&mut self, logger: Logger) {
        self.uploader.set_logger(logger.clone());
        self.logger = logger;
    }

    async fn deploy(
        &self,
        cancel: &CancellationToken,
        material: &CertificateMaterial,
    ) -> Result<DeploymentResult> {
        self.config.validate()?;
        material.validate()?;

        self.logger
            .scope(async {
                let driver = JobDriver::new(self.sleeper.clone());
                let (uploaded, outcome) = if self.config.is_replaced {
                    let backend = ReplaceJob {
                        deployer: self,
                        material,
                    };
                    (None, driver.run(cancel, &backend).await?)
                } else {
                    let uploaded = upload(self.uploader.as_ref(), cancel, material).await?;
                    let backend = UpdateJob {
                        deployer: self,
                        uploaded: &uploaded,
                    };
                    let outcome = driver.run(cancel, &backend).await?;
                    (Some(uploaded), outcome)
                };

                if outcome.progress.failed > 0 {
                    return Err(Error::JobFailed {
                        failed: outcome.progress.failed,
                        total: outcome.progress.total,
                    });
                }

                Ok::<_, Error>(DeploymentResult {
                    upload: uploaded,
                    deployed: self.config.resource_types.clone(),
                    skipped: Vec::new(),
                    job: Some(outcome),
                })
            })
            .await
    }
}

/// Moves resources from the old certificate id to a freshly uploaded one.
struct UpdateJob<'a> {
    deployer: &'a TencentCloudSslUpdateDeployer,
    uploaded: &'a UploadResult,
}

#[async_trait]
impl JobBackend for UpdateJob<'_> {
    async fn submit(&self) -> Result<Submission> {
        let request = UpdateCertificateInstanceRequest {
            old_certificate_id: self.deployer.config.certificate_id.clone(),
            certificate_id: self.uploaded.cert_id.clone(),
            resource_types: self.deployer.config.resource_types.clone(),
            resource_types_regions: self.deployer.resource_types_regions(),
        };
        let response = self
            .deployer
            .client
            .update_certificate_instance(&request)
            .await
            .map_err(|e| Error::platform("ssl.UpdateCertificateInstance", e))?;
        tracing::debug!(?request, ?response, "sdk request 'ssl.UpdateCertificateInstance'");

        match response.deploy_status {
            None => Err(Error::UnexpectedJobStatus("DeployStatus is missing".to_string())),
            Some(DEPLOY_STATUS_STARTED) => match response.deploy_record_id {
                Some(id) => Ok(Submission::Started(DeploymentJobHandle(id.to_string()))),
                None => Err(Error::UnexpectedJobStatus("DeployRecordId is missing".to_string())),
            },
            Some(_) => Ok(Submission::Pending),
        }
    }

    async fn poll(&self, handle: &DeploymentJobHandle) -> Result<JobProgress> {
        let request = DescribeHostUpdateRecordDetailRequest {
            deploy_record_id: handle.0.clone(),
        };
        let response = self
            .deployer
            .client
            .describe_host_update_record_detail(&request)
            .await
            .map_err(|e| Error::platform("ssl.DescribeHostUpdateRecordDetail", e))?;
        tracing::debug!(?request, ?response, "sdk request 'ssl.DescribeHostUpdateRecordDetail'");

        let Some(total) = response.total_count else {
            return Err(Error::UnexpectedJobStatus("TotalCount is missing".to_string()));
        };
        Ok(JobProgress {
            running: count(response.running_total_count),
            succeeded: count(response.success_total_count),
            failed: count(response.failed_total_count),
            total: count(Some(total)),
        })
    }
}

/// Replaces the content of the old certificate, keeping its id.
struct ReplaceJob<'a> {
    deployer: &'a TencentCloudSslUpdateDeployer,
    material: &'a CertificateMaterial,
}

#[async_trait]
impl JobBackend for ReplaceJob<'_> {
    async fn submit(&self) -> Result<Submission> {
        let request = UploadUpdateCertificateInstanceRequest {
            old_certificate_id: self.deployer.config.certificate_id.clone(),
            certificate_public_key: self.material.certificate_pem().to_string(),
            certificate_private_key: self.material.private_key_pem().into(),
            resource_types: self.deployer.config.resource_types.clone(),
            resource_types_regions: self.deployer.resource_types_regions(),
        };
        let response = self
            .deployer
            .client
            .upload_update_certificate_instance(&request)
            .await
            .map_err(|e| Error::platform("ssl.UploadUpdateCertificateInstance", e))?;
        tracing::debug!(?request, ?response, "sdk request 'ssl.UploadUpdateCertificateInstance'");

        match response.deploy_status {
            None => Err(Error::UnexpectedJobStatus("DeployStatus is missing".to_string())),
            Some(DEPLOY_STATUS_STARTED) => match response.deploy_record_id {
                Some(id) => Ok(Submission::Started(DeploymentJobHandle(id.to_string()))),
                None => Err(Error::UnexpectedJobStatus("DeployRecordId is missing".to_string())),
            },
            Some(_) => Ok(Submission::Pending),
        }
    }

    async fn poll(&self, handle: &DeploymentJobHandle) -> Result<JobProgress> {
        let deploy_record_id = handle.0.parse::<i64>().map_err(|_| {
            Error::UnexpectedJobStatus(format!("invalid deploy record id '{}'", handle))
        })?;
        let request = DescribeHostUploadUpdateRecordDetailRequest {
            deploy_record_id,
            limit: Some(RECORD_DETAIL_LIMIT),
        };
        let response = self
            .deployer
            .client
            .describe_host_upload_update_record_detail(&request)
            .await
            .map_err(|e| Error::platform("ssl.DescribeHostUploadUpdateRecordDetail", e))?;
        tracing::debug!(?request, ?response, "sdk request 'ssl.DescribeHostUploadUpdateRecordDetail'");

        let Some(records) = response.deploy_record_detail else {
            return Err(Error::UnexpectedJobStatus("DeployRecordDetail is missing".to_string()));
        };

        // Counters are reported per record; the last record carrying a value wins.
        let mut progress = JobProgress::default();
        for record in records {
            if let Some(n) = record.running_total_count {
                progress.running = count(Some(n));
            }
            if let Some(n) = record.success_total_count {
                progress.succeeded = count(Some(n));
            }
            if let Some(n) = record.failed_total_count {
                progress.failed = count(Some(n));
            }
            if let Some(n) = record.total_count {
                progress.total = count(Some(n));
            }
        }
        Ok(progress)
    }
}

fn count(value: Option<i64>) -> u64 {
    value.map(|n| n.max(0) as u64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::tests::InstantSleeper;
    use crate::testing::{StaticUploader, material};
    use certdeploy_config::TencentCloudAccessConfig;
    use certdeploy_core::Secret;
    use certdeploy_sdk::ApiResult;
    use certdeploy_sdk::tencentcloud::ssl::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSsl {
        statuses: Mutex<VecDeque<Option<i64>>>,
        details: Mutex<VecDeque<DescribeHostUpdateRecordDetailResponse>>,
        upload_details: Mutex<VecDeque<DescribeHostUploadUpdateRecordDetailResponse>>,
        updates: Mutex<Vec<UpdateCertificateInstanceRequest>>,
        replaces: Mutex<Vec<UploadUpdateCertificateInstanceRequest>>,
        polls: Mutex<Vec<String>>,
    }

    impl MockSsl {
        fn with_statuses(statuses: Vec<Option<i64>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                ..Default::default()
            }
        }

        fn next_status(&self) -> Option<i64> {
            self.statuses.lock().unwrap().pop_front().flatten()
        }
    }

    #[async_trait]
    impl SslApi for MockSsl {
        async fn upload_certificate(
            &self,
            _: &UploadCertificateRequest,
        ) -> ApiResult<UploadCertificateResponse> {
            unreachable!()
        }

        async fn update_certificate_instance(
            &self,
            request: &UpdateCertificateInstanceRequest,
        ) -> ApiResult<UpdateCertificateInstanceResponse> {
            self.updates.lock().unwrap().push(request.clone());
            Ok(UpdateCertificateInstanceResponse {
                deploy_record_id: Some(1234),
                deploy_status: self.next_status(),
                ..Default::default()
            })
        }

        async fn upload_update_certificate_instance(
            &self,
            request: &UploadUpdateCertificateInstanceRequest,
        ) -> ApiResult<UploadUpdateCertificateInstanceResponse> {
            self.replaces.lock().unwrap().push(request.clone());
            Ok(UploadUpdateCertificateInstanceResponse {
                deploy_record_id: Some(99),
                deploy_status: self.next_status(),
                ..Default::default()
            })
        }

        async fn describe_host_update_record_detail(
            &self,
            request: &DescribeHostUpdateRecordDetailRequest,
        ) -> ApiResult<DescribeHostUpdateRecordDetailResponse> {
            self.polls.lock().unwrap().push(request.deploy_record_id.clone());
            Ok(self.details.lock().unwrap().pop_front().expect("unexpected poll"))
        }

        async fn describe_host_upload_update_record_detail(
            &self,
            request: &DescribeHostUploadUpdateRecordDetailRequest,
        ) -> ApiResult<DescribeHostUploadUpdateRecordDetailResponse> {
            assert_eq!(request.limit, Some(200));
            self.polls.lock().unwrap().push(request.deploy_record_id.to_string());
            Ok(self
                .upload_details
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected poll"))
        }
    }

    fn detail(running: i64, succeeded: i64, failed: i64, total: i64) -> DescribeHostUpdateRecordDetailResponse {
        DescribeHostUpdateRecordDetailResponse {
            total_count: Some(total),
            running_total_count: Some(running),
            success_total_count: Some(succeeded),
            failed_total_count: Some(failed),
            ..Default::default()
        }
    }

    fn config(is_replaced: bool) -> TencentCloudSslUpdateConfig {
        TencentCloudSslUpdateConfig {
            access: TencentCloudAccessConfig {
                secret_id: "AKID".to_string(),
                secret_key: Secret::new("key"),
            },
            certificate_id: "old-cert".to_string(),
            is_replaced,
            resource_types: vec!["clb".to_string(), "cdn".to_string()],
            resource_regions: vec!["ap-guangzhou".to_string()],
            ..Default::default()
        }
    }

    fn deployer(config: TencentCloudSslUpdateConfig, mock: Arc<MockSsl>) -> TencentCloudSslUpdateDeployer {
        TencentCloudSslUpdateDeployer::with_clients(config, Box::new(StaticUploader::new("new-cert")), mock)
            .with_sleeper(Arc::new(InstantSleeper::default()))
    }

    #[tokio::test]
    async fn test_update_waits_for_started_job() {
        let mock = Arc::new(MockSsl::with_statuses(vec![Some(0), Some(1)]));
        mock.details.lock().unwrap().extend([detail(1, 0, 0, 2), detail(0, 2, 0, 2)]);

        let result = deployer(config(false), mock.clone())
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap();

        let updates = mock.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].old_certificate_id, "old-cert");
        assert_eq!(updates[0].certificate_id, "new-cert");
        assert_eq!(
            updates[0].resource_types_regions,
            vec![ResourceTypeRegions {
                resource_type: "clb".to_string(),
                regions: vec!["ap-guangzhou".to_string()],
            }]
        );
        assert_eq!(*mock.polls.lock().unwrap(), vec!["1234", "1234"]);

        let job = result.job.unwrap();
        assert_eq!(job.polls, 2);
        assert_eq!(job.progress.succeeded, 2);
        assert_eq!(result.upload.unwrap().cert_id, "new-cert");
    }

    #[tokio::test]
    async fn test_failed_subtasks_fail_deployment() {
        let mock = Arc::new(MockSsl::with_statuses(vec![Some(1)]));
        mock.details.lock().unwrap().extend([detail(1, 0, 0, 2), detail(0, 1, 1, 2)]);

        let err = deployer(config(false), mock.clone())
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::JobFailed { failed: 1, total: 2 }));
        assert_eq!(mock.polls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_status_is_unexpected() {
        let mock = Arc::new(MockSsl::with_statuses(vec![None]));

        let err = deployer(config(false), mock.clone())
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedJobStatus(_)));
        assert!(mock.polls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_total_is_unexpected() {
        let mock = Arc::new(MockSsl::with_statuses(vec![Some(1)]));
        mock.details
            .lock()
            .unwrap()
            .push_back(DescribeHostUpdateRecordDetailResponse::default());

        let err = deployer(config(false), mock)
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedJobStatus(_)));
    }

    #[tokio::test]
    async fn test_replace_keeps_old_id() {
        let mock = Arc::new(MockSsl::with_statuses(vec![Some(1)]));
        mock.upload_details.lock().unwrap().push_back(
            DescribeHostUploadUpdateRecordDetailResponse {
                deploy_record_detail: Some(vec![UploadUpdateRecordDetail {
                    total_count: Some(3),
                    running_total_count: Some(0),
                    success_total_count: Some(3),
                    failed_total_count: Some(0),
                }]),
                ..Default::default()
            },
        );
        let uploader = StaticUploader::new("unused");
        let deployer = TencentCloudSslUpdateDeployer::with_clients(
            config(true),
            Box::new(uploader.clone()),
            mock.clone(),
        )
        .with_sleeper(Arc::new(InstantSleeper::default()));

        let result = deployer
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap();

        assert_eq!(uploader.calls(), 0);
        assert!(result.upload.is_none());
        let replaces = mock.replaces.lock().unwrap();
        assert_eq!(replaces[0].old_certificate_id, "old-cert");
        assert!(replaces[0].certificate_public_key.contains("BEGIN CERTIFICATE"));
        assert_eq!(*mock.polls.lock().unwrap(), vec!["99"]);
    }

    #[tokio::test]
    async fn test_regions_omitted_without_region_list() {
        let mock = Arc::new(MockSsl::with_statuses(vec![Some(1)]));
        mock.details.lock().unwrap().push_back(detail(0, 1, 0, 1));
        let mut config = config(false);
        config.resource_regions.clear();

        deployer(config, mock.clone())
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap();
        assert!(mock.updates.lock().unwrap()[0].resource_types_regions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_resource_types_makes_no_calls() {
        let mock = Arc::new(MockSsl::default());
        let mut config = config(false);
        config.resource_types.clear();

        let err = deployer(config, mock.clone())
            .deploy(&CancellationToken::new(), &material())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "config `resourceTypes` is required");
        assert!(mock.updates.lock().unwrap().is_empty());
    }
}

//! Async job driver.
//!
//! Some platforms activate certificates through a background job: the job is
//! submitted (possibly several times until the platform accepts it), then its
//! sub-task counters are polled until every sub-task has finished.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use certdeploy_core::{
    CancellationToken, DeploymentJobHandle, Error, JobOutcome, JobProgress, Result, cancel,
};

/// Delay between submission retries and between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Waits between driver iterations.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Answer of a job submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The platform has not started the job; submit again later.
    Pending,
    Started(DeploymentJobHandle),
}

/// Platform side of an asynchronous job.
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn submit(&self) -> Result<Submission>;

    /// Current counters. A response without a total is an
    /// [`Error::UnexpectedJobStatus`].
    async fn poll(&self, handle: &DeploymentJobHandle) -> Result<JobProgress>;
}

/// Driver state. Failure and cancellation leave the loop as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Submitting {
        attempts: u32,
    },
    Polling {
        handle: DeploymentJobHandle,
        polls: u32,
    },
    Completed(JobOutcome),
}

pub struct JobDriver {
    sleeper: Arc<dyn Sleeper>,
    interval: Duration,
}

impl JobDriver {
    pub fn new(sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            sleeper,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Submit the job and poll it to completion. Cancellation is checked
    /// before every submission and every poll, and interrupts pending calls
    /// and waits.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        backend: &dyn JobBackend,
    ) -> Result<JobOutcome> {
        let mut state = JobState::Submitting { attempts: 0 };
        loop {
            state = match state {
                JobState::Submitting { attempts } => {
                    cancel::check(cancel)?;
                    match cancel::run(cancel, backend.submit()).await? {
                        Submission::Started(handle) => {
                            tracing::debug!(%handle, attempts = attempts + 1, "deployment job started");
                            JobState::Polling { handle, polls: 0 }
                        }
                        Submission::Pending => {
                            tracing::debug!(attempts = attempts + 1, "deployment job not started yet");
                            self.wait(cancel).await?;
                            JobState::Submitting {
                                attempts: attempts + 1,
                            }
                        }
                    }
                }
                JobState::Polling { handle, polls } => {
                    cancel::check(cancel)?;
                    let progress = cancel::run(cancel, backend.poll(&handle)).await?;
                    let polls = polls + 1;
                    if progress.is_complete() {
                        JobState::Completed(JobOutcome {
                            handle,
                            progress,
                            polls,
                        })
                    } else {
                        tracing::info!(
                            "waiting for deployment job completion (running: {}, succeeded: {}, failed: {}, total: {}) ...",
                            progress.running,
                            progress.succeeded,
                            progress.failed,
                            progress.total,
                        );
                        self.wait(cancel).await?;
                        JobState::Polling { handle, polls }
                    }
                }
                JobState::Completed(outcome) => {
                    tracing::info!(
                        handle = %outcome.handle,
                        succeeded = outcome.progress.succeeded,
                        failed = outcome.progress.failed,
                        total = outcome.progress.total,
                        "deployment job completed"
                    );
                    return Ok(outcome);
                }
            };
        }
    }

    async fn wait(&self, cancel: &CancellationToken) -> Result<()> {
        cancel::run(cancel, async {
            self.sleeper.sleep(self.interval).await;
            Ok::<_, Error>(())
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns immediately and records requested delays.
    #[derive(Default)]
    pub(crate) struct InstantSleeper {
        pub(crate) sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for InstantSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn progress(running: u64, succeeded: u64, failed: u64, total: u64) -> JobProgress {
        JobProgress {
            running,
            succeeded,
            failed,
            total,
        }
    }

    #[derive(Default)]
    struct ScriptedBackend {
        submissions: Mutex<VecDeque<Submission>>,
        polls: Mutex<VecDeque<Result<JobProgress>>>,
        submit_calls: Mutex<u32>,
        poll_calls: Mutex<u32>,
        cancel_on_poll: Option<CancellationToken>,
    }

    impl ScriptedBackend {
        fn new(submissions: Vec<Submission>, polls: Vec<Result<JobProgress>>) -> Self {
            Self {
                submissions: Mutex::new(submissions.into()),
                polls: Mutex::new(polls.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl JobBackend for ScriptedBackend {
        async fn submit(&self) -> Result<Submission> {
            *self.submit_calls.lock().unwrap() += 1;
            Ok(self
                .submissions
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected submission"))
        }

        async fn poll(&self, _: &DeploymentJobHandle) -> Result<JobProgress> {
            *self.poll_calls.lock().unwrap() += 1;
            if let Some(cancel) = &self.cancel_on_poll {
                cancel.cancel();
            }
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected poll")
        }
    }

    fn started(id: &str) -> Submission {
        Submission::Started(DeploymentJobHandle(id.to_string()))
    }

    #[tokio::test]
    async fn test_completes_after_second_poll() {
        let sleeper = Arc::new(InstantSleeper::default());
        let driver = JobDriver::new(sleeper.clone());
        let backend = ScriptedBackend::new(
            vec![started("42")],
            vec![Ok(progress(1, 0, 0, 2)), Ok(progress(0, 1, 1, 2))],
        );

        let outcome = driver
            .run(&CancellationToken::new(), &backend)
            .await
            .unwrap();

        assert_eq!(outcome.handle, DeploymentJobHandle("42".to_string()));
        assert_eq!(outcome.polls, 2);
        assert_eq!(outcome.progress, progress(0, 1, 1, 2));
        assert_eq!(*backend.poll_calls.lock().unwrap(), 2);
        assert_eq!(*sleeper.sleeps.lock().unwrap(), vec![POLL_INTERVAL]);
    }

    #[tokio::test]
    async fn test_resubmits_until_started() {
        let sleeper = Arc::new(InstantSleeper::default());
        let driver = JobDriver::new(sleeper.clone());
        let backend = ScriptedBackend::new(
            vec![Submission::Pending, Submission::Pending, started("7")],
            vec![Ok(progress(0, 3, 0, 3))],
        );

        let outcome = driver
            .run(&CancellationToken::new(), &backend)
            .await
            .unwrap();

        assert_eq!(*backend.submit_calls.lock().unwrap(), 3);
        assert_eq!(outcome.polls, 1);
        assert_eq!(sleeper.sleeps.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_between_polls() {
        let cancel = CancellationToken::new();
        let driver = JobDriver::new(Arc::new(InstantSleeper::default()));
        let backend = ScriptedBackend {
            cancel_on_poll: Some(cancel.clone()),
            ..ScriptedBackend::new(
                vec![started("1")],
                vec![Ok(progress(2, 0, 0, 2)), Ok(progress(0, 2, 0, 2))],
            )
        };

        let err = driver.run(&cancel, &backend).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(*backend.poll_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_submit() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let driver = JobDriver::new(Arc::new(InstantSleeper::default()));
        let backend = ScriptedBackend::default();

        let err = driver.run(&cancel, &backend).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(*backend.submit_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_poll_error_is_fatal() {
        let driver = JobDriver::new(Arc::new(InstantSleeper::default()));
        let backend = ScriptedBackend::new(
            vec![started("1")],
            vec![Err(Error::UnexpectedJobStatus("missing total".to_string()))],
        );

        let err = driver
            .run(&CancellationToken::new(), &backend)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedJobStatus(_)));
    }

    #[tokio::test]
    async fn test_tokio_sleeper_is_interrupted() {
        let cancel = CancellationToken::new();
        let driver = JobDriver::new(Arc::new(TokioSleeper)).with_interval(Duration::from_secs(60));
        let backend = ScriptedBackend::new(vec![Submission::Pending], vec![]);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = driver.run(&cancel, &backend).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}

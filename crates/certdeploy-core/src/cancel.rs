//! Cancellation helpers.

use std::future::Future;

pub use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Fail with [`Error::Cancelled`] once the token has fired.
pub fn check(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Race a platform round trip against cancellation.
pub async fn run<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_check() {
        let cancel = CancellationToken::new();
        assert!(check(&cancel).is_ok());
        cancel.cancel();
        assert!(check(&cancel).unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_run_returns_future_result() {
        let cancel = CancellationToken::new();
        let value = run(&cancel, async { Ok::<_, Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_aborts_pending_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = run(&cancel, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, Error>(())
        })
        .await
        .unwrap_err();
        assert!(err.is_cancelled());
    }
}

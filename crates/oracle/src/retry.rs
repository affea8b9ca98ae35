//! Retrying oracle wrapper — bounded retries with backoff and timeout.
//!
//! Every oracle call in the pipeline is a suspension point that may hang or
//! fail transiently. This wrapper enforces a per-call timeout and retries a
//! bounded number of times with exponential backoff; after exhaustion the
//! last error surfaces as a recoverable failure for the caller's fallback
//! path.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use skillbot_core::error::OracleError;
use skillbot_core::oracle::{CompletionRequest, Oracle};

/// Wraps an oracle with timeout and bounded-retry behavior.
pub struct RetryingOracle {
    inner: Arc<dyn Oracle>,
    max_retries: u32,
    backoff: Duration,
    timeout: Duration,
}

impl RetryingOracle {
    pub fn new(
        inner: Arc<dyn Oracle>,
        max_retries: u32,
        backoff: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
            timeout,
        }
    }

    /// Authentication failures are permanent; retrying cannot fix them.
    fn is_retryable(error: &OracleError) -> bool {
        !matches!(error, OracleError::AuthenticationFailed(_))
    }
}

#[async_trait]
impl Oracle for RetryingOracle {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        let mut last_error = OracleError::NotConfigured("No attempt made".into());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff * 2u32.pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.timeout, self.inner.complete(request.clone())).await {
                Ok(Ok(reply)) => return Ok(reply),
                Ok(Err(e)) => {
                    if !Self::is_retryable(&e) {
                        return Err(e);
                    }
                    warn!(
                        oracle = %self.inner.name(),
                        attempt = attempt + 1,
                        error = %e,
                        "Oracle call failed, retrying"
                    );
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        oracle = %self.inner.name(),
                        attempt = attempt + 1,
                        timeout_secs = self.timeout.as_secs(),
                        "Oracle call timed out, retrying"
                    );
                    last_error = OracleError::Timeout(format!(
                        "Oracle '{}' timed out after {}s",
                        self.inner.name(),
                        self.timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbot_core::oracle::ChatMessage;
    use std::sync::Mutex;

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyOracle {
        failures: Mutex<u32>,
        calls: Mutex<u32>,
    }

    impl FlakyOracle {
        fn new(failures: u32) -> Self {
            Self {
                failures: Mutex::new(failures),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Oracle for FlakyOracle {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, OracleError> {
            *self.calls.lock().unwrap() += 1;
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                Err(OracleError::Network("connection reset".into()))
            } else {
                Ok("답변입니다".into())
            }
        }
    }

    /// Sleeps forever.
    struct HangingOracle;

    #[async_trait]
    impl Oracle for HangingOracle {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, OracleError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    /// Always fails with an authentication error.
    struct UnauthorizedOracle {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl Oracle for UnauthorizedOracle {
        fn name(&self) -> &str {
            "unauthorized"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, OracleError> {
            *self.calls.lock().unwrap() += 1;
            Err(OracleError::AuthenticationFailed("bad key".into()))
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![ChatMessage::user("카카오싱크가 뭐예요?")])
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let flaky = Arc::new(FlakyOracle::new(2));
        let oracle = RetryingOracle::new(
            flaky.clone(),
            3,
            Duration::from_millis(1),
            Duration::from_secs(5),
        );

        let reply = oracle.complete(request()).await.unwrap();
        assert_eq!(reply, "답변입니다");
        assert_eq!(flaky.calls(), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let flaky = Arc::new(FlakyOracle::new(10));
        let oracle = RetryingOracle::new(
            flaky.clone(),
            2,
            Duration::from_millis(1),
            Duration::from_secs(5),
        );

        let err = oracle.complete(request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Network(_)));
        assert_eq!(flaky.calls(), 3); // initial attempt + 2 retries
    }

    #[tokio::test]
    async fn timeout_surfaces_as_recoverable_error() {
        let oracle = RetryingOracle::new(
            Arc::new(HangingOracle),
            0,
            Duration::from_millis(1),
            Duration::from_millis(10),
        );

        let err = oracle.complete(request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Timeout(_)));
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let inner = Arc::new(UnauthorizedOracle {
            calls: Mutex::new(0),
        });
        let oracle = RetryingOracle::new(
            inner.clone(),
            5,
            Duration::from_millis(1),
            Duration::from_secs(5),
        );

        let err = oracle.complete(request()).await.unwrap_err();
        assert!(matches!(err, OracleError::AuthenticationFailed(_)));
        assert_eq!(*inner.calls.lock().unwrap(), 1);
    }
}

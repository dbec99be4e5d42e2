//! Resilience policies for external validation calls
//!
//! Each attempt runs under an absolute timeout; retryable failures go through
//! an exponential backoff ladder; a process-wide circuit breaker guards every
//! attempt. The breaker state is one long-lived object per external system,
//! created once at wiring time and shared by all concurrent callers.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::transport::{RawValidationReply, TransportError};

/// Retry ladder configuration
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// First delay; each subsequent delay doubles
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a probe
    pub open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(30),
        }
    }
}

/// Full policy configuration for one external system
#[derive(Debug, Clone, Copy, Default)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub breaker: CircuitBreakerConfig,
    /// Absolute timeout per attempt
    pub attempt_timeout: Duration,
}

impl ResilienceConfig {
    /// The production defaults: 10s per attempt, 2s/4s/8s retries,
    /// breaker opens after 5 consecutive failures for 30s
    pub fn standard() -> Self {
        Self {
            retry: RetryConfig::default(),
            breaker: CircuitBreakerConfig::default(),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { since: Instant },
    HalfOpen,
}

/// Circuit breaker shared across all callers of one external system
///
/// A failure is any attempt that does not produce a success reply: transport
/// errors, timeouts, non-success status codes, and attempts abandoned by
/// caller-side cancellation all count.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    /// Asks permission to run one attempt
    ///
    /// Returns false while the circuit is open or while another caller holds
    /// the half-open probe slot. When the open period has elapsed, the caller
    /// that wins this check becomes the probe.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { since } => {
                if since.elapsed() >= self.config.open_duration {
                    *state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => false,
        }
    }

    /// Records a successful attempt; closes the circuit from any state
    pub fn record_success(&self) {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        *state = BreakerState::Closed {
            consecutive_failures: 0,
        };
    }

    /// Records a failed attempt
    pub fn record_failure(&self) {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        *state = match *state {
            BreakerState::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures + 1;
                if failures >= self.config.failure_threshold {
                    BreakerState::Open {
                        since: Instant::now(),
                    }
                } else {
                    BreakerState::Closed {
                        consecutive_failures: failures,
                    }
                }
            }
            // A failed probe re-opens the circuit for a full period
            BreakerState::HalfOpen | BreakerState::Open { .. } => BreakerState::Open {
                since: Instant::now(),
            },
        };
    }

    /// Whether the circuit is currently rejecting calls
    pub fn is_open(&self) -> bool {
        let state = self.state.lock().expect("breaker lock poisoned");
        match *state {
            BreakerState::Open { since } => since.elapsed() < self.config.open_duration,
            _ => false,
        }
    }
}

/// Failure of a resilient call after the whole policy chain ran its course
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Transport(TransportError),

    #[error("circuit breaker is open")]
    CircuitOpen,
}

impl CallError {
    fn is_retryable(&self) -> bool {
        match self {
            CallError::Timeout(_) => true,
            CallError::Transport(err) => err.is_retryable(),
            CallError::CircuitOpen => false,
        }
    }

    /// Synthetic status code recorded on the normalized response
    pub fn status_code(&self) -> &'static str {
        match self {
            CallError::Timeout(_) => "TIMEOUT",
            CallError::Transport(_) => "TRANSPORT_ERROR",
            CallError::CircuitOpen => "CIRCUIT_OPEN",
        }
    }
}

/// Settles the breaker outcome of one attempt exactly once
///
/// If the attempt future is dropped mid-flight (caller-side cancellation)
/// the guard's Drop records a failure, so abandoned calls still count
/// against the breaker.
struct AttemptGuard<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl<'a> AttemptGuard<'a> {
    fn new(breaker: &'a CircuitBreaker) -> Self {
        Self {
            breaker,
            settled: false,
        }
    }

    fn succeed(mut self) {
        self.breaker.record_success();
        self.settled = true;
    }

    fn fail(mut self) {
        self.breaker.record_failure();
        self.settled = true;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record_failure();
        }
    }
}

/// Timeout, retry and circuit breaker around one external system's calls
#[derive(Debug)]
pub struct ResiliencePolicy {
    config: ResilienceConfig,
    breaker: CircuitBreaker,
}

impl ResiliencePolicy {
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            breaker: CircuitBreaker::new(config.breaker),
            config,
        }
    }

    /// The shared breaker, exposed for health reporting
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Runs `attempt` under the full policy chain
    ///
    /// A reply with a non-success status code is returned to the caller
    /// as-is (business rejections are not retried) but still counts as a
    /// breaker failure.
    pub async fn execute<F, Fut>(&self, mut attempt: F) -> Result<RawValidationReply, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawValidationReply, TransportError>> + Send,
    {
        let mut delay = self.config.retry.initial_delay;
        let mut retries = 0u32;

        loop {
            if !self.breaker.try_acquire() {
                return Err(CallError::CircuitOpen);
            }

            let guard = AttemptGuard::new(&self.breaker);
            let error = match timeout(self.config.attempt_timeout, attempt()).await {
                Ok(Ok(reply)) => {
                    if reply.is_success() {
                        guard.succeed();
                    } else {
                        guard.fail();
                    }
                    return Ok(reply);
                }
                Ok(Err(err)) => {
                    guard.fail();
                    CallError::Transport(err)
                }
                Err(_) => {
                    guard.fail();
                    CallError::Timeout(self.config.attempt_timeout)
                }
            };

            if error.is_retryable() && retries < self.config.retry.max_retries {
                retries += 1;
                warn!(
                    retry = retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "validation attempt failed, retrying"
                );
                sleep(delay).await;
                delay *= 2;
                continue;
            }

            debug!(retries, error = %error, "validation call exhausted policy chain");
            return Err(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> ResilienceConfig {
        ResilienceConfig {
            retry: RetryConfig {
                max_retries: 3,
                initial_delay: Duration::from_millis(10),
            },
            breaker: CircuitBreakerConfig {
                failure_threshold: 5,
                open_duration: Duration::from_secs(30),
            },
            attempt_timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let policy = ResiliencePolicy::new(fast_config());
        let reply = policy
            .execute(|| async { Ok(RawValidationReply::success()) })
            .await
            .unwrap();
        assert!(reply.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures_then_succeeds() {
        let policy = ResiliencePolicy::new(fast_config());
        let calls = AtomicU32::new(0);

        let reply = policy
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(TransportError::Connection("refused".into()))
                    } else {
                        Ok(RawValidationReply::success())
                    }
                }
            })
            .await
            .unwrap();

        assert!(reply.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_is_not_retried() {
        let policy = ResiliencePolicy::new(fast_config());
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::Protocol("truncated".into())) }
            })
            .await;

        assert!(matches!(result, Err(CallError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_business_rejection_is_returned_without_retry() {
        let policy = ResiliencePolicy::new(fast_config());
        let calls = AtomicU32::new(0);

        let reply = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(RawValidationReply::with_code("EZERT8002")) }
            })
            .await
            .unwrap();

        assert_eq!(reply.code, "EZERT8002");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_exhausted_after_the_ladder() {
        let policy = ResiliencePolicy::new(fast_config());
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::Server { status: 503 }) }
            })
            .await;

        assert!(matches!(result, Err(CallError::Transport(_))));
        // initial attempt plus three retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_replaces_hung_attempt() {
        let policy = ResiliencePolicy::new(ResilienceConfig {
            retry: RetryConfig {
                max_retries: 0,
                initial_delay: Duration::from_millis(10),
            },
            attempt_timeout: Duration::from_millis(50),
            ..fast_config()
        });

        let result = policy
            .execute(|| async {
                sleep(Duration::from_secs(3600)).await;
                Ok(RawValidationReply::success())
            })
            .await;

        assert!(matches!(result, Err(CallError::Timeout(_))));
    }

    #[test]
    fn test_breaker_opens_after_threshold() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 5,
            open_duration: Duration::from_secs(30),
        });

        for _ in 0..4 {
            breaker.record_failure();
            assert!(!breaker.is_open());
        }
        breaker.record_failure();
        assert!(breaker.is_open());
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn test_breaker_success_resets_failure_count() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            open_duration: Duration::from_secs(30),
        });

        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_breaker_half_open_admits_single_probe() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            open_duration: Duration::ZERO,
        });

        breaker.record_failure();
        // Open period of zero: first caller becomes the probe
        assert!(breaker.try_acquire());
        // Second caller is rejected while the probe is in flight
        assert!(!breaker.try_acquire());

        breaker.record_success();
        assert!(breaker.try_acquire());
    }

    #[test]
    fn test_breaker_failed_probe_reopens() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            open_duration: Duration::from_millis(20),
        });

        breaker.record_failure();
        assert!(!breaker.try_acquire());

        std::thread::sleep(Duration::from_millis(30));
        // Open period elapsed: this caller becomes the probe
        assert!(breaker.try_acquire());
        breaker.record_failure();

        // Failed probe starts a fresh open period
        assert!(breaker.is_open());
        assert!(!breaker.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_rejects_without_calling_transport() {
        let policy = ResiliencePolicy::new(ResilienceConfig {
            breaker: CircuitBreakerConfig {
                failure_threshold: 1,
                open_duration: Duration::from_secs(30),
            },
            ..fast_config()
        });

        let _ = policy
            .execute(|| async { Err(TransportError::Protocol("bad".into())) })
            .await;

        let calls = AtomicU32::new(0);
        let result = policy
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(RawValidationReply::success()) }
            })
            .await;

        assert!(matches!(result, Err(CallError::CircuitOpen)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_attempt_counts_as_breaker_failure() {
        let policy = ResiliencePolicy::new(ResilienceConfig {
            breaker: CircuitBreakerConfig {
                failure_threshold: 1,
                open_duration: Duration::from_secs(30),
            },
            ..fast_config()
        });

        {
            let call = policy.execute(|| async {
                sleep(Duration::from_secs(3600)).await;
                Ok(RawValidationReply::success())
            });
            tokio::pin!(call);
            // Poll once so the attempt is in flight, then drop it
            let _ = futures_poll_once(&mut call).await;
        }

        assert!(policy.breaker().is_open());
    }

    /// Polls a future exactly once
    async fn futures_poll_once<F: Future + Unpin>(future: &mut F) -> Option<F::Output> {
        use std::task::Poll;
        std::future::poll_fn(|cx| {
            let pinned = std::pin::Pin::new(&mut *future);
            match pinned.poll(cx) {
                Poll::Ready(output) => Poll::Ready(Some(output)),
                Poll::Pending => Poll::Ready(None),
            }
        })
        .await
    }
}

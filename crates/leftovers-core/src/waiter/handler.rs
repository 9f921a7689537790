use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::traits::OperationPoller;
use super::types::{OperationHandle, WaitConfig, WaitState};
use crate::resources::DeleteError;

/// Turns a provider's asynchronous operation into a bounded, blocking result.
#[derive(Clone)]
pub struct OperationWaiter {
    poller: Arc<dyn OperationPoller>,
    config: WaitConfig,
    cancel: CancellationToken,
}

impl OperationWaiter {
    pub fn new(
        poller: Arc<dyn OperationPoller>,
        config: WaitConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            poller,
            config,
            cancel,
        }
    }

    pub fn config(&self) -> WaitConfig {
        self.config
    }

    /// Poll `handle` until it is done, fails, times out or is cancelled.
    ///
    /// Sleeps `min(poll_interval, time left)` before every status query, so
    /// an operation is never polled past the configured ceiling.
    pub async fn wait(&self, handle: OperationHandle) -> Result<OperationHandle, DeleteError> {
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        let mut handle = handle;
        let mut state = WaitState::from(handle.status);
        let mut polls: u32 = 0;

        debug!(
            event = "core.waiter.wait_started",
            operation = handle.id,
            state = state.as_str(),
            derivative = handle.is_derivative()
        );

        while !state.is_terminal() {
            if Instant::now() >= deadline {
                state = transition(&handle, state, WaitState::TimedOut);
                break;
            }

            let nap = self
                .config
                .poll_interval
                .min(deadline.saturating_duration_since(Instant::now()));
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(&handle)),
                _ = tokio::time::sleep(nap) => {}
            }

            // A status call that never answers must not outlive the ceiling.
            let refreshed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(&handle)),
                result = self.poller.poll(&handle) => result?,
                _ = tokio::time::sleep_until(deadline) => {
                    state = transition(&handle, state, WaitState::TimedOut);
                    break;
                }
            };
            polls += 1;

            let next = WaitState::from(refreshed.status);
            debug!(
                event = "core.waiter.poll_completed",
                operation = refreshed.id,
                poll = polls,
                state = next.as_str()
            );
            state = transition(&refreshed, state, next);
            handle = refreshed;
        }

        match state {
            WaitState::Done => {
                info!(
                    event = "core.waiter.wait_completed",
                    operation = handle.id,
                    polls = polls,
                    elapsed_ms = elapsed_ms(started)
                );
                Ok(handle)
            }
            WaitState::Error => Err(operation_error(&handle)),
            WaitState::Pending | WaitState::Running | WaitState::TimedOut => {
                warn!(
                    event = "core.waiter.wait_timed_out",
                    operation = handle.id,
                    polls = polls,
                    elapsed_ms = elapsed_ms(started)
                );
                Err(DeleteError::OperationTimedOut {
                    operation: handle.id,
                    elapsed_ms: elapsed_ms(started),
                })
            }
        }
    }

    fn cancelled(&self, handle: &OperationHandle) -> DeleteError {
        info!(event = "core.waiter.wait_cancelled", operation = handle.id);
        DeleteError::Cancelled
    }
}

fn transition(handle: &OperationHandle, from: WaitState, to: WaitState) -> WaitState {
    if from != to {
        debug!(
            event = "core.waiter.state_changed",
            operation = handle.id,
            from = from.as_str(),
            to = to.as_str()
        );
    }
    to
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn operation_error(handle: &OperationHandle) -> DeleteError {
    let (message, blocked) = match &handle.error {
        Some(failure) => (
            format!("{}: {}", failure.code, failure.message),
            failure.dependency_blocked,
        ),
        None => ("provider reported an unspecified error".to_string(), false),
    };

    warn!(
        event = "core.waiter.wait_failed",
        operation = handle.id,
        dependency_blocked = blocked,
        error = message
    );

    if blocked {
        DeleteError::DependencyBlocked { message }
    } else {
        DeleteError::OperationFailed {
            operation: handle.id.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::types::{OperationFailure, OperationStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Replays a fixed status sequence; repeats the last status forever.
    struct ScriptedPoller {
        statuses: Mutex<VecDeque<OperationStatus>>,
        last: Mutex<OperationStatus>,
        polls: AtomicU32,
    }

    impl ScriptedPoller {
        fn new(statuses: &[OperationStatus]) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                last: Mutex::new(OperationStatus::Running),
                polls: AtomicU32::new(0),
            })
        }

        fn polls(&self) -> u32 {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OperationPoller for ScriptedPoller {
        async fn poll(&self, handle: &OperationHandle) -> Result<OperationHandle, DeleteError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.statuses.lock().unwrap().pop_front() {
                *last = next;
            }
            let mut refreshed = handle.clone();
            refreshed.status = *last;
            if *last == OperationStatus::Error {
                refreshed.error = Some(OperationFailure {
                    code: "RESOURCE_IN_USE_BY_ANOTHER_RESOURCE".to_string(),
                    message: "disk is attached to instance ci-vm".to_string(),
                    dependency_blocked: true,
                });
            }
            Ok(refreshed)
        }
    }

    fn config(interval_ms: u64, timeout_ms: u64) -> WaitConfig {
        WaitConfig {
            poll_interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_reaches_done_after_three_polls() {
        let poller = ScriptedPoller::new(&[
            OperationStatus::Running,
            OperationStatus::Running,
            OperationStatus::Done,
        ]);
        let waiter = OperationWaiter::new(
            poller.clone(),
            config(1000, 60_000),
            CancellationToken::new(),
        );

        let started = Instant::now();
        let handle = waiter
            .wait(OperationHandle::new("op-1", OperationStatus::Pending))
            .await
            .unwrap();

        assert_eq!(handle.status, OperationStatus::Done);
        assert_eq!(poller.polls(), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed <= Duration::from_millis(3000 + 50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_done_handle_is_not_polled() {
        let poller = ScriptedPoller::new(&[]);
        let waiter = OperationWaiter::new(
            poller.clone(),
            config(1000, 60_000),
            CancellationToken::new(),
        );

        waiter
            .wait(OperationHandle::new("op-1", OperationStatus::Done))
            .await
            .unwrap();
        assert_eq!(poller.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_at_ceiling() {
        let poller = ScriptedPoller::new(&[]);
        let waiter = OperationWaiter::new(
            poller.clone(),
            config(1000, 4500),
            CancellationToken::new(),
        );

        let started = Instant::now();
        let err = waiter
            .wait(OperationHandle::new("op-1", OperationStatus::Pending))
            .await
            .unwrap_err();

        assert!(matches!(err, DeleteError::OperationTimedOut { .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(4500));
        assert!(elapsed <= Duration::from_millis(4500 + 50));
        // polls at 1s, 2s, 3s, 4s and a final one at the 4.5s ceiling
        assert_eq!(poller.polls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_carries_provider_message() {
        let poller = ScriptedPoller::new(&[OperationStatus::Running, OperationStatus::Error]);
        let waiter = OperationWaiter::new(poller, config(500, 60_000), CancellationToken::new());

        let err = waiter
            .wait(OperationHandle::new("op-1", OperationStatus::Pending))
            .await
            .unwrap_err();

        match err {
            DeleteError::DependencyBlocked { message } => {
                assert!(message.contains("attached to instance ci-vm"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_without_dependency_is_operation_failure() {
        let poller = ScriptedPoller::new(&[]);
        let waiter = OperationWaiter::new(poller, config(500, 60_000), CancellationToken::new());

        let handle = OperationHandle::new("op-9", OperationStatus::Running).with_error(
            OperationFailure {
                code: "INTERNAL".to_string(),
                message: "backend error".to_string(),
                dependency_blocked: false,
            },
        );

        let err = waiter.wait(handle).await.unwrap_err();
        assert_eq!(
            err,
            DeleteError::OperationFailed {
                operation: "op-9".to_string(),
                message: "INTERNAL: backend error".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let poller = ScriptedPoller::new(&[]);
        let cancel = CancellationToken::new();
        let waiter = OperationWaiter::new(poller.clone(), config(10_000, 600_000), cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = waiter
            .wait(OperationHandle::new("op-1", OperationStatus::Pending))
            .await
            .unwrap_err();

        assert_eq!(err, DeleteError::Cancelled);
        assert!(started.elapsed() < Duration::from_millis(10_000));
        assert_eq!(poller.polls(), 0);
    }

    /// Never answers a status query.
    struct StalledPoller {
        polls: AtomicU32,
    }

    #[async_trait]
    impl OperationPoller for StalledPoller {
        async fn poll(&self, _handle: &OperationHandle) -> Result<OperationHandle, DeleteError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_status_call_is_bounded_by_ceiling() {
        let poller = Arc::new(StalledPoller {
            polls: AtomicU32::new(0),
        });
        let waiter = OperationWaiter::new(
            poller.clone(),
            config(1000, 5000),
            CancellationToken::new(),
        );

        let started = Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            waiter.wait(OperationHandle::new("op-1", OperationStatus::Pending)),
        )
        .await
        .expect("wait must return before the outer timeout");

        match result.unwrap_err() {
            DeleteError::OperationTimedOut { operation, .. } => assert_eq!(operation, "op-1"),
            other => panic!("unexpected error: {other:?}"),
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(5000));
        assert!(elapsed <= Duration::from_millis(5000 + 50));
        assert_eq!(poller.polls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transition_returns_target_state() {
        let handle = OperationHandle::new("op-1", OperationStatus::Running);
        assert_eq!(
            transition(&handle, WaitState::Running, WaitState::TimedOut),
            WaitState::TimedOut
        );
        assert_eq!(
            transition(&handle, WaitState::Running, WaitState::Running),
            WaitState::Running
        );
    }
}

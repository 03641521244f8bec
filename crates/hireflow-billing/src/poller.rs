//! Activation polling — reconciles "gateway says paid" with "entitlement
//! says active".
//!
//! Entitlement activation rides an asynchronous event pipeline with
//! unspecified latency, so after a confirmed payment the client polls the
//! entitlement read endpoint at a fixed interval until it flips to premium
//! or the attempt budget runs out. No backoff: the pipeline's latency
//! distribution isn't worth modeling, and over-polling a lightweight read
//! endpoint beats stranding the user on a spinner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::services::EntitlementSource;

/// Attempt budget and spacing for one reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval_ms: u64) -> Self {
        Self {
            max_attempts,
            interval: Duration::from_millis(interval_ms),
        }
    }
}

/// 10 attempts, 2 s apart: a bounded wait of roughly 20 s. Long enough to
/// absorb realistic pipeline lag, short enough not to strand the user.
impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(10, 2000)
    }
}

/// How a poll run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The entitlement reflects the payment.
    Activated,
    /// Budget exhausted without seeing premium. Not a failure: the payment
    /// is confirmed; activation is merely lagging.
    TimedOut,
    /// The owning context tore down mid-run; resolved neither way and no
    /// further queries were issued.
    Cancelled,
}

// ─── Cancellation ───────────────────────────────────────────────────

/// Owner side of a poll cancellation pair. Clones share the same signal,
/// so the orchestrator's owning context can keep a handle while the flow
/// itself holds another. Dropping every clone without cancelling also ends
/// the loop, so an abandoned flow cannot leak a live poller.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signal cancellation to every outstanding [`CancelSignal`], including
    /// ones derived after this call.
    pub fn cancel(&self) {
        // send_replace, not send: the value must stick even when no signal
        // has been derived yet.
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Derive the signal handed to a poll run.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side of the cancellation pair.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve when cancellation is signalled. A dropped [`CancelToken`]
    /// counts as cancelled.
    pub async fn cancelled(&mut self) {
        while !*self.receiver.borrow() {
            if self.receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

// ─── Polling ────────────────────────────────────────────────────────

/// Poll the entitlement source until it reports premium, the attempt budget
/// runs out, or the owning context cancels.
///
/// Each attempt is isolated: a transient query failure is "not yet
/// activated", logged at debug level and never surfaced, and the loop keeps
/// going within its budget. The inter-attempt sleep races the cancellation
/// signal so teardown takes effect without waiting out the interval.
pub async fn await_activation(
    source: &dyn EntitlementSource,
    payer_id: &str,
    policy: PollPolicy,
    cancel: &mut CancelSignal,
) -> PollOutcome {
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            tracing::debug!(attempt, "activation poll cancelled");
            return PollOutcome::Cancelled;
        }

        match source.status(payer_id).await {
            Ok(ent) if ent.is_premium => {
                tracing::debug!(attempt, "entitlement active");
                return PollOutcome::Activated;
            }
            Ok(_) => {
                tracing::debug!(attempt, "entitlement not yet active");
            }
            Err(fault) => {
                tracing::debug!(attempt, error = %fault, "transient entitlement query failure");
            }
        }

        // No sleep after the final attempt.
        if attempt < policy.max_attempts {
            tokio::select! {
                _ = tokio::time::sleep(policy.interval) => {}
                _ = cancel.cancelled() => {
                    tracing::debug!(attempt, "activation poll cancelled during interval");
                    return PollOutcome::Cancelled;
                }
            }
        }
    }

    tracing::debug!(
        attempts = policy.max_attempts,
        "activation poll budget exhausted"
    );
    PollOutcome::TimedOut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_token_signal_pair() {
        let token = CancelToken::new();
        let signal = token.signal();
        assert!(!token.is_cancelled());
        assert!(!signal.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_token_counts_as_cancelled() {
        let token = CancelToken::new();
        let mut signal = token.signal();
        drop(token);
        // Resolves instead of hanging.
        signal.cancelled().await;
    }
}

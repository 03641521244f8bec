//! The purchase-flow state machine.
//!
//! One [`PurchaseFlow`] per user session owns the whole sequence from plan
//! selection to a durably active entitlement. It is the only component that
//! mutates [`FlowState`]; its state guard, not any external deduplication,
//! is what makes submitting an attempt twice impossible.

use crate::error::BillingError;
use crate::gateway::{ConfirmOutcome, GatewayAdapter};
use crate::poller::{await_activation, CancelToken, PollOutcome, PollPolicy};
use crate::services::{EntitlementSource, IntentService};
use crate::types::{
    PaymentIntentHandle, PaymentOutcome, PurchaseResult, SubscriptionConfirmation,
};
use serde::{Deserialize, Serialize};

/// Where one purchase attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// Plan selection screen. Initial state.
    Pricing,
    /// A confirmation is held; no intent submitted yet.
    Confirming,
    /// An intent handle exists; the gateway owns the interaction.
    AwaitingGateway,
    /// Payment confirmed; polling the entitlement until it catches up.
    Reconciling,
    /// Terminal for the attempt; `reset()` starts over.
    Succeeded,
    /// Terminal for the attempt; `retry()` or `reset()`.
    Failed,
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pricing => "pricing",
            Self::Confirming => "confirming",
            Self::AwaitingGateway => "awaiting_gateway",
            Self::Reconciling => "reconciling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Steps the user can navigate back to explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Pricing,
    Confirming,
}

/// Returned by every action so the presentation layer can trigger its own
/// refresh off the transition it just caused; no implicit pub/sub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: FlowState,
    pub to: FlowState,
}

impl StateChange {
    fn stayed(state: FlowState) -> Self {
        Self {
            from: state,
            to: state,
        }
    }

    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// The orchestrator. Generic over its service seams so every collaborator
/// can be scripted in tests.
pub struct PurchaseFlow<I, G, E> {
    state: FlowState,
    confirmation: Option<SubscriptionConfirmation>,
    handle: Option<PaymentIntentHandle>,
    outcome: Option<PaymentOutcome>,
    last_error: Option<BillingError>,
    last_result: Option<PurchaseResult>,
    requires_action_seen: bool,
    intents: I,
    gateway: G,
    entitlements: E,
    poll_policy: PollPolicy,
    cancel_token: CancelToken,
}

impl<I, G, E> PurchaseFlow<I, G, E>
where
    I: IntentService,
    G: GatewayAdapter,
    E: EntitlementSource,
{
    pub fn new(intents: I, gateway: G, entitlements: E) -> Self {
        Self {
            state: FlowState::Pricing,
            confirmation: None,
            handle: None,
            outcome: None,
            last_error: None,
            last_result: None,
            requires_action_seen: false,
            intents,
            gateway,
            entitlements,
            poll_policy: PollPolicy::default(),
            cancel_token: CancelToken::new(),
        }
    }

    /// Override the reconciliation poll policy.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    // ─── Read surface ───────────────────────────────────────────────

    pub fn current_state(&self) -> FlowState {
        self.state
    }

    pub fn last_error(&self) -> Option<&BillingError> {
        self.last_error.as_ref()
    }

    pub fn last_result(&self) -> Option<&PurchaseResult> {
        self.last_result.as_ref()
    }

    /// Whether the gateway signalled a step-up challenge during the current
    /// or most recent interaction.
    pub fn requires_action_seen(&self) -> bool {
        self.requires_action_seen
    }

    pub fn confirmation(&self) -> Option<&SubscriptionConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn handle(&self) -> Option<&PaymentIntentHandle> {
        self.handle.as_ref()
    }

    /// The terminal outcome of the current attempt's gateway interaction,
    /// if one has arrived.
    pub fn last_outcome(&self) -> Option<&PaymentOutcome> {
        self.outcome.as_ref()
    }

    /// A cancellation handle for the owning context. Cancelling it stops an
    /// in-flight reconciliation poll without waiting out the interval.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel_token.clone()
    }

    // ─── Actions ────────────────────────────────────────────────────

    /// Accept a completed confirmation from the plan screen.
    ///
    /// Legal from Pricing, and from Confirming as a re-submission (e.g.
    /// after an intent-creation failure; the next `initiate_payment` then
    /// mints a fresh intent). Any stored handle is discarded: a handle must
    /// never survive into a semantically different confirmation.
    pub fn confirm(
        &mut self,
        confirmation: SubscriptionConfirmation,
    ) -> Result<StateChange, BillingError> {
        let from = self.state;
        if !matches!(from, FlowState::Pricing | FlowState::Confirming) {
            tracing::warn!(state = %from, "confirm ignored outside pricing/confirming");
            return Ok(StateChange::stayed(from));
        }

        if let Err(err) = confirmation.validate() {
            self.last_error = Some(err.clone());
            return Err(err);
        }

        self.confirmation = Some(confirmation);
        self.handle = None;
        self.outcome = None;
        self.last_error = None;
        self.state = FlowState::Confirming;
        tracing::info!(from = %from, to = %self.state, "confirmation accepted");
        Ok(StateChange {
            from,
            to: self.state,
        })
    }

    /// Submit the confirmed purchase to the payment-intent service.
    ///
    /// A no-op in every state but Confirming: the current state, not
    /// external deduplication, is the single source of truth for "this
    /// attempt has already been submitted".
    pub async fn initiate_payment(&mut self) -> Result<StateChange, BillingError> {
        let from = self.state;
        if from != FlowState::Confirming {
            tracing::warn!(state = %from, "initiate_payment ignored outside confirming");
            return Ok(StateChange::stayed(from));
        }

        let confirmation = match self.confirmation.as_ref() {
            Some(c) => c,
            None => {
                let err = BillingError::validation("confirmation", "no confirmation held");
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        match self.intents.create_intent(confirmation).await {
            Ok(handle) => {
                tracing::info!(intent_id = %handle.intent_id, "payment intent created");
                self.handle = Some(handle);
                self.last_error = None;
                self.state = FlowState::AwaitingGateway;
                Ok(StateChange {
                    from,
                    to: self.state,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "payment intent creation failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Hand the stored handle to the gateway and drive the attempt to a
    /// terminal state.
    ///
    /// Interim `RequiresAction` signals are recorded (see
    /// [`requires_action_seen`](Self::requires_action_seen)) without
    /// changing FlowState; the adapter is then asked again for the terminal
    /// outcome. On success the reconciliation poll runs before this
    /// resolves; a poll timeout still lands in Succeeded with
    /// `activation_pending` set, since a confirmed payment is never
    /// downgraded to a failure because the backend consumer is slow.
    pub async fn await_gateway(&mut self) -> Result<StateChange, BillingError> {
        let from = self.state;
        if from != FlowState::AwaitingGateway {
            tracing::warn!(state = %from, "await_gateway ignored outside awaiting_gateway");
            return Ok(StateChange::stayed(from));
        }

        let handle = match self.handle.clone() {
            Some(h) => h,
            None => {
                let err = BillingError::validation("handle", "no payment intent held");
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let outcome = loop {
            match self.gateway.confirm(&handle).await {
                ConfirmOutcome::RequiresAction => {
                    self.requires_action_seen = true;
                    tracing::info!(intent_id = %handle.intent_id, "gateway requires further action");
                }
                ConfirmOutcome::Success { transaction_id } => {
                    break PaymentOutcome::Success { transaction_id }
                }
                ConfirmOutcome::Failure { code, message } => {
                    break PaymentOutcome::Failure { code, message }
                }
            }
        };

        match outcome {
            PaymentOutcome::Success { transaction_id } => {
                self.outcome = Some(PaymentOutcome::Success {
                    transaction_id: transaction_id.clone(),
                });
                self.state = FlowState::Reconciling;
                tracing::info!(transaction_id = %transaction_id, "payment confirmed, reconciling");
                self.reconcile(from, transaction_id).await
            }
            PaymentOutcome::Failure { code, message } => {
                tracing::warn!(code = %code, "gateway reported failure");
                self.outcome = Some(PaymentOutcome::Failure {
                    code: code.clone(),
                    message: message.clone(),
                });
                self.last_error = Some(BillingError::Gateway { code, message });
                self.state = FlowState::Failed;
                Ok(StateChange {
                    from,
                    to: self.state,
                })
            }
        }
    }

    /// Run the activation poll for a confirmed payment and settle the
    /// terminal state.
    async fn reconcile(
        &mut self,
        from: FlowState,
        transaction_id: String,
    ) -> Result<StateChange, BillingError> {
        let payer_id = self
            .confirmation
            .as_ref()
            .map(|c| c.payer.payer_id.clone())
            .unwrap_or_default();

        let mut signal = self.cancel_token.signal();
        let poll = await_activation(
            &self.entitlements,
            &payer_id,
            self.poll_policy,
            &mut signal,
        )
        .await;

        match poll {
            PollOutcome::Activated => {
                self.state = FlowState::Succeeded;
                self.last_result = Some(PurchaseResult {
                    transaction_id,
                    activation_pending: false,
                });
                tracing::info!("entitlement active, purchase complete");
            }
            PollOutcome::TimedOut => {
                // Payment success dominates backend lag.
                self.state = FlowState::Succeeded;
                self.last_result = Some(PurchaseResult {
                    transaction_id,
                    activation_pending: true,
                });
                tracing::warn!("payment confirmed but activation still pending");
            }
            PollOutcome::Cancelled => {
                tracing::info!("reconciliation cancelled, tearing down attempt");
                self.discard_attempt();
            }
        }

        Ok(StateChange {
            from,
            to: self.state,
        })
    }

    /// Re-enter the gateway step after a failure, reusing the stored handle
    /// if the gateway hasn't consumed it. No new intent is created.
    pub fn retry(&mut self) -> StateChange {
        let from = self.state;
        if from != FlowState::Failed {
            tracing::warn!(state = %from, "retry ignored outside failed");
            return StateChange::stayed(from);
        }
        if self.handle.is_none() {
            tracing::warn!("retry ignored: no handle to reuse");
            return StateChange::stayed(from);
        }

        self.state = FlowState::AwaitingGateway;
        tracing::info!("retrying gateway interaction with existing intent");
        StateChange {
            from,
            to: self.state,
        }
    }

    /// Start over. The only operation that discards the user's plan
    /// selection; always explicit.
    pub fn reset(&mut self) -> StateChange {
        let from = self.state;
        self.confirmation = None;
        self.discard_attempt();
        self.last_error = None;
        self.last_result = None;
        self.state = FlowState::Pricing;
        tracing::info!(from = %from, "flow reset to pricing");
        StateChange {
            from,
            to: self.state,
        }
    }

    /// Navigate back to an earlier step, discarding any stored handle so it
    /// can never be reused under a different confirmation. Ignored while
    /// reconciling; a confirmed payment's poll is cancellation's business,
    /// not navigation's.
    pub fn go_to_step(&mut self, step: FlowStep) -> StateChange {
        let from = self.state;
        if from == FlowState::Reconciling {
            tracing::warn!("go_to_step ignored while reconciling");
            return StateChange::stayed(from);
        }

        match step {
            FlowStep::Pricing => {
                self.discard_attempt();
                self.state = FlowState::Pricing;
            }
            FlowStep::Confirming => {
                if self.confirmation.is_none() {
                    tracing::warn!("go_to_step(confirming) ignored without a confirmation");
                    return StateChange::stayed(from);
                }
                self.discard_attempt();
                self.state = FlowState::Confirming;
            }
        }

        tracing::info!(from = %from, to = %self.state, "navigated back");
        StateChange {
            from,
            to: self.state,
        }
    }

    /// Owning-context teardown: stop any in-flight poll and discard the
    /// attempt's in-memory handle/outcome state. The confirmation survives;
    /// only `reset()` throws away the user's plan selection. No refund or
    /// void is issued.
    pub fn cancel(&mut self) -> StateChange {
        let from = self.state;
        self.cancel_token.cancel();
        self.discard_attempt();
        if matches!(from, FlowState::AwaitingGateway | FlowState::Reconciling) {
            self.state = if self.confirmation.is_some() {
                FlowState::Confirming
            } else {
                FlowState::Pricing
            };
        }
        tracing::info!(from = %from, to = %self.state, "flow cancelled");
        StateChange {
            from,
            to: self.state,
        }
    }

    /// Drop handle/outcome state and arm a fresh cancellation token for
    /// whatever attempt comes next.
    fn discard_attempt(&mut self) {
        self.handle = None;
        self.outcome = None;
        self.requires_action_seen = false;
        self.cancel_token = CancelToken::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_change_changed() {
        let change = StateChange {
            from: FlowState::Pricing,
            to: FlowState::Confirming,
        };
        assert!(change.changed());
        assert!(!StateChange::stayed(FlowState::Pricing).changed());
    }

    #[test]
    fn test_flow_state_display() {
        assert_eq!(FlowState::AwaitingGateway.to_string(), "awaiting_gateway");
        assert_eq!(FlowState::Succeeded.to_string(), "succeeded");
    }

    #[test]
    fn test_flow_state_serde() {
        let json = serde_json::to_value(FlowState::Reconciling).unwrap();
        assert_eq!(json, "reconciling");
        let back: FlowState = serde_json::from_value(json).unwrap();
        assert_eq!(back, FlowState::Reconciling);
    }
}

//! The seam between the flow orchestrator and the external payment gateway.
//!
//! The gateway's hosted confirmation UI, card collection, and step-up
//! challenges are a black box. The adapter's one obligation toward the flow
//! is exactly-once delivery of a terminal outcome per handle, with
//! gateway-specific error shapes translated into stable codes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::PaymentIntentHandle;

/// What one `confirm` call resolved to.
///
/// `RequiresAction` is an interim signal (a step-up challenge is pending on
/// the gateway's side); it is surfaced to the user but does not end the
/// attempt, and a subsequent terminal outcome always follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Success { transaction_id: String },
    Failure { code: String, message: String },
    RequiresAction,
}

impl ConfirmOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::RequiresAction)
    }
}

/// Adapter over the external gateway's confirmation step.
///
/// Implementations own the interaction with the gateway SDK (including any
/// user-facing challenge flow) and must resolve exactly one terminal
/// outcome per handle. Transport failures toward the gateway are reported
/// as `Failure` with a translated code, never as a panic or a hang.
#[async_trait]
pub trait GatewayAdapter: Send + Sync {
    async fn confirm(&self, handle: &PaymentIntentHandle) -> ConfirmOutcome;
}

#[async_trait]
impl<T: GatewayAdapter + ?Sized> GatewayAdapter for Arc<T> {
    async fn confirm(&self, handle: &PaymentIntentHandle) -> ConfirmOutcome {
        (**self).confirm(handle).await
    }
}

/// Translate a raw gateway error code into the stable codes the rest of
/// the system keys on. Unknown codes collapse to `"gateway_error"`.
pub fn translate_gateway_code(raw: &str) -> &'static str {
    match raw {
        "card_declined" | "generic_decline" | "do_not_honor" => "card_declined",
        "expired_card" => "expired_card",
        "insufficient_funds" => "insufficient_funds",
        "authentication_required" | "authentication_failed" => "authentication_failed",
        "processing_error" => "processing_error",
        _ => "gateway_error",
    }
}

//! Billing error taxonomy.
//!
//! Three recoverable-or-terminal failure families cover the purchase flow;
//! everything else is either swallowed (transient poll-time query failures)
//! or deliberately not an error at all (activation lagging behind a
//! confirmed payment).

use thiserror::Error;

/// Errors surfaced by the purchase flow.
#[derive(Debug, Clone, Error)]
pub enum BillingError {
    /// Malformed confirmation input. The flow stays in Confirming; the user
    /// must correct the input. Never retried automatically.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The payment-intent service was unreachable or rejected the request.
    /// The flow stays in Confirming; re-submitting the confirmation mints a
    /// new intent.
    #[error("payment intent creation failed: {message}")]
    IntentCreation { message: String, retryable: bool },

    /// Terminal failure outcome from the gateway. The attempt is over; the
    /// flow moves to Failed and the user may retry or reset.
    #[error("gateway failure [{code}]: {message}")]
    Gateway { code: String, message: String },
}

impl BillingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn intent_creation(message: impl Into<String>, retryable: bool) -> Self {
        Self::IntentCreation {
            message: message.into(),
            retryable,
        }
    }

    pub fn gateway(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Gateway {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the presentation layer.
    /// Gateway failures pass the gateway's own code through.
    pub fn code(&self) -> &str {
        match self {
            Self::Validation { .. } => "invalid_input",
            Self::IntentCreation { .. } => "intent_creation_failed",
            Self::Gateway { code, .. } => code,
        }
    }

    /// Whether re-driving the same action can reasonably succeed without
    /// the user changing anything.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation { .. } => false,
            Self::IntentCreation { retryable, .. } => *retryable,
            Self::Gateway { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            BillingError::validation("payer_id", "empty").code(),
            "invalid_input"
        );
        assert_eq!(
            BillingError::intent_creation("503", true).code(),
            "intent_creation_failed"
        );
        assert_eq!(
            BillingError::gateway("card_declined", "declined").code(),
            "card_declined"
        );
    }

    #[test]
    fn test_retryability() {
        assert!(!BillingError::validation("price", "negative").is_retryable());
        assert!(BillingError::intent_creation("timeout", true).is_retryable());
        assert!(!BillingError::intent_creation("rejected", false).is_retryable());
        assert!(BillingError::gateway("card_declined", "declined").is_retryable());
    }

    #[test]
    fn test_display() {
        let err = BillingError::gateway("card_declined", "The card was declined");
        let s = format!("{}", err);
        assert!(s.contains("card_declined"));
        assert!(s.contains("declined"));
    }
}

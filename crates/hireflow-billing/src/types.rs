//! Domain types for one purchase attempt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// Billing cycles offered on the plan screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Annual,
}

/// Who is paying. Explicit on every confirmation; never read from ambient
/// session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerContact {
    pub payer_id: String,
    pub email: String,
}

/// A user-confirmed intent to purchase a plan.
///
/// Immutable once created; held by the flow for the duration of one
/// purchase attempt and discarded only by an explicit `reset()` (or a
/// successful terminal result). Construct via [`SubscriptionConfirmation::new`],
/// which rejects malformed input locally instead of round-tripping an
/// invalid request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionConfirmation {
    pub plan_id: String,
    pub price: Decimal,
    pub currency: String,
    pub cycle: BillingCycle,
    pub payer: PayerContact,
    pub consented: bool,
}

impl SubscriptionConfirmation {
    pub fn new(
        plan_id: impl Into<String>,
        price: Decimal,
        currency: impl Into<String>,
        cycle: BillingCycle,
        payer: PayerContact,
        consented: bool,
    ) -> Result<Self, BillingError> {
        let confirmation = Self {
            plan_id: plan_id.into(),
            price,
            currency: currency.into(),
            cycle,
            payer,
            consented,
        };
        confirmation.validate()?;
        Ok(confirmation)
    }

    /// Validate the confirmation. Also re-run by the payment-intent port
    /// right before the request goes out.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.plan_id.is_empty() {
            return Err(BillingError::validation("plan_id", "must not be empty"));
        }
        validate_payer_id(&self.payer.payer_id)?;
        if self.payer.email.is_empty() || !self.payer.email.contains('@') {
            return Err(BillingError::validation(
                "email",
                "must be a well-formed address",
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(BillingError::validation("price", "must be positive"));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(BillingError::validation(
                "currency",
                "must be a three-letter code",
            ));
        }
        if !self.consented {
            return Err(BillingError::validation(
                "consented",
                "explicit consent is required",
            ));
        }
        Ok(())
    }
}

/// Well-formedness check for the opaque payer identifier.
pub fn validate_payer_id(payer_id: &str) -> Result<(), BillingError> {
    if payer_id.is_empty() {
        return Err(BillingError::validation("payer_id", "must not be empty"));
    }
    if payer_id.len() > 64 {
        return Err(BillingError::validation("payer_id", "too long"));
    }
    if !payer_id.chars().all(|c| c.is_ascii_graphic()) {
        return Err(BillingError::validation(
            "payer_id",
            "must be printable ASCII without whitespace",
        ));
    }
    Ok(())
}

/// Opaque identifier plus client credential for one attempt to pay a
/// specific amount. Owned exclusively by the flow for the lifetime of one
/// gateway interaction; never reused across semantically different
/// confirmations, since the gateway enforces at most one successful
/// confirmation per handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentHandle {
    pub intent_id: String,
    pub client_credential: String,
}

impl From<hireflow_client::CreateIntentResponse> for PaymentIntentHandle {
    fn from(resp: hireflow_client::CreateIntentResponse) -> Self {
        Self {
            intent_id: resp.intent_id,
            client_credential: resp.client_credential,
        }
    }
}

/// Terminal result of one gateway interaction. Produced once per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success { transaction_id: String },
    Failure { code: String, message: String },
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// What the flow exposes after a successful attempt.
///
/// `activation_pending` marks a confirmed payment whose entitlement hadn't
/// propagated within the poll budget; the presentation layer softens its
/// success message accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseResult {
    pub transaction_id: String,
    pub activation_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payer() -> PayerContact {
        PayerContact {
            payer_id: "payer_42".into(),
            email: "hr@acme.example".into(),
        }
    }

    fn confirmation() -> Result<SubscriptionConfirmation, BillingError> {
        SubscriptionConfirmation::new(
            "premium-monthly",
            dec!(30),
            "USD",
            BillingCycle::Monthly,
            payer(),
            true,
        )
    }

    #[test]
    fn test_valid_confirmation() {
        let c = confirmation().unwrap();
        assert_eq!(c.plan_id, "premium-monthly");
        assert_eq!(c.price, dec!(30));
    }

    #[test]
    fn test_rejects_missing_consent() {
        let err = SubscriptionConfirmation::new(
            "premium-monthly",
            dec!(30),
            "USD",
            BillingCycle::Monthly,
            payer(),
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BillingError::Validation {
                field: "consented",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let err = SubscriptionConfirmation::new(
            "premium-monthly",
            dec!(0),
            "USD",
            BillingCycle::Monthly,
            payer(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, BillingError::Validation { field: "price", .. }));
    }

    #[test]
    fn test_rejects_bad_currency() {
        for bad in ["usd", "US", "DOLLARS"] {
            let err = SubscriptionConfirmation::new(
                "premium-monthly",
                dec!(30),
                bad,
                BillingCycle::Monthly,
                payer(),
                true,
            )
            .unwrap_err();
            assert!(matches!(
                err,
                BillingError::Validation {
                    field: "currency",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_payer_id_well_formedness() {
        assert!(validate_payer_id("payer_42").is_ok());
        assert!(validate_payer_id("").is_err());
        assert!(validate_payer_id("has space").is_err());
        assert!(validate_payer_id("naïve").is_err());
        assert!(validate_payer_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_price_precision_survives() {
        let c = SubscriptionConfirmation::new(
            "premium-annual",
            dec!(299.99),
            "EUR",
            BillingCycle::Annual,
            payer(),
            true,
        )
        .unwrap();
        assert_eq!(c.price.to_string(), "299.99");
    }

    #[test]
    fn test_handle_from_intent_response() {
        let handle: PaymentIntentHandle = hireflow_client::CreateIntentResponse {
            intent_id: "pi_1".into(),
            client_credential: "pi_1_secret".into(),
        }
        .into();
        assert_eq!(handle.intent_id, "pi_1");
        assert_eq!(handle.client_credential, "pi_1_secret");
    }

    #[test]
    fn test_outcome_success_flag() {
        assert!(PaymentOutcome::Success {
            transaction_id: "tx_1".into()
        }
        .is_success());
        assert!(!PaymentOutcome::Failure {
            code: "card_declined".into(),
            message: "declined".into()
        }
        .is_success());
    }
}

//! Production service-port implementations over [`HireflowClient`].
//!
//! The seam where HTTP-level errors become the billing taxonomy: transient
//! transport/backend failures stay retryable, backend rejections don't.

use async_trait::async_trait;

use hireflow_client::{CreateIntentRequest, EntitlementStatus, HireflowClient};

use crate::error::BillingError;
use crate::services::{EntitlementSource, IntentService, QueryFault};
use crate::types::{PaymentIntentHandle, SubscriptionConfirmation};

#[async_trait]
impl EntitlementSource for HireflowClient {
    async fn status(&self, payer_id: &str) -> Result<EntitlementStatus, QueryFault> {
        // Bypasses the freshness cache on purpose: poll sites exist to
        // observe the record changing. (`entitlement_status` still refreshes
        // the cache for casual readers.)
        self.entitlement_status(payer_id)
            .await
            .map_err(|err| QueryFault(err.to_string()))
    }
}

#[async_trait]
impl IntentService for HireflowClient {
    async fn create_intent(
        &self,
        confirmation: &SubscriptionConfirmation,
    ) -> Result<PaymentIntentHandle, BillingError> {
        // Reject malformed input locally rather than round-tripping an
        // invalid request.
        confirmation.validate()?;

        let request = CreateIntentRequest {
            payer_id: confirmation.payer.payer_id.clone(),
            amount: confirmation.price,
            currency: confirmation.currency.clone(),
            description: Some(confirmation.plan_id.clone()),
        };

        match self.create_payment_intent(&request).await {
            Ok(resp) => Ok(resp.into()),
            Err(err) => {
                let retryable = err.is_transient();
                Err(BillingError::intent_creation(err.to_string(), retryable))
            }
        }
    }
}

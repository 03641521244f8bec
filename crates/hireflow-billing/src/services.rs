//! Service ports the flow orchestrator drives.
//!
//! The orchestrator never talks HTTP directly; it is generic over these
//! traits so tests can script every service response. The production
//! implementations over [`hireflow_client::HireflowClient`] live in
//! [`crate::http`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BillingError;
use crate::types::{PaymentIntentHandle, SubscriptionConfirmation};
use hireflow_client::EntitlementStatus;

/// A failed entitlement read: the service was unreachable or answered
/// garbage, as opposed to answering "inactive". Poll sites swallow these
/// within their attempt budget; other call sites surface them.
#[derive(Debug, Clone, thiserror::Error)]
#[error("entitlement query failed: {0}")]
pub struct QueryFault(pub String);

/// Read-only accessor for the payer's current entitlement.
#[async_trait]
pub trait EntitlementSource: Send + Sync {
    async fn status(&self, payer_id: &str) -> Result<EntitlementStatus, QueryFault>;
}

#[async_trait]
impl<T: EntitlementSource + ?Sized> EntitlementSource for Arc<T> {
    async fn status(&self, payer_id: &str) -> Result<EntitlementStatus, QueryFault> {
        (**self).status(payer_id).await
    }
}

/// Creates a payment intent for a confirmed purchase.
///
/// One confirmation yields at most one live handle; re-submitting a
/// confirmation after a failure mints a fresh intent.
#[async_trait]
pub trait IntentService: Send + Sync {
    async fn create_intent(
        &self,
        confirmation: &SubscriptionConfirmation,
    ) -> Result<PaymentIntentHandle, BillingError>;
}

#[async_trait]
impl<T: IntentService + ?Sized> IntentService for Arc<T> {
    async fn create_intent(
        &self,
        confirmation: &SubscriptionConfirmation,
    ) -> Result<PaymentIntentHandle, BillingError> {
        (**self).create_intent(confirmation).await
    }
}

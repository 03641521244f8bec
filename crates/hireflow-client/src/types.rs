//! Request and response types for the portal billing endpoints.
//!
//! These mirror the backend's JSON shapes (camelCase on the wire) with
//! typed structs for the well-known records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Entitlement ────────────────────────────────────────────────────

/// Subscription lifecycle states as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Expired,
    Cancelled,
}

/// The durable server-side entitlement record for a payer.
///
/// Response shape of `GET /entitlement?payerId=...`. Written only by the
/// backend's payment-completed event consumer; clients read it and poll it,
/// never write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementStatus {
    /// Entitlement record id, when one exists (absent for payers with no
    /// subscription history).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: SubscriptionStatus,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
}

impl EntitlementStatus {
    /// The well-formed "no subscription" record. Payers without any
    /// subscription history resolve to this rather than an error.
    pub fn inactive() -> Self {
        Self {
            id: None,
            status: SubscriptionStatus::Inactive,
            is_premium: false,
            start_at: None,
            end_at: None,
        }
    }

    /// Whole days until the entitlement ends, measured from `now`.
    /// `None` when there is no end date; clamped at zero once past it.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.end_at.map(|end| (end - now).num_days().max(0))
    }

    /// Whether the entitlement is in a state that grants access.
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

// ─── Payment intents ────────────────────────────────────────────────

/// Request body for `POST /payment-intents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub payer_id: String,
    /// Full-precision amount; the backend rejects truncated values.
    pub amount: Decimal,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response from `POST /payment-intents`.
///
/// `client_credential` is the opaque secret the external gateway's
/// confirmation step consumes; it is never interpreted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub intent_id: String,
    pub client_credential: String,
}

//! Portal client integration tests.
//!
//! Covers: client creation, URL building, options, entitlement cache,
//! error types, and wire-type serde. No live HTTP.

use hireflow_client::*;
use rust_decimal_macros::dec;

// ── ClientOptions ───────────────────────────────────────────────

#[test]
fn client_options_default() {
    let opts = ClientOptions::default();
    assert_eq!(opts.base_path, "/api/billing");
    assert!(opts.base_url.is_empty());
    assert!(opts.auth_token.is_none());
    assert_eq!(opts.timeout_secs, 30);
    assert_eq!(opts.entitlement_cache_max_age_secs, 60);
}

#[test]
fn client_options_custom_base_path() {
    let opts = ClientOptions {
        base_url: "https://portal.example".into(),
        base_path: "/billing/v2".into(),
        ..Default::default()
    };
    assert_eq!(opts.base_path, "/billing/v2");
}

// ── HireflowClient ──────────────────────────────────────────────

#[test]
fn client_creation() {
    let client = HireflowClient::new(ClientOptions {
        base_url: "https://portal.example".into(),
        ..Default::default()
    });
    assert_eq!(client.base_url(), "https://portal.example/api/billing");
}

#[test]
fn client_custom_base_path() {
    let client = HireflowClient::new(ClientOptions {
        base_url: "https://portal.example".into(),
        base_path: "/billing".into(),
        ..Default::default()
    });
    assert_eq!(client.base_url(), "https://portal.example/billing");
}

#[test]
fn client_trailing_slash_normalized() {
    let client = HireflowClient::new(ClientOptions {
        base_url: "https://portal.example/".into(),
        ..Default::default()
    });
    assert!(!client.base_url().contains("//api"));
}

#[test]
fn client_with_token() {
    let client = HireflowClient::new(ClientOptions {
        base_url: "https://portal.example".into(),
        auth_token: Some("session-token".into()),
        ..Default::default()
    });
    assert_eq!(client.options().auth_token, Some("session-token".into()));
}

#[test]
fn client_clone_works() {
    let client = HireflowClient::new(ClientOptions {
        base_url: "https://portal.example".into(),
        ..Default::default()
    });
    let cloned = client.clone();
    assert_eq!(cloned.base_url(), client.base_url());
}

// ── EntitlementCache ────────────────────────────────────────────

#[test]
fn cache_starts_empty() {
    let cache = EntitlementCache::new(60);
    assert!(!cache.has_data());
    assert!(!cache.is_fresh());
}

#[test]
fn cache_set_then_fresh() {
    let mut cache = EntitlementCache::new(60);
    cache.set(EntitlementStatus::inactive());
    assert!(cache.is_fresh());
    assert_eq!(
        cache.get_if_fresh().unwrap().status,
        SubscriptionStatus::Inactive
    );
}

#[test]
fn cache_invalidate_is_stale_but_keeps_data() {
    let mut cache = EntitlementCache::new(60);
    cache.set(EntitlementStatus::inactive());
    cache.invalidate();
    assert!(!cache.is_fresh());
    assert!(cache.has_data());
}

// ── ClientError ─────────────────────────────────────────────────

#[test]
fn client_error_display() {
    let err = ClientError::Unauthorized {
        code: "UNAUTHORIZED".into(),
        message: "Invalid credentials".into(),
    };
    let display = format!("{}", err);
    assert!(display.contains("Unauthorized"));
    assert!(display.contains("Invalid credentials"));
}

#[test]
fn client_error_variants_constructible() {
    let _ = ClientError::Network("connection refused".into());
    let _ = ClientError::BadRequest {
        code: "X".into(),
        message: "Y".into(),
    };
    let _ = ClientError::NotFound {
        message: "Y".into(),
    };
    let _ = ClientError::Conflict {
        code: "X".into(),
        message: "Y".into(),
    };
    let _ = ClientError::UnprocessableEntity {
        code: "X".into(),
        message: "Y".into(),
    };
    let _ = ClientError::TooManyRequests {
        message: "Y".into(),
    };
    let _ = ClientError::Server {
        status: 500,
        message: "Y".into(),
    };
    let _ = ClientError::Deserialization("Y".into());
}

#[test]
fn client_error_transient_split() {
    assert!(ClientError::Network("down".into()).is_transient());
    assert!(!ClientError::UnprocessableEntity {
        code: "INVALID_PAYER".into(),
        message: "bad payer id".into(),
    }
    .is_transient());
}

// ── Wire types ──────────────────────────────────────────────────

#[test]
fn entitlement_status_deserializes_camel_case() {
    let json = serde_json::json!({
        "id": "ent_9",
        "status": "active",
        "isPremium": true,
        "startAt": "2025-05-01T00:00:00Z",
        "endAt": "2025-06-01T00:00:00Z"
    });
    let ent: EntitlementStatus = serde_json::from_value(json).unwrap();
    assert!(ent.is_premium);
    assert_eq!(ent.id.as_deref(), Some("ent_9"));
    assert_eq!(ent.status, SubscriptionStatus::Active);
}

#[test]
fn entitlement_status_minimal_shape() {
    let json = serde_json::json!({
        "status": "cancelled",
        "isPremium": false
    });
    let ent: EntitlementStatus = serde_json::from_value(json).unwrap();
    assert_eq!(ent.status, SubscriptionStatus::Cancelled);
    assert!(ent.end_at.is_none());
}

#[test]
fn create_intent_request_serializes_amount_with_precision() {
    let req = CreateIntentRequest {
        payer_id: "payer_1".into(),
        amount: dec!(149.90),
        currency: "EUR".into(),
        description: None,
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["amount"], "149.90");
    assert!(json.get("description").is_none());
}

#[test]
fn create_intent_response_roundtrip() {
    let resp = CreateIntentResponse {
        intent_id: "pi_55".into(),
        client_credential: "pi_55_secret".into(),
    };
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["intentId"], "pi_55");
    let back: CreateIntentResponse = serde_json::from_value(json).unwrap();
    assert_eq!(back, resp);
}

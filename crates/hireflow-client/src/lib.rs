//! # Hireflow portal client
//!
//! Headless Rust client for the Hireflow portal backend's billing surface.
//! Provides typed async methods for the entitlement query service, the
//! payment-intent service, and the entitlement lifecycle endpoint, plus a
//! freshness-tracked entitlement cache for casual premium checks.
//!
//! Payer identity is explicit on every call; the client holds no ambient
//! session state, which keeps the purchase orchestrator built on top of it
//! independently testable.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hireflow_client::{ClientOptions, HireflowClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HireflowClient::new(ClientOptions {
//!         base_url: "https://app.hireflow.example".into(),
//!         ..Default::default()
//!     });
//!
//!     let ent = client.entitlement_status("payer_42").await?;
//!     println!("premium: {}", ent.is_premium);
//!     Ok(())
//! }
//! ```

mod cache;
mod error;
mod types;

pub use cache::*;
pub use error::*;
pub use types::*;

use std::sync::Arc;
use tokio::sync::RwLock;

// ─── Client Options ────────────────────────────────────────────────

/// Configuration for the portal client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the portal backend (e.g. `https://app.hireflow.example`).
    pub base_url: String,

    /// Base path for billing endpoints (default: `/api/billing`).
    pub base_path: String,

    /// Optional static Bearer token sent on every request.
    pub auth_token: Option<String>,

    /// HTTP request timeout in seconds (default: 30).
    pub timeout_secs: u64,

    /// Number of seconds a cached entitlement read is considered fresh
    /// (default: 60). The activation poller bypasses the cache entirely.
    pub entitlement_cache_max_age_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            base_path: "/api/billing".to_string(),
            auth_token: None,
            timeout_secs: 30,
            entitlement_cache_max_age_secs: 60,
        }
    }
}

// ─── Client ────────────────────────────────────────────────────────

/// Headless async HTTP client for the portal's billing endpoints.
#[derive(Clone)]
pub struct HireflowClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
    entitlement_cache: Arc<RwLock<EntitlementCache>>,
}

impl HireflowClient {
    /// Create a new client with the given options.
    pub fn new(options: ClientOptions) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = options.auth_token {
            if let Ok(val) = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(reqwest::header::AUTHORIZATION, val);
            }
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(options.timeout_secs))
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base_url = format!(
            "{}{}",
            options.base_url.trim_end_matches('/'),
            options.base_path
        );

        Self {
            http,
            base_url,
            entitlement_cache: Arc::new(RwLock::new(EntitlementCache::new(
                options.entitlement_cache_max_age_secs,
            ))),
            options,
        }
    }

    /// Get the options this client was created with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Get the full base URL (base_url + base_path).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a reference to the underlying `reqwest::Client`.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    // ─── Internal helpers ───────────────────────────────────────────

    /// Build a full URL for the given endpoint path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a GET request with query parameters.
    async fn get_with_query<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(ClientError::network)?;

        Self::handle_response(resp).await
    }

    /// Send a POST request with a JSON body and deserialize the response.
    async fn post<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ClientError::network)?;

        Self::handle_response(resp).await
    }

    /// Send a POST request without a body.
    async fn post_empty<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(ClientError::network)?;

        Self::handle_response(resp).await
    }

    /// Handle an HTTP response, mapping status codes to errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();

        if status.is_success() {
            let body = resp.text().await.map_err(ClientError::network)?;
            return serde_json::from_str(&body).map_err(|e| {
                ClientError::Deserialization(format!(
                    "Failed to deserialize response: {} (body: {})",
                    e,
                    if body.len() > 200 {
                        format!("{}...", &body[..200])
                    } else {
                        body
                    }
                ))
            });
        }

        // Try to parse the structured error body
        let body = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
        let error_detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                let err = v.get("error")?;
                let code = err.get("code")?.as_str()?.to_string();
                let message = err.get("message")?.as_str()?.to_string();
                Some((code, message))
            });

        match status.as_u16() {
            400 => Err(ClientError::BadRequest {
                code: error_detail
                    .as_ref()
                    .map(|(c, _)| c.clone())
                    .unwrap_or_else(|| "BAD_REQUEST".into()),
                message: error_detail.map(|(_, m)| m).unwrap_or(body),
            }),
            401 => Err(ClientError::Unauthorized {
                code: error_detail
                    .as_ref()
                    .map(|(c, _)| c.clone())
                    .unwrap_or_else(|| "UNAUTHORIZED".into()),
                message: error_detail
                    .map(|(_, m)| m)
                    .unwrap_or_else(|| "Unauthorized".into()),
            }),
            403 => Err(ClientError::Forbidden {
                code: error_detail
                    .as_ref()
                    .map(|(c, _)| c.clone())
                    .unwrap_or_else(|| "FORBIDDEN".into()),
                message: error_detail
                    .map(|(_, m)| m)
                    .unwrap_or_else(|| "Forbidden".into()),
            }),
            404 => Err(ClientError::NotFound {
                message: error_detail
                    .map(|(_, m)| m)
                    .unwrap_or_else(|| "Not found".into()),
            }),
            409 => Err(ClientError::Conflict {
                code: error_detail
                    .as_ref()
                    .map(|(c, _)| c.clone())
                    .unwrap_or_else(|| "CONFLICT".into()),
                message: error_detail.map(|(_, m)| m).unwrap_or(body),
            }),
            422 => Err(ClientError::UnprocessableEntity {
                code: error_detail
                    .as_ref()
                    .map(|(c, _)| c.clone())
                    .unwrap_or_else(|| "UNPROCESSABLE_ENTITY".into()),
                message: error_detail.map(|(_, m)| m).unwrap_or(body),
            }),
            429 => Err(ClientError::TooManyRequests {
                message: error_detail
                    .map(|(_, m)| m)
                    .unwrap_or_else(|| "Too many requests".into()),
            }),
            _ => Err(ClientError::Server {
                status: status.as_u16(),
                message: error_detail.map(|(_, m)| m).unwrap_or(body),
            }),
        }
    }

    // ─── Entitlement query service ──────────────────────────────────

    /// Read the payer's current entitlement, always hitting the server.
    ///
    /// A payer with no subscription record resolves to the well-formed
    /// inactive status: "no subscription" is a normal state, not a fault.
    /// Every other error is surfaced so callers can tell an unreachable
    /// backend apart from a legitimately inactive entitlement.
    ///
    /// Maps to `GET /entitlement?payerId=...`.
    pub async fn entitlement_status(
        &self,
        payer_id: &str,
    ) -> Result<EntitlementStatus, ClientError> {
        let result: Result<EntitlementStatus, ClientError> = self
            .get_with_query("/entitlement", &[("payerId", payer_id)])
            .await;

        let ent = match result {
            Ok(ent) => ent,
            Err(err) if err.is_not_found() => EntitlementStatus::inactive(),
            Err(err) => {
                tracing::debug!(payer_id, error = %err, "entitlement query failed");
                return Err(err);
            }
        };

        self.entitlement_cache.write().await.set(ent.clone());
        Ok(ent)
    }

    /// Read the payer's entitlement, preferring a fresh cached value.
    pub async fn entitlement_status_cached(
        &self,
        payer_id: &str,
    ) -> Result<EntitlementStatus, ClientError> {
        {
            let cache = self.entitlement_cache.read().await;
            if let Some(cached) = cache.get_if_fresh() {
                return Ok(cached.clone());
            }
        }
        self.entitlement_status(payer_id).await
    }

    /// Convenience premium gate over the cached entitlement read.
    pub async fn is_premium(&self, payer_id: &str) -> Result<bool, ClientError> {
        Ok(self.entitlement_status_cached(payer_id).await?.is_premium)
    }

    /// Mark the cached entitlement stale so the next read re-fetches.
    pub async fn invalidate_entitlement_cache(&self) {
        self.entitlement_cache.write().await.invalidate();
    }

    // ─── Payment intent service ─────────────────────────────────────

    /// Create a payment intent against the external gateway for the given
    /// amount and payer.
    ///
    /// Maps to `POST /payment-intents`.
    pub async fn create_payment_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<CreateIntentResponse, ClientError> {
        self.post("/payment-intents", request).await
    }

    // ─── Entitlement lifecycle ──────────────────────────────────────

    /// Cancel an entitlement. Lifecycle endpoint, not part of the purchase
    /// flow; returns the updated record and drops the cached read.
    ///
    /// Maps to `POST /entitlements/{id}/cancel`.
    pub async fn cancel_entitlement(
        &self,
        entitlement_id: &str,
    ) -> Result<EntitlementStatus, ClientError> {
        let updated: EntitlementStatus = self
            .post_empty(&format!("/entitlements/{}/cancel", entitlement_id))
            .await?;
        self.entitlement_cache.write().await.set(updated.clone());
        Ok(updated)
    }
}

impl std::fmt::Debug for HireflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HireflowClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ClientOptions::default();
        assert_eq!(opts.base_path, "/api/billing");
        assert_eq!(opts.timeout_secs, 30);
        assert!(opts.auth_token.is_none());
        assert_eq!(opts.entitlement_cache_max_age_secs, 60);
    }

    #[test]
    fn test_client_creation() {
        let client = HireflowClient::new(ClientOptions {
            base_url: "https://app.hireflow.example".into(),
            ..Default::default()
        });
        assert_eq!(client.base_url(), "https://app.hireflow.example/api/billing");
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let client = HireflowClient::new(ClientOptions {
            base_url: "https://app.hireflow.example/".into(),
            ..Default::default()
        });
        assert_eq!(client.base_url(), "https://app.hireflow.example/api/billing");
    }

    #[test]
    fn test_url_building() {
        let client = HireflowClient::new(ClientOptions {
            base_url: "https://app.hireflow.example".into(),
            ..Default::default()
        });
        assert_eq!(
            client.url("/payment-intents"),
            "https://app.hireflow.example/api/billing/payment-intents"
        );
        assert_eq!(
            client.url("/entitlements/ent_1/cancel"),
            "https://app.hireflow.example/api/billing/entitlements/ent_1/cancel"
        );
    }

    #[test]
    fn test_client_debug() {
        let client = HireflowClient::new(ClientOptions {
            base_url: "https://app.hireflow.example".into(),
            ..Default::default()
        });
        let debug = format!("{:?}", client);
        assert!(debug.contains("HireflowClient"));
        assert!(debug.contains("/api/billing"));
    }
}

//! # hireflow-billing
//!
//! Subscription purchase and activation core for the Hireflow portal
//! client. Owns the one subsystem of the portal with real state-machine
//! and failure-handling complexity: taking a user from plan selection
//! through external-gateway payment confirmation to a durably active
//! entitlement, where activation happens out-of-band after payment clears.
//!
//! ## Pieces
//! - [`PurchaseFlow`] — the state machine driving one attempt
//! - [`await_activation`] — bounded, cancellable entitlement polling
//! - [`GatewayAdapter`] — the boundary to the external payment gateway
//! - [`EntitlementSource`] / [`IntentService`] — service ports, implemented
//!   over [`hireflow_client::HireflowClient`] in [`http`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hireflow_billing::*;
//! use hireflow_client::{ClientOptions, HireflowClient};
//! use rust_decimal::Decimal;
//!
//! # async fn example(gateway: impl GatewayAdapter) -> Result<(), BillingError> {
//! let client = HireflowClient::new(ClientOptions {
//!     base_url: "https://app.hireflow.example".into(),
//!     ..Default::default()
//! });
//!
//! let mut flow = PurchaseFlow::new(client.clone(), gateway, client);
//! let confirmation = SubscriptionConfirmation::new(
//!     "premium-monthly",
//!     Decimal::new(3000, 2),
//!     "USD",
//!     BillingCycle::Monthly,
//!     PayerContact { payer_id: "payer_42".into(), email: "hr@acme.example".into() },
//!     true,
//! )?;
//!
//! flow.confirm(confirmation)?;
//! flow.initiate_payment().await?;
//! flow.await_gateway().await?;
//! assert_eq!(flow.current_state(), FlowState::Succeeded);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod flow;
pub mod gateway;
pub mod http;
pub mod poller;
pub mod services;
pub mod types;

pub use error::*;
pub use flow::*;
pub use gateway::*;
pub use poller::*;
pub use services::*;
pub use types::*;

// The entitlement record is owned by the client crate; re-exported so flow
// consumers need only one import.
pub use hireflow_client::{EntitlementStatus, SubscriptionStatus};

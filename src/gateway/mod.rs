// Payment gateway layer: error types and the bePaid client.

pub mod bepaid;

pub use bepaid::{BePaidClient, GatewayClient, SubscriptionCreated};

use thiserror::Error;

/// Identifier written into the `payment_gateway` column of local records.
pub const GATEWAY_ID: &str = "bePaid";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed gateway response: {context}")]
    MalformedResponse { context: String },

    #[error("payment gateway not configured (missing shop credentials)")]
    NotConfigured,
}

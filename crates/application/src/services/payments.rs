//! Post-checkout payment verification.

use std::sync::Arc;

use prepdesk_domain::{DomainError, PaymentVerification};
use tracing::info;

use crate::ApiResult;
use crate::api_client::AuthenticatedClient;

/// Verifies orders after the payment provider redirects back.
pub struct PaymentService {
    client: Arc<AuthenticatedClient>,
}

impl PaymentService {
    /// Creates the service.
    #[must_use]
    pub const fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    /// Fetches the verification result for an order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty or non-path-safe order id, and
    /// the pipeline error otherwise.
    pub async fn verify(&self, order_id: &str) -> ApiResult<PaymentVerification> {
        let order_id = validate_order_id(order_id)?;
        let verification: PaymentVerification = self
            .client
            .get_json(&format!("/payments/verify/{order_id}"))
            .await?;
        info!(
            order_id,
            outcome = ?verification.outcome(),
            "payment verified"
        );
        Ok(verification)
    }
}

fn validate_order_id(order_id: &str) -> Result<&str, DomainError> {
    let trimmed = order_id.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(trimmed)
    } else {
        Err(DomainError::InvalidIdentifier(order_id.to_string()))
    }
}

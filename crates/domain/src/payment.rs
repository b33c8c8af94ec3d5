//! Payment verification result
//!
//! The backend reports three independent signals after checkout: whether
//! access to the purchased content was granted, the payment status from the
//! payment provider, and the order status. They are not interchangeable:
//! a paid order whose access has not been provisioned yet is reported as
//! [`PaymentOutcome::AwaitingAccess`], not as confirmed.

use serde::{Deserialize, Serialize};

/// Body of `GET /payments/verify/{order_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    /// Whether the purchased content is unlocked for the user.
    #[serde(default)]
    pub access_granted: bool,
    /// Payment provider status (e.g. `SUCCESS`, `PENDING`, `FAILED`).
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Order status (e.g. `PAID`, `CREATED`).
    #[serde(default)]
    pub order_status: Option<String>,
}

/// Interpretation of a [`PaymentVerification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Paid and access granted.
    Confirmed,
    /// Payment or order reports success but access is not granted yet.
    AwaitingAccess,
    /// The payment was declined, cancelled or expired.
    Failed,
    /// No final signal yet.
    Pending,
}

impl PaymentVerification {
    /// Classifies the verification result.
    #[must_use]
    pub fn outcome(&self) -> PaymentOutcome {
        if self.access_granted {
            return PaymentOutcome::Confirmed;
        }

        let payment = self.payment_status.as_deref().unwrap_or_default();
        let order = self.order_status.as_deref().unwrap_or_default();

        if payment.eq_ignore_ascii_case("SUCCESS") || order.eq_ignore_ascii_case("PAID") {
            PaymentOutcome::AwaitingAccess
        } else if ["FAILED", "CANCELLED", "EXPIRED"]
            .iter()
            .any(|s| payment.eq_ignore_ascii_case(s))
        {
            PaymentOutcome::Failed
        } else {
            PaymentOutcome::Pending
        }
    }
}

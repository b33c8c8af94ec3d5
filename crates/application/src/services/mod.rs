//! Thin wrappers over backend endpoints that ride the authenticated pipeline.

mod payments;

pub use payments::PaymentService;

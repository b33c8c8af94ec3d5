//! Prepdesk Domain - Core client types
//!
//! This crate defines the domain model for the Prepdesk client core:
//! request and response values, credentials and token pairs, session
//! state, and client settings. All types here are pure Rust with no I/O.

pub mod auth;
pub mod error;
pub mod payment;
pub mod request;
pub mod response;
pub mod session;
pub mod settings;
pub mod user;

pub use auth::{
    AuthEvent, Credentials, LoginResponse, RefreshedTokens, Registration, RegistrationReceipt,
    TokenPair, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use payment::{PaymentOutcome, PaymentVerification};
pub use request::{ApiRequest, Header, Headers, HttpMethod};
pub use response::{ApiResponse, StatusCode};
pub use session::{Route, SessionState};
pub use settings::{ClientSettings, RetryPolicy};
pub use user::{Profile, User};

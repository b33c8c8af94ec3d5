//! Authentication domain types

mod types;

pub use types::{
    AuthEvent, Credentials, LoginResponse, RefreshedTokens, Registration, RegistrationReceipt,
    TokenPair, token_preview,
};

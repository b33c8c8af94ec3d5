//! HTTP Request domain types

mod header;
mod method;
mod spec;

pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use spec::{AUTHORIZATION, ApiRequest};

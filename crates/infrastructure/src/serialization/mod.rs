//! Deterministic JSON serialization for files written by the client.
//!
//! Output uses 2-space indentation and a trailing newline; key order follows
//! the source type (`BTreeMap` for sorted keys).

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};

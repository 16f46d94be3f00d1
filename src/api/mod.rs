//! Remote document-management service API: wire types, errors, and the
//! HTTP client.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, Result};

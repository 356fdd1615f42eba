//! REST client for the TARA enterprise backend.
//!
//! Covers the endpoints the co-pilot tooling needs: authentication, tenant
//! and agent lookup, call metrics and the wallet.

mod client;
mod error;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;

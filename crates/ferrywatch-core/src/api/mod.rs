//! REST API client module for the ferry alerts service.
//!
//! `AlertsBackend` is the seam the sync store talks through; `ApiClient`
//! implements it over HTTP with optional bearer token authentication.
//! Guests are identified per request with an identity hint instead.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::AlertsBackend;
pub use client::ApiClient;
pub use error::ApiError;

//! Ferrywatch core: keeps a user's watched ferry routes in sync with the
//! alerts backend.
//!
//! - `api`: the `AlertsBackend` seam and its HTTP client
//! - `cache`: normalized route keys and the route status cache
//! - `sync`: the session-scoped `AlertSync` store
//! - `models`: wire and domain types
//! - `config`: on-disk and environment configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod sync;
pub mod utils;

pub use api::{AlertsBackend, ApiClient, ApiError};
pub use cache::{route_key, RouteKey, RouteStatusCache};
pub use config::Config;
pub use models::{AlertOptions, AlertPatch, AlertStatus, QuickSave, RouteCacheEntry, SavedRoute, Stats};
pub use sync::{AlertSync, PageView, SyncError};

//! Data models for ferry route alerts.
//!
//! This module contains the data structures exchanged with the alerts
//! backend and held by the sync store:
//!
//! - `SavedRoute`, `AlertStatus`: a watched route and its lifecycle state
//! - `RouteCacheEntry`: the per-route "is this watched" answer
//! - `AlertPage`: one page of the user's saved routes
//! - Request types: `AlertOptions`, `QuickSave`, `AlertPatch`, `ListQuery`
//! - `Stats`: denormalized alert counters

pub mod request;
pub mod route;
pub mod stats;

pub use request::{AlertOptions, AlertPatch, ListQuery, QuickSave};
pub use route::{AlertPage, AlertStatus, RouteCacheEntry, SavedRoute};
pub use stats::Stats;

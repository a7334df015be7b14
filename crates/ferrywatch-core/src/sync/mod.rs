//! The session-scoped saved-route store.
//!
//! `AlertSync` ties together the route status cache, the paginated list of
//! saved routes and the alert stats:
//!
//! - `store`: construction, cache reads and the read-through route check
//! - `coordinator`: create, quick-save, update, delete, pause, resume
//! - `paginator`: first page and load-more over `GET /alerts`
//! - `stats`: full stats refresh and local deltas

pub mod coordinator;
pub mod error;
pub mod paginator;
pub mod state;
pub mod stats;
pub mod store;

#[cfg(test)]
pub(crate) mod testkit;

pub use error::SyncError;
pub use paginator::{PageView, RouteList};
pub use stats::StatsAggregator;
pub use store::AlertSync;

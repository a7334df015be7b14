//! Route status caching.
//!
//! This module provides the `RouteStatusCache`, an in-memory map from a
//! normalized route key to whether that route is watched. Entries are only
//! written from confirmed server responses; a missing entry means the
//! answer is unknown, never that the route is unsaved.

pub mod key;
pub mod routes;

pub use key::{route_key, RouteKey, KEY_SEPARATOR};
pub use routes::RouteStatusCache;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::AlertsBackend;
use crate::cache::RouteKey;
use crate::models::request::{validate_ports, DEFAULT_PER_PAGE};
use crate::models::RouteCacheEntry;

use super::state::{InFlightKey, SyncState};
use super::SyncError;

/// Session-scoped saved-route store.
///
/// Owns the route status cache, the paginated list and the stats, and keeps
/// them consistent with the server. Share it between consumers behind an
/// `Arc`; separate sessions use separate stores.
///
/// The lock is only ever taken between awaits, so every confirmed response
/// is applied to cache, list and stats in one critical section.
pub struct AlertSync<B> {
    pub(crate) backend: B,
    pub(crate) state: Mutex<SyncState>,
    pub(crate) per_page: u32,
}

impl<B: AlertsBackend> AlertSync<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(SyncState::default()),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Cached answer for a route, `None` when unknown. Never hits the network.
    pub fn lookup(&self, departure: &str, arrival: &str) -> Option<RouteCacheEntry> {
        self.state.lock().cache.lookup(departure, arrival)
    }

    /// Whether a route is watched, asking the server only on a cache miss.
    ///
    /// Concurrent misses for the same route each query the server and the
    /// last response wins. A failed query leaves the route unknown.
    pub async fn check_route_saved(
        &self,
        departure: &str,
        arrival: &str,
        identity_hint: Option<&str>,
    ) -> Result<RouteCacheEntry, SyncError> {
        validate_ports(departure, arrival).map_err(SyncError::Validation)?;
        let key = RouteKey::new(departure, arrival);
        let cached = self.state.lock().cache.get(&key);
        if let Some(entry) = cached {
            debug!(route = %key, "Route status cache hit");
            return Ok(entry);
        }

        let entry = match self.backend.check_route(departure, arrival, identity_hint).await {
            Ok(entry) => entry.normalized(),
            Err(e) => {
                warn!(route = %key, error = %e, "Failed to check route");
                return Err(e.into());
            }
        };

        debug!(route = %key, saved = entry.saved, "Route status fetched");
        self.state.lock().cache.set(key, entry);
        Ok(entry)
    }

    /// Display string of the most recent failed mutation.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.state.lock().last_error = None;
    }

    /// Drop everything held, e.g. when the user signs out.
    pub fn reset(&self) {
        self.state.lock().clear();
    }

    /// Claim `key` for a mutation, failing if an identical one is pending.
    pub(crate) fn begin(&self, key: InFlightKey) -> Result<InFlightGuard<'_>, SyncError> {
        let mut state = self.state.lock();
        if !state.in_flight.insert(key.clone()) {
            debug!(key = %key, "Rejecting duplicate mutation");
            return Err(SyncError::InProgress(key.to_string()));
        }
        state.last_error = None;
        Ok(InFlightGuard {
            state: &self.state,
            key,
        })
    }

    /// Record a failure as the store's last error and hand it back.
    pub(crate) fn fail(&self, operation: &str, err: SyncError) -> SyncError {
        warn!(operation = operation, error = %err, "Mutation failed");
        self.state.lock().last_error = Some(err.to_string());
        err
    }
}

/// Releases an in-flight claim when the mutation finishes or is dropped.
pub(crate) struct InFlightGuard<'a> {
    state: &'a Mutex<SyncState>,
    key: InFlightKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().in_flight.remove(&self.key);
    }
}

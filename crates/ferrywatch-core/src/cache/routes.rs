use std::collections::HashMap;

use tracing::debug;

use crate::models::{RouteCacheEntry, SavedRoute};

use super::RouteKey;

/// Per-route "is this watched" answers keyed by normalized route.
///
/// No eviction: the data set is bounded by the user's own saved routes.
#[derive(Debug, Default, Clone)]
pub struct RouteStatusCache {
    entries: HashMap<RouteKey, RouteCacheEntry>,
}

impl RouteStatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, departure: &str, arrival: &str) -> Option<RouteCacheEntry> {
        self.get(&RouteKey::new(departure, arrival))
    }

    pub fn get(&self, key: &RouteKey) -> Option<RouteCacheEntry> {
        self.entries.get(key).copied()
    }

    pub fn set(&mut self, key: RouteKey, entry: RouteCacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Drop an entry so the next read goes back to the server.
    pub fn invalidate(&mut self, key: &RouteKey) -> Option<RouteCacheEntry> {
        self.entries.remove(key)
    }

    /// Record a server-confirmed route under its own key.
    pub fn record_route(&mut self, route: &SavedRoute) {
        let key = RouteKey::new(&route.departure_port, &route.arrival_port);
        self.set(key, RouteCacheEntry::from_route(route));
    }

    /// Prime entries from a fetched list page.
    pub fn hydrate<'a>(&mut self, routes: impl IntoIterator<Item = &'a SavedRoute>) {
        let mut count = 0usize;
        for route in routes {
            self.record_route(route);
            count += 1;
        }
        debug!(count = count, "Hydrated route status cache");
    }

    /// Find the key currently holding `alert_id`, if any.
    pub fn key_for_alert(&self, alert_id: i64) -> Option<RouteKey> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.alert_id == Some(alert_id))
            .map(|(key, _)| key.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

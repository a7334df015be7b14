use std::collections::HashSet;

use tracing::debug;

use crate::cache::{RouteKey, RouteStatusCache};
use crate::models::{AlertPage, AlertStatus, RouteCacheEntry, SavedRoute};

use super::paginator::RouteList;
use super::stats::StatsAggregator;

/// What a pending mutation is keyed by for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InFlightKey {
    /// A save for a route that may not have an id yet.
    Route(RouteKey),
    /// Any mutation of an existing alert.
    Alert(i64),
}

impl std::fmt::Display for InFlightKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InFlightKey::Route(key) => write!(f, "saving route {}", key),
            InFlightKey::Alert(id) => write!(f, "a change to alert {}", id),
        }
    }
}

/// Everything the store holds, mutated only inside one lock scope per
/// confirmed server response.
#[derive(Debug, Default)]
pub struct SyncState {
    pub cache: RouteStatusCache,
    pub list: RouteList,
    pub stats: StatsAggregator,
    pub last_error: Option<String>,
    pub in_flight: HashSet<InFlightKey>,
}

impl SyncState {
    /// A create or quick-save was confirmed.
    pub fn apply_saved(&mut self, route: &SavedRoute) {
        self.cache.record_route(route);
        if self.list.replace(route).is_some() {
            // Server handed back an alert we already list
            debug!(alert_id = route.id, "Saved route already listed, replaced in place");
            return;
        }
        self.list.prepend(route.clone());
        self.stats.apply(|s| s.record_created(route.status));
    }

    /// An update, pause or resume was confirmed.
    ///
    /// `assumed_prior` is used for the stats delta when neither the list nor
    /// the cache knew the alert's previous status.
    pub fn apply_changed(&mut self, route: &SavedRoute, assumed_prior: Option<AlertStatus>) {
        if !route.status.is_live() {
            let key = RouteKey::new(&route.departure_port, &route.arrival_port);
            self.apply_deleted(route.id, key);
            return;
        }

        let cached_key = self.cache.key_for_alert(route.id);
        let prior = self
            .list
            .replace(route)
            .or_else(|| {
                cached_key
                    .as_ref()
                    .and_then(|key| self.cache.get(key))
                    .and_then(|entry| entry.status)
            })
            .or(assumed_prior);

        let key = RouteKey::new(&route.departure_port, &route.arrival_port);
        if let Some(stale) = cached_key.filter(|k| *k != key) {
            self.cache.invalidate(&stale);
        }
        self.cache.set(key, RouteCacheEntry::from_route(route));

        if let Some(prior) = prior {
            self.stats.apply(|s| s.record_transition(prior, route.status));
        }
    }

    /// A delete was confirmed.
    pub fn apply_deleted(&mut self, alert_id: i64, key: RouteKey) {
        let removed = self.list.remove(alert_id);
        self.list.decrement_total();

        let prior = removed
            .map(|r| r.status)
            .or_else(|| {
                self.cache
                    .get(&key)
                    .filter(|entry| entry.alert_id == Some(alert_id))
                    .and_then(|entry| entry.status)
            });

        self.cache.set(key, RouteCacheEntry::not_saved());

        if let Some(status) = prior.filter(|s| s.is_live()) {
            self.stats.apply(|s| s.record_removed(Some(status)));
        }
    }

    /// A list page arrived. Cancelled alerts are neither listed nor cached.
    pub fn accept_page(&mut self, mut page: AlertPage) -> AlertPage {
        page.routes.retain(|route| route.status.is_live());
        self.cache.hydrate(&page.routes);
        page
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.list.reset();
        self.stats.clear();
        self.last_error = None;
    }
}

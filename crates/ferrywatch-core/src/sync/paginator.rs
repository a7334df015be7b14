use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::AlertsBackend;
use crate::models::{AlertPage, AlertStatus, ListQuery, SavedRoute};

use super::state::SyncState;
use super::{AlertSync, SyncError};

/// Snapshot of the paginated list handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PageView {
    pub items: Vec<SavedRoute>,
    pub total: u64,
    /// Last successfully fetched page, 0 before the first fetch.
    pub page: u32,
    pub has_more: bool,
}

/// The user's saved routes as fetched page by page.
///
/// `total` is the server's count and may disagree with `items.len()` while
/// pages are still being loaded.
#[derive(Debug, Default)]
pub struct RouteList {
    items: Vec<SavedRoute>,
    page: u32,
    has_more: bool,
    total: u64,
    loading: bool,
    /// Bumped by every first-page fetch and reset; older responses are discarded.
    generation: u64,
}

impl RouteList {
    pub fn items(&self) -> &[SavedRoute] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, alert_id: i64) -> Option<&SavedRoute> {
        self.items.iter().find(|r| r.id == alert_id)
    }

    pub fn view(&self) -> PageView {
        PageView {
            items: self.items.clone(),
            total: self.total,
            page: self.page,
            has_more: self.has_more,
        }
    }

    pub fn prepend(&mut self, route: SavedRoute) {
        self.items.insert(0, route);
        self.total += 1;
    }

    /// Replace the entry with the same id in place, returning its old status.
    pub fn replace(&mut self, route: &SavedRoute) -> Option<AlertStatus> {
        let slot = self.items.iter_mut().find(|r| r.id == route.id)?;
        let prior = slot.status;
        *slot = route.clone();
        Some(prior)
    }

    pub fn remove(&mut self, alert_id: i64) -> Option<SavedRoute> {
        let index = self.items.iter().position(|r| r.id == alert_id)?;
        Some(self.items.remove(index))
    }

    /// Empty the list. Responses to fetches issued before are discarded.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    pub fn decrement_total(&mut self) {
        self.total = self.total.saturating_sub(1);
    }

    fn begin_first_page(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Reserve the next page, or `None` if there is nothing to load.
    fn begin_next_page(&mut self) -> Option<(u32, u64)> {
        if !self.has_more || self.loading {
            return None;
        }
        self.loading = true;
        Some((self.page + 1, self.generation))
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Clear the loading flag held by a fetch of `generation`, unless a
    /// newer fetch has taken over since.
    fn release(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.loading = false;
        }
    }

    fn replace_with(&mut self, page: AlertPage) {
        self.items = page.routes;
        self.page = 1;
        self.has_more = page.has_more;
        self.total = page.total;
    }

    fn append(&mut self, requested: u32, page: AlertPage) {
        self.items.extend(page.routes);
        self.page = requested;
        self.has_more = page.has_more;
        self.total = page.total;
    }
}

/// A list fetch's hold on the loading flag.
///
/// Released when the response is handled or when the fetch future is
/// dropped before its response arrives.
struct PageLoad<'a> {
    state: &'a Mutex<SyncState>,
    generation: u64,
}

impl Drop for PageLoad<'_> {
    fn drop(&mut self) {
        self.state.lock().list.release(self.generation);
    }
}

impl<B: AlertsBackend> AlertSync<B> {
    /// Fetch page 1, replacing whatever list was held.
    pub async fn fetch_first_page(&self, filter: Option<AlertStatus>) -> Result<PageView, SyncError> {
        let load = PageLoad {
            state: &self.state,
            generation: self.state.lock().list.begin_first_page(),
        };
        let generation = load.generation;
        let result = self
            .backend
            .list_alerts(ListQuery::first(filter, self.per_page))
            .await;
        drop(load);

        let mut state = self.state.lock();
        if !state.list.is_current(generation) {
            debug!(generation = generation, "Discarding superseded first page");
            return Ok(state.list.view());
        }
        match result {
            Ok(page) => {
                let page = state.accept_page(page);
                state.list.replace_with(page);
                debug!(count = state.list.items().len(), total = state.list.total(), "Loaded first page");
                Ok(state.list.view())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch saved routes");
                Err(e.into())
            }
        }
    }

    /// Fetch and append the next page.
    ///
    /// Returns the current list untouched when there are no more pages or a
    /// fetch is already running.
    pub async fn load_more(&self, filter: Option<AlertStatus>) -> Result<PageView, SyncError> {
        let reserved = {
            let mut state = self.state.lock();
            match state.list.begin_next_page() {
                Some(reserved) => reserved,
                None => return Ok(state.list.view()),
            }
        };
        let (requested, generation) = reserved;
        let load = PageLoad {
            state: &self.state,
            generation,
        };
        let result = self
            .backend
            .list_alerts(ListQuery::for_page(filter, requested, self.per_page))
            .await;
        drop(load);

        let mut state = self.state.lock();
        if !state.list.is_current(generation) {
            debug!(page = requested, "Discarding page from a replaced list");
            return Ok(state.list.view());
        }
        match result {
            Ok(page) => {
                let page = state.accept_page(page);
                state.list.append(requested, page);
                debug!(page = requested, count = state.list.items().len(), "Loaded more routes");
                Ok(state.list.view())
            }
            Err(e) => {
                warn!(page = requested, error = %e, "Failed to load more routes");
                Err(e.into())
            }
        }
    }

    pub fn list_view(&self) -> PageView {
        self.state.lock().list.view()
    }

    /// A listed route by alert id.
    pub fn listed_route(&self, alert_id: i64) -> Option<SavedRoute> {
        self.state.lock().list.find(alert_id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().list.is_loading()
    }
}

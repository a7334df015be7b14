//! Scripted in-memory backend for store tests.
//!
//! Each endpoint pops its next scripted result and yields once before
//! answering, so `futures::join!` can interleave calls the way real
//! network latency would.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::{AlertsBackend, ApiError};
use crate::models::{AlertOptions, AlertPage, AlertPatch, ListQuery, QuickSave, RouteCacheEntry, SavedRoute, Stats};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list: u32,
    pub create: u32,
    pub quick_save: u32,
    pub update: u32,
    pub delete: u32,
    pub pause: u32,
    pub resume: u32,
    pub check: u32,
    pub stats: u32,
}

#[derive(Default)]
struct Script {
    pages: VecDeque<Result<AlertPage, ApiError>>,
    routes: VecDeque<Result<SavedRoute, ApiError>>,
    checks: VecDeque<Result<RouteCacheEntry, ApiError>>,
    deletes: VecDeque<Result<(), ApiError>>,
    stats: Option<Stats>,
    calls: CallCounts,
    queries: Vec<ListQuery>,
    quick_saves: Vec<QuickSave>,
    identity_hints: Vec<Option<String>>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

fn exhausted<T>(endpoint: &str) -> Result<T, ApiError> {
    Err(ApiError::InvalidResponse(format!("no scripted response for {}", endpoint)))
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(self, pages: Vec<Result<AlertPage, ApiError>>) -> Self {
        self.script.lock().pages = pages.into();
        self
    }

    /// Answers for every endpoint returning a route, in call order.
    pub fn with_routes(self, routes: Vec<Result<SavedRoute, ApiError>>) -> Self {
        self.script.lock().routes = routes.into();
        self
    }

    pub fn with_checks(self, checks: Vec<Result<RouteCacheEntry, ApiError>>) -> Self {
        self.script.lock().checks = checks.into();
        self
    }

    pub fn with_deletes(self, deletes: Vec<Result<(), ApiError>>) -> Self {
        self.script.lock().deletes = deletes.into();
        self
    }

    pub fn with_stats(self, stats: Stats) -> Self {
        self.script.lock().stats = Some(stats);
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.script.lock().calls
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.script.lock().queries.clone()
    }

    pub fn quick_saves(&self) -> Vec<QuickSave> {
        self.script.lock().quick_saves.clone()
    }

    pub fn identity_hints(&self) -> Vec<Option<String>> {
        self.script.lock().identity_hints.clone()
    }

    fn next_route(&self, count: impl FnOnce(&mut CallCounts)) -> Result<SavedRoute, ApiError> {
        let mut script = self.script.lock();
        count(&mut script.calls);
        script.routes.pop_front().unwrap_or_else(|| exhausted("route"))
    }
}

#[async_trait]
impl AlertsBackend for ScriptedBackend {
    async fn list_alerts(&self, query: ListQuery) -> Result<AlertPage, ApiError> {
        let result = {
            let mut script = self.script.lock();
            script.calls.list += 1;
            script.queries.push(query);
            script.pages.pop_front().unwrap_or_else(|| exhausted("list"))
        };
        tokio::task::yield_now().await;
        result
    }

    async fn create_alert(
        &self,
        _departure: &str,
        _arrival: &str,
        _options: &AlertOptions,
    ) -> Result<SavedRoute, ApiError> {
        let result = self.next_route(|c| c.create += 1);
        tokio::task::yield_now().await;
        result
    }

    async fn quick_save(&self, request: &QuickSave) -> Result<SavedRoute, ApiError> {
        self.script.lock().quick_saves.push(request.clone());
        let result = self.next_route(|c| c.quick_save += 1);
        tokio::task::yield_now().await;
        result
    }

    async fn update_alert(
        &self,
        _alert_id: i64,
        _patch: &AlertPatch,
        identity_hint: Option<&str>,
    ) -> Result<SavedRoute, ApiError> {
        self.script.lock().identity_hints.push(identity_hint.map(str::to_string));
        let result = self.next_route(|c| c.update += 1);
        tokio::task::yield_now().await;
        result
    }

    async fn delete_alert(&self, _alert_id: i64, identity_hint: Option<&str>) -> Result<(), ApiError> {
        let result = {
            let mut script = self.script.lock();
            script.calls.delete += 1;
            script.identity_hints.push(identity_hint.map(str::to_string));
            script.deletes.pop_front().unwrap_or_else(|| exhausted("delete"))
        };
        tokio::task::yield_now().await;
        result
    }

    async fn pause_alert(&self, _alert_id: i64) -> Result<SavedRoute, ApiError> {
        let result = self.next_route(|c| c.pause += 1);
        tokio::task::yield_now().await;
        result
    }

    async fn resume_alert(&self, _alert_id: i64) -> Result<SavedRoute, ApiError> {
        let result = self.next_route(|c| c.resume += 1);
        tokio::task::yield_now().await;
        result
    }

    async fn check_route(
        &self,
        _departure: &str,
        _arrival: &str,
        identity_hint: Option<&str>,
    ) -> Result<RouteCacheEntry, ApiError> {
        let result = {
            let mut script = self.script.lock();
            script.calls.check += 1;
            script.identity_hints.push(identity_hint.map(str::to_string));
            script.checks.pop_front().unwrap_or_else(|| exhausted("check"))
        };
        tokio::task::yield_now().await;
        result
    }

    async fn fetch_stats(&self) -> Result<Stats, ApiError> {
        let result = {
            let mut script = self.script.lock();
            script.calls.stats += 1;
            script.stats.ok_or_else(|| ApiError::InvalidResponse("no scripted stats".to_string()))
        };
        tokio::task::yield_now().await;
        result
    }
}

//! The alerts backend as seen by the sync store.

use async_trait::async_trait;

use crate::models::{AlertOptions, AlertPage, AlertPatch, ListQuery, QuickSave, RouteCacheEntry, SavedRoute, Stats};

use super::ApiError;

/// Operations the alerts REST backend provides.
///
/// `ApiClient` is the HTTP implementation. Every method maps to exactly one
/// request; retry and timeout policy live in the implementation.
#[async_trait]
pub trait AlertsBackend: Send + Sync {
    /// `GET /alerts?status&page&per_page`
    async fn list_alerts(&self, query: ListQuery) -> Result<AlertPage, ApiError>;

    /// `POST /alerts`
    async fn create_alert(
        &self,
        departure: &str,
        arrival: &str,
        options: &AlertOptions,
    ) -> Result<SavedRoute, ApiError>;

    /// `POST /alerts/quick-save`
    async fn quick_save(&self, request: &QuickSave) -> Result<SavedRoute, ApiError>;

    /// `PATCH /alerts/{id}`
    async fn update_alert(
        &self,
        alert_id: i64,
        patch: &AlertPatch,
        identity_hint: Option<&str>,
    ) -> Result<SavedRoute, ApiError>;

    /// `DELETE /alerts/{id}`
    async fn delete_alert(&self, alert_id: i64, identity_hint: Option<&str>) -> Result<(), ApiError>;

    /// `POST /alerts/{id}/pause`
    async fn pause_alert(&self, alert_id: i64) -> Result<SavedRoute, ApiError>;

    /// `POST /alerts/{id}/resume`
    async fn resume_alert(&self, alert_id: i64) -> Result<SavedRoute, ApiError>;

    /// `GET /alerts/check?departure&arrival&identityHint`
    async fn check_route(
        &self,
        departure: &str,
        arrival: &str,
        identity_hint: Option<&str>,
    ) -> Result<RouteCacheEntry, ApiError>;

    /// `GET /alerts/stats`
    async fn fetch_stats(&self) -> Result<Stats, ApiError>;
}

//! Mutations of saved routes.
//!
//! Every mutation sends one request and, only once the server confirms it,
//! writes the result through to the route cache, the list and the stats in
//! a single lock scope. Nothing is written while a request is pending and a
//! failure leaves all three untouched. Failures are not retried.

use std::future::Future;

use tracing::info;

use crate::api::{AlertsBackend, ApiError};
use crate::cache::RouteKey;
use crate::models::request::{validate_date_window, validate_ports};
use crate::models::{AlertOptions, AlertPatch, AlertStatus, QuickSave, SavedRoute};

use super::state::{InFlightKey, SyncState};
use super::{AlertSync, SyncError};

impl<B: AlertsBackend> AlertSync<B> {
    /// Run one mutation: validate, claim `key`, send, then apply on success.
    async fn mutate<T, F>(
        &self,
        operation: &'static str,
        key: InFlightKey,
        validation: Result<(), String>,
        request: F,
        apply: impl FnOnce(&mut SyncState, &T),
    ) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if let Err(message) = validation {
            return Err(self.fail(operation, SyncError::Validation(message)));
        }
        let _claim = self.begin(key)?;

        let value = match request.await {
            Ok(value) => value,
            Err(e) => return Err(self.fail(operation, e.into())),
        };

        let mut state = self.state.lock();
        apply(&mut state, &value);
        Ok(value)
    }

    /// Create an alert with the full option set.
    pub async fn create(
        &self,
        departure: &str,
        arrival: &str,
        options: AlertOptions,
    ) -> Result<SavedRoute, SyncError> {
        let validation = validate_ports(departure, arrival)
            .and_then(|_| validate_date_window(options.date_from, options.date_to));
        let key = InFlightKey::Route(RouteKey::new(departure, arrival));

        let route = self
            .mutate(
                "create",
                key,
                validation,
                self.backend.create_alert(departure, arrival, &options),
                |state, route| state.apply_saved(route),
            )
            .await?;
        info!(alert_id = route.id, route = %route.route_label(), "Created alert");
        Ok(route)
    }

    /// One-tap save of a route with an optional price and travel window.
    ///
    /// An inverted window is rejected rather than swapped.
    pub async fn quick_save(&self, request: QuickSave) -> Result<SavedRoute, SyncError> {
        let validation = validate_ports(&request.departure, &request.arrival)
            .and_then(|_| validate_date_window(request.date_from, request.date_to));
        let key = InFlightKey::Route(RouteKey::new(&request.departure, &request.arrival));

        let route = self
            .mutate(
                "quick_save",
                key,
                validation,
                self.backend.quick_save(&request),
                |state, route| state.apply_saved(route),
            )
            .await?;
        info!(alert_id = route.id, route = %route.route_label(), "Saved route");
        Ok(route)
    }

    /// Change the window, notification flags or target price of an alert.
    pub async fn update(
        &self,
        alert_id: i64,
        patch: AlertPatch,
        identity_hint: Option<&str>,
    ) -> Result<SavedRoute, SyncError> {
        let validation = if patch.is_empty() {
            Err("Nothing to update".to_string())
        } else {
            validate_date_window(patch.date_from, patch.date_to)
        };

        let route = self
            .mutate(
                "update",
                InFlightKey::Alert(alert_id),
                validation,
                self.backend.update_alert(alert_id, &patch, identity_hint),
                |state, route| state.apply_changed(route, None),
            )
            .await?;
        info!(alert_id = route.id, "Updated alert");
        Ok(route)
    }

    /// Delete an alert. Its route reads as unsaved afterwards.
    pub async fn delete(
        &self,
        alert_id: i64,
        departure: &str,
        arrival: &str,
        identity_hint: Option<&str>,
    ) -> Result<(), SyncError> {
        let key = RouteKey::new(departure, arrival);

        self.mutate(
            "delete",
            InFlightKey::Alert(alert_id),
            Ok(()),
            self.backend.delete_alert(alert_id, identity_hint),
            |state, _| state.apply_deleted(alert_id, key),
        )
        .await?;
        info!(alert_id = alert_id, "Deleted alert");
        Ok(())
    }

    pub async fn pause(&self, alert_id: i64) -> Result<SavedRoute, SyncError> {
        let route = self
            .mutate(
                "pause",
                InFlightKey::Alert(alert_id),
                Ok(()),
                self.backend.pause_alert(alert_id),
                |state, route| state.apply_changed(route, Some(AlertStatus::Active)),
            )
            .await?;
        info!(alert_id = alert_id, status = %route.status, "Paused alert");
        Ok(route)
    }

    pub async fn resume(&self, alert_id: i64) -> Result<SavedRoute, SyncError> {
        let route = self
            .mutate(
                "resume",
                InFlightKey::Alert(alert_id),
                Ok(()),
                self.backend.resume_alert(alert_id),
                |state, route| state.apply_changed(route, Some(AlertStatus::Paused)),
            )
            .await?;
        info!(alert_id = alert_id, status = %route.status, "Resumed alert");
        Ok(route)
    }
}

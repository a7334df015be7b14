use serde::{Deserialize, Serialize};

use super::AlertStatus;

/// Denormalized alert counters from `GET /alerts/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Stats {
    #[serde(default)]
    pub total_alerts: u64,
    #[serde(default)]
    pub active_alerts: u64,
    #[serde(default)]
    pub paused_alerts: u64,
    #[serde(default)]
    pub routes_with_price_drops: u64,
}

impl Stats {
    /// Count a newly created alert.
    pub fn record_created(&mut self, status: AlertStatus) {
        self.total_alerts += 1;
        if let Some(counter) = self.counter_mut(status) {
            *counter += 1;
        }
    }

    /// Forget a deleted alert. Counters never go below zero.
    pub fn record_removed(&mut self, status: Option<AlertStatus>) {
        self.total_alerts = self.total_alerts.saturating_sub(1);
        if let Some(counter) = status.and_then(|s| self.counter_mut(s)) {
            *counter = counter.saturating_sub(1);
        }
    }

    /// Move one alert from one status counter to another.
    pub fn record_transition(&mut self, from: AlertStatus, to: AlertStatus) {
        if from == to {
            return;
        }
        if let Some(counter) = self.counter_mut(from) {
            *counter = counter.saturating_sub(1);
        }
        if let Some(counter) = self.counter_mut(to) {
            *counter += 1;
        }
    }

    fn counter_mut(&mut self, status: AlertStatus) -> Option<&mut u64> {
        match status {
            AlertStatus::Active => Some(&mut self.active_alerts),
            AlertStatus::Paused => Some(&mut self.paused_alerts),
            AlertStatus::Cancelled => None,
        }
    }
}

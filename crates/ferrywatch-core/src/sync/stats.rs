use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::AlertsBackend;
use crate::models::Stats;

use super::{AlertSync, SyncError};

/// Consider stats stale after 15 minutes.
const STATS_STALE_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy)]
struct LoadedStats {
    stats: Stats,
    fetched_at: DateTime<Utc>,
}

/// Alert counters, replaced by a full fetch and nudged by mutation deltas.
///
/// Deltas are dropped until the first successful refresh.
#[derive(Debug, Default, Clone)]
pub struct StatsAggregator {
    loaded: Option<LoadedStats>,
}

impl StatsAggregator {
    pub fn get(&self) -> Option<Stats> {
        self.loaded.map(|l| l.stats)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn replace(&mut self, stats: Stats) {
        self.replace_at(stats, Utc::now());
    }

    fn replace_at(&mut self, stats: Stats, fetched_at: DateTime<Utc>) {
        self.loaded = Some(LoadedStats { stats, fetched_at });
    }

    /// Apply a local delta if stats were ever loaded.
    pub fn apply(&mut self, delta: impl FnOnce(&mut Stats)) {
        match self.loaded.as_mut() {
            Some(loaded) => delta(&mut loaded.stats),
            None => debug!("Stats not loaded, skipping delta"),
        }
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.loaded
            .map(|l| (Utc::now() - l.fetched_at).num_minutes())
    }

    /// Unloaded stats count as stale.
    pub fn is_stale(&self) -> bool {
        self.age_minutes()
            .map(|age| age > STATS_STALE_MINUTES)
            .unwrap_or(true)
    }

    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            None => "never".to_string(),
            // Clock skew shows as negative
            Some(m) if m < 1 => "just now".to_string(),
            Some(m) if m < 60 => format!("{}m ago", m),
            Some(m) if m < 1440 => format!("{}h ago", m / 60),
            Some(m) => format!("{}d ago", m / 1440),
        }
    }

    pub fn clear(&mut self) {
        self.loaded = None;
    }
}

impl<B: AlertsBackend> AlertSync<B> {
    /// Replace the held stats with the server's view.
    pub async fn refresh_stats(&self) -> Result<Stats, SyncError> {
        let stats = match self.backend.fetch_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Failed to refresh stats");
                return Err(e.into());
            }
        };
        self.state.lock().stats.replace(stats);
        debug!(total = stats.total_alerts, active = stats.active_alerts, "Refreshed stats");
        Ok(stats)
    }

    /// Last known stats, approximate between refreshes.
    pub fn stats(&self) -> Option<Stats> {
        self.state.lock().stats.get()
    }

    pub fn stats_age(&self) -> String {
        self.state.lock().stats.age_display()
    }

    pub fn stats_stale(&self) -> bool {
        self.state.lock().stats.is_stale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Stats {
        Stats {
            total_alerts: 3,
            active_alerts: 2,
            paused_alerts: 1,
            routes_with_price_drops: 1,
        }
    }

    #[test]
    fn test_delta_skipped_before_load() {
        let mut agg = StatsAggregator::default();
        agg.apply(|s| s.total_alerts += 1);
        assert_eq!(agg.get(), None);
        assert!(agg.is_stale());
        assert_eq!(agg.age_display(), "never");
    }

    #[test]
    fn test_delta_applied_after_load() {
        let mut agg = StatsAggregator::default();
        agg.replace(sample());
        agg.apply(|s| s.total_alerts += 1);
        assert_eq!(agg.get().map(|s| s.total_alerts), Some(4));
        assert!(!agg.is_stale());
        assert_eq!(agg.age_display(), "just now");
    }

    #[test]
    fn test_staleness() {
        let mut agg = StatsAggregator::default();
        agg.replace_at(sample(), Utc::now() - Duration::minutes(16));
        assert!(agg.is_stale());
        assert_eq!(agg.age_display(), "16m ago");

        agg.replace_at(sample(), Utc::now() - Duration::hours(3));
        assert_eq!(agg.age_display(), "3h ago");
    }
}

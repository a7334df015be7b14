use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{format_percent, format_price};

/// Lifecycle state of an alert as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum AlertStatus {
    Active,
    Paused,
    /// Terminal. Cancelled alerts are never kept client-side.
    Cancelled,
}

impl AlertStatus {
    /// Whether an alert in this state still counts as a watched route.
    pub fn is_live(&self) -> bool {
        !matches!(self, AlertStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Paused => "paused",
            AlertStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "Active"),
            AlertStatus::Paused => write!(f, "Paused"),
            AlertStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "paused" => Ok(AlertStatus::Paused),
            "cancelled" | "canceled" => Ok(AlertStatus::Cancelled),
            other => Err(format!("unknown alert status: {}", other)),
        }
    }
}

/// A server-confirmed price alert on a ferry route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SavedRoute {
    pub id: i64,
    pub departure_port: String,
    pub arrival_port: String,
    pub status: AlertStatus,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub initial_price: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub lowest_price_seen: Option<f64>,
    #[serde(default)]
    pub price_change_percent: Option<f64>,
    #[serde(default)]
    pub notify_on_drop: bool,
    #[serde(default)]
    pub notify_on_increase: bool,
    #[serde(default)]
    pub target_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl SavedRoute {
    /// Route as typed by the user: "Genoa → Tunis"
    pub fn route_label(&self) -> String {
        format!("{} → {}", self.departure_port, self.arrival_port)
    }

    /// Compact travel window for list views: "Jun 01 - Jun 15, 2025"
    pub fn date_window_display(&self) -> String {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) if from == to => from.format("%b %d, %Y").to_string(),
            (Some(from), Some(to)) => format!(
                "{} - {}",
                from.format("%b %d"),
                to.format("%b %d, %Y")
            ),
            (Some(from), None) => format!("from {}", from.format("%b %d, %Y")),
            (None, Some(to)) => format!("until {}", to.format("%b %d, %Y")),
            (None, None) => "Any date".to_string(),
        }
    }

    pub fn price_display(&self) -> String {
        format_price(self.current_price.or(self.initial_price))
    }

    pub fn change_display(&self) -> String {
        format_percent(self.price_change_percent)
    }

    /// True when the current price is below the price at creation time.
    pub fn has_price_drop(&self) -> bool {
        match (self.initial_price, self.current_price) {
            (Some(initial), Some(current)) => current < initial,
            _ => false,
        }
    }
}

/// Whether a route is watched, as cached per normalized route key.
///
/// Wire shape of `GET /alerts/check`. The server has used both `alertId`
/// and `alert_id` spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RouteCacheEntry {
    pub saved: bool,
    #[serde(rename = "alertId", alias = "alert_id", default)]
    pub alert_id: Option<i64>,
    #[serde(default)]
    pub status: Option<AlertStatus>,
}

impl RouteCacheEntry {
    pub fn watching(alert_id: i64, status: AlertStatus) -> Self {
        Self {
            saved: true,
            alert_id: Some(alert_id),
            status: Some(status),
        }
    }

    pub fn not_saved() -> Self {
        Self {
            saved: false,
            alert_id: None,
            status: None,
        }
    }

    pub fn from_route(route: &SavedRoute) -> Self {
        if route.status.is_live() {
            Self::watching(route.id, route.status)
        } else {
            Self::not_saved()
        }
    }

    /// Fold an answer describing a cancelled alert into a plain "not saved".
    /// Any other answer is kept exactly as the server sent it.
    pub fn normalized(self) -> Self {
        match self.status {
            Some(AlertStatus::Cancelled) => Self::not_saved(),
            _ => self,
        }
    }
}

/// One page of `GET /alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPage {
    #[serde(default)]
    pub routes: Vec<SavedRoute>,
    #[serde(default)]
    pub total: u64,
    pub page: u32,
    #[serde(default)]
    pub has_more: bool,
}


#[cfg(test)]
mod tests {
    use super::fixtures::saved_route;
    use super::*;

    #[test]
    fn test_parse_saved_route() {
        let json = r#"{"id": 42, "departure_port": "TUN", "arrival_port": "Marseille",
            "status": "paused", "date_from": "2025-06-01", "date_to": "2025-06-15",
            "initial_price": 120.0, "current_price": 98.5, "price_change_percent": -17.9,
            "notify_on_drop": true, "created_at": "2025-05-01T08:30:00Z"}"#;

        let route: SavedRoute = serde_json::from_str(json).expect("Failed to parse route JSON");
        assert_eq!(route.id, 42);
        assert_eq!(route.status, AlertStatus::Paused);
        assert_eq!(route.date_from, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(route.route_label(), "TUN → Marseille");
        assert!(route.has_price_drop());
        assert!(!route.notify_on_increase);
        assert!(route.last_checked_at.is_none());
    }

    #[test]
    fn test_dates_serialize_without_time() {
        let mut route = saved_route(1, "genoa", "tunis", AlertStatus::Active);
        route.date_from = NaiveDate::from_ymd_opt(2025, 6, 1);
        let value = serde_json::to_value(&route).expect("serialize");
        assert_eq!(value["date_from"], "2025-06-01");
        assert_eq!(value["status"], "active");
    }

    #[test]
    fn test_date_window_display() {
        let mut route = saved_route(1, "genoa", "tunis", AlertStatus::Active);
        assert_eq!(route.date_window_display(), "Any date");

        route.date_from = NaiveDate::from_ymd_opt(2025, 6, 1);
        route.date_to = NaiveDate::from_ymd_opt(2025, 6, 15);
        assert_eq!(route.date_window_display(), "Jun 01 - Jun 15, 2025");

        route.date_to = route.date_from;
        assert_eq!(route.date_window_display(), "Jun 01, 2025");
    }

    #[test]
    fn test_check_response_spellings() {
        let camel: RouteCacheEntry =
            serde_json::from_str(r#"{"saved": true, "alertId": 7, "status": "active"}"#).unwrap();
        let snake: RouteCacheEntry =
            serde_json::from_str(r#"{"saved": true, "alert_id": 7, "status": "active"}"#).unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel, RouteCacheEntry::watching(7, AlertStatus::Active));

        let unsaved: RouteCacheEntry =
            serde_json::from_str(r#"{"saved": false, "alertId": null, "status": null}"#).unwrap();
        assert_eq!(unsaved, RouteCacheEntry::not_saved());
    }

    #[test]
    fn test_cancelled_is_not_saved() {
        let entry = RouteCacheEntry {
            saved: true,
            alert_id: Some(3),
            status: Some(AlertStatus::Cancelled),
        };
        assert_eq!(entry.normalized(), RouteCacheEntry::not_saved());

        let route = saved_route(3, "a", "b", AlertStatus::Cancelled);
        assert_eq!(RouteCacheEntry::from_route(&route), RouteCacheEntry::not_saved());
    }

    #[test]
    fn test_partial_check_answers_are_kept() {
        let no_status: RouteCacheEntry =
            serde_json::from_str(r#"{"saved": true, "alertId": 5, "status": null}"#).unwrap();
        assert_eq!(
            no_status.normalized(),
            RouteCacheEntry {
                saved: true,
                alert_id: Some(5),
                status: None,
            }
        );

        let no_id: RouteCacheEntry =
            serde_json::from_str(r#"{"saved": true, "alertId": null, "status": "paused"}"#).unwrap();
        let kept = no_id.normalized();
        assert!(kept.saved);
        assert_eq!(kept.alert_id, None);
        assert_eq!(kept.status, Some(AlertStatus::Paused));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Paused".parse::<AlertStatus>(), Ok(AlertStatus::Paused));
        assert_eq!("canceled".parse::<AlertStatus>(), Ok(AlertStatus::Cancelled));
        assert!("gone".parse::<AlertStatus>().is_err());
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cache::KEY_SEPARATOR;

use super::AlertStatus;

/// Page size used when a caller does not configure one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Optional settings for a full alert creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AlertOptions {
    /// Price the user saw when saving, used as the baseline for deltas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_drop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_increase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

/// The one-tap "save route" request. Sent camelCase, matching the
/// `identityHint` query parameter of the other endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct QuickSave {
    pub departure: String,
    pub arrival: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_hint: Option<String>,
}

impl QuickSave {
    pub fn new(departure: impl Into<String>, arrival: impl Into<String>) -> Self {
        Self {
            departure: departure.into(),
            arrival: arrival.into(),
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_dates(mut self, date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
        self.date_from = date_from;
        self.date_to = date_to;
        self
    }

    pub fn with_identity(mut self, identity_hint: impl Into<String>) -> Self {
        self.identity_hint = Some(identity_hint.into());
        self
    }
}

/// Fields an existing alert may change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AlertPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_drop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_increase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
}

impl AlertPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Query for one page of saved routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub status: Option<AlertStatus>,
    pub page: u32,
    pub per_page: u32,
}

impl ListQuery {
    pub fn first(status: Option<AlertStatus>, per_page: u32) -> Self {
        Self::for_page(status, 1, per_page)
    }

    pub fn for_page(status: Option<AlertStatus>, page: u32, per_page: u32) -> Self {
        Self {
            status,
            page,
            per_page,
        }
    }
}

/// Reject a travel window whose start falls after its end.
///
/// A single-day window (`from == to`) is accepted.
pub fn validate_date_window(
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> Result<(), String> {
    match (date_from, date_to) {
        (Some(from), Some(to)) if from > to => Err(format!(
            "Travel window starts after it ends ({} > {})",
            from, to
        )),
        _ => Ok(()),
    }
}

/// Reject blank port codes and codes containing the route key separator.
pub fn validate_ports(departure: &str, arrival: &str) -> Result<(), String> {
    for (label, port) in [("Departure", departure), ("Arrival", arrival)] {
        if port.trim().is_empty() {
            return Err(format!("{} port is required", label));
        }
        if port.contains(KEY_SEPARATOR) {
            return Err(format!("{} port may not contain '{}'", label, KEY_SEPARATOR));
        }
    }
    Ok(())
}

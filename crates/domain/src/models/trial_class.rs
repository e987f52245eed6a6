//! Show, trial, and class domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PrecedenceLevel;

/// A licensed show (the root scope).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Show {
    /// License key, e.g. `NW-202405`.
    pub license_key: String,
    pub name: String,
    /// Nullable column; `None` inherits nothing (the show is the root) and
    /// resolution falls back to the built-in default.
    pub self_checkin_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One trial day within a show.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Trial {
    pub id: uuid::Uuid,
    pub show_key: String,
    pub trial_date: NaiveDate,
    pub self_checkin_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A judged class within a trial (element + level).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrialClass {
    pub id: uuid::Uuid,
    pub trial_id: uuid::Uuid,
    /// Element being judged, e.g. "Container" or "Interior".
    pub element: String,
    /// Competition level, e.g. "Novice A".
    pub level: String,
    pub self_checkin_enabled: Option<bool>,
    /// Set when an administrator releases manually gated results.
    pub results_released_at: Option<DateTime<Utc>>,
    pub results_released_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrialClass {
    pub fn results_released(&self) -> bool {
        self.results_released_at.is_some()
    }
}

/// Resolved self check-in flag with the scope it came from.
///
/// `inherited_from` is `None` when nothing was configured at any level and
/// the built-in default (enabled) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SelfCheckinSetting {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<PrecedenceLevel>,
}

/// Request to record a manual results release.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ReleaseResultsRequest {
    #[validate(length(min = 1, max = 120))]
    pub released_by: String,
}

/// Request to set or clear a scope's self check-in flag.
///
/// `enabled: null` clears the column, restoring inheritance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetSelfCheckinRequest {
    pub enabled: Option<bool>,
}

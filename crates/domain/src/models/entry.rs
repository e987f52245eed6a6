//! Entry and scored-result domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{CheckinStatus, VisibleResultFields};

/// Outcome of a scored run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationResult {
    Qualified,
    NotQualified,
    Excused,
    Absent,
}

impl std::fmt::Display for QualificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualificationResult::Qualified => write!(f, "qualified"),
            QualificationResult::NotQualified => write!(f, "not_qualified"),
            QualificationResult::Excused => write!(f, "excused"),
            QualificationResult::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for QualificationResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qualified" => Ok(QualificationResult::Qualified),
            "not_qualified" => Ok(QualificationResult::NotQualified),
            "excused" => Ok(QualificationResult::Excused),
            "absent" => Ok(QualificationResult::Absent),
            _ => Err(format!("Unknown qualification result: {}", s)),
        }
    }
}

/// One dog/handler entry in a class.
///
/// Result fields are `None` until the run is scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Entry {
    pub id: Uuid,
    pub class_id: Uuid,
    pub armband: i32,
    pub call_name: String,
    pub handler_name: String,
    pub checkin_status: CheckinStatus,
    pub placement: Option<i32>,
    pub qualification: Option<QualificationResult>,
    pub search_time_secs: Option<f64>,
    pub fault_count: Option<i32>,
    pub scored_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to set an entry's check-in status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCheckinRequest {
    pub status: CheckinStatus,
}

/// One entry in a gated results listing.
///
/// Fields the viewer may not see are blanked, regardless of whether the
/// underlying run was scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GatedEntryResult {
    pub entry_id: Uuid,
    pub armband: i32,
    pub call_name: String,
    pub handler_name: String,
    pub checkin_status: CheckinStatus,
    pub placement: Option<i32>,
    pub qualification: Option<QualificationResult>,
    pub search_time_secs: Option<f64>,
    pub fault_count: Option<i32>,
}

impl GatedEntryResult {
    /// Blank out the result fields the viewer may not see.
    pub fn from_entry(entry: &Entry, visible: &VisibleResultFields) -> Self {
        Self {
            entry_id: entry.id,
            armband: entry.armband,
            call_name: entry.call_name.clone(),
            handler_name: entry.handler_name.clone(),
            checkin_status: entry.checkin_status,
            placement: visible.show_placement.then_some(entry.placement).flatten(),
            qualification: visible
                .show_qualification
                .then_some(entry.qualification)
                .flatten(),
            search_time_secs: visible.show_time.then_some(entry.search_time_secs).flatten(),
            fault_count: visible.show_faults.then_some(entry.fault_count).flatten(),
        }
    }
}

//! Ring check-in status for entries.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Check-in state of a single entry.
///
/// Entries move `none → checked_in | conflict | pulled | at_gate → scored`.
/// Assignment is a plain status set; there are no transition guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinStatus {
    /// Not yet checked in.
    None,
    /// Present and ready to run.
    CheckedIn,
    /// Present but double-booked in another ring.
    Conflict,
    /// Withdrawn from the class.
    Pulled,
    /// Staged at the ring gate.
    AtGate,
    /// Run finished and score recorded.
    Scored,
}

impl CheckinStatus {
    pub fn is_scored(&self) -> bool {
        matches!(self, CheckinStatus::Scored)
    }

    /// Whether this entry still keeps the class from completing.
    /// Pulled entries never run, so they do not block.
    pub fn blocks_completion(&self) -> bool {
        !matches!(self, CheckinStatus::Scored | CheckinStatus::Pulled)
    }

    /// Get all statuses.
    pub fn all() -> &'static [CheckinStatus] {
        &[
            CheckinStatus::None,
            CheckinStatus::CheckedIn,
            CheckinStatus::Conflict,
            CheckinStatus::Pulled,
            CheckinStatus::AtGate,
            CheckinStatus::Scored,
        ]
    }
}

impl Default for CheckinStatus {
    fn default() -> Self {
        CheckinStatus::None
    }
}

impl std::fmt::Display for CheckinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckinStatus::None => write!(f, "none"),
            CheckinStatus::CheckedIn => write!(f, "checked_in"),
            CheckinStatus::Conflict => write!(f, "conflict"),
            CheckinStatus::Pulled => write!(f, "pulled"),
            CheckinStatus::AtGate => write!(f, "at_gate"),
            CheckinStatus::Scored => write!(f, "scored"),
        }
    }
}

impl FromStr for CheckinStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CheckinStatus::None),
            "checked_in" => Ok(CheckinStatus::CheckedIn),
            "conflict" => Ok(CheckinStatus::Conflict),
            "pulled" => Ok(CheckinStatus::Pulled),
            "at_gate" => Ok(CheckinStatus::AtGate),
            "scored" => Ok(CheckinStatus::Scored),
            _ => Err(format!("Unknown check-in status: {}", s)),
        }
    }
}

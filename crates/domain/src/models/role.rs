//! Viewer roles for result access.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of the person asking to see results.
///
/// Authenticating the claim is outside this layer; the role arrives with
/// the request and is applied as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Show administrator.
    Admin,
    /// Officiating judge.
    Judge,
    /// Trial secretary.
    Secretary,
    /// Ring steward.
    Steward,
    /// Competitor.
    Exhibitor,
}

impl UserRole {
    /// Officials always see full results, bypassing every timing gate.
    pub fn sees_full_results(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Judge)
    }

    /// Get all roles.
    pub fn all() -> &'static [UserRole] {
        &[
            UserRole::Admin,
            UserRole::Judge,
            UserRole::Secretary,
            UserRole::Steward,
            UserRole::Exhibitor,
        ]
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Exhibitor
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Judge => write!(f, "judge"),
            UserRole::Secretary => write!(f, "secretary"),
            UserRole::Steward => write!(f, "steward"),
            UserRole::Exhibitor => write!(f, "exhibitor"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "judge" => Ok(UserRole::Judge),
            "secretary" => Ok(UserRole::Secretary),
            "steward" => Ok(UserRole::Steward),
            "exhibitor" => Ok(UserRole::Exhibitor),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

//! Result visibility domain models.
//!
//! Visibility of scored result fields (placement, qualification, time,
//! faults) is configured per show, per trial, or per class; narrower
//! scopes win in full over broader ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// When a single result field becomes visible to non-officials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityTiming {
    /// Visible as soon as the value exists.
    Immediate,
    /// Visible once every entry in the class is scored.
    ClassComplete,
    /// Visible only after an administrator records a release.
    ManualRelease,
}

impl VisibilityTiming {
    /// Placement is computed by ranking all finished entries, so it cannot
    /// exist before the class is complete.
    pub fn allowed_for_placement(&self) -> bool {
        !matches!(self, VisibilityTiming::Immediate)
    }

    /// Get all timing values.
    pub fn all() -> &'static [VisibilityTiming] {
        &[
            VisibilityTiming::Immediate,
            VisibilityTiming::ClassComplete,
            VisibilityTiming::ManualRelease,
        ]
    }
}

impl std::fmt::Display for VisibilityTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisibilityTiming::Immediate => write!(f, "immediate"),
            VisibilityTiming::ClassComplete => write!(f, "class_complete"),
            VisibilityTiming::ManualRelease => write!(f, "manual_release"),
        }
    }
}

impl FromStr for VisibilityTiming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(VisibilityTiming::Immediate),
            "class_complete" => Ok(VisibilityTiming::ClassComplete),
            "manual_release" => Ok(VisibilityTiming::ManualRelease),
            _ => Err(format!("Unknown visibility timing: {}", s)),
        }
    }
}

/// Named bundle of default timings for the four result fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPreset {
    /// Everything as soon as known, except placement.
    Open,
    /// Qualification immediately; comparative data once the class is done.
    Standard,
    /// Everything held for an explicit publication action.
    Review,
}

impl VisibilityPreset {
    /// The timing each result field gets under this preset.
    pub fn timings(&self) -> PresetTimings {
        match self {
            VisibilityPreset::Open => PresetTimings {
                placement: VisibilityTiming::ClassComplete,
                qualification: VisibilityTiming::Immediate,
                time: VisibilityTiming::Immediate,
                faults: VisibilityTiming::Immediate,
            },
            VisibilityPreset::Standard => PresetTimings {
                placement: VisibilityTiming::ClassComplete,
                qualification: VisibilityTiming::Immediate,
                time: VisibilityTiming::ClassComplete,
                faults: VisibilityTiming::ClassComplete,
            },
            VisibilityPreset::Review => PresetTimings {
                placement: VisibilityTiming::ManualRelease,
                qualification: VisibilityTiming::ManualRelease,
                time: VisibilityTiming::ManualRelease,
                faults: VisibilityTiming::ManualRelease,
            },
        }
    }

    /// Get all presets.
    pub fn all() -> &'static [VisibilityPreset] {
        &[
            VisibilityPreset::Open,
            VisibilityPreset::Standard,
            VisibilityPreset::Review,
        ]
    }

    /// Get a human-readable description of this preset.
    pub fn description(&self) -> &'static str {
        match self {
            VisibilityPreset::Open => "Show results as soon as they are recorded",
            VisibilityPreset::Standard => "Show qualification immediately, the rest when the class completes",
            VisibilityPreset::Review => "Hold all results until explicitly released",
        }
    }
}

impl std::fmt::Display for VisibilityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisibilityPreset::Open => write!(f, "open"),
            VisibilityPreset::Standard => write!(f, "standard"),
            VisibilityPreset::Review => write!(f, "review"),
        }
    }
}

impl FromStr for VisibilityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(VisibilityPreset::Open),
            "standard" => Ok(VisibilityPreset::Standard),
            "review" => Ok(VisibilityPreset::Review),
            _ => Err(format!("Unknown visibility preset: {}", s)),
        }
    }
}

/// The four field timings a preset expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetTimings {
    pub placement: VisibilityTiming,
    pub qualification: VisibilityTiming,
    pub time: VisibilityTiming,
    pub faults: VisibilityTiming,
}

/// Scope a resolved setting was inherited from, broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecedenceLevel {
    Show,
    Trial,
    Class,
}

impl std::fmt::Display for PrecedenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrecedenceLevel::Show => write!(f, "show"),
            PrecedenceLevel::Trial => write!(f, "trial"),
            PrecedenceLevel::Class => write!(f, "class"),
        }
    }
}

/// Fully resolved visibility settings for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VisibilitySettings {
    pub placement: VisibilityTiming,
    pub qualification: VisibilityTiming,
    pub time: VisibilityTiming,
    pub faults: VisibilityTiming,
    /// Precedence level the settings were inherited from.
    pub inherited_from: PrecedenceLevel,
    /// Preset the settings were based on, when one was named.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<VisibilityPreset>,
}

impl VisibilitySettings {
    /// Expand a preset into settings attributed to the given level.
    pub fn from_preset(preset: VisibilityPreset, level: PrecedenceLevel) -> Self {
        let timings = preset.timings();
        Self {
            placement: timings.placement,
            qualification: timings.qualification,
            time: timings.time,
            faults: timings.faults,
            inherited_from: level,
            preset: Some(preset),
        }
    }

    /// The timing configured for a single result field.
    pub fn timing_for(&self, field: ResultField) -> VisibilityTiming {
        match field {
            ResultField::Placement => self.placement,
            ResultField::Qualification => self.qualification,
            ResultField::Time => self.time,
            ResultField::Faults => self.faults,
        }
    }
}

/// One override row, at any of the three scopes.
///
/// `None` in a timing field means "inherit from the preset or the next
/// precedence level".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VisibilityOverride {
    pub preset: Option<VisibilityPreset>,
    pub placement_timing: Option<VisibilityTiming>,
    pub qualification_timing: Option<VisibilityTiming>,
    pub time_timing: Option<VisibilityTiming>,
    pub faults_timing: Option<VisibilityTiming>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl VisibilityOverride {
    /// Row holding only a preset, granular fields cleared.
    pub fn from_preset(preset: VisibilityPreset) -> Self {
        Self {
            preset: Some(preset),
            ..Default::default()
        }
    }
}

/// Which result fields a specific viewer can see right now.
///
/// Never persisted; recomputed on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VisibleResultFields {
    pub show_placement: bool,
    pub show_qualification: bool,
    pub show_time: bool,
    pub show_faults: bool,
}

impl VisibleResultFields {
    pub fn all_visible() -> Self {
        Self {
            show_placement: true,
            show_qualification: true,
            show_time: true,
            show_faults: true,
        }
    }

    /// Whether a single field is visible.
    pub fn shows(&self, field: ResultField) -> bool {
        match field {
            ResultField::Placement => self.show_placement,
            ResultField::Qualification => self.show_qualification,
            ResultField::Time => self.show_time,
            ResultField::Faults => self.show_faults,
        }
    }
}

/// The four gated result fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultField {
    Placement,
    Qualification,
    Time,
    Faults,
}

impl ResultField {
    pub fn all() -> &'static [ResultField] {
        &[
            ResultField::Placement,
            ResultField::Qualification,
            ResultField::Time,
            ResultField::Faults,
        ]
    }
}

/// A hidden field together with the note explaining when it will appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WithheldField {
    pub field: ResultField,
    pub message: String,
}

/// Validator hook for granular placement timings.
pub fn validate_placement_timing(timing: &VisibilityTiming) -> Result<(), ValidationError> {
    if timing.allowed_for_placement() {
        Ok(())
    } else {
        let mut err = ValidationError::new("placement_timing");
        err.message = Some("Placement cannot be visible before the class is complete".into());
        Err(err)
    }
}

/// Request to assign a preset at one scope.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SetVisibilityRequest {
    pub preset: VisibilityPreset,
    #[validate(length(min = 1, max = 120))]
    pub updated_by: String,
}

/// Request to set per-field timings at one scope, leaving the preset as is.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct GranularVisibilityRequest {
    #[validate(custom(function = "validate_placement_timing"))]
    pub placement_timing: Option<VisibilityTiming>,
    pub qualification_timing: Option<VisibilityTiming>,
    pub time_timing: Option<VisibilityTiming>,
    pub faults_timing: Option<VisibilityTiming>,
    #[validate(length(min = 1, max = 120))]
    pub updated_by: String,
}

impl GranularVisibilityRequest {
    /// True when no timing field was provided at all.
    pub fn is_empty(&self) -> bool {
        self.placement_timing.is_none()
            && self.qualification_timing.is_none()
            && self.time_timing.is_none()
            && self.faults_timing.is_none()
    }
}

/// Request to apply one preset to many classes in a single batch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BulkSetClassVisibilityRequest {
    #[validate(length(min = 1, max = 200))]
    pub class_ids: Vec<Uuid>,
    pub preset: VisibilityPreset,
    #[validate(length(min = 1, max = 120))]
    pub updated_by: String,
}

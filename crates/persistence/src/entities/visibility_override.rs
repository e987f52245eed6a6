//! Visibility override entities (database row mappings).
//!
//! Three tables share one shape, keyed by their scope: show license key,
//! trial id, or class id. `NULL` in a timing column means "inherit".

use chrono::{DateTime, Utc};
use domain::models::{VisibilityOverride, VisibilityPreset, VisibilityTiming};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum mapping for the `visibility_timing` PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "visibility_timing", rename_all = "snake_case")]
pub enum VisibilityTimingDb {
    Immediate,
    ClassComplete,
    ManualRelease,
}

impl From<VisibilityTimingDb> for VisibilityTiming {
    fn from(db: VisibilityTimingDb) -> Self {
        match db {
            VisibilityTimingDb::Immediate => VisibilityTiming::Immediate,
            VisibilityTimingDb::ClassComplete => VisibilityTiming::ClassComplete,
            VisibilityTimingDb::ManualRelease => VisibilityTiming::ManualRelease,
        }
    }
}

impl From<VisibilityTiming> for VisibilityTimingDb {
    fn from(timing: VisibilityTiming) -> Self {
        match timing {
            VisibilityTiming::Immediate => VisibilityTimingDb::Immediate,
            VisibilityTiming::ClassComplete => VisibilityTimingDb::ClassComplete,
            VisibilityTiming::ManualRelease => VisibilityTimingDb::ManualRelease,
        }
    }
}

/// Database enum mapping for the `visibility_preset` PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "visibility_preset", rename_all = "snake_case")]
pub enum VisibilityPresetDb {
    Open,
    Standard,
    Review,
}

impl From<VisibilityPresetDb> for VisibilityPreset {
    fn from(db: VisibilityPresetDb) -> Self {
        match db {
            VisibilityPresetDb::Open => VisibilityPreset::Open,
            VisibilityPresetDb::Standard => VisibilityPreset::Standard,
            VisibilityPresetDb::Review => VisibilityPreset::Review,
        }
    }
}

impl From<VisibilityPreset> for VisibilityPresetDb {
    fn from(preset: VisibilityPreset) -> Self {
        match preset {
            VisibilityPreset::Open => VisibilityPresetDb::Open,
            VisibilityPreset::Standard => VisibilityPresetDb::Standard,
            VisibilityPreset::Review => VisibilityPresetDb::Review,
        }
    }
}

/// Row mapping for the `show_visibility_defaults` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShowVisibilityEntity {
    pub show_key: String,
    pub preset_name: Option<VisibilityPresetDb>,
    pub placement_timing: Option<VisibilityTimingDb>,
    pub qualification_timing: Option<VisibilityTimingDb>,
    pub time_timing: Option<VisibilityTimingDb>,
    pub faults_timing: Option<VisibilityTimingDb>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShowVisibilityEntity> for VisibilityOverride {
    fn from(entity: ShowVisibilityEntity) -> Self {
        VisibilityOverride {
            preset: entity.preset_name.map(Into::into),
            placement_timing: entity.placement_timing.map(Into::into),
            qualification_timing: entity.qualification_timing.map(Into::into),
            time_timing: entity.time_timing.map(Into::into),
            faults_timing: entity.faults_timing.map(Into::into),
            updated_by: entity.updated_by,
            updated_at: Some(entity.updated_at),
        }
    }
}

/// Row mapping for the `trial_visibility_overrides` table.
#[derive(Debug, Clone, FromRow)]
pub struct TrialVisibilityEntity {
    pub trial_id: Uuid,
    pub preset_name: Option<VisibilityPresetDb>,
    pub placement_timing: Option<VisibilityTimingDb>,
    pub qualification_timing: Option<VisibilityTimingDb>,
    pub time_timing: Option<VisibilityTimingDb>,
    pub faults_timing: Option<VisibilityTimingDb>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrialVisibilityEntity> for VisibilityOverride {
    fn from(entity: TrialVisibilityEntity) -> Self {
        VisibilityOverride {
            preset: entity.preset_name.map(Into::into),
            placement_timing: entity.placement_timing.map(Into::into),
            qualification_timing: entity.qualification_timing.map(Into::into),
            time_timing: entity.time_timing.map(Into::into),
            faults_timing: entity.faults_timing.map(Into::into),
            updated_by: entity.updated_by,
            updated_at: Some(entity.updated_at),
        }
    }
}

/// Row mapping for the `class_visibility_overrides` table.
#[derive(Debug, Clone, FromRow)]
pub struct ClassVisibilityEntity {
    pub class_id: Uuid,
    pub preset_name: Option<VisibilityPresetDb>,
    pub placement_timing: Option<VisibilityTimingDb>,
    pub qualification_timing: Option<VisibilityTimingDb>,
    pub time_timing: Option<VisibilityTimingDb>,
    pub faults_timing: Option<VisibilityTimingDb>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClassVisibilityEntity> for VisibilityOverride {
    fn from(entity: ClassVisibilityEntity) -> Self {
        VisibilityOverride {
            preset: entity.preset_name.map(Into::into),
            placement_timing: entity.placement_timing.map(Into::into),
            qualification_timing: entity.qualification_timing.map(Into::into),
            time_timing: entity.time_timing.map(Into::into),
            faults_timing: entity.faults_timing.map(Into::into),
            updated_by: entity.updated_by,
            updated_at: Some(entity.updated_at),
        }
    }
}

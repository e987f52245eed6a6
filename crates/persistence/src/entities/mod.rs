//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod entry;
pub mod show;
pub mod trial;
pub mod trial_class;
pub mod visibility_override;

pub use entry::{CheckinStatusDb, ClassCompletionEntity, EntryEntity, QualificationResultDb};
pub use show::ShowEntity;
pub use trial::TrialEntity;
pub use trial_class::TrialClassEntity;
pub use visibility_override::{
    ClassVisibilityEntity, ShowVisibilityEntity, TrialVisibilityEntity, VisibilityPresetDb,
    VisibilityTimingDb,
};

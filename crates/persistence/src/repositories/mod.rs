//! Repository implementations for database operations.

pub mod entry;
pub mod show;
pub mod trial;
pub mod trial_class;
pub mod visibility;

pub use entry::EntryRepository;
pub use show::ShowRepository;
pub use trial::TrialRepository;
pub use trial_class::TrialClassRepository;
pub use visibility::{GranularTimings, VisibilityRepository};

//! Domain services for the Trial Manager backend.
//!
//! Services contain business logic that operates on domain models.

pub mod self_checkin;
pub mod visibility_resolution;

pub use self_checkin::resolve_self_checkin;

pub use visibility_resolution::{
    availability_message, compute_visible_fields, resolve_class_visibility, resolve_override,
    withheld_fields, VisibilityStore,
};

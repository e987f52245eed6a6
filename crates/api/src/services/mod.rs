//! Application services used by route handlers.

pub mod visibility;

pub use visibility::{class_visibility_for, load_class_context, ClassContext, ClassVisibility};

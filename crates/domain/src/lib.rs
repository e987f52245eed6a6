//! Domain layer for the Trial Manager backend.
//!
//! This crate contains:
//! - Domain models (visibility settings, roles, classes, entries)
//! - Business logic services (visibility resolution, self check-in)

pub mod models;
pub mod services;

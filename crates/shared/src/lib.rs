//! Shared utilities for the Trial Manager backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic

pub mod validation;

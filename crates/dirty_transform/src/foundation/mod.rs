//! Foundation module - Core utilities and types
//!
//! This module provides the low-level pieces the dirty-tracking core sits on:
//! - Math types and operations
//! - Bounding volumes and box expansion
//! - Logging utilities

pub mod bounds;
pub mod logging;
pub mod math;

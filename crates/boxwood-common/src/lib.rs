//! Common utilities for the boxwood layout engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - deduplicated warnings emitted through `log`

pub mod warning;

pub use warning::{clear_warnings, warn_once};

//! Terminal reporting.
//!
//! HTML/report rendering is someone else's job; this module only prints a
//! plain-text summary of a run and of the feed catalog.

pub mod format;

pub use format::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - feed descriptors and their strategies (`Retrieval`, `Schema`, `DateWindow`)
//! - normalized outputs (`Record`, `Vulnerability`, `FeedResult`, `FeedResults`)
//! - the built-in feed catalog (`catalog`)

pub mod catalog;
pub mod types;

pub use types::*;

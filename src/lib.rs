//! `threat-digest` library crate.
//!
//! Pulls recent entries from public threat-intelligence feeds (CSV with inline
//! headers, plain indicator lists, the NVD CVE API), normalizes them into
//! per-feed results, and applies trailing date windows.
//!
//! The binary is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes or touching the network
//! - report renderers can consume `FeedResults` directly or via the JSON export

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod report;

//! Export a run's results to JSON.
//!
//! This is the hand-off format for report renderers: one object per feed, keyed
//! by feed name, with entries, row accounting and any failure. Values are written
//! as received; escaping for markup is the renderer's job.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::FeedResults;
use crate::error::AppError;

/// Write `results` as pretty-printed JSON.
pub fn write_results_json(path: &Path, results: &FeedResults) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)
        .map_err(|e| AppError::usage(format!("Failed to write export '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to write export '{}': {e}", path.display())))?;

    Ok(())
}

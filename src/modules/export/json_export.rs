//! JSON Export
//!
//! Writes a decode outcome to JSON.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::trace::DecodeOutcome;

/// Write the outcome to a JSON file; returns the number of calls
pub fn write_outcome(path: &Path, outcome: &DecodeOutcome) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_outcome_to(file, outcome)
}

pub fn write_outcome_to<W: Write>(mut writer: W, outcome: &DecodeOutcome) -> Result<usize> {
    let json = serde_json::to_string_pretty(outcome)?;
    writer.write_all(json.as_bytes())?;
    writer.flush()?;

    Ok(match outcome {
        DecodeOutcome::Decoded(root) => root.node_count(),
        DecodeOutcome::Reverted { .. } => 0,
    })
}

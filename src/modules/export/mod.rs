//! Export Module
//!
//! Writes a decode outcome to disk.
//!
//! - JSON: the outcome as produced, pretty-printed
//! - CSV: one row per call, depth-first, reverted transactions yield no rows

mod csv_export;
mod json_export;

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::domain::trace::DecodeOutcome;

pub use csv_export::{write_calls, write_calls_to};
pub use json_export::{write_outcome, write_outcome_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            _ => bail!("cannot infer export format of {}", path.display()),
        }
    }
}

/// Write `outcome` to `path`; returns the number of calls written
pub fn export(path: &Path, outcome: &DecodeOutcome) -> Result<usize> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Json => write_outcome(path, outcome),
        ExportFormat::Csv => match outcome {
            DecodeOutcome::Decoded(root) => write_calls(path, root),
            DecodeOutcome::Reverted { .. } => {
                let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
                write_calls_to(file, None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a/trace.JSON")).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("calls.csv")).unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_path(Path::new("calls.txt")).is_err());
    }
}

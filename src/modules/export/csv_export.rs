//! CSV Export
//!
//! Writes the calls of a decoded tree to CSV, one row per call.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::abi::{DecodedValue, Omission};
use crate::domain::trace::{CallType, DecodeGap, DecodedInvocation, Side};

const HEADER: [&str; 8] = [
    "depth",
    "contract",
    "function",
    "selector",
    "call_type",
    "inputs",
    "outputs",
    "gaps",
];

/// Write every call of `root` to a CSV file
pub fn write_calls(path: &Path, root: &DecodedInvocation) -> Result<usize> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_calls_to(file, Some(root))
}

/// Write the header and, if there is a tree, one row per call
pub fn write_calls_to<W: Write>(writer: W, root: Option<&DecodedInvocation>) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    // Write header
    wtr.write_record(HEADER)?;

    let rows = root.map(DecodedInvocation::flatten).unwrap_or_default();
    for (depth, call) in &rows {
        wtr.write_record([
            depth.to_string(),
            call.contract_address.to_fixed_hex(),
            call.function_name.clone().unwrap_or_default(),
            call.entry_point_selector.to_string(),
            call_type_name(call.call_type).to_string(),
            join_values(&call.inputs),
            join_values(&call.outputs),
            call.gaps.iter().map(gap_text).collect::<Vec<_>>().join(";"),
        ])?;
    }

    wtr.flush()?;
    Ok(rows.len())
}

fn call_type_name(call_type: CallType) -> &'static str {
    match call_type {
        CallType::Call => "CALL",
        CallType::LibraryCall => "LIBRARY_CALL",
        CallType::Delegate => "DELEGATE",
        CallType::DeployAccount => "DEPLOY_ACCOUNT",
    }
}

fn join_values(values: &[DecodedValue]) -> String {
    values
        .iter()
        .map(|value| format!("{}={}", value.name, value.value))
        .collect::<Vec<_>>()
        .join(";")
}

fn gap_text(gap: &DecodeGap) -> String {
    match gap {
        DecodeGap::UnknownSelector => "unknown selector".to_string(),
        DecodeGap::Parameter { side, omission } => {
            let side = match side {
                Side::Inputs => "input",
                Side::Outputs => "output",
            };
            match omission {
                Omission::Unsupported { param, kind } => {
                    format!("unsupported {side} {param}: {kind}")
                }
                Omission::Truncated { param, kind } => {
                    format!("truncated {side} {param}: {kind}")
                }
            }
        }
    }
}

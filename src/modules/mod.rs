//! Application modules
//!
//! Each module drives one CLI operation on top of the domain and
//! infrastructure layers:
//! - decode: decode session over a trace
//! - readable: labelled, human-readable rendering
//! - explain: prose explanation of a rendered trace
//! - simulate: decode simulated or re-played transactions
//! - export: JSON and CSV output

pub mod decode;
pub mod explain;
pub mod export;
pub mod readable;
pub mod simulate;

pub use decode::TraceDecoder;
pub use readable::{render, render_outcome, HumanReadableTrace, LabelLookup};

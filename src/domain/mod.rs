//! Domain layer: felts, ABIs, traces and the decoding over them.
//!
//! Nothing here performs I/O; the collaborators it needs are described by
//! the traits in [`source`].

pub mod abi;
mod error;
mod felt;
pub mod source;
pub mod trace;

pub use error::DecodeError;
pub use felt::{selector_from_name, Felt, FeltParseError};

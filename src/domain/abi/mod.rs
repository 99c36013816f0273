//! ABI domain models
//!
//! Interface definitions, the selector index derived from them and the
//! value decoder that turns flat felt sequences into typed values.

mod cache;
mod decoder;
mod registry;
mod types;

pub use cache::{InterfaceCache, ResolvedContract};
pub use decoder::{decode, Decoded, DecodedValue, Omission, Value};
pub use registry::{FunctionSignature, SelectorIndex};
pub use types::{
    AbiEntry, CompositeCatalog, FunctionEntry, InterfaceDefinition, InterfaceEntry, ParamSpec,
    ParamType, StructEntry,
};

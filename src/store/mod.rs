//! SQLite-backed local state

mod abi_cache;
mod labels;

pub use abi_cache::AbiCache;
pub use labels::{AddressLabel, LabelStore};

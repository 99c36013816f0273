//! Starknet transaction trace decoding
//!
//! Turns the flat felt sequences of a transaction trace into a typed call
//! tree using each contract's ABI, then optionally renders, explains or
//! exports it.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod store;

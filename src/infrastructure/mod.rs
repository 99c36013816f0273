//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Interface resolution, local ABI overrides and the layered source
//! - The Starknet JSON-RPC client
//! - The chat-completions client behind `explain`

pub mod abi;
pub mod llm;
pub mod starknet;

pub use abi::{AbiScanner, InterfaceResolver, LayeredSource};
pub use starknet::StarknetRpc;

//! Starknet infrastructure - JSON-RPC client and wire types

mod calls;
mod provider;
mod types;

pub use calls::{flatten_calls, Call};
pub use provider::{StarknetRpc, DEFAULT_TIMEOUT};
pub use types::{
    BlockTag, ContractClass, FeeEstimation, FeePayment, InvokeTransactionV1, RpcError, SimulatedTransaction,
    SimulationFlag, TransactionReceipt,
};

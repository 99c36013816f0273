//! Starknet JSON-RPC wire types

use serde::{Deserialize, Serialize};

use crate::domain::trace::TransactionTrace;
use crate::domain::Felt;

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct RpcResponse<T> {
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, " ({data})")?;
        }
        Ok(())
    }
}

/// Block reference accepted by state-reading methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayment {
    pub amount: Felt,
    pub unit: String,
}

/// The parts of a receipt the simulation view needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: Felt,
    pub actual_fee: FeePayment,
    #[serde(default)]
    pub execution_status: Option<String>,
    #[serde(default)]
    pub finality_status: Option<String>,
    #[serde(default)]
    pub revert_reason: Option<String>,
}

/// Class definition; only the ABI is read
#[derive(Debug, Clone, Deserialize)]
pub struct ContractClass {
    #[serde(default)]
    pub abi: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationFlag {
    SkipValidate,
    SkipFeeCharge,
}

/// Version 1 invoke transaction, as submitted for simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeTransactionV1 {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: Felt,
    pub sender_address: Felt,
    pub calldata: Vec<Felt>,
    pub max_fee: Felt,
    #[serde(default)]
    pub signature: Vec<Felt>,
    pub nonce: Felt,
}

impl InvokeTransactionV1 {
    pub fn new(sender_address: Felt, calldata: Vec<Felt>, nonce: Felt) -> Self {
        Self {
            kind: "INVOKE".to_string(),
            version: Felt::from(1u64),
            sender_address,
            calldata,
            max_fee: Felt::ZERO,
            signature: Vec::new(),
            nonce,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimation {
    #[serde(default)]
    pub gas_consumed: Option<Felt>,
    #[serde(default)]
    pub gas_price: Option<Felt>,
    #[serde(default)]
    pub data_gas_consumed: Option<Felt>,
    #[serde(default)]
    pub data_gas_price: Option<Felt>,
    pub overall_fee: Felt,
    #[serde(default)]
    pub unit: Option<String>,
}

impl FeeEstimation {
    /// Only the overall fee is known for mined transactions
    pub fn from_receipt(fee: &FeePayment) -> Self {
        Self {
            gas_consumed: None,
            gas_price: None,
            data_gas_consumed: None,
            data_gas_price: None,
            overall_fee: fee.amount,
            unit: Some(fee.unit.clone()),
        }
    }
}

/// One element of a `starknet_simulateTransactions` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTransaction {
    pub transaction_trace: TransactionTrace,
    pub fee_estimation: FeeEstimation,
}

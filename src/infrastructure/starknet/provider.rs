//! Starknet JSON-RPC client over HTTP
//!
//! Params are sent by name, as the Starknet RPC specification defines them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, trace};

use super::types::{
    BlockTag, ContractClass, FeeEstimation, InvokeTransactionV1, RpcRequest, RpcResponse,
    SimulatedTransaction, SimulationFlag, TransactionReceipt,
};
use crate::domain::abi::InterfaceDefinition;
use crate::domain::source::{InterfaceSource, TraceSource};
use crate::domain::trace::TransactionTrace;
use crate::domain::{selector_from_name, Felt};

/// Default HTTP timeout for RPC requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StarknetRpc {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl StarknetRpc {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<P, T>(&self, method: &str, params: P) -> Result<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(target: "tracelens::rpc", method, id, "request");

        let response = self
            .http
            .post(&self.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .with_context(|| format!("{method} request failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{method} responded with status {status}");
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {method} response"))?;
        if let Some(error) = body.error {
            debug!(target: "tracelens::rpc", method, code = error.code, "error response");
            return Err(anyhow!("{method}: {error}"));
        }
        body.result
            .ok_or_else(|| anyhow!("{method} returned neither result nor error"))
    }

    pub async fn trace_transaction(&self, transaction_hash: Felt) -> Result<TransactionTrace> {
        self.request(
            "starknet_traceTransaction",
            json!({ "transaction_hash": transaction_hash }),
        )
        .await
    }

    pub async fn transaction_receipt(&self, transaction_hash: Felt) -> Result<TransactionReceipt> {
        self.request(
            "starknet_getTransactionReceipt",
            json!({ "transaction_hash": transaction_hash }),
        )
        .await
    }

    pub async fn class_hash_at(&self, contract_address: Felt) -> Result<Felt> {
        self.request(
            "starknet_getClassHashAt",
            json!({ "block_id": BlockTag::Latest, "contract_address": contract_address }),
        )
        .await
    }

    pub async fn get_class(&self, class_hash: Felt) -> Result<ContractClass> {
        self.request(
            "starknet_getClass",
            json!({ "block_id": BlockTag::Latest, "class_hash": class_hash }),
        )
        .await
    }

    /// `starknet_call` against the latest block
    pub async fn call(
        &self,
        contract_address: Felt,
        entrypoint: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>> {
        self.request(
            "starknet_call",
            json!({
                "request": {
                    "contract_address": contract_address,
                    "entry_point_selector": selector_from_name(entrypoint),
                    "calldata": calldata,
                },
                "block_id": BlockTag::Latest,
            }),
        )
        .await
    }

    /// Simulate against the latest state without validation
    pub async fn simulate_transactions(
        &self,
        transactions: &[InvokeTransactionV1],
    ) -> Result<Vec<SimulatedTransaction>> {
        debug!(target: "tracelens::rpc", count = transactions.len(), "simulating");
        self.request(
            "starknet_simulateTransactions",
            json!({
                "block_id": BlockTag::Latest,
                "transactions": transactions,
                "simulation_flags": [SimulationFlag::SkipValidate],
            }),
        )
        .await
    }

    /// A mined transaction in the shape of a simulation result.
    ///
    /// Past transactions cannot be re-simulated, so the trace is paired with
    /// the fee actually charged.
    pub async fn past_transaction_simulation(
        &self,
        transaction_hash: Felt,
    ) -> Result<SimulatedTransaction> {
        let (receipt, trace) = futures::try_join!(
            self.transaction_receipt(transaction_hash),
            self.trace_transaction(transaction_hash),
        )?;
        Ok(SimulatedTransaction {
            transaction_trace: trace,
            fee_estimation: FeeEstimation::from_receipt(&receipt.actual_fee),
        })
    }
}

/// ABI of a fetched class, whether Sierra (JSON string) or legacy (array)
pub(crate) fn class_interface(class_hash: Felt, class: ContractClass) -> Result<InterfaceDefinition> {
    let abi = class
        .abi
        .ok_or_else(|| anyhow!("class {class_hash} has no ABI"))?;
    InterfaceDefinition::from_json(abi).with_context(|| format!("class {class_hash}"))
}

#[async_trait]
impl InterfaceSource for StarknetRpc {
    async fn class_hash_at(&self, address: Felt) -> Result<Felt> {
        StarknetRpc::class_hash_at(self, address).await
    }

    async fn interface_of_class(&self, class_hash: Felt) -> Result<InterfaceDefinition> {
        let class = self.get_class(class_hash).await?;
        class_interface(class_hash, class)
    }

    async fn call_view(&self, address: Felt, function: &str) -> Result<Felt> {
        let result = self.call(address, function, &[]).await?;
        result
            .first()
            .copied()
            .ok_or_else(|| anyhow!("{function} on {address} returned no data"))
    }
}

#[async_trait]
impl TraceSource for StarknetRpc {
    async fn trace_transaction(&self, transaction_hash: Felt) -> Result<TransactionTrace> {
        StarknetRpc::trace_transaction(self, transaction_hash).await
    }
}

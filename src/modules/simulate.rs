//! Simulated and re-played transactions, decoded

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::decode::TraceDecoder;
use crate::domain::source::InterfaceSource;
use crate::domain::trace::DecodeOutcome;
use crate::domain::Felt;
use crate::infrastructure::starknet::{
    flatten_calls, Call, FeeEstimation, InvokeTransactionV1, SimulatedTransaction, StarknetRpc,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub outcome: DecodeOutcome,
    pub fee_estimation: FeeEstimation,
}

/// Simulate `calls` from `sender` against the latest state and decode the result
pub async fn simulate_calls<S: InterfaceSource + ?Sized>(
    rpc: &StarknetRpc,
    decoder: &TraceDecoder<'_, S>,
    sender: Felt,
    nonce: Felt,
    calls: &[Call],
) -> Result<SimulationReport> {
    let transaction = InvokeTransactionV1::new(sender, flatten_calls(calls), nonce);
    let simulated = rpc
        .simulate_transactions(std::slice::from_ref(&transaction))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("simulation returned no results"))?;
    report(decoder, simulated).await
}

/// A mined transaction presented as a simulation result
pub async fn simulate_past<S: InterfaceSource + ?Sized>(
    rpc: &StarknetRpc,
    decoder: &TraceDecoder<'_, S>,
    transaction_hash: Felt,
) -> Result<SimulationReport> {
    let simulated = rpc.past_transaction_simulation(transaction_hash).await?;
    report(decoder, simulated).await
}

async fn report<S: InterfaceSource + ?Sized>(
    decoder: &TraceDecoder<'_, S>,
    simulated: SimulatedTransaction,
) -> Result<SimulationReport> {
    let outcome = decoder.decode_trace(simulated.transaction_trace).await?;
    Ok(SimulationReport {
        outcome,
        fee_estimation: simulated.fee_estimation,
    })
}

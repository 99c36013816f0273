//! Contracts for the collaborators that feed the decoder

use anyhow::Result;
use async_trait::async_trait;

use super::abi::InterfaceDefinition;
use super::trace::TransactionTrace;
use super::Felt;

/// Where interface definitions come from
#[async_trait]
pub trait InterfaceSource: Send + Sync {
    /// Class hash deployed at a contract address
    async fn class_hash_at(&self, address: Felt) -> Result<Felt>;

    /// Interface of a declared class
    async fn interface_of_class(&self, class_hash: Felt) -> Result<InterfaceDefinition>;

    /// Call a read-only function without arguments and return its first result word
    async fn call_view(&self, address: Felt, function: &str) -> Result<Felt>;

    /// Interface of the class deployed at `address`
    async fn interface_at(&self, address: Felt) -> Result<InterfaceDefinition> {
        let class_hash = self.class_hash_at(address).await?;
        self.interface_of_class(class_hash).await
    }
}

/// Where transaction traces come from
#[async_trait]
pub trait TraceSource: Send + Sync {
    async fn trace_transaction(&self, transaction_hash: Felt) -> Result<TransactionTrace>;
}

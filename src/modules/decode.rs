//! Decode session: classify, resolve every contract once, then build the tree

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::abi::InterfaceCache;
use crate::domain::source::{InterfaceSource, TraceSource};
use crate::domain::trace::{build, classify, Classification, DecodeOutcome, TransactionTrace};
use crate::domain::{DecodeError, Felt};
use crate::infrastructure::abi::{InterfaceResolver, DEFAULT_CONCURRENCY};

/// Decodes traces against interfaces from `S`.
///
/// Each call to [`TraceDecoder::decode_trace`] is one session with its own
/// interface cache; nothing carries over between transactions.
pub struct TraceDecoder<'a, S: ?Sized> {
    source: &'a S,
    concurrency: usize,
}

impl<'a, S: InterfaceSource + ?Sized> TraceDecoder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub async fn decode_trace(&self, trace: TransactionTrace) -> Result<DecodeOutcome, DecodeError> {
        let root = match classify(trace)? {
            Classification::Reverted(revert_reason) => {
                debug!(target: "tracelens::decode", %revert_reason, "transaction reverted");
                return Ok(DecodeOutcome::Reverted { revert_reason });
            }
            Classification::Root(root) => root,
        };

        let addresses = root.contract_addresses();
        let mut cache = InterfaceCache::new();
        InterfaceResolver::new(self.source)
            .with_concurrency(self.concurrency)
            .resolve_all(&mut cache, &addresses)
            .await?;

        let decoded = build(&root, &cache);
        info!(
            target: "tracelens::decode",
            nodes = decoded.node_count(),
            contracts = cache.len(),
            "decoded trace"
        );
        Ok(DecodeOutcome::Decoded(decoded))
    }

    /// Fetch the trace of a mined transaction and decode it
    pub async fn decode_transaction<T>(&self, traces: &T, transaction_hash: Felt) -> Result<DecodeOutcome>
    where
        T: TraceSource + ?Sized,
    {
        let trace = traces
            .trace_transaction(transaction_hash)
            .await
            .with_context(|| format!("trace of {transaction_hash}"))?;
        Ok(self.decode_trace(trace).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::domain::abi::InterfaceDefinition;

    struct OneClass {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl InterfaceSource for OneClass {
        async fn class_hash_at(&self, _address: Felt) -> Result<Felt> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Felt::from(100u64))
        }

        async fn interface_of_class(&self, _class_hash: Felt) -> Result<InterfaceDefinition> {
            InterfaceDefinition::from_json(json!([
                {"type": "function", "name": "transfer",
                 "inputs": [{"name": "recipient", "type": "core::starknet::contract_address::ContractAddress"},
                            {"name": "amount", "type": "core::integer::u256"}],
                 "outputs": [{"type": "core::bool"}], "state_mutability": "external"}
            ]))
        }

        async fn call_view(&self, _address: Felt, _function: &str) -> Result<Felt> {
            Err(anyhow!("no views"))
        }
    }

    #[tokio::test]
    async fn test_decode_single_transfer() {
        let trace: TransactionTrace = serde_json::from_value(json!({
            "type": "INVOKE",
            "execute_invocation": {
                "contract_address": "0x49d",
                "entry_point_selector": "0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e",
                "calldata": ["0x5", "0xa", "0x0"],
                "result": ["0x1"],
                "calls": []
            }
        }))
        .unwrap();
        let source = OneClass {
            lookups: AtomicUsize::new(0),
        };

        let outcome = TraceDecoder::new(&source).decode_trace(trace).await.unwrap();
        let DecodeOutcome::Decoded(root) = outcome else {
            panic!("expected decoded tree");
        };
        assert_eq!(root.function_name.as_deref(), Some("transfer"));
        assert_eq!(root.inputs[1].value.as_scalar(), Some("10"));
        assert_eq!(root.outputs[0].value.as_scalar(), Some("true"));
        assert!(root.gaps.is_empty());
        assert_eq!(source.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_trace_is_error() {
        let source = OneClass {
            lookups: AtomicUsize::new(0),
        };
        let err = TraceDecoder::new(&source)
            .decode_trace(TransactionTrace::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::EmptyTrace));
    }
}

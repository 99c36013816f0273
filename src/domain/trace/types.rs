//! Raw and decoded invocation trees

use serde::{Deserialize, Serialize};

use crate::domain::abi::{DecodedValue, Omission};
use crate::domain::Felt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallType {
    #[default]
    Call,
    LibraryCall,
    Delegate,
    /// Fee payment routed through an account deployment
    DeployAccount,
}

/// A successful invocation, as returned by `starknet_traceTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInvocation {
    pub contract_address: Felt,
    pub entry_point_selector: Felt,
    #[serde(default)]
    pub calldata: Vec<Felt>,
    #[serde(default)]
    pub result: Vec<Felt>,
    #[serde(default)]
    pub calls: Vec<FunctionInvocation>,
    #[serde(default)]
    pub call_type: CallType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_address: Option<Felt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_hash: Option<Felt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point_type: Option<String>,
}

impl FunctionInvocation {
    /// Every contract address in this subtree, first-seen order, no repeats
    pub fn contract_addresses(&self) -> Vec<Felt> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if seen.insert(node.contract_address) {
                out.push(node.contract_address);
            }
            stack.extend(node.calls.iter().rev());
        }
        out
    }

    pub fn node_count(&self) -> usize {
        1 + self.calls.iter().map(Self::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertedInvocation {
    pub revert_reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Invocation {
    Reverted(RevertedInvocation),
    Success(FunctionInvocation),
}

/// Transaction trace with its top-level invocation slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionTrace {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_invocation: Option<Invocation>,
    /// L1 handler traces call this slot `function_invocation`
    #[serde(
        default,
        alias = "function_invocation",
        skip_serializing_if = "Option::is_none"
    )]
    pub execute_invocation: Option<Invocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_transfer_invocation: Option<Invocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_diff: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_resources: Option<serde_json::Value>,
}

/// Which list of a node a gap belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Inputs,
    Outputs,
}

/// Something the decoder could not annotate on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeGap {
    /// Selector not found in the contract's interface
    UnknownSelector,
    /// A parameter was left out of `inputs` or `outputs`
    Parameter { side: Side, omission: Omission },
}

/// One decoded node; same shape as the [`FunctionInvocation`] it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedInvocation {
    pub contract_address: Felt,
    pub function_name: Option<String>,
    pub entry_point_selector: Felt,
    pub call_type: CallType,
    pub inputs: Vec<DecodedValue>,
    pub outputs: Vec<DecodedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<DecodeGap>,
    pub internal_calls: Vec<DecodedInvocation>,
}

impl DecodedInvocation {
    /// Depth-first, pre-order walk with each node's depth
    pub fn flatten(&self) -> Vec<(usize, &DecodedInvocation)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            stack.extend(node.internal_calls.iter().rev().map(|child| (depth + 1, child)));
        }
        out
    }

    pub fn node_count(&self) -> usize {
        1 + self.internal_calls.iter().map(Self::node_count).sum::<usize>()
    }
}

/// What decoding a trace produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecodeOutcome {
    /// The transaction reverted; nothing was decoded
    Reverted { revert_reason: String },
    Decoded(DecodedInvocation),
}

//! Decoding whole traces against an in-memory chain
//!
//! Covers the session guarantees:
//! 1. The decoded tree has the shape of the raw tree
//! 2. Each distinct contract is looked up once per session
//! 3. Reverts short-circuit before any lookup
//! 4. Unknown selectors and failed lookups

mod common;

use common::{account_interface, felts, invocation, proxy_interface, token_interface, MockChain};
use tracelens::domain::abi::Value;
use tracelens::domain::trace::{
    CallType, DecodeGap, DecodeOutcome, DecodedInvocation, FunctionInvocation, Invocation,
    RevertedInvocation, TransactionTrace,
};
use tracelens::domain::{selector_from_name, DecodeError, Felt};
use tracelens::modules::TraceDecoder;

const ACCOUNT: u64 = 0xacc;
const TOKEN: u64 = 0x49d;
const OTHER: u64 = 0x53c;

fn chain() -> MockChain {
    let mut chain = MockChain::default();
    chain.deploy(ACCOUNT, 1, account_interface());
    chain.deploy(TOKEN, 2, token_interface());
    chain.deploy(OTHER, 2, token_interface());
    chain
}

fn transfer(address: u64, recipient: u64, low: u64) -> FunctionInvocation {
    invocation(address, "transfer", felts(&[recipient, low, 0]), felts(&[1]), vec![])
}

fn invoke_trace(root: FunctionInvocation) -> TransactionTrace {
    TransactionTrace {
        kind: Some("INVOKE".to_string()),
        execute_invocation: Some(Invocation::Success(root)),
        ..TransactionTrace::default()
    }
}

fn decoded(outcome: DecodeOutcome) -> DecodedInvocation {
    match outcome {
        DecodeOutcome::Decoded(root) => root,
        DecodeOutcome::Reverted { revert_reason } => panic!("unexpected revert: {revert_reason}"),
    }
}

fn shape(node: &DecodedInvocation) -> Vec<(usize, Felt)> {
    node.flatten()
        .into_iter()
        .map(|(depth, node)| (depth, node.contract_address))
        .collect()
}

fn raw_shape(node: &FunctionInvocation, depth: usize, out: &mut Vec<(usize, Felt)>) {
    out.push((depth, node.contract_address));
    for child in &node.calls {
        raw_shape(child, depth + 1, out);
    }
}

#[tokio::test]
async fn test_decoded_tree_matches_raw_shape() {
    let chain = chain();
    let nested = invocation(
        OTHER,
        "get_pool",
        vec![],
        felts(&[TOKEN, 30]),
        vec![transfer(TOKEN, 7, 1), transfer(OTHER, 8, 2)],
    );
    let root = invocation(
        ACCOUNT,
        "__execute__",
        felts(&[1, TOKEN, 0x99, 2, 7, 1]),
        felts(&[0]),
        vec![transfer(TOKEN, 7, 5), nested, transfer(OTHER, 9, 3)],
    );
    let mut expected = Vec::new();
    raw_shape(&root, 0, &mut expected);

    let outcome = TraceDecoder::new(&chain)
        .decode_trace(invoke_trace(root))
        .await
        .expect("decodes");
    let tree = decoded(outcome);

    assert_eq!(shape(&tree), expected);
    assert_eq!(tree.node_count(), 6);
    println!("✓ {} nodes, same order and depth", tree.node_count());

    // account multicall: Array<Call> with a Span<felt252> member
    assert_eq!(tree.function_name.as_deref(), Some("__execute__"));
    let calls = tree.inputs[0].value.as_composite().expect("array");
    assert_eq!(calls.len(), 1);
    let call = calls[0].value.as_composite().expect("struct");
    assert_eq!(call[0].value.as_scalar(), Some("0x49d"));
    assert_eq!(call[2].value.to_string(), "[0x7,0x1]");

    let pool = &tree.internal_calls[1];
    assert_eq!(pool.function_name.as_deref(), Some("get_pool"));
    let members = pool.outputs[0].value.as_composite().expect("struct");
    assert_eq!(members[1].value, Value::Scalar("30".into()));
    assert!(tree.flatten().iter().all(|(_, node)| node.gaps.is_empty()));
}

#[tokio::test]
async fn test_siblings_share_one_lookup() {
    let chain = chain();
    let root = invocation(
        ACCOUNT,
        "__execute__",
        felts(&[0]),
        felts(&[0]),
        vec![transfer(TOKEN, 1, 1), transfer(TOKEN, 2, 2), transfer(TOKEN, 3, 3)],
    );

    TraceDecoder::new(&chain)
        .decode_trace(invoke_trace(root))
        .await
        .expect("decodes");

    assert_eq!(chain.lookups_of(TOKEN), 1);
    assert_eq!(chain.lookups_of(ACCOUNT), 1);
    assert_eq!(chain.total(), 2);
}

#[tokio::test]
async fn test_execute_revert_skips_resolution() {
    let chain = chain();
    let trace = TransactionTrace {
        validate_invocation: Some(Invocation::Success(transfer(TOKEN, 1, 1))),
        execute_invocation: Some(Invocation::Reverted(RevertedInvocation {
            revert_reason: "ERC20: transfer amount exceeds balance".to_string(),
        })),
        fee_transfer_invocation: Some(Invocation::Success(transfer(TOKEN, 2, 2))),
        ..TransactionTrace::default()
    };

    let outcome = TraceDecoder::new(&chain).decode_trace(trace).await.expect("classifies");
    assert_eq!(
        outcome,
        DecodeOutcome::Reverted {
            revert_reason: "ERC20: transfer amount exceeds balance".to_string()
        }
    );
    assert_eq!(chain.total(), 0);
}

#[tokio::test]
async fn test_fee_transfer_root_is_deploy_account() {
    let chain = chain();
    let trace = TransactionTrace {
        kind: Some("DEPLOY_ACCOUNT".to_string()),
        fee_transfer_invocation: Some(Invocation::Success(transfer(TOKEN, 0x1176, 42))),
        ..TransactionTrace::default()
    };

    let tree = decoded(TraceDecoder::new(&chain).decode_trace(trace).await.expect("decodes"));
    assert_eq!(tree.call_type, CallType::DeployAccount);
    assert_eq!(tree.inputs[1].value.as_scalar(), Some("42"));
}

#[tokio::test]
async fn test_unknown_selector_does_not_abort() {
    let chain = chain();
    let mut mystery = transfer(TOKEN, 1, 1);
    mystery.entry_point_selector = selector_from_name("not_in_abi");
    let root = invocation(
        ACCOUNT,
        "__execute__",
        felts(&[0]),
        felts(&[0]),
        vec![mystery, transfer(OTHER, 4, 4)],
    );

    let tree = decoded(
        TraceDecoder::new(&chain)
            .decode_trace(invoke_trace(root))
            .await
            .expect("decodes"),
    );

    let unknown = &tree.internal_calls[0];
    assert_eq!(unknown.function_name, None);
    assert!(unknown.inputs.is_empty() && unknown.outputs.is_empty());
    assert_eq!(unknown.gaps, vec![DecodeGap::UnknownSelector]);

    let sibling = &tree.internal_calls[1];
    assert_eq!(sibling.function_name.as_deref(), Some("transfer"));
    assert_eq!(sibling.inputs[1].value.as_scalar(), Some("4"));
}

#[tokio::test]
async fn test_lookup_failure_aborts_session() {
    let chain = chain();
    let root = invocation(
        ACCOUNT,
        "__execute__",
        felts(&[0]),
        felts(&[0]),
        vec![transfer(TOKEN, 1, 1), transfer(0xdead, 2, 2)],
    );

    let err = TraceDecoder::new(&chain)
        .decode_trace(invoke_trace(root))
        .await
        .expect_err("unknown contract");
    assert!(matches!(err, DecodeError::LookupFailed { address, .. } if address == Felt::from(0xdeadu64)));
}

#[tokio::test]
async fn test_proxy_resolved_to_implementation() {
    let mut chain = chain();
    chain.deploy(0x777, 3, proxy_interface());
    chain.set_implementation(0x777, 2);

    let root = transfer(0x777, 5, 6);
    let tree = decoded(
        TraceDecoder::new(&chain)
            .decode_trace(invoke_trace(root))
            .await
            .expect("decodes"),
    );
    assert_eq!(tree.function_name.as_deref(), Some("transfer"));
    assert_eq!(tree.outputs[0].value.as_scalar(), Some("true"));
}

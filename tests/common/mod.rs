//! Shared fixtures: an in-memory chain and a calldata encoder
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

use tracelens::domain::abi::{
    CompositeCatalog, DecodedValue, InterfaceDefinition, ParamSpec, ParamType, Value,
};
use tracelens::domain::source::InterfaceSource;
use tracelens::domain::trace::{CallType, FunctionInvocation};
use tracelens::domain::{selector_from_name, Felt};

/// Contracts deployed on an in-memory chain; every lookup is counted
#[derive(Default)]
pub struct MockChain {
    /// address -> class hash
    deployed: HashMap<Felt, Felt>,
    classes: HashMap<Felt, InterfaceDefinition>,
    implementations: HashMap<Felt, Felt>,
    lookups: Mutex<HashMap<Felt, usize>>,
    pub total_lookups: AtomicUsize,
}

impl MockChain {
    pub fn deploy(&mut self, address: u64, class_hash: u64, interface: InterfaceDefinition) {
        self.deployed.insert(Felt::from(address), Felt::from(class_hash));
        self.classes.insert(Felt::from(class_hash), interface);
    }

    pub fn set_implementation(&mut self, proxy: u64, implementation: u64) {
        self.implementations
            .insert(Felt::from(proxy), Felt::from(implementation));
    }

    pub fn lookups_of(&self, address: u64) -> usize {
        self.lookups
            .lock()
            .map(|lookups| lookups.get(&Felt::from(address)).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InterfaceSource for MockChain {
    async fn class_hash_at(&self, address: Felt) -> Result<Felt> {
        self.total_lookups.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut lookups) = self.lookups.lock() {
            *lookups.entry(address).or_default() += 1;
        }
        self.deployed
            .get(&address)
            .copied()
            .ok_or_else(|| anyhow!("Contract not found"))
    }

    async fn interface_of_class(&self, class_hash: Felt) -> Result<InterfaceDefinition> {
        self.classes
            .get(&class_hash)
            .cloned()
            .ok_or_else(|| anyhow!("Class hash not found"))
    }

    async fn call_view(&self, address: Felt, _function: &str) -> Result<Felt> {
        self.implementations
            .get(&address)
            .copied()
            .ok_or_else(|| anyhow!("Entrypoint not found"))
    }
}

/// ERC20-like interface with a `transfer` and a struct-returning `get_pool`
pub fn token_interface() -> InterfaceDefinition {
    InterfaceDefinition::from_json(serde_json::json!([
        {"type": "struct", "name": "dex::Pool", "members": [
            {"name": "token0", "type": "core::starknet::contract_address::ContractAddress"},
            {"name": "fee", "type": "core::integer::u128"}
        ]},
        {"type": "interface", "name": "IToken", "items": [
            {"type": "function", "name": "transfer",
             "inputs": [
                {"name": "recipient", "type": "core::starknet::contract_address::ContractAddress"},
                {"name": "amount", "type": "core::integer::u256"}
             ],
             "outputs": [{"type": "core::bool"}], "state_mutability": "external"},
            {"type": "function", "name": "get_pool",
             "inputs": [],
             "outputs": [{"type": "dex::Pool"}], "state_mutability": "view"}
        ]}
    ]))
    .expect("valid ABI")
}

/// Account interface with the multicall entry point
pub fn account_interface() -> InterfaceDefinition {
    InterfaceDefinition::from_json(serde_json::json!([
        {"type": "struct", "name": "core::starknet::account::Call", "members": [
            {"name": "to", "type": "core::starknet::contract_address::ContractAddress"},
            {"name": "selector", "type": "core::felt252"},
            {"name": "calldata", "type": "core::array::Span::<core::felt252>"}
        ]},
        {"type": "function", "name": "__execute__",
         "inputs": [{"name": "calls", "type": "core::array::Array::<core::starknet::account::Call>"}],
         "outputs": [{"type": "core::array::Array::<core::array::Span::<core::felt252>>"}],
         "state_mutability": "external"}
    ]))
    .expect("valid ABI")
}

/// Proxy exposing its implementation class hash through a view
pub fn proxy_interface() -> InterfaceDefinition {
    InterfaceDefinition::from_json(serde_json::json!([
        {"type": "function", "name": "get_implementation", "inputs": [],
         "outputs": [{"name": "implementation", "type": "felt"}], "stateMutability": "view"},
        {"type": "function", "name": "__default__", "inputs": [], "outputs": []}
    ]))
    .expect("valid ABI")
}

pub fn invocation(
    address: u64,
    function: &str,
    calldata: Vec<Felt>,
    result: Vec<Felt>,
    calls: Vec<FunctionInvocation>,
) -> FunctionInvocation {
    FunctionInvocation {
        contract_address: Felt::from(address),
        entry_point_selector: selector_from_name(function),
        calldata,
        result,
        calls,
        call_type: CallType::Call,
        caller_address: None,
        class_hash: None,
        entry_point_type: None,
    }
}

pub fn felts(words: &[u64]) -> Vec<Felt> {
    words.iter().copied().map(Felt::from).collect()
}

pub fn scalar(name: &str, kind: &str, value: &str) -> DecodedValue {
    DecodedValue {
        name: name.to_string(),
        kind: kind.to_string(),
        value: Value::Scalar(value.to_string()),
    }
}

pub fn composite(name: &str, kind: &str, members: Vec<DecodedValue>) -> DecodedValue {
    DecodedValue {
        name: name.to_string(),
        kind: kind.to_string(),
        value: Value::Composite(members),
    }
}

/// Serialize decoded values back into words with the Cairo calldata rules
pub fn encode(values: &[DecodedValue], params: &[ParamSpec], catalog: &CompositeCatalog) -> Vec<Felt> {
    let mut out = Vec::new();
    for (value, param) in values.iter().zip(params) {
        encode_value(&ParamType::parse(&param.kind), &value.value, catalog, &mut out);
    }
    out
}

fn encode_value(ty: &ParamType, value: &Value, catalog: &CompositeCatalog, out: &mut Vec<Felt>) {
    match (ty, value) {
        (ParamType::Bool, Value::Scalar(raw)) => out.push(Felt::from(u64::from(raw == "true"))),
        (ParamType::U256, Value::Scalar(raw)) => {
            let value = U256::from_str_radix(raw, 10).expect("decimal u256");
            let mask = (U256::from(1u8) << 128usize) - U256::from(1u8);
            out.push(Felt::from_u256(value & mask));
            out.push(Felt::from_u256(value >> 128usize));
        }
        (_, Value::Scalar(raw)) => out.push(raw.parse().expect("scalar word")),
        (ParamType::Array(element), Value::Composite(items)) => {
            out.push(Felt::from(items.len() as u64));
            for item in items {
                encode_value(element, &item.value, catalog, out);
            }
        }
        (ParamType::Composite(name), Value::Composite(members)) => {
            let specs = catalog.members(name).expect("known struct");
            for (member, spec) in members.iter().zip(specs) {
                encode_value(&ParamType::parse(&spec.kind), &member.value, catalog, out);
            }
        }
        (ty, value) => panic!("cannot encode {value:?} as {ty:?}"),
    }
}

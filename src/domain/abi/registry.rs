//! Selector index - function signatures of one interface keyed by entry point selector

use std::collections::HashMap;

use tracing::warn;

use super::{InterfaceDefinition, ParamSpec};
use crate::domain::felt::{selector_from_name, Felt};

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// `starknet_keccak` of the function name
    pub selector: Felt,
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
    /// Output parameters
    pub outputs: Vec<ParamSpec>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<ParamSpec>, outputs: Vec<ParamSpec>) -> Self {
        let name = name.into();
        Self {
            selector: selector_from_name(&name),
            name,
            inputs,
            outputs,
        }
    }
}

/// Function signatures indexed by selector
#[derive(Debug, Default, Clone)]
pub struct SelectorIndex {
    functions: HashMap<Felt, FunctionSignature>,
    /// Names that replaced an earlier entry with the same selector
    pub duplicates: Vec<String>,
}

impl SelectorIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every function of an interface, including grouped ones
    pub fn build(interface: &InterfaceDefinition) -> Self {
        let mut index = Self::new();
        for function in interface.functions() {
            index.insert(FunctionSignature::new(
                function.name.clone(),
                function.inputs.clone(),
                function.outputs.clone(),
            ));
        }
        index
    }

    /// Insert a function signature
    ///
    /// Note: the last function for a given selector wins
    pub fn insert(&mut self, function: FunctionSignature) {
        let name = function.name.clone();
        if let Some(previous) = self.functions.insert(function.selector, function) {
            warn!(
                target: "tracelens::abi",
                selector = %previous.selector,
                replaced = %previous.name,
                by = %name,
                "duplicate function selector"
            );
            self.duplicates.push(name);
        }
    }

    /// Look up a function by selector
    pub fn lookup(&self, selector: &Felt) -> Option<&FunctionSignature> {
        self.functions.get(selector)
    }

    /// Look up a function by selector hex string (any zero padding)
    pub fn lookup_hex(&self, selector_hex: &str) -> Option<&FunctionSignature> {
        let selector: Felt = selector_hex.parse().ok()?;
        self.lookup(&selector)
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Get all functions
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions.values()
    }
}

//! Per-session interface cache

use std::collections::HashMap;

use super::{CompositeCatalog, InterfaceDefinition, SelectorIndex};
use crate::domain::felt::Felt;

/// An interface together with the lookups derived from it
#[derive(Debug, Clone)]
pub struct ResolvedContract {
    pub interface: InterfaceDefinition,
    pub catalog: CompositeCatalog,
    pub selectors: SelectorIndex,
}

impl ResolvedContract {
    pub fn new(interface: InterfaceDefinition) -> Self {
        Self {
            catalog: interface.catalog(),
            selectors: SelectorIndex::build(&interface),
            interface,
        }
    }
}

/// Resolved contracts by address, scoped to one decode call.
///
/// Entries are never replaced once inserted.
#[derive(Debug, Default)]
pub struct InterfaceCache {
    contracts: HashMap<Felt, ResolvedContract>,
}

impl InterfaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Felt) -> Option<&ResolvedContract> {
        self.contracts.get(address)
    }

    pub fn contains(&self, address: &Felt) -> bool {
        self.contracts.contains_key(address)
    }

    /// Insert unless already present; returns the cached entry
    pub fn insert(&mut self, address: Felt, interface: InterfaceDefinition) -> &ResolvedContract {
        self.contracts
            .entry(address)
            .or_insert_with(|| ResolvedContract::new(interface))
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

//! Starknet ABI model: entries, parameter specs and parameter types

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A named, typed parameter or struct member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (Cairo 1 outputs have none)
    #[serde(default)]
    pub name: String,
    /// Declared type, e.g. `core::integer::u256` or `felt*`
    #[serde(rename = "type")]
    pub kind: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ParamSpec>,
    #[serde(default)]
    pub outputs: Vec<ParamSpec>,
    /// `view` or `external`; legacy classes spell it `stateMutability`
    #[serde(
        default,
        alias = "stateMutability",
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<String>,
}

impl FunctionEntry {
    pub fn is_view(&self) -> bool {
        self.state_mutability.as_deref() == Some("view")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructEntry {
    pub name: String,
    #[serde(default)]
    pub members: Vec<ParamSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceEntry {
    pub name: String,
    #[serde(default)]
    pub items: Vec<AbiEntry>,
}

/// One top-level ABI item. Kinds the decoder does not use collapse into `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiEntry {
    Function(FunctionEntry),
    Struct(StructEntry),
    Interface(InterfaceEntry),
    #[serde(other)]
    Other,
}

/// A contract's published interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceDefinition {
    pub entries: Vec<AbiEntry>,
}

impl InterfaceDefinition {
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    /// Parse an ABI as returned by `starknet_getClass`.
    ///
    /// Sierra classes carry the ABI as a JSON string, legacy classes as an
    /// array. Entries that fail to parse are skipped, not fatal.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let value = match value {
            serde_json::Value::String(raw) => {
                serde_json::from_str(&raw).context("ABI string is not valid JSON")?
            }
            other => other,
        };
        let serde_json::Value::Array(items) = value else {
            bail!("ABI is not an array");
        };

        let entries = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<AbiEntry>(item) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(target: "tracelens::abi", %err, "skipping malformed ABI entry");
                    None
                }
            })
            .collect();
        Ok(Self { entries })
    }

    /// All functions, including those grouped under `interface` entries
    pub fn functions(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.entries.iter().flat_map(|entry| {
            let (own, nested): (Option<&FunctionEntry>, &[AbiEntry]) = match entry {
                AbiEntry::Function(function) => (Some(function), &[][..]),
                AbiEntry::Interface(interface) => (None, &interface.items),
                _ => (None, &[][..]),
            };
            own.into_iter().chain(nested.iter().filter_map(|item| match item {
                AbiEntry::Function(function) => Some(function),
                _ => None,
            }))
        })
    }

    /// Name of the view function exposing a proxy's implementation, if any.
    ///
    /// The first match wins when several functions qualify.
    pub fn proxy_getter(&self) -> Option<&str> {
        let mut candidates = self
            .functions()
            .filter(|function| function.is_view() && function.name.contains("implementation"));
        let first = candidates.next()?;
        if let Some(other) = candidates.next() {
            tracing::warn!(
                target: "tracelens::abi",
                chosen = %first.name,
                ignored = %other.name,
                "several implementation getters"
            );
        }
        Some(first.name.as_str())
    }

    /// Struct members by struct name
    pub fn catalog(&self) -> CompositeCatalog {
        let structs = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                AbiEntry::Struct(s) => Some((s.name.clone(), s.members.clone())),
                _ => None,
            })
            .collect();
        CompositeCatalog { structs }
    }
}

/// Struct layouts of one interface
#[derive(Debug, Clone, Default)]
pub struct CompositeCatalog {
    structs: HashMap<String, Vec<ParamSpec>>,
}

impl CompositeCatalog {
    pub fn members(&self, name: &str) -> Option<&[ParamSpec]> {
        self.structs.get(name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: impl Into<String>, members: Vec<ParamSpec>) {
        self.structs.insert(name.into(), members);
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

/// Parameter type, parsed from the declared type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Felt,
    /// Unsigned integer narrower than 256 bits
    Uint(u16),
    /// Two words, low limb first
    U256,
    Bool,
    ContractAddress,
    ClassHash,
    /// Not decoded
    ByteArray,
    /// Length-prefixed sequence (`Array::<T>`, `Span::<T>`)
    Array(Box<ParamType>),
    /// Legacy `T*`, length carried by the preceding `<name>_len` parameter
    Pointer(Box<ParamType>),
    /// Struct looked up by name in the catalog
    Composite(String),
}

impl ParamType {
    pub fn parse(kind: &str) -> Self {
        let kind = kind.trim();

        for prefix in ["core::array::Array::<", "core::array::Span::<"] {
            if let Some(inner) = kind.strip_prefix(prefix).and_then(|s| s.strip_suffix('>')) {
                return Self::Array(Box::new(Self::parse(inner)));
            }
        }
        if let Some(inner) = kind.strip_suffix('*') {
            return Self::Pointer(Box::new(Self::parse(inner)));
        }

        match kind {
            "felt" | "core::felt252" => Self::Felt,
            "core::integer::u8" => Self::Uint(8),
            "core::integer::u16" => Self::Uint(16),
            "core::integer::u32" | "core::integer::usize" => Self::Uint(32),
            "core::integer::u64" => Self::Uint(64),
            "core::integer::u128" => Self::Uint(128),
            "core::integer::u256" | "Uint256" => Self::U256,
            "core::bool" => Self::Bool,
            "core::starknet::contract_address::ContractAddress" => Self::ContractAddress,
            "core::starknet::class_hash::ClassHash" => Self::ClassHash,
            "core::byte_array::ByteArray" => Self::ByteArray,
            other => Self::Composite(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param_types() {
        assert_eq!(ParamType::parse("core::felt252"), ParamType::Felt);
        assert_eq!(ParamType::parse("core::integer::u64"), ParamType::Uint(64));
        assert_eq!(ParamType::parse("Uint256"), ParamType::U256);
        assert_eq!(
            ParamType::parse("core::array::Array::<core::integer::u256>"),
            ParamType::Array(Box::new(ParamType::U256))
        );
        assert_eq!(
            ParamType::parse("core::array::Span::<core::array::Array::<core::felt252>>"),
            ParamType::Array(Box::new(ParamType::Array(Box::new(ParamType::Felt))))
        );
        assert_eq!(
            ParamType::parse("AccountCallArray*"),
            ParamType::Pointer(Box::new(ParamType::Composite("AccountCallArray".into())))
        );
        assert_eq!(
            ParamType::parse("openzeppelin::Thing"),
            ParamType::Composite("openzeppelin::Thing".into())
        );
    }

    #[test]
    fn test_sierra_abi_string() {
        let abi = json!([
            {"type": "impl", "name": "Impl", "interface_name": "IToken"},
            {"type": "interface", "name": "IToken", "items": [
                {"type": "function", "name": "transfer",
                 "inputs": [{"name": "recipient", "type": "core::starknet::contract_address::ContractAddress"}],
                 "outputs": [{"type": "core::bool"}],
                 "state_mutability": "external"}
            ]},
            {"type": "struct", "name": "Pair", "members": [
                {"name": "a", "type": "core::felt252"},
                {"name": "b", "type": "core::felt252"}
            ]},
            {"type": "event", "name": "Transfer", "kind": "struct", "members": []}
        ]);
        let interface = InterfaceDefinition::from_json(json!(abi.to_string())).unwrap();

        let names: Vec<_> = interface.functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["transfer"]);
        assert_eq!(interface.catalog().members("Pair").map(<[_]>::len), Some(2));
        assert!(interface.proxy_getter().is_none());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let abi = json!([
            {"type": "function", "inputs": []},
            {"type": "function", "name": "get_implementation", "inputs": [], "outputs": [], "stateMutability": "view"}
        ]);
        let interface = InterfaceDefinition::from_json(abi).unwrap();
        assert_eq!(interface.functions().count(), 1);
        assert_eq!(interface.proxy_getter(), Some("get_implementation"));
        assert!(InterfaceDefinition::from_json(json!({"abi": 1})).is_err());
    }

    #[test]
    fn test_external_implementation_not_proxy() {
        let abi = json!([
            {"type": "function", "name": "upgrade_implementation", "inputs": [], "outputs": [], "state_mutability": "external"}
        ]);
        let interface = InterfaceDefinition::from_json(abi).unwrap();
        assert!(interface.proxy_getter().is_none());
    }
}

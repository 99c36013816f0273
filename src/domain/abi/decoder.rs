//! Schema-driven decoding of flat felt sequences into typed values
//!
//! Calldata and return data carry no delimiters or type tags. The declared
//! parameter list is walked in order and each parameter takes exactly as many
//! leading words as its type needs; the running position is what lets the
//! next parameter (and the caller) know where its data begins.

use std::fmt;

use serde::{Deserialize, Serialize};

use alloy_primitives::U512;

use super::{CompositeCatalog, ParamSpec, ParamType};
use crate::domain::felt::Felt;

/// Nesting beyond this is treated as unsupported (guards self-referencing structs)
const MAX_DEPTH: usize = 32;

/// Upper bound on array elements that take no words
const MAX_EMPTY_ELEMENTS: usize = 1 << 16;

/// A decoded parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedValue {
    /// Parameter name, or the element index inside an array
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Decimal for integers, hex for felts, addresses and class hashes.
    ///
    /// Hex is the canonical `Felt` spelling: lower-case with leading zeros
    /// dropped, so `0x049D...` in a trace comes out as `0x49d...`. The
    /// numeric value is unchanged.
    Scalar(String),
    /// Struct members or array elements, in order
    Composite(Vec<DecodedValue>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&[DecodedValue]> {
        match self {
            Self::Scalar(_) => None,
            Self::Composite(values) => Some(values),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::Composite(values) => {
                f.write_str("[")?;
                for (idx, item) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A parameter left out of the decoded values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Omission {
    /// Type not modelled; consumed no words
    Unsupported {
        param: String,
        #[serde(rename = "type")]
        kind: String,
    },
    /// Ran out of words; decoding stopped here
    Truncated {
        param: String,
        #[serde(rename = "type")]
        kind: String,
    },
}

/// Result of decoding one parameter list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub values: Vec<DecodedValue>,
    /// Words read from the front of the input
    pub consumed: usize,
    pub omitted: Vec<Omission>,
}

/// Decode `words` against `params`, resolving struct types through `catalog`
pub fn decode(words: &[Felt], params: &[ParamSpec], catalog: &CompositeCatalog) -> Decoded {
    let mut decoder = Decoder {
        words,
        pos: 0,
        depth: 0,
        catalog,
        omitted: Vec::new(),
    };
    // top level never reports truncation upwards
    let values = decoder.decode_members(params, "", true).unwrap_or_default();
    Decoded {
        values,
        consumed: decoder.pos,
        omitted: decoder.omitted,
    }
}

#[derive(Debug)]
struct Truncated;

struct Decoder<'a> {
    words: &'a [Felt],
    pos: usize,
    depth: usize,
    catalog: &'a CompositeCatalog,
    omitted: Vec<Omission>,
}

impl<'a> Decoder<'a> {
    fn remaining(&self) -> usize {
        self.words.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [Felt], Truncated> {
        let words = self.words;
        let taken = words.get(self.pos..self.pos + n).ok_or(Truncated)?;
        self.pos += n;
        Ok(taken)
    }

    fn decode_members(
        &mut self,
        params: &[ParamSpec],
        parent: &str,
        top_level: bool,
    ) -> Result<Vec<DecodedValue>, Truncated> {
        let mut values = Vec::with_capacity(params.len());
        // (name, value) of the previous single-word integer, for `T*` lengths
        let mut last_count: Option<(&str, usize)> = None;

        for param in params {
            let ty = ParamType::parse(&param.kind);
            let path = if parent.is_empty() {
                param.name.clone()
            } else {
                format!("{parent}.{}", param.name)
            };
            let pointer_len = match ty {
                ParamType::Pointer(_) => last_count
                    .filter(|(name, _)| name.strip_suffix("_len") == Some(param.name.as_str()))
                    .map(|(_, count)| count),
                _ => None,
            };

            let start = self.pos;
            match self.decode_type(&ty, &param.kind, &path, pointer_len) {
                Ok(Some(value)) => values.push(DecodedValue {
                    name: param.name.clone(),
                    kind: param.kind.clone(),
                    value,
                }),
                Ok(None) => self.omitted.push(Omission::Unsupported {
                    param: path,
                    kind: param.kind.clone(),
                }),
                Err(Truncated) if top_level => {
                    self.pos = start;
                    self.omitted.push(Omission::Truncated {
                        param: path,
                        kind: param.kind.clone(),
                    });
                    break;
                }
                Err(truncated) => return Err(truncated),
            }

            last_count = match ty {
                ParamType::Felt | ParamType::Uint(_) if self.pos == start + 1 => self.words[start]
                    .to_usize()
                    .map(|count| (param.name.as_str(), count)),
                _ => None,
            };
        }

        Ok(values)
    }

    /// `Ok(None)` means unsupported: nothing consumed, no value
    fn decode_type(
        &mut self,
        ty: &ParamType,
        kind: &str,
        path: &str,
        pointer_len: Option<usize>,
    ) -> Result<Option<Value>, Truncated> {
        let value = match ty {
            ParamType::Felt | ParamType::ContractAddress | ParamType::ClassHash => {
                Value::Scalar(self.take(1)?[0].to_string())
            }
            ParamType::Uint(_) => Value::Scalar(self.take(1)?[0].to_decimal()),
            ParamType::Bool => {
                let word = self.take(1)?[0];
                Value::Scalar((!word.is_zero()).to_string())
            }
            ParamType::U256 => {
                let limbs = self.take(2)?;
                // limbs are felts, so high * 2^128 can exceed 256 bits
                let low = U512::from_be_slice(&limbs[0].as_u256().to_be_bytes::<32>());
                let high = U512::from_be_slice(&limbs[1].as_u256().to_be_bytes::<32>());
                Value::Scalar(((high << 128usize) + low).to_string())
            }
            ParamType::ByteArray => return Ok(None),
            ParamType::Array(element) => {
                if !self.supports(element) {
                    return Ok(None);
                }
                let start = self.pos;
                let count = self.take(1)?[0].to_usize().ok_or(Truncated)?;
                match self.decode_elements(element, element_kind(kind), path, count)? {
                    Some(items) => Value::Composite(items),
                    None => {
                        self.pos = start;
                        return Ok(None);
                    }
                }
            }
            ParamType::Pointer(element) => {
                let Some(count) = pointer_len.filter(|_| self.supports(element)) else {
                    return Ok(None);
                };
                let start = self.pos;
                match self.decode_elements(element, element_kind(kind), path, count)? {
                    Some(items) => Value::Composite(items),
                    None => {
                        self.pos = start;
                        return Ok(None);
                    }
                }
            }
            ParamType::Composite(name) => {
                let catalog = self.catalog;
                let Some(members) = catalog.members(name) else {
                    return Ok(None);
                };
                if self.depth >= MAX_DEPTH {
                    return Ok(None);
                }
                self.depth += 1;
                let members = self.decode_members(members, path, false);
                self.depth -= 1;
                Value::Composite(members?)
            }
        };
        Ok(Some(value))
    }

    /// Whether an array element type decodes to a value, judged from the type alone
    fn supports(&self, element: &ParamType) -> bool {
        match element {
            ParamType::Felt
            | ParamType::ContractAddress
            | ParamType::ClassHash
            | ParamType::Uint(_)
            | ParamType::Bool
            | ParamType::U256 => true,
            ParamType::Array(inner) => self.supports(inner),
            // element pointers never have a sibling `_len`
            ParamType::Pointer(_) | ParamType::ByteArray => false,
            ParamType::Composite(name) => {
                self.depth < MAX_DEPTH && self.catalog.members(name).is_some()
            }
        }
    }

    /// `Ok(None)` when the element type is unsupported
    fn decode_elements(
        &mut self,
        element: &ParamType,
        element_kind: &str,
        path: &str,
        count: usize,
    ) -> Result<Option<Vec<DecodedValue>>, Truncated> {
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for idx in 0..count {
            let item_path = format!("{path}[{idx}]");
            let before = self.pos;
            let decoded = self.decode_type(element, element_kind, &item_path, None)?;
            if self.pos == before && idx >= MAX_EMPTY_ELEMENTS {
                return Err(Truncated);
            }
            match decoded {
                Some(value) => items.push(DecodedValue {
                    name: idx.to_string(),
                    kind: element_kind.to_string(),
                    value,
                }),
                None => return Ok(None),
            }
        }
        Ok(Some(items))
    }
}

/// Declared element type of an array or pointer type string
fn element_kind(kind: &str) -> &str {
    let kind = kind.trim();
    ["core::array::Array::<", "core::array::Span::<"]
        .iter()
        .find_map(|prefix| kind.strip_prefix(prefix).and_then(|s| s.strip_suffix('>')))
        .or_else(|| kind.strip_suffix('*'))
        .unwrap_or(kind)
}

//! Starknet field element - the word unit of calldata and return data

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Low 250 bits, the range of `starknet_keccak`
const MASK_250: U256 = U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, (1u64 << 58) - 1]);

/// A field element as carried by traces and ABIs.
///
/// Parsed from `0x`-prefixed hex (or plain decimal) and always printed as
/// lower-case hex without padding. The value is not reduced modulo the
/// field prime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Felt(U256);

#[derive(Debug, Error)]
#[error("invalid field element '{input}'")]
pub struct FeltParseError {
    input: String,
}

impl Felt {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `0x` followed by exactly 64 hex digits
    pub fn to_fixed_hex(&self) -> String {
        format!("0x{:0>64}", format!("{:x}", self.0))
    }

    /// Decimal rendering of the numeric value
    pub fn to_decimal(&self) -> String {
        self.0.to_string()
    }

    /// Numeric value as a count, if it fits
    pub fn to_usize(&self) -> Option<usize> {
        if self.0 > U256::from(u64::MAX) {
            return None;
        }
        usize::try_from(self.0.to::<u64>()).ok()
    }
}

/// Entry point selector for a function name (`starknet_keccak`)
pub fn selector_from_name(name: &str) -> Felt {
    let hash = keccak256(name.as_bytes());
    Felt(U256::from_be_slice(hash.as_slice()) & MASK_250)
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Felt {
    type Err = FeltParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            // "0x" alone shows up in some RPC fee fields
            Some("") => Ok(U256::ZERO),
            Some(payload) => U256::from_str_radix(payload, 16),
            None => U256::from_str_radix(trimmed, 10),
        };
        parsed.map(Self).map_err(|_| FeltParseError {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

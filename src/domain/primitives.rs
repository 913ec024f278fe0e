//! Domain primitives: Address, BlockNumber.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Block height on the tracked chain.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    pub fn new(block: u64) -> Self {
        BlockNumber(block)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Number of blocks from `self` up to `later`, or `None` if `later` precedes `self`.
    pub fn blocks_until(&self, later: BlockNumber) -> Option<u64> {
        later.0.checked_sub(self.0)
    }
}

impl std::fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("address must have 40 hex digits, got {len}: {input}")]
    BadLength { input: String, len: usize },
    #[error("address contains non-hex characters: {0}")]
    NotHex(String),
}

/// Account address (20 bytes, `0x`-prefixed hex).
///
/// Parsing is case-insensitive and the stored form is lowercase, so checksummed
/// and plain spellings of the same account collide to one map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and canonicalize an address.
    pub fn parse(input: &str) -> Result<Self, AddressParseError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError::MissingPrefix(trimmed.to_string()))?;

        if digits.len() != 40 {
            return Err(AddressParseError::BadLength {
                input: trimmed.to_string(),
                len: digits.len(),
            });
        }

        let bytes =
            hex::decode(digits).map_err(|_| AddressParseError::NotHex(trimmed.to_string()))?;

        Ok(Address(format!("0x{}", hex::encode(bytes))))
    }

    /// Get the canonical (lowercase) address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

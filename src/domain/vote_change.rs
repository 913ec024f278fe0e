//! Raw vote-change log line as returned by an event source.

use crate::domain::{Address, BlockNumber, Decimal};
use serde::{Deserialize, Serialize};

/// Which delegation filter produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Delegation moved toward the tracked recipient.
    To,
    /// Delegation moved away from the tracked recipient.
    From,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "to" => Ok(Direction::To),
            "from" => Ok(Direction::From),
            other => Err(format!("invalid direction: {}", other)),
        }
    }
}

/// A delegate's vote balance change emitted alongside a delegation change.
///
/// `delegate` is the account whose votes moved; only lines whose delegate is the
/// tracked recipient affect the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteChangeLog {
    pub block_number: BlockNumber,
    pub delegator: Address,
    pub delegate: Address,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
}

impl VoteChangeLog {
    pub fn new(
        block_number: BlockNumber,
        delegator: Address,
        delegate: Address,
        previous_balance: Decimal,
        new_balance: Decimal,
    ) -> Self {
        Self {
            block_number,
            delegator,
            delegate,
            previous_balance,
            new_balance,
        }
    }
}

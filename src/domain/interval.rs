//! Reward release interval.

use crate::domain::{BlockNumber, Decimal};
use serde::{Deserialize, Serialize};

/// Budget released linearly over `[start_block, end_block]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    pub total_budget: Decimal,
}

impl Interval {
    pub fn new(start_block: BlockNumber, end_block: BlockNumber, total_budget: Decimal) -> Self {
        Self {
            start_block,
            end_block,
            total_budget,
        }
    }

    /// Number of blocks the budget is released over.
    pub fn span(&self) -> u64 {
        self.start_block.blocks_until(self.end_block).unwrap_or(0)
    }

    /// Whether `block` lies inside the interval (both ends inclusive).
    pub fn contains(&self, block: BlockNumber) -> bool {
        block >= self.start_block && block <= self.end_block
    }

    /// Returns a description of the first violated precondition, if any.
    pub fn violation(&self) -> Option<&'static str> {
        if self.end_block <= self.start_block {
            return Some("end block must be greater than start block");
        }
        if !self.total_budget.is_positive() {
            return Some("total budget must be positive");
        }
        None
    }
}

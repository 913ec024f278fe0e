//! Participant state and the final allocation table.

use crate::domain::{Address, Decimal};
use serde::{Deserialize, Serialize};

/// Per-participant contribution and accrued entitlement.
///
/// Updates produce a new value; the engine replaces the stored state wholesale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub contribution: Decimal,
    pub allocated_rewards: Decimal,
}

impl ParticipantState {
    pub fn new(contribution: Decimal) -> Self {
        Self {
            contribution,
            allocated_rewards: Decimal::zero(),
        }
    }

    pub fn with_contribution(self, contribution: Decimal) -> Self {
        Self {
            contribution,
            ..self
        }
    }

    pub fn with_accrued(self, amount: Decimal) -> Self {
        Self {
            allocated_rewards: self.allocated_rewards + amount,
            ..self
        }
    }

    /// Contribution and entitlement both forfeited.
    pub fn slashed() -> Self {
        Self::default()
    }

    pub fn is_holding(&self) -> bool {
        self.contribution.is_positive()
    }
}

/// One row of the allocation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub address: Address,
    pub contribution: Decimal,
    pub allocated_rewards: Decimal,
}

/// Final result of one allocation run.
///
/// Rows are kept in first-seen order, which is also the order reporters emit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Allocation {
    pub rows: Vec<AllocationRow>,
    /// Budget left unallocated at the end of the run.
    pub remaining_budget: Decimal,
    /// Tracked pool at the end of the run.
    pub total_pool: Decimal,
}

impl Allocation {
    pub fn get(&self, address: &Address) -> Option<ParticipantState> {
        self.rows
            .iter()
            .find(|row| &row.address == address)
            .map(|row| ParticipantState {
                contribution: row.contribution,
                allocated_rewards: row.allocated_rewards,
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_allocated(&self) -> Decimal {
        self.rows.iter().map(|row| row.allocated_rewards).sum()
    }
}

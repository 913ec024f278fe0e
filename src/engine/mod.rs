//! Pure computation engine(s) for deterministic reward allocation.

use crate::domain::{Address, BlockNumber, Decimal};
use thiserror::Error;

pub mod allocator;
pub mod ledger;
pub mod normalizer;

pub use allocator::{allocate, RewardAllocator, DEFAULT_REWARD_SCALE, RATE_SCALE};
pub use ledger::Ledger;
pub use normalizer::{ensure_sorted, EventNormalizer};

/// Coarse classification of allocation faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    InputOrdering,
    Interval,
    PoolIntegrity,
    Arithmetic,
}

/// Inconsistency between the event stream and the tracked pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolFault {
    #[error("pool balance became negative ({pool})")]
    NegativePool { pool: Decimal },
    #[error("pool is empty while participants hold {holdings}")]
    EmptyPool { holdings: Decimal },
    #[error("participant holdings {holdings} exceed pool {pool}")]
    HoldingsExceedPool { holdings: Decimal, pool: Decimal },
    #[error("accrual of {accrued} exceeds remaining budget {remaining}")]
    BudgetOverdrawn { accrued: Decimal, remaining: Decimal },
}

/// Errors that abort an allocation run. No partial allocation is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("events out of order at index {index}: block {block} follows block {previous_block}")]
    InputOrdering {
        index: usize,
        block: BlockNumber,
        previous_block: BlockNumber,
    },
    #[error("invalid interval [{start_block}, {end_block}]: {reason}")]
    Interval {
        start_block: BlockNumber,
        end_block: BlockNumber,
        reason: String,
    },
    #[error("event at block {block} for {participant} lies outside interval [{start_block}, {end_block}]")]
    EventOutsideInterval {
        block: BlockNumber,
        participant: Address,
        start_block: BlockNumber,
        end_block: BlockNumber,
    },
    #[error("pool integrity violated at block {block} ({participant}): {fault}")]
    PoolIntegrity {
        block: BlockNumber,
        participant: Address,
        fault: PoolFault,
    },
    #[error("decimal overflow at block {block}")]
    Overflow { block: BlockNumber },
}

impl AllocationError {
    pub fn kind(&self) -> FaultKind {
        match self {
            AllocationError::InputOrdering { .. } => FaultKind::InputOrdering,
            AllocationError::Interval { .. } | AllocationError::EventOutsideInterval { .. } => {
                FaultKind::Interval
            }
            AllocationError::PoolIntegrity { .. } => FaultKind::PoolIntegrity,
            AllocationError::Overflow { .. } => FaultKind::Arithmetic,
        }
    }
}

//! Balance-change event consumed by the allocation engine.

use crate::domain::{Address, BlockNumber, Decimal};
use serde::{Deserialize, Serialize};

/// One change of the tracked recipient's delegated balance, attributed to a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Delegator whose action moved the pool.
    pub participant: Address,
    pub block_number: BlockNumber,
    /// Pool balance before the change.
    pub previous_balance: Decimal,
    /// Pool balance after the change.
    pub new_balance: Decimal,
}

impl Event {
    pub fn new(
        participant: Address,
        block_number: BlockNumber,
        previous_balance: Decimal,
        new_balance: Decimal,
    ) -> Self {
        Self {
            participant,
            block_number,
            previous_balance,
            new_balance,
        }
    }

    /// Signed pool change: positive for delegation, negative for undelegation.
    pub fn delta(&self) -> Decimal {
        self.new_balance - self.previous_balance
    }
}

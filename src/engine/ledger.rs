use crate::domain::{Address, Allocation, AllocationRow, Decimal, ParticipantState};
use std::collections::HashMap;

/// Mutable accounting state for a single allocation run.
///
/// Owned by exactly one `RewardAllocator`; nothing here outlives the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    /// Running sum of all applied deltas.
    pub total_pool: Decimal,
    /// Budget not yet allocated to anyone.
    pub remaining_budget: Decimal,
    /// Budget released per block over the remaining span.
    pub rate_per_block: Decimal,

    participants: HashMap<Address, ParticipantState>,
    /// Participants in the order they first held a nonzero contribution.
    first_seen: Vec<Address>,
}

impl Ledger {
    pub fn new(budget: Decimal, rate_per_block: Decimal) -> Self {
        Self {
            total_pool: Decimal::zero(),
            remaining_budget: budget,
            rate_per_block,
            participants: HashMap::new(),
            first_seen: Vec::new(),
        }
    }

    pub fn participant(&self, address: &Address) -> Option<ParticipantState> {
        self.participants.get(address).copied()
    }

    pub fn first_seen(&self) -> &[Address] {
        &self.first_seen
    }

    /// Replace a participant's state, registering it in first-seen order if new.
    pub fn put(&mut self, address: &Address, state: ParticipantState) {
        if self.participants.insert(address.clone(), state).is_none() {
            self.first_seen.push(address.clone());
        }
    }

    /// Holders with nonzero contribution, in first-seen order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, ParticipantState)> + '_ {
        self.first_seen.iter().filter_map(|address| {
            self.participants
                .get(address)
                .filter(|state| state.is_holding())
                .map(|state| (address, *state))
        })
    }

    /// Sum of all contributions, or `None` on overflow.
    pub fn holdings(&self) -> Option<Decimal> {
        self.holders()
            .try_fold(Decimal::zero(), |acc, (_, state)| acc.checked_add(state.contribution))
    }

    pub fn into_allocation(self) -> Allocation {
        let Ledger {
            total_pool,
            remaining_budget,
            mut participants,
            first_seen,
            ..
        } = self;

        let rows = first_seen
            .into_iter()
            .filter_map(|address| {
                participants.remove(&address).map(|state| AllocationRow {
                    address,
                    contribution: state.contribution,
                    allocated_rewards: state.allocated_rewards,
                })
            })
            .collect();

        Allocation {
            rows,
            remaining_budget,
            total_pool,
        }
    }
}

//! Event-driven pro-rata reward allocation.
//!
//! One forward pass over the sorted events. At each event the pool delta is applied
//! first, then the budget released over `[event.block, next_block)` is split among
//! current holders in first-seen order. A holder whose contribution drops to zero
//! forfeits everything accrued so far and the release rate is recomputed so the
//! remaining budget still runs out at the interval's end block.

use super::{ensure_sorted, AllocationError, Ledger, PoolFault};
use crate::domain::{
    Allocation, AllocationRow, BlockNumber, Decimal, Event, Interval, ParticipantState,
};
use tracing::{debug, info, warn};

/// Decimal places kept on the per-block release rate.
pub const RATE_SCALE: u32 = 24;
/// Decimal places kept on each accrued reward amount.
pub const DEFAULT_REWARD_SCALE: u32 = 18;
const MAX_SCALE: u32 = 28;

/// Allocate `interval.total_budget` across the participants of `events`.
pub fn allocate(events: &[Event], interval: Interval) -> Result<Allocation, AllocationError> {
    RewardAllocator::new(interval)?.run(events)
}

#[derive(Debug, Clone)]
pub struct RewardAllocator {
    interval: Interval,
    reward_scale: u32,
    ledger: Ledger,
}

impl RewardAllocator {
    /// # Errors
    /// Returns `AllocationError::Interval` if the interval is empty or the budget is not positive.
    pub fn new(interval: Interval) -> Result<Self, AllocationError> {
        if let Some(reason) = interval.violation() {
            return Err(AllocationError::Interval {
                start_block: interval.start_block,
                end_block: interval.end_block,
                reason: reason.to_string(),
            });
        }

        let rate = release_rate(interval.total_budget, interval.span()).ok_or(
            AllocationError::Overflow {
                block: interval.start_block,
            },
        )?;

        Ok(Self {
            interval,
            reward_scale: DEFAULT_REWARD_SCALE,
            ledger: Ledger::new(interval.total_budget, rate),
        })
    }

    /// Set the number of decimal places accrued rewards are truncated to (at most 28).
    pub fn with_reward_scale(mut self, scale: u32) -> Self {
        self.reward_scale = scale.min(MAX_SCALE);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Consume the allocator and process `events`, which must be sorted by block.
    pub fn run(mut self, events: &[Event]) -> Result<Allocation, AllocationError> {
        self.validate(events)?;

        if let [only] = events {
            return Ok(self.sole_participant(only));
        }

        for (i, event) in events.iter().enumerate() {
            let next_block = events
                .get(i + 1)
                .map(|next| next.block_number)
                .unwrap_or(self.interval.end_block);
            self.process_event(event, next_block)?;
        }

        let allocation = self.ledger.into_allocation();
        info!(
            participants = allocation.len(),
            total_allocated = %allocation.total_allocated(),
            remaining_budget = %allocation.remaining_budget,
            "Allocation complete"
        );
        Ok(allocation)
    }

    fn validate(&self, events: &[Event]) -> Result<(), AllocationError> {
        ensure_sorted(events)?;

        if let Some(event) = events
            .iter()
            .find(|event| !self.interval.contains(event.block_number))
        {
            return Err(AllocationError::EventOutsideInterval {
                block: event.block_number,
                participant: event.participant.clone(),
                start_block: self.interval.start_block,
                end_block: self.interval.end_block,
            });
        }

        Ok(())
    }

    /// A lone delegator takes the whole budget; there is nothing to divide against.
    fn sole_participant(self, event: &Event) -> Allocation {
        info!(
            participant = %event.participant,
            block = %event.block_number,
            "Single delegation event, assigning entire budget"
        );
        Allocation {
            rows: vec![AllocationRow {
                address: event.participant.clone(),
                contribution: Decimal::zero(),
                allocated_rewards: self.interval.total_budget,
            }],
            remaining_budget: Decimal::zero(),
            total_pool: event.delta(),
        }
    }

    fn process_event(&mut self, event: &Event, next_block: BlockNumber) -> Result<(), AllocationError> {
        let delta = event.delta();
        if delta.is_zero() {
            debug!(
                participant = %event.participant,
                block = %event.block_number,
                "Skipping zero-delta event"
            );
            return Ok(());
        }

        let pool = self
            .ledger
            .total_pool
            .checked_add(delta)
            .ok_or_else(|| overflow(event))?;
        if pool.is_negative() {
            return Err(pool_fault(event, PoolFault::NegativePool { pool }));
        }
        self.ledger.total_pool = pool;

        self.apply_delta(event, delta)?;
        self.accrue(event, next_block)
    }

    fn apply_delta(&mut self, event: &Event, delta: Decimal) -> Result<(), AllocationError> {
        let participant = &event.participant;

        match self.ledger.participant(participant) {
            None if delta.is_positive() => {
                debug!(
                    participant = %participant,
                    block = %event.block_number,
                    contribution = %delta,
                    "New participant"
                );
                self.ledger.put(participant, ParticipantState::new(delta));
            }
            None => {
                warn!(
                    participant = %participant,
                    block = %event.block_number,
                    delta = %delta,
                    "Withdrawal by participant with no tracked contribution"
                );
            }
            Some(state) => {
                let contribution = state
                    .contribution
                    .checked_add(delta)
                    .ok_or_else(|| overflow(event))?;
                if contribution.is_positive() {
                    self.ledger
                        .put(participant, state.with_contribution(contribution));
                } else {
                    self.slash(event, state)?;
                }
            }
        }

        Ok(())
    }

    /// Zero the participant and return its rewards to the pool of unallocated budget.
    fn slash(&mut self, event: &Event, state: ParticipantState) -> Result<(), AllocationError> {
        let forfeited = state.allocated_rewards;
        let remaining = self
            .ledger
            .remaining_budget
            .checked_add(forfeited)
            .ok_or_else(|| overflow(event))?;
        let blocks_left = event
            .block_number
            .blocks_until(self.interval.end_block)
            .unwrap_or(0);
        let rate = release_rate(remaining, blocks_left).ok_or_else(|| overflow(event))?;

        info!(
            participant = %event.participant,
            block = %event.block_number,
            forfeited = %forfeited,
            rate_per_block = %rate,
            "Participant withdrew fully, rewards forfeited"
        );

        self.ledger.remaining_budget = remaining;
        self.ledger.rate_per_block = rate;
        self.ledger.put(&event.participant, ParticipantState::slashed());
        Ok(())
    }

    /// Split the budget released over `[event.block, next_block)` among holders.
    fn accrue(&mut self, event: &Event, next_block: BlockNumber) -> Result<(), AllocationError> {
        let holdings = self.ledger.holdings().ok_or_else(|| overflow(event))?;
        if holdings.is_zero() {
            return Ok(());
        }

        let pool = self.ledger.total_pool;
        if pool.is_zero() {
            return Err(pool_fault(event, PoolFault::EmptyPool { holdings }));
        }
        if holdings > pool {
            return Err(pool_fault(
                event,
                PoolFault::HoldingsExceedPool { holdings, pool },
            ));
        }

        let blocks = event.block_number.blocks_until(next_block).unwrap_or(0);
        if blocks == 0 {
            return Ok(());
        }
        let released = self
            .ledger
            .rate_per_block
            .checked_mul(Decimal::from(blocks))
            .ok_or_else(|| overflow(event))?;

        // Each holder gets the increase of the truncated cumulative payout, so the
        // span pays out exactly `released` truncated to the reward scale.
        let scale = self.reward_scale;
        let mut cumulative = Decimal::zero();
        let mut paid = Decimal::zero();
        let mut updates = Vec::new();
        for (address, state) in self.ledger.holders() {
            cumulative = cumulative
                .checked_add(state.contribution)
                .ok_or_else(|| overflow(event))?;
            let owed = pro_rata(released, cumulative, pool)
                .ok_or_else(|| overflow(event))?
                .truncate_to(scale);
            updates.push((address.clone(), state.with_accrued(owed - paid)));
            paid = owed;
        }

        let remaining = self
            .ledger
            .remaining_budget
            .checked_sub(paid)
            .ok_or_else(|| overflow(event))?;
        if remaining.is_negative() {
            return Err(pool_fault(
                event,
                PoolFault::BudgetOverdrawn {
                    accrued: paid,
                    remaining: self.ledger.remaining_budget,
                },
            ));
        }

        for (address, state) in updates {
            self.ledger.put(&address, state);
        }
        self.ledger.remaining_budget = remaining;

        debug!(
            block = %event.block_number,
            next_block = %next_block,
            released = %paid,
            remaining_budget = %remaining,
            "Accrued span"
        );
        Ok(())
    }
}

/// Budget per block for spreading `budget` over `blocks`, truncated to `RATE_SCALE`.
fn release_rate(budget: Decimal, blocks: u64) -> Option<Decimal> {
    if blocks == 0 {
        return Some(Decimal::zero());
    }
    budget
        .checked_div(Decimal::from(blocks))
        .map(|rate| rate.truncate_to(RATE_SCALE))
}

/// `amount * part / whole`, multiplying first when the product fits.
fn pro_rata(amount: Decimal, part: Decimal, whole: Decimal) -> Option<Decimal> {
    if part == whole {
        return Some(amount);
    }
    amount
        .checked_mul(part)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| {
            part.checked_div(whole)
                .and_then(|share| share.checked_mul(amount))
        })
}

fn overflow(event: &Event) -> AllocationError {
    AllocationError::Overflow {
        block: event.block_number,
    }
}

fn pool_fault(event: &Event, fault: PoolFault) -> AllocationError {
    AllocationError::PoolIntegrity {
        block: event.block_number,
        participant: event.participant.clone(),
        fault,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{}", hex::encode([n; 20]))).unwrap()
    }

    fn interval(start: u64, end: u64, budget: &str) -> Interval {
        Interval::new(BlockNumber::new(start), BlockNumber::new(end), d(budget))
    }

    fn event(who: u8, block: u64, previous: &str, new: &str) -> Event {
        Event::new(addr(who), BlockNumber::new(block), d(previous), d(new))
    }

    #[test]
    fn test_release_rate() {
        assert_eq!(release_rate(d("32000"), 1000), Some(d("32")));
        assert_eq!(release_rate(d("5"), 0), Some(Decimal::zero()));
        assert_eq!(
            release_rate(d("1"), 3),
            Some(d("0.333333333333333333333333"))
        );
    }

    #[test]
    fn test_pro_rata() {
        assert_eq!(pro_rata(d("1600"), d("60"), d("60")), Some(d("1600")));
        assert_eq!(pro_rata(d("16000"), d("50"), d("100")), Some(d("8000")));
        assert!(pro_rata(d("1"), d("1"), Decimal::zero()).is_none());
    }

    #[test]
    fn test_new_rejects_invalid_interval() {
        let err = RewardAllocator::new(interval(10, 10, "1")).unwrap_err();
        assert!(matches!(err, AllocationError::Interval { .. }));
    }

    #[test]
    fn test_initial_ledger_state() {
        let allocator = RewardAllocator::new(interval(1000, 2000, "32000")).unwrap();
        let ledger = allocator.ledger();
        assert_eq!(ledger.rate_per_block, d("32"));
        assert_eq!(ledger.remaining_budget, d("32000"));
        assert!(ledger.total_pool.is_zero());
        assert!(ledger.first_seen().is_empty());
    }

    #[test]
    fn test_new_participant_earns_for_its_own_span() {
        let allocation = allocate(
            &[event(1, 0, "0", "10"), event(2, 50, "10", "20")],
            interval(0, 100, "100"),
        )
        .unwrap();

        // [0, 50): A alone; [50, 100): split evenly.
        assert_eq!(allocation.get(&addr(1)).unwrap().allocated_rewards, d("75"));
        assert_eq!(allocation.get(&addr(2)).unwrap().allocated_rewards, d("25"));
        assert!(allocation.remaining_budget.is_zero());
    }

    #[test]
    fn test_accrual_truncates_to_reward_scale() {
        let allocation = RewardAllocator::new(interval(0, 3, "1"))
            .unwrap()
            .with_reward_scale(2)
            .run(&[
                event(1, 0, "0", "1"),
                event(2, 0, "1", "2"),
                event(3, 0, "2", "3"),
            ])
            .unwrap();

        // Rate 0.333...; three holders share 0.999... over [0, 3).
        let a = allocation.get(&addr(1)).unwrap().allocated_rewards;
        let b = allocation.get(&addr(2)).unwrap().allocated_rewards;
        let c = allocation.get(&addr(3)).unwrap().allocated_rewards;
        assert_eq!(a, d("0.33"));
        assert_eq!(b, d("0.33"));
        assert_eq!(c, d("0.33"));
        assert_eq!(allocation.remaining_budget, d("0.01"));
    }

    #[test]
    fn test_slash_at_end_block_zeroes_rate() {
        let allocation = allocate(
            &[event(1, 0, "0", "10"), event(1, 100, "10", "0")],
            interval(0, 100, "100"),
        )
        .unwrap();

        let a = allocation.get(&addr(1)).unwrap();
        assert!(a.allocated_rewards.is_zero());
        assert!(a.contribution.is_zero());
        assert_eq!(allocation.remaining_budget, d("100"));
    }

    #[test]
    fn test_accrual_beyond_remaining_budget_is_rejected() {
        let mut allocator = RewardAllocator::new(interval(0, 100, "100")).unwrap();
        allocator.ledger.remaining_budget = d("1");

        let err = allocator
            .run(&[event(1, 0, "0", "10"), event(2, 50, "10", "20")])
            .unwrap_err();
        assert_eq!(
            err,
            AllocationError::PoolIntegrity {
                block: BlockNumber::new(0),
                participant: addr(1),
                fault: PoolFault::BudgetOverdrawn {
                    accrued: d("50"),
                    remaining: d("1"),
                },
            }
        );
    }
}

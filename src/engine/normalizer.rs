//! Turns raw vote-change logs into the engine's ordered event sequence.

use super::AllocationError;
use crate::domain::ordering::{first_out_of_order, sort_logs_stable};
use crate::domain::{Address, Event, VoteChangeLog};
use tracing::debug;

/// Check that `events` ascend by block, for sequences built without the normalizer.
pub fn ensure_sorted(events: &[Event]) -> Result<(), AllocationError> {
    match first_out_of_order(events) {
        Some((index, block, previous_block)) => Err(AllocationError::InputOrdering {
            index,
            block,
            previous_block,
        }),
        None => Ok(()),
    }
}

/// Normalizes logs for a single tracked recipient.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    recipient: Address,
}

impl EventNormalizer {
    pub fn new(recipient: Address) -> Self {
        Self { recipient }
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    /// Merge "to recipient" and "from recipient" logs into sorted events.
    ///
    /// Within one block, "to" logs precede "from" logs and each list keeps the
    /// order the source returned it in. Every log line whose delegate is the
    /// tracked recipient becomes exactly one event.
    pub fn normalize(&self, to_logs: Vec<VoteChangeLog>, from_logs: Vec<VoteChangeLog>) -> Vec<Event> {
        let mut logs = to_logs;
        logs.extend(from_logs);
        sort_logs_stable(&mut logs);

        let total = logs.len();
        let events: Vec<Event> = logs
            .into_iter()
            .filter_map(|log| self.to_event(log))
            .collect();

        debug!(
            recipient = %self.recipient,
            logs = total,
            events = events.len(),
            "Normalized vote-change logs"
        );
        events
    }

    fn to_event(&self, log: VoteChangeLog) -> Option<Event> {
        if log.delegate != self.recipient {
            debug!(
                block = %log.block_number,
                delegator = %log.delegator,
                delegate = %log.delegate,
                "Dropping vote change for untracked delegate"
            );
            return None;
        }

        Some(Event::new(
            log.delegator,
            log.block_number,
            log.previous_balance,
            log.new_balance,
        ))
    }
}

//! Stable event ordering for deterministic processing.

use crate::domain::{BlockNumber, Event, VoteChangeLog};

/// Sort log lines by block, keeping discovery order within a block.
///
/// `sort_by_key` is stable, so callers control tie order by how they concatenate.
pub fn sort_logs_stable(logs: &mut [VoteChangeLog]) {
    logs.sort_by_key(|log| log.block_number);
}

/// First position where block numbers decrease, as `(index, block, previous_block)`.
pub fn first_out_of_order(events: &[Event]) -> Option<(usize, BlockNumber, BlockNumber)> {
    events
        .windows(2)
        .enumerate()
        .find(|(_, pair)| pair[1].block_number < pair[0].block_number)
        .map(|(i, pair)| (i + 1, pair[1].block_number, pair[0].block_number))
}

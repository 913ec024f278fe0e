//! Event source abstraction for fetching vote-change logs around the tracked recipient.

use crate::domain::{Address, BlockNumber, VoteChangeLog};
use async_trait::async_trait;
use std::fmt;

pub mod file;
pub mod mock;

pub use file::FileEventSource;
pub use mock::MockEventSource;

/// Supplies the raw logs the normalizer turns into engine events.
///
/// Both queries are inclusive of `from` and `to`. Implementations return logs in
/// discovery order; sorting is the normalizer's job.
#[async_trait]
pub trait EventSource: Send + Sync + fmt::Debug {
    /// Vote-change logs emitted by delegations *to* `recipient`.
    async fn fetch_delegations_to(
        &self,
        recipient: &Address,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<VoteChangeLog>, SourceError>;

    /// Vote-change logs emitted by delegations moving away *from* `recipient`.
    async fn fetch_delegations_from(
        &self,
        recipient: &Address,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<VoteChangeLog>, SourceError>;
}

/// Error type for event source operations.
#[derive(Debug, Clone)]
pub enum SourceError {
    /// Reading the underlying input failed
    Io(String),
    /// Malformed log entry or document
    Parse(String),
    /// Other error
    Other(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(msg) => write!(f, "I/O error: {}", msg),
            SourceError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

pub(crate) fn in_range(log: &VoteChangeLog, from: BlockNumber, to: BlockNumber) -> bool {
    log.block_number >= from && log.block_number <= to
}

/// Logs within `[from, to]`, in their stored order.
pub(crate) fn select(
    logs: &[VoteChangeLog],
    from: BlockNumber,
    to: BlockNumber,
) -> Vec<VoteChangeLog> {
    logs.iter()
        .filter(|log| in_range(log, from, to))
        .cloned()
        .collect()
}

//! Mock event source for testing without real inputs.

use super::{select, EventSource, SourceError};
use crate::domain::{Address, BlockNumber, VoteChangeLog};
use async_trait::async_trait;

/// Mock event source that returns predefined logs.
#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    to_logs: Vec<VoteChangeLog>,
    from_logs: Vec<VoteChangeLog>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a log returned by `fetch_delegations_to`.
    pub fn with_to_log(mut self, log: VoteChangeLog) -> Self {
        self.to_logs.push(log);
        self
    }

    pub fn with_to_logs(mut self, logs: Vec<VoteChangeLog>) -> Self {
        self.to_logs.extend(logs);
        self
    }

    /// Add a log returned by `fetch_delegations_from`.
    pub fn with_from_log(mut self, log: VoteChangeLog) -> Self {
        self.from_logs.push(log);
        self
    }

    pub fn with_from_logs(mut self, logs: Vec<VoteChangeLog>) -> Self {
        self.from_logs.extend(logs);
        self
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_delegations_to(
        &self,
        _recipient: &Address,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<VoteChangeLog>, SourceError> {
        Ok(select(&self.to_logs, from, to))
    }

    async fn fetch_delegations_from(
        &self,
        _recipient: &Address,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<VoteChangeLog>, SourceError> {
        Ok(select(&self.from_logs, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decimal;

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{}", hex::encode([n; 20]))).unwrap()
    }

    fn log(block: u64) -> VoteChangeLog {
        VoteChangeLog::new(
            BlockNumber::new(block),
            addr(1),
            addr(0xaa),
            Decimal::zero(),
            Decimal::from(5u64),
        )
    }

    #[tokio::test]
    async fn test_mock_filters_by_block_range() {
        let mock = MockEventSource::new()
            .with_to_logs(vec![log(5), log(10), log(20), log(21)])
            .with_from_log(log(15));

        let to = mock
            .fetch_delegations_to(&addr(0xaa), BlockNumber::new(10), BlockNumber::new(20))
            .await
            .unwrap();
        assert_eq!(to, vec![log(10), log(20)]);

        let from = mock
            .fetch_delegations_from(&addr(0xaa), BlockNumber::new(10), BlockNumber::new(20))
            .await
            .unwrap();
        assert_eq!(from, vec![log(15)]);
    }
}

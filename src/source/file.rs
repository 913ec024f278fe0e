//! Event source backed by a local export of vote-change logs.
//!
//! Two layouts are accepted, chosen by file extension:
//! - `.json`: `{ "to": [VoteChangeLog, ...], "from": [...] }`, decimals as strings
//! - `.csv`: `direction,block_number,delegator,delegate,previous_balance,new_balance`

use super::{select, EventSource, SourceError};
use crate::domain::{Address, BlockNumber, Decimal, Direction, VoteChangeLog};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
    to_logs: Vec<VoteChangeLog>,
    from_logs: Vec<VoteChangeLog>,
}

impl FileEventSource {
    /// Read and parse the whole file up front.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| SourceError::Io(format!("{}: {}", path.display(), e)))?;

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let (to_logs, from_logs) = if is_csv {
            Self::parse_csv(&bytes)?
        } else {
            Self::parse_json(&bytes)?
        };

        info!(
            path = %path.display(),
            to_logs = to_logs.len(),
            from_logs = from_logs.len(),
            "Loaded vote-change logs"
        );

        Ok(Self {
            path,
            to_logs,
            from_logs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_json(
        json_bytes: &[u8],
    ) -> Result<(Vec<VoteChangeLog>, Vec<VoteChangeLog>), SourceError> {
        #[derive(Debug, Deserialize)]
        struct Document {
            #[serde(default)]
            to: Vec<VoteChangeLog>,
            #[serde(default)]
            from: Vec<VoteChangeLog>,
        }

        let doc: Document =
            serde_json::from_slice(json_bytes).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok((doc.to, doc.from))
    }

    pub fn parse_csv(
        csv_bytes: &[u8],
    ) -> Result<(Vec<VoteChangeLog>, Vec<VoteChangeLog>), SourceError> {
        #[derive(Debug, Deserialize)]
        struct Row {
            direction: String,
            block_number: u64,
            delegator: String,
            delegate: String,
            previous_balance: String,
            new_balance: String,
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let mut to_logs = Vec::new();
        let mut from_logs = Vec::new();
        for record in reader.deserialize::<Row>() {
            let row = record.map_err(|e| SourceError::Parse(e.to_string()))?;
            let direction = row
                .direction
                .parse::<Direction>()
                .map_err(SourceError::Parse)?;
            let delegator = Address::parse(&row.delegator)
                .map_err(|e| SourceError::Parse(format!("invalid delegator: {}", e)))?;
            let delegate = Address::parse(&row.delegate)
                .map_err(|e| SourceError::Parse(format!("invalid delegate: {}", e)))?;
            let previous_balance = Decimal::from_str_canonical(&row.previous_balance)
                .map_err(|e| SourceError::Parse(format!("invalid previous_balance: {}", e)))?;
            let new_balance = Decimal::from_str_canonical(&row.new_balance)
                .map_err(|e| SourceError::Parse(format!("invalid new_balance: {}", e)))?;

            let log = VoteChangeLog::new(
                BlockNumber::new(row.block_number),
                delegator,
                delegate,
                previous_balance,
                new_balance,
            );
            match direction {
                Direction::To => to_logs.push(log),
                Direction::From => from_logs.push(log),
            }
        }

        Ok((to_logs, from_logs))
    }
}

#[async_trait]
impl EventSource for FileEventSource {
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

use crate::config::Config;
use crate::domain::{Address, Allocation, Decimal, Event, Interval};
use crate::engine::{EventNormalizer, RewardAllocator, DEFAULT_REWARD_SCALE};
use crate::error::AppError;
use crate::report::{self, Reporter};
use crate::source::{EventSource, SourceError};
use std::io::Write;
use std::sync::Arc;

/// One source → normalizer → engine pass for a tracked recipient.
#[derive(Clone, Debug)]
pub struct RewardRun {
    source: Arc<dyn EventSource>,
    normalizer: EventNormalizer,
    interval: Interval,
    reward_scale: u32,
}

impl RewardRun {
    pub fn new(source: Arc<dyn EventSource>, recipient: Address, interval: Interval) -> Self {
        Self {
            source,
            normalizer: EventNormalizer::new(recipient),
            interval,
            reward_scale: DEFAULT_REWARD_SCALE,
        }
    }

    pub fn from_config(source: Arc<dyn EventSource>, config: &Config) -> Self {
        Self::new(source, config.tracked_recipient.clone(), config.interval())
            .with_reward_scale(config.reward_scale)
    }

    pub fn with_reward_scale(mut self, scale: u32) -> Self {
        self.reward_scale = scale;
        self
    }

    /// Fetch both delegation directions and normalize them into engine events.
    ///
    /// The whole sequence is materialized before the engine sees any of it.
    pub async fn collect_events(&self) -> Result<Vec<Event>, SourceError> {
        let recipient = self.normalizer.recipient();
        let (from, to) = (self.interval.start_block, self.interval.end_block);

        let (to_logs, from_logs) = tokio::try_join!(
            self.source.fetch_delegations_to(recipient, from, to),
            self.source.fetch_delegations_from(recipient, from, to),
        )?;

        tracing::info!(
            recipient = %recipient,
            to_logs = to_logs.len(),
            from_logs = from_logs.len(),
            "Fetched delegation logs"
        );

        Ok(self.normalizer.normalize(to_logs, from_logs))
    }

    pub async fn execute(&self) -> Result<Allocation, AppError> {
        let events = self.collect_events().await?;
        let allocation = RewardAllocator::new(self.interval)?
            .with_reward_scale(self.reward_scale)
            .run(&events)?;
        Ok(allocation)
    }
}

/// Outcome of a reported run, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub participants: usize,
    pub total_allocated: Decimal,
    pub remaining_budget: Decimal,
    pub digest: String,
}

/// Run the allocation described by `config` and render it into `writer`.
pub async fn run_report<W: Write>(
    config: &Config,
    source: Arc<dyn EventSource>,
    writer: W,
) -> Result<RunSummary, AppError> {
    let allocation = RewardRun::from_config(source, config).execute().await?;
    let reporter =
        Reporter::new(config.report_format).with_claim_reason(config.claim_reason.as_str());
    write_and_summarize(&allocation, &reporter, writer)
}

fn write_and_summarize<W: Write>(
    allocation: &Allocation,
    reporter: &Reporter,
    writer: W,
) -> Result<RunSummary, AppError> {
    reporter.write(allocation, writer)?;
    let digest = report::digest(allocation)?;

    tracing::info!(
        participants = allocation.len(),
        accounted = %report::accounted_budget(allocation),
        digest = %digest,
        "Report written"
    );

    Ok(RunSummary {
        participants: allocation.len(),
        total_allocated: allocation.total_allocated(),
        remaining_budget: allocation.remaining_budget,
        digest,
    })
}

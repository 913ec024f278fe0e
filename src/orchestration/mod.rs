pub mod orchestrator;

pub use orchestrator::{run_report, RewardRun, RunSummary};

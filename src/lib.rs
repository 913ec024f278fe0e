pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod report;
pub mod source;

pub use config::Config;
pub use domain::{
    Address, Allocation, AllocationRow, BlockNumber, Decimal, Event, Interval, ParticipantState,
    VoteChangeLog,
};
pub use engine::{allocate, ensure_sorted, AllocationError, FaultKind, PoolFault, RewardAllocator};
pub use error::AppError;
pub use source::{EventSource, FileEventSource, MockEventSource, SourceError};

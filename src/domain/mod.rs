//! Domain types and determinism layer for delegation reward allocation.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Address, BlockNumber
//! - Raw vote-change logs and the normalized Event the engine consumes
//! - Participant state and the final allocation table
//! - Stable ordering helpers for deterministic processing

pub mod allocation;
pub mod decimal;
pub mod event;
pub mod interval;
pub mod ordering;
pub mod primitives;
pub mod vote_change;

pub use allocation::{Allocation, AllocationRow, ParticipantState};
pub use decimal::Decimal;
pub use event::Event;
pub use interval::Interval;
pub use primitives::{Address, AddressParseError, BlockNumber};
pub use vote_change::{Direction, VoteChangeLog};

//! CrewLedger Core — share normalization, balances and settlement planning.
//!
//! This crate contains the pure settlement engine:
//! - Domain types (participants, expenses, split rows, balances, settlements)
//! - Share normalization with exact largest-remainder rounding
//! - Balance calculation with conservation of money
//! - Greedy settlement optimization (at most `N - 1` payments)
//! - Trip composition and content fingerprints
//!
//! Everything here is synchronous and deterministic. There is no I/O and no
//! logging; callers decide how to load records and report outcomes.

pub mod balances;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod settlement;

pub use balances::calculate_balances;
pub use engine::{settle_trip, settle_valid, LenientSettlement, TripSettlement};
pub use error::{BalanceError, EngineError, NormalizeError, SettlementError};
pub use normalize::normalize;
pub use settlement::optimize;

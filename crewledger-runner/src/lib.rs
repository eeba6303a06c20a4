//! CrewLedger Runner — trip export loading, verification, batch runs, reporting.
//!
//! This crate builds on `crewledger-core` to provide:
//! - TOML runner configuration (currency format, discovery, export)
//! - Loading of the app's JSON trip exports
//! - Per-expense verification with a lenient settlement plan
//! - Parallel batch verification of many trip files
//! - Text and Markdown reports, CSV/JSON artifact export

pub mod batch;
pub mod config;
pub mod reporting;
pub mod trip_file;
pub mod verify;

pub use batch::{discover_trip_files, verify_all, verify_file, BatchItem};
pub use config::{ConfigError, CurrencyFormat, RunnerConfig};
pub use trip_file::{load_trip, parse_trip, ExpenseDetail, LoadError, LoadedTrip};
pub use verify::{verify_trip, ExpenseRow, ExpenseStatus, VerificationReport};

//! export
//!
//! Turns harvested facts into the wire payload and delivers it.
//!
//! # Modules
//!
//! - [`schema`] - Wire payload types
//! - [`transform`] - Normalizer
//! - [`client`] - Sink trait and HTTP sink
//! - [`mock`] - Recording sink for tests
//! - [`backup`] - Local JSON backups
//! - [`pipeline`] - Per-match pipeline

pub mod backup;
pub mod client;
pub mod mock;
pub mod pipeline;
pub mod schema;
pub mod transform;

pub use backup::{write_backup, BackupError};
pub use client::{normalize_endpoint, HttpSink, SendError, SendReceipt, StatsSink};
pub use pipeline::{ExportOutcome, Pipeline, SkipReason};
pub use schema::{ExportRecord, GameInfo, GameResult, PlayerExport, PlayerStats};
pub use transform::normalize;

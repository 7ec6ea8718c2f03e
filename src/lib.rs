//! tou-stats-exporter - End-of-match statistics export for a foreign game-logic module
//!
//! The exporter reads the state of a separately versioned game-logic module
//! at runtime, with no compile-time contract, normalizes it into a stable
//! schema and posts it to a stats collector.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`bridge`] - Foreign object model, metadata locator, version gate, collection adapter
//! - [`harvest`] - Fault-isolated fact-getters and the descriptive string fallback
//! - [`export`] - Wire schema, normalizer, sinks, backups and the per-match pipeline
//! - [`core`] - Value types, markup stripping, configuration and storage paths
//! - [`plugin`] - Host entry point: one-time load and the match-end trigger
//! - [`telemetry`] - Tracing subscriber setup
//! - [`cli`] - `tou-stats` command-line interface
//!
//! # Guarantees
//!
//! 1. Metadata is resolved once; a failed resolution disables the exporter
//! 2. A missing fact never cancels the rest of the harvest
//! 3. No failure propagates back to the host
//! 4. Every exported player corresponds to exactly one roster entry

pub mod bridge;
pub mod cli;
pub mod core;
pub mod export;
pub mod harvest;
pub mod plugin;
pub mod telemetry;

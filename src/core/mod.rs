//! core
//!
//! Value types, configuration and storage paths for the exporter.
//!
//! # Modules
//!
//! - [`types`] - Harvested match facts as plain values
//! - [`markup`] - Display markup removal
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for exporter storage
//!
//! Nothing in `core` touches the foreign module.

pub mod config;
pub mod markup;
pub mod paths;
pub mod types;

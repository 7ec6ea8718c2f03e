//! harvest
//!
//! Reads raw match facts through the bridge and recovers missing ones
//! from descriptive strings.
//!
//! # Modules
//!
//! - [`facts`] - Independent, fault-isolated fact-getters
//! - [`fallback`] - Descriptive string parser

pub mod facts;
pub mod fallback;

pub use facts::{Fact, FactUnavailable, HarvestedMatch, Harvester};
pub use fallback::{FallbackParse, ParseAmbiguous};

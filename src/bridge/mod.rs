//! bridge
//!
//! Runtime interoperability with the foreign game-logic module.
//!
//! # Layers
//!
//! - [`traits`]: the binding interface every host adapter implements
//! - [`locator`]: finds the module and resolves the metadata handle
//! - [`version`]: advisory compatibility verdict
//! - [`adapter`]: converts foreign collections into local ones
//! - [`context`]: the once-initialised [`Bridge`] passed to the harvester
//!
//! Hosts: [`memory`] (in-process, used by tests and [`fixture`]) and
//! [`snapshot`] (JSON files, used by the command line).

pub mod adapter;
pub mod context;
pub mod fixture;
pub mod locator;
pub mod memory;
pub mod names;
pub mod snapshot;
pub mod traits;
pub mod version;

pub use adapter::{to_entries, to_map, to_sequence, try_sequence};
pub use context::{Bridge, RuntimeRef};
pub use locator::{find_module, locate, LocateError, MetadataHandle};
pub use snapshot::SnapshotError;
pub use traits::{
    BindingError, EnumValue, ForeignMember, ForeignModule, ForeignObject, ForeignRuntime,
    ForeignType, ForeignValue, MemberRef, ModuleRef, ObjectRef, SessionInfo, TypeRef,
};
pub use version::{CompatibilityVerdict, ModuleVersion, UnsupportedReason, VersionGate};

//! bridge::context
//!
//! The bridge context: resolved metadata plus the runtime it came from.
//!
//! A [`Bridge`] is constructed once at startup and passed explicitly to
//! everything that harvests. There is no process-wide cache; a failed
//! initialisation simply means no `Bridge` exists.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::locator::{locate, LocateError, MetadataHandle};
use super::traits::ForeignRuntime;
use super::version::{CompatibilityVerdict, VersionGate};

/// Shared handle to the host runtime.
pub type RuntimeRef = Arc<dyn ForeignRuntime>;

/// Initialised bridge to the foreign module.
#[derive(Clone)]
pub struct Bridge {
    runtime: RuntimeRef,
    handle: MetadataHandle,
    verdict: CompatibilityVerdict,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("handle", &self.handle)
            .field("verdict", &self.verdict)
            .finish()
    }
}

impl Bridge {
    /// Locate the foreign module and classify its version.
    ///
    /// # Errors
    ///
    /// Returns the [`LocateError`] from resolution. The verdict never
    /// causes an error.
    pub fn initialize(runtime: RuntimeRef, gate: &VersionGate) -> Result<Self, LocateError> {
        let handle = locate(runtime.as_ref())?;
        let version = handle.module_version();
        let verdict = gate.classify_opt(version.as_deref());

        if verdict.is_unsupported() {
            warn!(
                version = version.as_deref().unwrap_or("unknown"),
                %verdict,
                "foreign module version is not supported; continuing best-effort"
            );
        } else {
            info!(
                version = version.as_deref().unwrap_or("unknown"),
                %verdict,
                "foreign module version checked"
            );
        }

        Ok(Self {
            runtime,
            handle,
            verdict,
        })
    }

    pub fn runtime(&self) -> &dyn ForeignRuntime {
        self.runtime.as_ref()
    }

    pub fn handle(&self) -> &MetadataHandle {
        &self.handle
    }

    pub fn verdict(&self) -> CompatibilityVerdict {
        self.verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::fixture::MatchFixture;
    use crate::bridge::version::UnsupportedReason;

    #[test]
    fn initialize_attaches_verdict() {
        let runtime = Arc::new(MatchFixture::new().version(Some("1.2.0")).build());
        let bridge = Bridge::initialize(runtime, &VersionGate::default()).unwrap();
        assert!(bridge.verdict().is_supported());
        assert_eq!(bridge.handle().module_name(), "TownOfUsMira");
    }

    #[test]
    fn unsupported_version_still_initializes() {
        let runtime = Arc::new(MatchFixture::new().version(Some("9.0")).build());
        let bridge = Bridge::initialize(runtime, &VersionGate::default()).unwrap();
        assert_eq!(
            bridge.verdict(),
            CompatibilityVerdict::Unsupported(UnsupportedReason::Untested)
        );
    }

    #[test]
    fn missing_version_is_unknown() {
        let runtime = Arc::new(MatchFixture::new().version(None).build());
        let bridge = Bridge::initialize(runtime, &VersionGate::default()).unwrap();
        assert_eq!(
            bridge.verdict(),
            CompatibilityVerdict::Unsupported(UnsupportedReason::Unknown)
        );
    }

    #[test]
    fn locate_failure_propagates() {
        let runtime = Arc::new(MatchFixture::new().without("PlayerRecord").build());
        let err = Bridge::initialize(runtime, &VersionGate::default()).unwrap_err();
        assert!(matches!(err, LocateError::MetadataIncomplete(_)));
    }
}

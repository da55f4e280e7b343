//! Platform-targeted wheel acquisition for bundled Python libraries
//!
//! A build pipeline that ships a Python library inside a platform-specific
//! bundle needs exactly the binary wheels that match the bundle's runtime
//! target, unpacked into one directory. This crate locates those wheels,
//! fetches them, verifies their digests and extracts them.
//!
//! # Pipeline
//!
//! ```text
//! target + version
//!   -> Locator       ordered ArtifactDescriptors (newest ABI first)
//!   -> FetchStrategy raw bytes (direct URL, or pip with tag fallbacks)
//!   -> verify        digest check when one is known
//!   -> extract       merged into the destination
//! ```
//!
//! # Sources
//!
//! - built-in profiles ([`locate::ProfileLocator`]) with `pip download`
//! - a static manifest of URLs and digests ([`locate::ManifestLocator`])
//! - the package index JSON API ([`locate::IndexLocator`])
//!
//! # Example
//!
//! ```ignore
//! use wheel_acquire::prelude::*;
//!
//! let settings = Settings::load()?;
//! let locator = ProfileLocator::new(&settings.package, settings.abis.clone());
//! let fetcher = IndexFetch::new(PipCommand::new(&settings.python));
//! let summary = Orchestrator::new(locator, fetcher).run(&AcquireRequest {
//!     target: TargetPlatform::parse("linux-x64"),
//!     version: "1.8.19".into(),
//!     destination: "bundled/libs".into(),
//!     clean: false,
//! })?;
//! ```

pub mod acquire;
pub mod artifact;
pub mod core;
pub mod extract;
pub mod fetch;
pub mod internal;
pub mod locate;
pub mod platform;
pub mod verify;

pub use acquire::{AcquireRequest, AcquireSummary, ArtifactOutcome, ArtifactSource, Orchestrator};
pub use artifact::{AbiTag, ArtifactDescriptor, DownloadResult, ExpectedDigest};
pub use crate::core::config::Settings;
pub use crate::core::error::{AcquireError, Result};
pub use platform::TargetPlatform;

/// Commonly used items.
pub mod prelude {
    pub use crate::acquire::{AcquireRequest, AcquireSummary, Orchestrator};
    pub use crate::artifact::{AbiTag, ArtifactDescriptor, DownloadResult, ExpectedDigest};
    pub use crate::core::config::Settings;
    pub use crate::core::error::{AcquireError, Result};
    pub use crate::fetch::{DirectFetch, FetchStrategy, IndexFetch, PipCommand, SourceFetch};
    pub use crate::locate::{IndexClient, IndexLocator, Locator, Manifest, ManifestLocator, ProfileLocator};
    pub use crate::platform::TargetPlatform;
}

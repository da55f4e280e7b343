//! Artifact location
//!
//! A [`Locator`] turns a target platform and a version into the ordered list
//! of artifacts a bundle needs: newest interpreter ABI first, and for each
//! ABI the most specific platform tag first. Three sources exist:
//!
//! - [`ProfileLocator`]: built-in profiles, no network, index-mediated
//!   descriptors only
//! - [`ManifestLocator`]: a static manifest of URLs and digests
//! - [`IndexLocator`]: the live package index JSON API

pub mod index;
pub mod manifest;

pub use index::{IndexClient, IndexLocator, ProjectReleases, ReleaseFile, parse_release_version};
pub use manifest::{Manifest, ManifestEntry, ManifestLocator};

use crate::artifact::{AbiTag, ArtifactDescriptor};
use crate::core::error::Result;
use crate::platform::{PlatformProfile, TargetPlatform};

/// Source of artifact descriptors for a target.
pub trait Locator {
    /// Ordered, non-empty candidate list for `target` at `version`.
    fn locate(&self, target: TargetPlatform, version: &str) -> Result<Vec<ArtifactDescriptor>>;
}

impl<L: Locator + ?Sized> Locator for &L {
    fn locate(&self, target: TargetPlatform, version: &str) -> Result<Vec<ArtifactDescriptor>> {
        (**self).locate(target, version)
    }
}

impl<L: Locator + ?Sized> Locator for Box<L> {
    fn locate(&self, target: TargetPlatform, version: &str) -> Result<Vec<ArtifactDescriptor>> {
        (**self).locate(target, version)
    }
}

/// Locator backed by the built-in platform profiles.
#[derive(Debug, Clone)]
pub struct ProfileLocator {
    pub package: String,
    pub abis: Vec<AbiTag>,
}

impl ProfileLocator {
    pub fn new(package: impl Into<String>, abis: Vec<AbiTag>) -> Self {
        Self {
            package: package.into(),
            abis,
        }
    }

    pub fn profile(&self, target: TargetPlatform) -> PlatformProfile {
        PlatformProfile::builtin(target, &self.abis)
    }
}

impl Locator for ProfileLocator {
    fn locate(&self, target: TargetPlatform, version: &str) -> Result<Vec<ArtifactDescriptor>> {
        let mut descriptors = self.profile(target).descriptors(&self.package, version);
        // A target with no configured ABIs still gets the universal artifact.
        if descriptors.is_empty() {
            descriptors.push(ArtifactDescriptor::universal(&self.package, version));
        }
        Ok(descriptors)
    }
}

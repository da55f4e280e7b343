//! Fetch strategies
//!
//! A [`FetchStrategy`] turns one descriptor into raw archive bytes. Direct
//! fetch downloads the descriptor's URL; index fetch hands the requirement and
//! targeting to the package tool and tries fallback platform tags in order.

pub mod direct;
pub mod pip;

pub use direct::DirectFetch;
pub use pip::{IndexFetch, PackageTool, PipCommand, PipRequest, Targeting};

use crate::artifact::{ArtifactDescriptor, DownloadResult};
use crate::core::error::Result;

/// Obtains the payload of one artifact.
pub trait FetchStrategy {
    fn fetch(&self, descriptor: &ArtifactDescriptor) -> Result<DownloadResult>;
}

impl<F: FetchStrategy + ?Sized> FetchStrategy for &F {
    fn fetch(&self, descriptor: &ArtifactDescriptor) -> Result<DownloadResult> {
        (**self).fetch(descriptor)
    }
}

impl<F: FetchStrategy + ?Sized> FetchStrategy for Box<F> {
    fn fetch(&self, descriptor: &ArtifactDescriptor) -> Result<DownloadResult> {
        (**self).fetch(descriptor)
    }
}

/// Picks the direct fetch for descriptors with a URL and the index fetch
/// for the rest.
pub struct SourceFetch<T: PackageTool> {
    pub direct: DirectFetch,
    pub index: IndexFetch<T>,
}

impl<T: PackageTool> SourceFetch<T> {
    pub fn new(direct: DirectFetch, index: IndexFetch<T>) -> Self {
        Self { direct, index }
    }
}

impl<T: PackageTool> FetchStrategy for SourceFetch<T> {
    fn fetch(&self, descriptor: &ArtifactDescriptor) -> Result<DownloadResult> {
        if descriptor.url.is_some() {
            self.direct.fetch(descriptor)
        } else {
            self.index.fetch(descriptor)
        }
    }
}

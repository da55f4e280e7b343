//! Acquisition orchestrator
//!
//! Per run: lock the destination, optionally empty it, locate the candidate
//! artifacts, then for each one in order fetch, verify (when a digest is
//! known) and extract. Any failure aborts the run; artifacts extracted before
//! the failure stay in place and a re-run overwrites them.

use std::fmt;
use std::path::PathBuf;

use crate::core::error::{AcquireError, Result};
use crate::core::lock;
use crate::core::output;
use crate::extract::{self, ExtractOptions, ExtractionReport};
use crate::fetch::FetchStrategy;
use crate::internal::fs_utils;
use crate::locate::Locator;
use crate::platform::TargetPlatform;
use crate::verify;

/// One acquisition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireRequest {
    pub target: TargetPlatform,
    pub version: String,
    pub destination: PathBuf,
    /// Empty the destination before extracting
    pub clean: bool,
}

/// Where an artifact's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    Direct,
    Index,
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Index => f.write_str("index"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub file_name: String,
    pub source: ArtifactSource,
    /// Platform tag that resolved, for index-mediated artifacts
    pub platform: Option<String>,
    pub verified: bool,
    pub report: ExtractionReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireSummary {
    pub target: TargetPlatform,
    pub version: String,
    pub artifacts: Vec<ArtifactOutcome>,
}

impl AcquireSummary {
    pub fn files_written(&self) -> usize {
        self.artifacts.iter().map(|a| a.report.written.len()).sum()
    }
}

/// Drives locate, fetch, verify and extract for one target.
pub struct Orchestrator<L: Locator, F: FetchStrategy> {
    pub locator: L,
    pub fetcher: F,
}

impl<L: Locator, F: FetchStrategy> Orchestrator<L, F> {
    pub fn new(locator: L, fetcher: F) -> Self {
        Self { locator, fetcher }
    }

    pub fn run(&self, request: &AcquireRequest) -> Result<AcquireSummary> {
        let dest = &request.destination;
        output::action(&format!(
            "Acquiring {} for {} into {}",
            request.version,
            request.target,
            dest.display()
        ));

        std::fs::create_dir_all(dest)?;
        let _lock = lock::acquire_destination_lock(dest)?;

        if request.clean {
            output::sub_action("cleaning destination");
            fs_utils::clear_dir(dest)?;
        }

        let candidates = self.locator.locate(request.target, &request.version)?;
        if candidates.is_empty() {
            return Err(AcquireError::Configuration(format!(
                "no artifacts located for {} {}",
                request.target, request.version
            )));
        }

        // A destination shared by several artifacts can only hold one
        // metadata directory per name, so merging leaves them all out.
        let options = ExtractOptions {
            merge: candidates.len() > 1,
        };

        let total = candidates.len();
        let mut artifacts = Vec::with_capacity(total);
        for (i, descriptor) in candidates.iter().enumerate() {
            output::action_numbered(i + 1, total, &descriptor.label());

            let download = self.fetcher.fetch(descriptor)?;

            let verified = match &descriptor.digest {
                Some(digest) => {
                    verify::verify(&download.file_name, &download.bytes, digest.algorithm, &digest.hex)?;
                    output::detail(&format!("{} verified", digest.algorithm.name()));
                    true
                }
                None => false,
            };

            output::sub_action(&format!("extracting {}", download.file_name));
            let report = extract::extract(&download.bytes, &download.file_name, dest, options)?;

            artifacts.push(ArtifactOutcome {
                file_name: download.file_name,
                source: if descriptor.url.is_some() {
                    ArtifactSource::Direct
                } else {
                    ArtifactSource::Index
                },
                platform: download.descriptor.platform,
                verified,
                report,
            });
        }

        let summary = AcquireSummary {
            target: request.target,
            version: request.version.clone(),
            artifacts,
        };
        output::success(&format!(
            "{} artifact(s), {} file(s) written to {}",
            summary.artifacts.len(),
            summary.files_written(),
            dest.display()
        ));
        Ok(summary)
    }
}

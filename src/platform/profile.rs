//! Built-in platform profiles
//!
//! A profile lists, for one target, the interpreter ABIs to bundle (newest
//! first) and for each ABI the platform tags to try against an index, most
//! specific first. Newer shared-library baselines come first because they may
//! carry optimizations; older ones are broadly compatible and act as fallbacks.

use super::TargetPlatform;
use crate::artifact::{AbiTag, ArtifactDescriptor};

/// manylinux tags from the newest glibc baseline to the oldest.
pub const MANYLINUX_X86_64_TAGS: [&str; 5] = [
    "manylinux_2_34_x86_64",
    "manylinux_2_31_x86_64",
    "manylinux_2_28_x86_64",
    "manylinux_2_17_x86_64",
    "manylinux2014_x86_64",
];

/// macOS universal2 tags from the newest deployment target to the oldest.
pub const MACOSX_UNIVERSAL2_TAGS: [&str; 7] = [
    "macosx_15_0_universal2",
    "macosx_14_0_universal2",
    "macosx_13_0_universal2",
    "macosx_12_0_universal2",
    "macosx_11_0_universal2",
    "macosx_10_15_universal2",
    "macosx_10_9_universal2",
];

pub const WIN_AMD64_TAGS: [&str; 1] = ["win_amd64"];
pub const WIN32_TAGS: [&str; 1] = ["win32"];

/// One ABI slot within a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// None for the universal entry
    pub abi: Option<AbiTag>,
    pub platform_tags: Vec<String>,
}

impl ProfileEntry {
    /// Rank of a wheel platform tag against this entry; lower is better.
    ///
    /// Listed tags rank by position. Tags outside the list but inside the
    /// target's family rank after every listed tag. Other tags don't match.
    pub fn rank_platform_tag(&self, target: TargetPlatform, tag: &str) -> Option<usize> {
        if let Some(pos) = self.platform_tags.iter().position(|t| t == tag) {
            return Some(pos);
        }
        target
            .accepts_platform_tag(tag)
            .then_some(self.platform_tags.len())
    }

    /// Index-mediated descriptor for this entry (no URL, no digest).
    pub fn descriptor(&self, package: &str, version: &str) -> ArtifactDescriptor {
        let mut descriptor = ArtifactDescriptor::universal(package, version);
        descriptor.abi = self.abi.clone();
        if let [only] = self.platform_tags.as_slice() {
            descriptor.platform = Some(only.clone());
        } else {
            descriptor.fallback_platforms = self.platform_tags.clone();
        }
        descriptor
    }
}

/// Ordered ABI slots for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub target: TargetPlatform,
    pub entries: Vec<ProfileEntry>,
}

impl PlatformProfile {
    /// Built-in profile for `target` covering `abis`.
    ///
    /// `abis` is sorted newest first here, so callers may pass any order.
    /// The universal target ignores `abis` and yields a single untargeted entry.
    pub fn builtin(target: TargetPlatform, abis: &[AbiTag]) -> Self {
        let tags: &[&str] = match target {
            TargetPlatform::MacOs => &MACOSX_UNIVERSAL2_TAGS,
            TargetPlatform::Win32 => &WIN32_TAGS,
            TargetPlatform::Win64 => &WIN_AMD64_TAGS,
            TargetPlatform::Linux => &MANYLINUX_X86_64_TAGS,
            TargetPlatform::Any => {
                return Self {
                    target,
                    entries: vec![ProfileEntry {
                        abi: None,
                        platform_tags: Vec::new(),
                    }],
                };
            }
        };

        let mut abis = abis.to_vec();
        abis.sort_by(|a, b| b.cmp(a));
        abis.dedup();

        let entries = abis
            .into_iter()
            .map(|abi| ProfileEntry {
                abi: Some(abi),
                platform_tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .collect();

        Self { target, entries }
    }

    pub fn descriptors(&self, package: &str, version: &str) -> Vec<ArtifactDescriptor> {
        self.entries
            .iter()
            .map(|e| e.descriptor(package, version))
            .collect()
    }
}

//! Target platforms and the platform-tag vocabulary
//!
//! A target is the coarse identifier a build pipeline passes in ("Linux x64",
//! "win32-x64", "darwin-arm64"). Each target owns a manifest key, a family of
//! platform tags it accepts, and a built-in profile of ABIs and fallback tags.

pub mod profile;
pub mod tags;

use std::fmt;

pub use profile::{PlatformProfile, ProfileEntry};
pub use tags::WheelName;

/// Coarse runtime target of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetPlatform {
    MacOs,
    Win32,
    Win64,
    Linux,
    /// Universal fallback: pure wheels only
    Any,
}

impl TargetPlatform {
    pub const ALL: [TargetPlatform; 5] =
        [Self::MacOs, Self::Win32, Self::Win64, Self::Linux, Self::Any];

    /// Parse a target identifier. Unrecognized identifiers map to `Any`.
    ///
    /// Accepts human names ("macOS", "Windows x64", "Linux x64"), VS Code
    /// target names ("darwin-arm64", "win32-x64", "linux-x64") and manifest
    /// keys ("win64", "linux").
    pub fn parse(target: &str) -> Self {
        let t = target.trim().to_ascii_lowercase().replace(['_', ' '], "-");

        if t.contains("darwin") || t.starts_with("mac") || t.starts_with("osx") {
            return Self::MacOs;
        }

        match t.as_str() {
            "win64" | "win32-x64" | "windows-x64" | "windows-amd64" | "win-amd64" | "win-x64" => {
                Self::Win64
            }
            "win32" | "win32-ia32" | "windows-x86" | "windows-ia32" | "win-x86" => Self::Win32,
            "linux" | "linux-x64" | "linux-x86-64" | "linux-amd64" => Self::Linux,
            _ => Self::Any,
        }
    }

    /// Key of this target's artifact list in a static manifest.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Win32 => "win32",
            Self::Win64 => "win64",
            Self::Linux => "linux",
            Self::Any => "any",
        }
    }

    /// Targets that are written to a regenerated manifest.
    ///
    /// 32-bit Windows is no longer bundled; it resolves to the `any` entry.
    pub fn manifest_targets() -> [TargetPlatform; 4] {
        [Self::MacOs, Self::Win64, Self::Linux, Self::Any]
    }

    /// Whether a wheel platform tag belongs to this target's family.
    pub fn accepts_platform_tag(&self, tag: &str) -> bool {
        match self {
            Self::MacOs => tag.starts_with("macosx_"),
            Self::Win32 => tag == "win32",
            Self::Win64 => tag == "win_amd64",
            Self::Linux => tag.starts_with("manylinux") && tag.ends_with("_x86_64"),
            Self::Any => tag == "any",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

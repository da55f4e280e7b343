//! Static artifact manifest
//!
//! ```json
//! {
//!     "macOS": [
//!         { "url": "https://files.pythonhosted.org/.../debugpy-1.8.19-cp312-cp312-macosx_14_0_universal2.whl",
//!           "hash": { "sha256": "..." } }
//!     ],
//!     "any": [ ... ]
//! }
//! ```
//!
//! Keys are target manifest keys. A target without its own key resolves to
//! `any`. Files ending in `.toml` use the same shape as TOML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Locator;
use super::index::IndexLocator;
use crate::artifact::{ArtifactDescriptor, ExpectedDigest};
use crate::core::error::{AcquireError, Result};
use crate::internal::fs_utils;
use crate::internal::url_utils;
use crate::platform::{TargetPlatform, WheelName};

/// One downloadable artifact in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    /// Algorithm name to hex digest
    #[serde(default)]
    pub hash: BTreeMap<String, String>,
}

/// Platform key to artifact list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub platforms: BTreeMap<String, Vec<ManifestEntry>>,
}

impl Manifest {
    /// Read a manifest; `.toml` files are TOML, anything else JSON.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AcquireError::Configuration(format!("cannot read manifest {}: {}", path.display(), e))
        })?;
        let parsed = if is_toml(path) {
            Self::from_toml_str(&text)
        } else {
            Self::from_json_str(&text)
        };
        parsed.map_err(|e| match e {
            AcquireError::Configuration(reason) => {
                AcquireError::Configuration(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| AcquireError::Configuration(format!("invalid manifest: {e}")))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| AcquireError::Configuration(format!("invalid manifest: {e}")))
    }

    /// Pretty JSON with four-space indentation and a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| AcquireError::Configuration(format!("cannot serialize manifest: {e}")))?;
        let mut text = String::from_utf8_lossy(&buf).into_owned();
        text.push('\n');
        Ok(text)
    }

    /// Write the manifest, TOML for `.toml` paths and JSON otherwise.
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| {
                AcquireError::Configuration(format!("cannot serialize manifest: {e}"))
            })?
        } else {
            self.to_json_string()?
        };
        fs_utils::ensure_parent_dir(path)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Entries for `target` and the key they came from.
    ///
    /// A missing key falls back to `any`. A key that is present but empty is
    /// returned as-is so the caller can report it.
    pub fn entries_for(&self, target: TargetPlatform) -> Option<(&str, &[ManifestEntry])> {
        let key = target.manifest_key();
        if let Some(entries) = self.platforms.get(key) {
            return Some((key, entries));
        }
        let any = TargetPlatform::Any.manifest_key();
        self.platforms.get(any).map(|entries| (any, entries.as_slice()))
    }

    /// Regenerate a manifest from the live index for every bundled target.
    pub fn from_index(locator: &IndexLocator, version: &str) -> Result<Self> {
        let mut platforms = BTreeMap::new();
        for target in TargetPlatform::manifest_targets() {
            let entries = locator
                .locate(target, version)?
                .into_iter()
                .filter_map(|d| {
                    let url = d.url?;
                    let hash = d
                        .digest
                        .map(|digest| {
                            BTreeMap::from([(digest.algorithm.key().to_string(), digest.hex)])
                        })
                        .unwrap_or_default();
                    Some(ManifestEntry { url, hash })
                })
                .collect();
            platforms.insert(target.manifest_key().to_string(), entries);
        }
        Ok(Self { platforms })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn version_matches(requested: &str, wheel_version: &str) -> bool {
    let requested = requested.trim();
    requested.is_empty() || requested.eq_ignore_ascii_case("latest") || requested == wheel_version
}

/// Locator reading a static manifest.
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    pub manifest: Manifest,
    /// Package name used for entries whose file name is not a wheel
    pub package: String,
    /// Keep only targeting information so the package tool does the download
    pub index_hints: bool,
}

impl ManifestLocator {
    pub fn new(manifest: Manifest, package: impl Into<String>) -> Self {
        Self {
            manifest,
            package: package.into(),
            index_hints: false,
        }
    }

    pub fn with_index_hints(mut self, index_hints: bool) -> Self {
        self.index_hints = index_hints;
        self
    }

    fn descriptor(&self, entry: &ManifestEntry, version: &str) -> Result<Option<ArtifactDescriptor>> {
        let file_name = url_utils::extract_filename(&entry.url);
        let wheel = WheelName::parse(&file_name);

        // Names that are not wheels carry no version to filter on.
        if let Some(wheel) = &wheel
            && !version_matches(version, &wheel.version)
        {
            return Ok(None);
        }

        let digest = if entry.hash.is_empty() {
            None
        } else {
            Some(ExpectedDigest::from_map(&entry.hash).ok_or_else(|| {
                AcquireError::Configuration(format!(
                    "manifest entry {} has no supported digest (got: {})",
                    entry.url,
                    entry.hash.keys().cloned().collect::<Vec<_>>().join(", ")
                ))
            })?)
        };

        let mut descriptor = match &wheel {
            Some(wheel) => {
                let mut d = ArtifactDescriptor::universal(&wheel.name, &wheel.version);
                d.abi = wheel.interpreter_abi();
                if !wheel.is_universal() {
                    d.platform = wheel.platform_tags.first().cloned();
                    if wheel.platform_tags.len() > 1 {
                        d.fallback_platforms = wheel.platform_tags.clone();
                    }
                }
                d
            }
            None => ArtifactDescriptor::universal(&self.package, version),
        };

        if !self.index_hints {
            descriptor.url = Some(entry.url.clone());
            descriptor.digest = digest;
            descriptor.file_name = Some(file_name);
        }

        Ok(Some(descriptor))
    }
}

impl Locator for ManifestLocator {
    fn locate(&self, target: TargetPlatform, version: &str) -> Result<Vec<ArtifactDescriptor>> {
        let (key, entries) = self.manifest.entries_for(target).ok_or_else(|| {
            AcquireError::Configuration(format!(
                "manifest has no '{}' or 'any' artifacts",
                target.manifest_key()
            ))
        })?;

        if entries.is_empty() {
            return Err(AcquireError::Configuration(format!(
                "manifest lists no artifacts under '{key}'"
            )));
        }

        let mut descriptors = Vec::new();
        for entry in entries {
            if let Some(descriptor) = self.descriptor(entry, version)? {
                descriptors.push(descriptor);
            }
        }

        if descriptors.is_empty() {
            return Err(AcquireError::Configuration(format!(
                "manifest lists no '{key}' artifacts for version {version}"
            )));
        }

        // Stable: entries with the same ABI keep manifest order.
        descriptors.sort_by(|a, b| b.abi.cmp(&a.abi));
        Ok(descriptors)
    }
}

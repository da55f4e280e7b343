//! Artifact data model shared by locators, fetchers and the orchestrator.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::{AcquireError, Result};
use crate::verify::HashAlgorithm;

/// Binary-compatibility tag of one interpreter build, e.g. `cp312`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbiTag {
    /// Implementation prefix (`cp`, `pp`, ...)
    pub implementation: String,
    /// Version digits as pip's `--python-version` expects them (`312`)
    pub python_version: String,
    /// Full ABI tag (`cp312`)
    pub abi: String,
}

impl AbiTag {
    /// Parse an ABI tag like `cp312`. Returns None for non-interpreter tags
    /// (`none`, `abi3`, `py3`).
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        let split = tag.find(|c: char| c.is_ascii_digit())?;
        let (implementation, digits) = tag.split_at(split);
        if implementation.is_empty()
            || implementation == "py"
            || digits.len() < 2
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            implementation: implementation.to_string(),
            python_version: digits.to_string(),
            abi: tag.clone(),
        })
    }

    /// (major, minor) interpreter version; `312` -> (3, 12).
    pub fn interpreter_version(&self) -> (u32, u32) {
        let (major, minor) = self.python_version.split_at(1);
        (major.parse().unwrap_or(0), minor.parse().unwrap_or(0))
    }
}

impl Ord for AbiTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.interpreter_version()
            .cmp(&other.interpreter_version())
            .then_with(|| self.abi.cmp(&other.abi))
    }
}

impl PartialOrd for AbiTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AbiTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.abi)
    }
}

/// Expected digest of an artifact payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

impl ExpectedDigest {
    pub fn new(algorithm: HashAlgorithm, hex: impl Into<String>) -> Self {
        Self {
            algorithm,
            hex: hex.into(),
        }
    }

    /// Parse an algorithm-qualified digest, `sha256:<hex>`.
    pub fn parse(qualified: &str) -> Result<Self> {
        let (alg, hex) = qualified.split_once(':').ok_or_else(|| {
            AcquireError::Configuration(format!(
                "digest '{qualified}' is not algorithm-qualified (expected e.g. sha256:<hex>)"
            ))
        })?;
        Ok(Self::new(HashAlgorithm::parse(alg)?, hex.trim()))
    }

    /// Pick a digest from an `{ algorithm: hex }` map, strongest known first.
    ///
    /// Unknown algorithms (`md5`, `blake2b_256`) are ignored; a map holding
    /// only unknown algorithms yields None.
    pub fn from_map(map: &BTreeMap<String, String>) -> Option<Self> {
        HashAlgorithm::PREFERENCE.iter().find_map(|alg| {
            map.iter()
                .find(|(name, _)| HashAlgorithm::parse(name).ok() == Some(*alg))
                .map(|(_, hex)| Self::new(*alg, hex.trim()))
        })
    }
}

impl fmt::Display for ExpectedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.key(), self.hex)
    }
}

/// One candidate artifact for a package/version/ABI/platform combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub package: String,
    pub version: String,
    pub abi: Option<AbiTag>,
    /// Platform tag this descriptor targets, when exactly one is known
    pub platform: Option<String>,
    /// Platform tags to try in order against an index, most specific first
    pub fallback_platforms: Vec<String>,
    pub url: Option<String>,
    pub digest: Option<ExpectedDigest>,
    pub file_name: Option<String>,
}

impl ArtifactDescriptor {
    /// Descriptor with no targeting at all (the universal "any" artifact).
    pub fn universal(package: &str, version: &str) -> Self {
        Self {
            package: package.to_string(),
            version: version.to_string(),
            abi: None,
            platform: None,
            fallback_platforms: Vec::new(),
            url: None,
            digest: None,
            file_name: None,
        }
    }

    /// True when this descriptor asks for no interpreter/platform targeting.
    pub fn is_universal(&self) -> bool {
        self.abi.is_none() && self.platform.is_none() && self.fallback_platforms.is_empty()
    }

    /// Platform tags an index-mediated fetch should try, in order.
    pub fn platform_attempts(&self) -> Vec<Option<String>> {
        if !self.fallback_platforms.is_empty() {
            self.fallback_platforms.iter().cloned().map(Some).collect()
        } else {
            vec![self.platform.clone()]
        }
    }

    /// Pinned requirement string, `debugpy==1.8.19`.
    pub fn requirement(&self) -> String {
        format!("{}=={}", self.package, self.version)
    }

    /// Human-readable label used in progress output and errors.
    pub fn label(&self) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        match (&self.abi, &self.platform) {
            (Some(abi), Some(platform)) => format!("{} ({abi}, {platform})", self.requirement()),
            (Some(abi), None) => format!("{} ({abi})", self.requirement()),
            (None, Some(platform)) => format!("{} ({platform})", self.requirement()),
            (None, None) => self.requirement(),
        }
    }
}

/// Raw payload obtained by a fetch strategy.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// The descriptor, with `platform` set to the tag that actually resolved
    pub descriptor: ArtifactDescriptor,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

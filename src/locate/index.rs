//! Package index JSON API
//!
//! `GET {index}/pypi/{package}/json` returns every release with its files:
//!
//! ```json
//! { "releases": { "1.8.19": [ { "filename": "...", "url": "...",
//!                               "digests": { "sha256": "..." }, "yanked": false } ] } }
//! ```
//!
//! `latest` resolves to the maximum release by semantic-version ordering.
//! Release strings are normalized first (`1.8` is `1.8.0`, `1.9.0b1` is the
//! prerelease `1.9.0-beta.1`); strings that do not normalize are ignored.

use std::collections::{BTreeMap, HashSet};

use semver::Version;
use serde::Deserialize;

use super::Locator;
use crate::artifact::{AbiTag, ArtifactDescriptor, ExpectedDigest};
use crate::core::error::{AcquireError, Result};
use crate::core::output;
use crate::internal::url_utils;
use crate::platform::{PlatformProfile, ProfileEntry, TargetPlatform, WheelName};

/// One file of a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub digests: BTreeMap<String, String>,
    #[serde(default)]
    pub yanked: bool,
}

/// Release listing of one project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectReleases {
    #[serde(default)]
    pub releases: BTreeMap<String, Vec<ReleaseFile>>,
}

impl ProjectReleases {
    /// Resolve `latest` (or an empty string) to the newest release that has
    /// files; any other version must exist verbatim.
    pub fn resolve_version(&self, requested: &str) -> Result<String> {
        let requested = requested.trim();
        if !requested.is_empty() && !requested.eq_ignore_ascii_case("latest") {
            return if self.releases.contains_key(requested) {
                Ok(requested.to_string())
            } else {
                Err(AcquireError::Configuration(format!(
                    "release {requested} not found on the package index"
                )))
            };
        }

        self.releases
            .iter()
            .filter(|(_, files)| !files.is_empty())
            .filter_map(|(raw, _)| parse_release_version(raw).map(|v| (v, raw)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, raw)| raw.clone())
            .ok_or_else(|| {
                AcquireError::Configuration("package index lists no usable releases".to_string())
            })
    }

    pub fn files(&self, version: &str) -> &[ReleaseFile] {
        self.releases
            .get(version)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Normalize a release string to a semantic version.
///
/// Handles missing components (`1.8`), a leading `v`, and the common
/// prerelease and post-release suffixes (`a1`, `b2`, `rc1`, `.dev0`, `.post1`).
///
/// Ordering follows release semantics: `dev` sorts below `a`, `b` and `rc`
/// (its prerelease starts with the numeric identifier `0`), and release
/// components past the third go into build metadata after any `post`, so
/// `1.8.19 < 1.8.19.post1 < 1.8.19.1`.
pub fn parse_release_version(raw: &str) -> Option<Version> {
    let s = raw.trim().trim_start_matches(['v', 'V']);
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (numeric, suffix) = s.split_at(split);
    let numeric = numeric.trim_end_matches('.');

    let parts: Vec<&str> = numeric.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let mut core: Vec<&str> = parts.iter().take(3).copied().collect();
    core.resize(3, "0");
    let core = core.join(".");

    let mut extra: Vec<&str> = parts.iter().skip(3).copied().collect();
    while extra.last().is_some_and(|p| p.bytes().all(|b| b == b'0')) {
        extra.pop();
    }

    let suffix = suffix.trim_start_matches(['-', '_', '.']).to_ascii_lowercase();
    let mut pre = None;
    let mut build = Vec::new();

    if !suffix.is_empty() {
        let digits_at = suffix
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(suffix.len());
        let (label, number) = suffix.split_at(digits_at);
        let label = label.trim_end_matches(['-', '_', '.']);
        let number = if number.is_empty() { "0" } else { number };
        if !number.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        match label {
            "dev" => pre = Some(format!("0.dev.{number}")),
            "a" | "alpha" => pre = Some(format!("alpha.{number}")),
            "b" | "beta" => pre = Some(format!("beta.{number}")),
            "c" | "rc" | "pre" | "preview" => pre = Some(format!("rc.{number}")),
            "post" | "r" | "rev" => build.push(format!("post.{number}")),
            _ => return None,
        }
    }

    if !extra.is_empty() {
        // "rel" sorts after "post" and longer identifier lists after shorter.
        let mut ids = vec!["rel".to_string()];
        ids.extend(extra.iter().map(|p| p.to_string()));
        if let Some(post) = build.pop() {
            ids.push(post);
        }
        build.push(ids.join("."));
    }

    let mut full = core;
    if let Some(pre) = pre {
        full.push('-');
        full.push_str(&pre);
    }
    if !build.is_empty() {
        full.push('+');
        full.push_str(&build.join("."));
    }
    Version::parse(&full).ok()
}

/// Blocking client for one project's JSON API document.
#[derive(Clone)]
pub struct IndexClient {
    agent: ureq::Agent,
    pub index_url: String,
    pub package: String,
}

impl IndexClient {
    pub fn new(agent: ureq::Agent, index_url: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            agent,
            index_url: index_url.into(),
            package: package.into(),
        }
    }

    pub fn project_url(&self) -> String {
        url_utils::join_url(&self.index_url, &format!("pypi/{}/json", self.package))
    }

    /// Fetch the project's release listing.
    pub fn releases(&self) -> Result<ProjectReleases> {
        let url = self.project_url();
        let response = self.agent.get(&url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => AcquireError::network(&url, format!("HTTP {code}")),
            ureq::Error::Transport(t) => AcquireError::network(&url, t.to_string()),
        })?;
        response
            .into_json::<ProjectReleases>()
            .map_err(|e| AcquireError::network(&url, format!("invalid index response: {e}")))
    }

    /// Resolve `latest` against the index; pinned versions pass through.
    pub fn resolve_version(&self, requested: &str) -> Result<String> {
        if is_latest(requested) {
            self.releases()?.resolve_version(requested)
        } else {
            Ok(requested.trim().to_string())
        }
    }
}

pub(crate) fn is_latest(version: &str) -> bool {
    let v = version.trim();
    v.is_empty() || v.eq_ignore_ascii_case("latest")
}

/// Locator that selects release files from the live index.
#[derive(Clone)]
pub struct IndexLocator {
    pub client: IndexClient,
    pub abis: Vec<AbiTag>,
}

impl IndexLocator {
    pub fn new(client: IndexClient, abis: Vec<AbiTag>) -> Self {
        Self { client, abis }
    }

    /// Locate against an already fetched release listing.
    pub fn locate_in(
        &self,
        releases: &ProjectReleases,
        target: TargetPlatform,
        version: &str,
    ) -> Result<Vec<ArtifactDescriptor>> {
        let version = releases.resolve_version(version)?;
        let files = releases.files(&version);
        let profile = PlatformProfile::builtin(target, &self.abis);

        let mut seen = HashSet::new();
        let mut descriptors = Vec::new();
        for entry in &profile.entries {
            let Some((file, wheel, tag)) = best_file(&self.client.package, target, entry, files)
            else {
                if let Some(abi) = &entry.abi {
                    output::warning(&format!(
                        "no {} {} wheel for {abi} on the package index",
                        self.client.package, version
                    ));
                }
                continue;
            };
            if !seen.insert(file.url.clone()) {
                continue;
            }

            let mut d = ArtifactDescriptor::universal(&wheel.name, &version);
            d.abi = entry.abi.clone();
            d.platform = tag;
            d.url = Some(file.url.clone());
            d.digest = ExpectedDigest::from_map(&file.digests);
            d.file_name = Some(file.filename.clone());
            descriptors.push(d);
        }

        if descriptors.is_empty() {
            return Err(AcquireError::Configuration(format!(
                "package index has no {} {} wheels for target {}",
                self.client.package, version, target
            )));
        }
        Ok(descriptors)
    }
}

impl Locator for IndexLocator {
    fn locate(&self, target: TargetPlatform, version: &str) -> Result<Vec<ArtifactDescriptor>> {
        let releases = self.client.releases()?;
        self.locate_in(&releases, target, version)
    }
}

/// Best non-yanked file for a profile entry, with the platform tag it matched.
fn best_file<'a>(
    package: &str,
    target: TargetPlatform,
    entry: &ProfileEntry,
    files: &'a [ReleaseFile],
) -> Option<(&'a ReleaseFile, WheelName, Option<String>)> {
    let mut best: Option<(usize, &ReleaseFile, WheelName, Option<String>)> = None;

    for file in files.iter().filter(|f| !f.yanked) {
        let Some(wheel) = WheelName::parse(&file.filename) else {
            continue;
        };
        if !wheel.is_for_package(package) {
            continue;
        }

        let ranked = match &entry.abi {
            None => wheel.is_universal().then_some((0, None)),
            Some(abi) => {
                if !wheel.abi_tags.iter().any(|t| t.eq_ignore_ascii_case(&abi.abi)) {
                    continue;
                }
                wheel
                    .platform_tags
                    .iter()
                    .filter_map(|tag| {
                        entry
                            .rank_platform_tag(target, tag)
                            .map(|rank| (rank, Some(tag.clone())))
                    })
                    .min_by_key(|(rank, _)| *rank)
            }
        };

        if let Some((rank, tag)) = ranked
            && best.as_ref().is_none_or(|(best_rank, ..)| rank < *best_rank)
        {
            best = Some((rank, file, wheel, tag));
        }
    }

    best.map(|(_, file, wheel, tag)| (file, wheel, tag))
}

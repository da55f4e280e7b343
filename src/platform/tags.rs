//! Wheel filename parsing
//!
//! `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`, where each of
//! the last three fields may be a compressed tag set joined by `.`
//! (`py2.py3`, `manylinux_2_17_x86_64.manylinux2014_x86_64`).

use crate::artifact::AbiTag;

/// Parsed components of a wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    pub name: String,
    pub version: String,
    pub build: Option<String>,
    pub python_tags: Vec<String>,
    pub abi_tags: Vec<String>,
    pub platform_tags: Vec<String>,
}

impl WheelName {
    /// Parse a wheel filename or a URL ending in one.
    pub fn parse(file_name_or_url: &str) -> Option<Self> {
        let file_name = file_name_or_url
            .split(['?', '#'])
            .next()
            .unwrap_or(file_name_or_url)
            .rsplit('/')
            .next()?;
        let stem = file_name.strip_suffix(".whl")?;
        let parts: Vec<&str> = stem.split('-').collect();

        let (name, version, build, py, abi, plat) = match parts.as_slice() {
            [name, version, py, abi, plat] => (*name, *version, None, *py, *abi, *plat),
            [name, version, build, py, abi, plat] => {
                (*name, *version, Some(build.to_string()), *py, *abi, *plat)
            }
            _ => return None,
        };

        if name.is_empty() || version.is_empty() {
            return None;
        }

        let split = |s: &str| s.split('.').map(str::to_string).collect::<Vec<_>>();
        Some(Self {
            name: name.to_string(),
            version: version.to_string(),
            build,
            python_tags: split(py),
            abi_tags: split(abi),
            platform_tags: split(plat),
        })
    }

    /// First interpreter-specific ABI tag (`cp312`), if the wheel has one.
    pub fn interpreter_abi(&self) -> Option<AbiTag> {
        self.abi_tags.iter().find_map(|t| AbiTag::parse(t))
    }

    /// True for pure wheels (`py3-none-any`).
    pub fn is_universal(&self) -> bool {
        self.abi_tags.iter().any(|t| t == "none") && self.platform_tags.iter().any(|t| t == "any")
    }

    /// Whether this wheel belongs to `package`, comparing normalized names.
    pub fn is_for_package(&self, package: &str) -> bool {
        normalize_name(&self.name) == normalize_name(package)
    }
}

/// Normalize a distribution name: lowercase, runs of `-_.` become `_`.
///
/// Wheel filenames use `_` where project names may use `-` or `.`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !prev_sep {
                out.push('_');
            }
            prev_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            prev_sep = false;
        }
    }
    out
}

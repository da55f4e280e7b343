//! Index-mediated fetch through the package tool
//!
//! `python -m pip download {package}=={version} --no-deps --only-binary :all:
//! --dest {scratch}` plus, when the descriptor is targeted,
//! `--python-version --implementation --abi --platform`. The universal
//! descriptor gets no targeting flags at all.
//!
//! Each attempt downloads into its own scratch directory so a wheel left over
//! from an earlier tag can never be mistaken for the current one.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::artifact::{AbiTag, ArtifactDescriptor, DownloadResult};
use crate::core::error::{AcquireError, Result};
use crate::core::output;
use crate::internal::progress::{self, ProgressGuard};
use crate::platform::WheelName;

use super::FetchStrategy;

/// Interpreter and platform targeting for one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targeting {
    pub abi: Option<AbiTag>,
    pub platform: Option<String>,
}

/// Everything the package tool needs for one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipRequest {
    pub package: String,
    pub version: String,
    pub targeting: Option<Targeting>,
    pub extra_args: Vec<String>,
}

impl PipRequest {
    pub fn requirement(&self) -> String {
        format!("{}=={}", self.package, self.version)
    }

    /// Arguments after `python -m pip`.
    pub fn args(&self, dest: &Path) -> Vec<String> {
        let mut args = vec![
            "download".to_string(),
            self.requirement(),
            "--no-deps".to_string(),
            "--only-binary".to_string(),
            ":all:".to_string(),
            "--dest".to_string(),
            dest.to_string_lossy().to_string(),
        ];

        if let Some(targeting) = &self.targeting {
            if let Some(abi) = &targeting.abi {
                args.extend([
                    "--python-version".to_string(),
                    abi.python_version.clone(),
                    "--implementation".to_string(),
                    abi.implementation.clone(),
                    "--abi".to_string(),
                    abi.abi.clone(),
                ]);
            }
            if let Some(platform) = &targeting.platform {
                args.extend(["--platform".to_string(), platform.clone()]);
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// The external tool that performs index-mediated downloads.
///
/// On failure the error is the tool's own reason (typically its stderr).
pub trait PackageTool {
    fn download(&self, request: &PipRequest, dest: &Path) -> std::result::Result<(), String>;
}

impl<T: PackageTool + ?Sized> PackageTool for &T {
    fn download(&self, request: &PipRequest, dest: &Path) -> std::result::Result<(), String> {
        (**self).download(request, dest)
    }
}

/// `python -m pip` as a subprocess.
#[derive(Debug, Clone)]
pub struct PipCommand {
    pub python: String,
}

impl PipCommand {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl PackageTool for PipCommand {
    fn download(&self, request: &PipRequest, dest: &Path) -> std::result::Result<(), String> {
        let pb = progress::create_spinner(&format!("pip download {}", request.requirement()));
        let _guard = ProgressGuard::new(&pb);

        let result = Command::new(&self.python)
            .args(["-m", "pip"])
            .args(request.args(dest))
            .output()
            .map_err(|e| format!("cannot run {}: {}", self.python, e))?;

        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        let reason = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .next_back()
            .map(str::to_string)
            .unwrap_or_else(|| format!("pip exited with {}", result.status));
        Err(reason)
    }
}

/// Fetch strategy delegating to a [`PackageTool`].
pub struct IndexFetch<T: PackageTool> {
    pub tool: T,
    pub extra_args: Vec<String>,
}

impl<T: PackageTool> IndexFetch<T> {
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    fn request(&self, descriptor: &ArtifactDescriptor, platform: Option<&str>) -> PipRequest {
        let targeting = if descriptor.abi.is_none() && platform.is_none() {
            None
        } else {
            Some(Targeting {
                abi: descriptor.abi.clone(),
                platform: platform.map(str::to_string),
            })
        };
        PipRequest {
            package: descriptor.package.clone(),
            version: descriptor.version.clone(),
            targeting,
            extra_args: self.extra_args.clone(),
        }
    }

    /// One download into a fresh scratch directory.
    fn attempt(
        &self,
        descriptor: &ArtifactDescriptor,
        platform: Option<&str>,
    ) -> std::result::Result<(String, Vec<u8>), String> {
        let scratch = tempfile::Builder::new()
            .prefix("wheel_acquire_")
            .tempdir()
            .map_err(|e| format!("cannot create scratch directory: {e}"))?;

        let request = self.request(descriptor, platform);
        self.tool.download(&request, scratch.path())?;

        let wheel = find_wheel(scratch.path(), &descriptor.package)?.ok_or_else(|| {
            format!(
                "package tool reported success but produced no {} wheel",
                descriptor.package
            )
        })?;

        let file_name = wheel
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let bytes = std::fs::read(&wheel)
            .map_err(|e| format!("cannot read {}: {}", wheel.display(), e))?;
        Ok((file_name, bytes))
    }
}

/// First wheel for `package` in `dir`, by file name order.
fn find_wheel(dir: &Path, package: &str) -> std::result::Result<Option<PathBuf>, String> {
    let pattern = format!("{}/*.whl", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut wheels: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| format!("invalid glob pattern: {e}"))?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            path.file_name()
                .and_then(|n| WheelName::parse(&n.to_string_lossy()))
                .is_some_and(|w| w.is_for_package(package))
        })
        .collect();
    wheels.sort();
    Ok(wheels.into_iter().next())
}

impl<T: PackageTool> FetchStrategy for IndexFetch<T> {
    fn fetch(&self, descriptor: &ArtifactDescriptor) -> Result<DownloadResult> {
        let attempts = descriptor.platform_attempts();
        let total = attempts.len();
        let mut last_failure: Option<(Option<String>, String)> = None;

        for (i, platform) in attempts.into_iter().enumerate() {
            match &platform {
                Some(tag) => output::sub_action(&format!("trying {tag}")),
                None => output::sub_action(&format!("resolving {}", descriptor.requirement())),
            }

            match self.attempt(descriptor, platform.as_deref()) {
                Ok((file_name, bytes)) => {
                    output::detail(&format!("resolved {} ({} bytes)", file_name, bytes.len()));
                    let mut resolved = descriptor.clone();
                    resolved.platform = platform;
                    resolved.fallback_platforms.clear();
                    resolved.file_name = Some(file_name.clone());
                    return Ok(DownloadResult {
                        descriptor: resolved,
                        file_name,
                        bytes,
                    });
                }
                Err(reason) => {
                    if i + 1 < total {
                        output::detail(&format!("not available: {reason}"));
                    }
                    last_failure = Some((platform, reason));
                }
            }
        }

        let (tag, reason) =
            last_failure.unwrap_or_else(|| (None, "no platform tags to try".to_string()));
        Err(AcquireError::Fetch {
            artifact: descriptor.label(),
            tag,
            reason,
        })
    }
}

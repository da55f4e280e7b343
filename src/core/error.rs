//! Acquisition error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while acquiring artifacts.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("could not resolve {artifact}{}: {reason}", last_tag(.tag))]
    Fetch {
        artifact: String,
        tag: Option<String>,
        reason: String,
    },

    #[error("{algorithm} integrity check failed for '{artifact}'\n  expected: {expected}\n  got:      {actual}")]
    Integrity {
        artifact: String,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    #[error("archive error in {artifact}: {reason}")]
    Archive { artifact: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "destination '{}' is already being populated by another process. \
         If this is incorrect, delete the lock file next to it",
        .path.display()
    )]
    DestinationBusy { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    pub(crate) fn archive(artifact: &str, reason: impl Into<String>) -> Self {
        Self::Archive {
            artifact: artifact.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn network(url: &str, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

fn last_tag(tag: &Option<String>) -> String {
    match tag {
        Some(t) => format!(" (last tag tried: {t})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, AcquireError>;

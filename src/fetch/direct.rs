//! Direct HTTP fetch of a descriptor's URL

use std::io::Read;

use crate::artifact::{ArtifactDescriptor, DownloadResult};
use crate::core::error::{AcquireError, Result};
use crate::core::output;
use crate::internal::progress::{self, ProgressGuard, upgrade_to_bytes};
use crate::internal::url_utils;

use super::FetchStrategy;

/// Downloads an artifact straight from its URL.
#[derive(Clone)]
pub struct DirectFetch {
    agent: ureq::Agent,
}

impl DirectFetch {
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn download(&self, url: &str, file_name: &str) -> Result<Vec<u8>> {
        let pb = progress::create_spinner(&format!("downloading {file_name}"));
        let _guard = ProgressGuard::new(&pb);

        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => AcquireError::network(url, format!("HTTP {code}")),
            ureq::Error::Transport(t) => AcquireError::network(url, t.to_string()),
        })?;

        let expected_len = response
            .header("content-length")
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(len) = expected_len {
            upgrade_to_bytes(&pb, len);
        }

        let mut bytes = Vec::with_capacity(expected_len.unwrap_or(0).min(64 << 20) as usize);
        let mut reader = response.into_reader();
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| AcquireError::network(url, format!("read error: {e}")))?;

            if bytes_read == 0 {
                break;
            }

            bytes.extend_from_slice(&buffer[..bytes_read]);
            pb.set_position(bytes.len() as u64);
        }

        Ok(bytes)
    }
}

impl FetchStrategy for DirectFetch {
    fn fetch(&self, descriptor: &ArtifactDescriptor) -> Result<DownloadResult> {
        let url = descriptor.url.as_deref().ok_or_else(|| {
            AcquireError::Configuration(format!("{} has no source URL", descriptor.label()))
        })?;

        if !url_utils::is_http_url(url) {
            return Err(AcquireError::network(
                url,
                "only http:// and https:// URLs can be fetched",
            ));
        }

        let file_name = descriptor
            .file_name
            .clone()
            .unwrap_or_else(|| url_utils::extract_filename(url));

        output::sub_action(&format!("downloading {url}"));
        let bytes = self.download(url, &file_name)?;
        output::detail(&format!("downloaded {} ({} bytes)", file_name, bytes.len()));

        Ok(DownloadResult {
            descriptor: descriptor.clone(),
            file_name,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> DirectFetch {
        DirectFetch::new(ureq::AgentBuilder::new().build())
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut d = ArtifactDescriptor::universal("debugpy", "1.8.19");
        d.url = Some("file:///tmp/debugpy.whl".to_string());

        let err = fetcher().fetch(&d).unwrap_err();
        assert!(matches!(err, AcquireError::Network { .. }));
        assert!(err.to_string().contains("only http"));
    }

    #[test]
    fn test_requires_url() {
        let d = ArtifactDescriptor::universal("debugpy", "1.8.19");
        assert!(matches!(
            fetcher().fetch(&d).unwrap_err(),
            AcquireError::Configuration(_)
        ));
    }
}

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;
use url::Url;

use super::errors::{transport_issue, BootstrapIssue};
use crate::core::net::build_http_client;

/// Source of release archive bytes.
pub trait ReleaseTransport: Send + Sync {
    /// Opens a byte stream for `url`.
    ///
    /// # Errors
    /// Returns an error if the resource cannot be reached.
    fn open(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// Reads `file://` URLs and plain paths from disk; everything else goes over HTTP.
#[derive(Clone, Debug)]
pub struct SystemTransport {
    online: bool,
}

impl SystemTransport {
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self { online }
    }
}

impl ReleaseTransport for SystemTransport {
    fn open(&self, url: &str) -> Result<Box<dyn Read>> {
        if let Some(path) = local_path(url) {
            debug!(path = %path.display(), "reading release archive from disk");
            let file = File::open(&path).map_err(|err| transport_issue(url)(err.to_string()))?;
            return Ok(Box::new(file));
        }
        if !self.online {
            return Err(BootstrapIssue::Offline {
                url: url.to_string(),
            }
            .into());
        }
        let client = build_http_client()?;
        let response = client
            .get(url)
            .send()
            .map_err(|err| transport_issue(url)(err.to_string()))?
            .error_for_status()
            .map_err(|err| transport_issue(url)(err.to_string()))?;
        Ok(Box::new(response))
    }
}

fn local_path(url: &str) -> Option<PathBuf> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed.to_file_path().ok(),
        // Single-letter schemes are Windows drive letters.
        Ok(parsed) if parsed.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(url)),
    }
}

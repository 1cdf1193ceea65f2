use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use anyhow::Result;
use jmlup_domain::ReleaseSpec;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::errors::{find_issue, fs_issue, transport_issue, BootstrapIssue};
use super::transport::ReleaseTransport;
use super::StageOutcome;
use crate::core::fs::{path_exists, persist_file, stage_file};

pub(crate) const DOWNLOAD_ATTEMPTS: usize = 3;

struct Download {
    file: NamedTempFile,
    sha256: String,
    bytes: u64,
}

/// Downloads `release` to `target` unless a file is already there.
///
/// Bytes land in a temporary sibling that is renamed onto `target` only once the stream is
/// complete and, when `expected_sha256` is given, its digest matches.
///
/// # Errors
/// Returns an error if the download fails after all attempts, the digest does not match, or
/// the archive cannot be written.
pub fn fetch_release(
    transport: &dyn ReleaseTransport,
    release: &ReleaseSpec,
    target: &Path,
    expected_sha256: Option<&str>,
) -> Result<StageOutcome> {
    if path_exists(target) {
        info!(
            archive = %target.display(),
            "release archive already present; no need to download"
        );
        return Ok(StageOutcome::Skipped);
    }

    let url = release.download_url();
    info!(version = release.version(), %url, "downloading release archive");
    let mut attempt = 1;
    let download = loop {
        match download_once(transport, &url, target) {
            Ok(download) => break download,
            Err(err) if attempt < DOWNLOAD_ATTEMPTS && is_transport_failure(&err) => {
                warn!(attempt, %url, error = %err, "download failed; retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    };

    if let Some(expected) = expected_sha256 {
        let expected = expected.trim().to_ascii_lowercase();
        if download.sha256 != expected {
            return Err(BootstrapIssue::ChecksumMismatch {
                url,
                expected,
                actual: download.sha256,
            }
            .into());
        }
    }

    debug!(bytes = download.bytes, sha256 = %download.sha256, "download complete");
    persist_file(download.file, target)?;
    info!(archive = %target.display(), "release archive downloaded");
    Ok(StageOutcome::Performed)
}

fn download_once(transport: &dyn ReleaseTransport, url: &str, target: &Path) -> Result<Download> {
    let mut reader = transport.open(url)?;
    let mut file = stage_file(target)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; 64 * 1024];
    let mut bytes = 0_u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(transport_issue(url)(err.to_string()).into()),
        };
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        file.write_all(&buffer[..read])
            .map_err(fs_issue("write", file.path()))?;
        bytes += read as u64;
    }
    if bytes == 0 {
        return Err(transport_issue(url)("empty response body".to_string()).into());
    }
    Ok(Download {
        file,
        sha256: hex::encode(hasher.finalize()),
        bytes,
    })
}

fn is_transport_failure(err: &anyhow::Error) -> bool {
    matches!(find_issue(err), Some(BootstrapIssue::Transport { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{self, Cursor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use httptest::{matchers::*, responders::*, Expectation, Server};

    use crate::core::bootstrap::transport::SystemTransport;

    /// Serves canned responses in order and counts how often it was asked.
    struct ScriptedTransport {
        responses: Mutex<Vec<io::Result<Vec<u8>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "connection reset"))
        }
    }

    impl ReleaseTransport for ScriptedTransport {
        fn open(&self, _url: &str) -> Result<Box<dyn Read>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().expect("responses").remove(0);
            match next {
                Ok(bytes) => Ok(Box::new(Cursor::new(bytes))),
                Err(_) => Ok(Box::new(FailingReader)),
            }
        }
    }

    fn release() -> ReleaseSpec {
        ReleaseSpec::new("v1", "https://example.invalid/{version}/openjml-{version}.zip")
            .expect("release")
    }

    #[test]
    fn existing_archive_skips_the_network() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("openjml.zip");
        fs::write(&target, b"")?;
        let transport = ScriptedTransport::new(Vec::new());

        let outcome = fetch_release(&transport, &release(), &target, None)?;

        assert_eq!(outcome, StageOutcome::Skipped);
        assert_eq!(transport.calls(), 0);
        Ok(())
    }

    #[test]
    fn interrupted_stream_leaves_no_archive_and_is_retried() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("dl").join("openjml.zip");
        let transport = ScriptedTransport::new(vec![
            Err(io::Error::other("reset")),
            Ok(b"archive-bytes".to_vec()),
        ]);

        let outcome = fetch_release(&transport, &release(), &target, None)?;

        assert_eq!(outcome, StageOutcome::Performed);
        assert_eq!(transport.calls(), 2);
        assert_eq!(fs::read(&target)?, b"archive-bytes");
        let entries: Vec<_> = fs::read_dir(target.parent().expect("parent"))?
            .flatten()
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("openjml.zip")]);
        Ok(())
    }

    #[test]
    fn persistent_failure_gives_up_without_marker() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("openjml.zip");
        let transport = ScriptedTransport::new(
            (0..DOWNLOAD_ATTEMPTS)
                .map(|_| Err(io::Error::other("reset")))
                .collect(),
        );

        let err = fetch_release(&transport, &release(), &target, None).unwrap_err();

        assert!(is_transport_failure(&err));
        assert_eq!(transport.calls(), DOWNLOAD_ATTEMPTS);
        assert!(!target.exists(), "failed download must not count as fetched");
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("openjml.zip");
        let transport = ScriptedTransport::new(vec![Ok(b"tampered".to_vec())]);

        let err = fetch_release(&transport, &release(), &target, Some(&"0".repeat(64)))
            .unwrap_err();

        assert!(matches!(
            find_issue(&err),
            Some(BootstrapIssue::ChecksumMismatch { .. })
        ));
        assert!(!target.exists());
    }

    #[test]
    fn matching_checksum_is_accepted_case_insensitively() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("openjml.zip");
        let digest = hex::encode(Sha256::digest(b"archive")).to_ascii_uppercase();
        let transport = ScriptedTransport::new(vec![Ok(b"archive".to_vec())]);

        fetch_release(&transport, &release(), &target, Some(&digest))?;

        assert_eq!(fs::read(&target)?, b"archive");
        Ok(())
    }

    #[test]
    fn downloads_over_http_once() -> Result<()> {
        let server = match std::panic::catch_unwind(Server::run) {
            Ok(server) => server,
            Err(_) => {
                eprintln!("skipping http fetch test (httptest server unavailable)");
                return Ok(());
            }
        };
        server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/releases/download/v1/openjml-v1.zip",
            ))
            .times(1)
            .respond_with(status_code(200).body("zip-bytes")),
        );
        let template = server.url_str("/releases/download/{version}/openjml-{version}.zip");
        let release = ReleaseSpec::new("v1", template)?;
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("openjml.zip");
        let transport = SystemTransport::new(true);

        assert_eq!(
            fetch_release(&transport, &release, &target, None)?,
            StageOutcome::Performed
        );
        assert_eq!(
            fetch_release(&transport, &release, &target, None)?,
            StageOutcome::Skipped
        );
        assert_eq!(fs::read(&target)?, b"zip-bytes");
        Ok(())
    }

    #[test]
    fn http_error_status_is_a_transport_failure() -> Result<()> {
        let server = match std::panic::catch_unwind(Server::run) {
            Ok(server) => server,
            Err(_) => {
                eprintln!("skipping http status test (httptest server unavailable)");
                return Ok(());
            }
        };
        server.expect(
            Expectation::matching(request::method("GET"))
                .times(DOWNLOAD_ATTEMPTS)
                .respond_with(status_code(404)),
        );
        let release = ReleaseSpec::new("v1", server.url_str("/{version}.zip"))?;
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("openjml.zip");

        let err = fetch_release(&SystemTransport::new(true), &release, &target, None)
            .unwrap_err();

        assert!(is_transport_failure(&err));
        assert!(!target.exists());
        Ok(())
    }
}

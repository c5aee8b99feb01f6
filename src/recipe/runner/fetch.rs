// src/recipe/runner/fetch.rs

//! Source acquisition: archive downloads and head checkouts
//!
//! Fetches are attempted once. Retrying is left to whoever invokes the
//! runner.

use crate::error::{Error, Result};
use crate::recipe::format::HeadSource;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for HTTP downloads (5 minutes)
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for obtaining recipe sources
///
/// The runner goes through this seam for every network or VCS access, so
/// alternative transports (mirrors, vendored trees) can be plugged in.
pub trait SourceFetcher: Send + Sync {
    /// Download the archive at `url` to `dest`
    fn fetch_archive(&self, url: &str, dest: &Path) -> Result<()>;

    /// Check out the head revision of `head` into the (not yet existing) `dest`
    fn checkout(&self, head: &HeadSource, dest: &Path) -> Result<()>;
}

/// Default fetcher: reqwest for http(s), plain copies for local files, git for heads
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    timeout: Duration,
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self {
            timeout: HTTP_TIMEOUT,
        }
    }
}

impl DefaultFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {e}")))?;

        let mut response = client
            .get(url)
            .send()
            .map_err(|e| Error::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!("HTTP {} from {}", response.status(), url)));
        }

        let mut file = File::create(dest)?;
        let bytes = io::copy(&mut response, &mut file)
            .map_err(|e| Error::Fetch(format!("Failed to read response from {}: {}", url, e)))?;

        debug!("Downloaded {} bytes from {}", bytes, url);
        Ok(())
    }
}

impl SourceFetcher for DefaultFetcher {
    fn fetch_archive(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading: {}", url);

        match classify(url)? {
            Location::Remote => self.download(url, dest),
            Location::Local(path) => {
                fs::copy(&path, dest).map_err(|e| {
                    Error::Fetch(format!("Failed to copy {}: {}", path.display(), e))
                })?;
                Ok(())
            }
        }
    }

    fn checkout(&self, head: &HeadSource, dest: &Path) -> Result<()> {
        info!("Checking out head: {}", head.url);

        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1"]);
        if let Some(branch) = &head.branch {
            cmd.args(["--branch", branch]);
        }
        cmd.arg(&head.url).arg(dest).stdin(Stdio::null());

        let output = cmd
            .output()
            .map_err(|e| Error::Fetch(format!("git failed: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Fetch(format!(
                "Failed to clone {}: {}",
                head.url,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

enum Location {
    Remote,
    Local(PathBuf),
}

/// Decide how a source URL is reached
fn classify(source: &str) -> Result<Location> {
    match Url::parse(source) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(Location::Remote),
            "file" => url
                .to_file_path()
                .map(Location::Local)
                .map_err(|_| Error::Fetch(format!("Invalid file URL: {}", source))),
            scheme => Err(Error::Fetch(format!(
                "Unsupported URL scheme {} in {}",
                scheme, source
            ))),
        },
        // Relative or absolute filesystem paths do not parse as URLs
        Err(_) => Ok(Location::Local(PathBuf::from(source))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(matches!(classify("https://example.com/a.tar.gz"), Ok(Location::Remote)));
        assert!(matches!(classify("http://example.com/a.tar.gz"), Ok(Location::Remote)));
        assert!(matches!(
            classify("file:///srv/src/a.tar.gz"),
            Ok(Location::Local(p)) if p == Path::new("/srv/src/a.tar.gz")
        ));
        assert!(matches!(
            classify("/srv/src/a.tar.gz"),
            Ok(Location::Local(p)) if p == Path::new("/srv/src/a.tar.gz")
        ));
        assert!(matches!(classify("ftp://example.com/a.tar.gz"), Err(Error::Fetch(_))));
    }

    #[test]
    fn test_fetch_local_archive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.tar.gz");
        fs::write(&src, b"payload").unwrap();
        let dest = dir.path().join("dest.tar.gz");

        let url = Url::from_file_path(&src).unwrap();
        DefaultFetcher::default()
            .fetch_archive(url.as_str(), &dest)
            .unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_fetch_missing_local_archive() {
        let dir = tempfile::tempdir().unwrap();
        let result = DefaultFetcher::default()
            .fetch_archive("/nonexistent/src.tar.gz", &dir.path().join("x"));
        assert!(matches!(result, Err(Error::Fetch(_))));
    }
}

// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use conary_kitchen::hash::{hash_file, HashAlgorithm};
use conary_kitchen::recipe::{HeadSource, SourceFetcher};
use conary_kitchen::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// `configure` script shipped in test tarballs.
///
/// Records its arguments and appends to the order log named by `$ORDER_LOG`.
pub const CONFIGURE_SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$@" > configure.args
echo configure >> "$ORDER_LOG"
"#;

/// Create `tool-1.0.tar.gz` in `dir` with a single top-level `tool-1.0/` directory.
pub fn make_source_tarball(dir: &Path) -> PathBuf {
    let path = dir.join("tool-1.0.tar.gz");
    let file = File::create(&path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for (name, content) in [
        ("tool-1.0/configure", CONFIGURE_SCRIPT),
        ("tool-1.0/README", "tool 1.0\n"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
    path
}

/// `sha256:<hex>` of a file
pub fn sha256_of(path: &Path) -> String {
    hash_file(path, HashAlgorithm::Sha256).unwrap().to_string()
}

/// A checksum that matches nothing the tests produce
pub fn wrong_checksum() -> String {
    format!("sha256:{}", "0".repeat(64))
}

/// Recipe text for the test tool.
///
/// `steps` and `extra` are spliced in verbatim; `order_log` is exposed both
/// as the `ORDER_LOG` build environment variable and as `%(log)s`.
pub fn tool_recipe(archive: &str, checksum: &str, order_log: &Path, steps: &str, extra: &str) -> String {
    format!(
        r#"
[package]
name = "tool"
version = "1.0"
homepage = "https://example.com/tool"

[source]
archive = '{archive}'
checksum = '{checksum}'
head = {{ url = "https://example.com/tool.git" }}

[build]
steps = {steps}
environment = {{ ORDER_LOG = '{log}' }}

[variables]
log = '{log}'

{extra}
"#,
        log = order_log.display()
    )
}

/// Lines recorded in an order log (empty if never written)
pub fn read_order(order_log: &Path) -> Vec<String> {
    fs::read_to_string(order_log)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Fetcher that never touches the network.
///
/// Checkouts materialize a tree containing the test `configure` script;
/// archive fetches fail and are counted.
#[derive(Default)]
pub struct LocalFetcher {
    pub checkouts: Mutex<Vec<String>>,
    pub archive_fetches: Mutex<usize>,
}

impl SourceFetcher for LocalFetcher {
    fn fetch_archive(&self, url: &str, _dest: &Path) -> Result<()> {
        *self.archive_fetches.lock().unwrap() += 1;
        Err(Error::Fetch(format!("unexpected archive fetch: {}", url)))
    }

    fn checkout(&self, head: &HeadSource, dest: &Path) -> Result<()> {
        self.checkouts.lock().unwrap().push(head.url.clone());
        fs::create_dir_all(dest)?;
        fs::write(dest.join("configure"), CONFIGURE_SCRIPT)?;
        Ok(())
    }
}

// src/recipe/runner/archive.rs

//! Archive and source file utilities for the runner

use crate::error::{Error, Result};
use crate::hash::{hash_file, Checksum};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use xz2::read::XzDecoder;

/// Verify a file against its declared checksum
///
/// Fails with [`Error::Integrity`] carrying both digests on mismatch.
pub fn verify_archive(path: &Path, expected: &Checksum) -> Result<()> {
    let actual = hash_file(path, expected.algorithm)?;

    if actual.value != expected.value {
        return Err(Error::Integrity {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    debug!("Checksum verified: {}", expected);
    Ok(())
}

/// Extract an archive to a destination directory
///
/// Supports: .tar.gz, .tgz, .tar.xz, .txz, .tar
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let filename = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let reader: Box<dyn Read> = if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
        Box::new(GzDecoder::new(open(archive)?))
    } else if filename.ends_with(".tar.xz") || filename.ends_with(".txz") {
        Box::new(XzDecoder::new(open(archive)?))
    } else if filename.ends_with(".tar") {
        Box::new(open(archive)?)
    } else {
        return Err(Error::Archive(format!("Unknown archive format: {}", filename)));
    };

    fs::create_dir_all(dest)?;
    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|e| Error::Archive(format!("Failed to extract {}: {}", filename, e)))?;

    debug!("Extracted {} to {}", filename, dest.display());
    Ok(())
}

/// Find the actual source directory inside an extraction directory
///
/// Archives usually carry a single top-level directory; if so that is the
/// source root, otherwise the extraction directory itself is.
pub fn locate_source_root(unpack_dir: &Path, extract_dir: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = extract_dir {
        let explicit = unpack_dir.join(dir);
        if !explicit.is_dir() {
            return Err(Error::Archive(format!(
                "extract_dir {} not found in archive",
                dir
            )));
        }
        return Ok(explicit);
    }

    let entries: Vec<_> = fs::read_dir(unpack_dir)?
        .filter_map(|e| e.ok())
        .collect();

    if entries.len() == 1 && entries[0].file_type().map(|t| t.is_dir()).unwrap_or(false) {
        return Ok(entries[0].path());
    }

    Ok(unpack_dir.to_path_buf())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

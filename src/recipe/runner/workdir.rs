// src/recipe/runner/workdir.rs

//! Scoped working directory for a single recipe run

use crate::error::Result;
use crate::recipe::format::BuildVariant;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// A resolved source tree living in a temporary directory
///
/// The directory is removed when the tree is dropped. Call [`SourceTree::keep`]
/// to retain it (e.g. for inspecting a successful build).
#[derive(Debug)]
pub struct SourceTree {
    root: TempDir,
    source_dir: PathBuf,
    variant: BuildVariant,
}

impl SourceTree {
    /// Create an empty tree under `parent` (or the system temp dir)
    pub(crate) fn create(parent: Option<&Path>, variant: BuildVariant) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("kitchen-");

        let root = match parent {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }?;

        let source_dir = root.path().join("source");
        fs::create_dir_all(&source_dir)?;
        fs::create_dir_all(root.path().join("downloads"))?;

        debug!("Work directory: {}", root.path().display());

        Ok(Self {
            root,
            source_dir,
            variant,
        })
    }

    /// Root of the temporary directory
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory the release archive is downloaded into
    pub fn downloads_dir(&self) -> PathBuf {
        self.root.path().join("downloads")
    }

    /// Directory sources are extracted or checked out into
    pub fn unpack_dir(&self) -> PathBuf {
        self.root.path().join("source")
    }

    /// The source directory build steps run in
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn variant(&self) -> BuildVariant {
        self.variant
    }

    pub(crate) fn set_source_dir(&mut self, dir: PathBuf) {
        debug!("Source directory: {}", dir.display());
        self.source_dir = dir;
    }

    /// Retain the directory on disk and return its path
    pub fn keep(self) -> PathBuf {
        self.root.keep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let tree = SourceTree::create(Some(parent.path()), BuildVariant::Release).unwrap();
        let root = tree.root().to_path_buf();

        assert!(tree.source_dir().is_dir());
        assert!(tree.downloads_dir().is_dir());
        drop(tree);
        assert!(!root.exists());
    }

    #[test]
    fn test_keep_retains_directory() {
        let parent = tempfile::tempdir().unwrap();
        let tree = SourceTree::create(Some(parent.path()), BuildVariant::HeadSource).unwrap();
        assert_eq!(tree.variant(), BuildVariant::HeadSource);

        let kept = tree.keep();
        assert!(kept.join("source").is_dir());
        assert!(kept.starts_with(parent.path()));
    }
}

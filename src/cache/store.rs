use std::path::{Path, PathBuf};

use crate::coordinate::{ArchiveLayout, Coordinate};
use crate::error::{DocsError, Result};

/// Filesystem-backed archive cache
///
/// Layout: `<root>/<group>/<artifact>/<version>/<archive file name>`. The
/// group keeps its dots and occupies a single directory. The existence of
/// the archive file is the only cache-hit signal.
#[derive(Debug, Clone)]
pub struct LocalCacheStore {
    root: PathBuf,
    layout: ArchiveLayout,
}

impl LocalCacheStore {
    pub fn new(root: impl Into<PathBuf>, layout: ArchiveLayout) -> Self {
        LocalCacheStore {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Create the cache root if it does not exist yet
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Deterministic location of the cached archive for a coordinate
    pub fn archive_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.root
            .join(coordinate.group())
            .join(coordinate.artifact())
            .join(coordinate.version())
            .join(self.layout.file_name(coordinate))
    }

    pub async fn list_groups(&self) -> Result<Vec<String>> {
        list_children(&self.root).await
    }

    pub async fn list_artifacts(&self, group: &str) -> Result<Vec<String>> {
        list_children(&self.root.join(group)).await
    }

    pub async fn list_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>> {
        list_children(&self.root.join(group).join(artifact)).await
    }
}

/// Names of the visible subdirectories of `dir`, sorted by name.
///
/// Hidden entries (leading `.`) and anything that is not a directory are
/// skipped. A missing `dir` is `NotFound`.
pub async fn list_children(dir: &Path) -> Result<Vec<String>> {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(DocsError::not_found(format!("directory {}", dir.display())));
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotADirectory => {
            return Err(DocsError::not_found(format!("{} is not a directory", dir.display())));
        }
        Err(err) => return Err(err.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        names.push(name);
    }

    names.sort();
    Ok(names)
}

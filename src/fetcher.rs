use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::cache::{LocalCacheStore, SingleFlight};
use crate::coordinate::Coordinate;
use crate::error::{DocsError, Result};
use crate::mirrors::{Attempt, MirrorList, MirrorOutcome, try_in_order};
use crate::remote::{FetchError, RemoteBody, RemoteSource};

/// Ensures a coordinate's archive is present in the local cache
///
/// A cached file is trusted forever. On a miss the mirrors are tried in
/// order; the first complete download is published with a rename so a
/// truncated file is never visible at the cache path. Concurrent misses for
/// the same coordinate share a single download. A cancelled download leaves
/// nothing behind.
pub struct ArchiveFetcher {
    source: Arc<dyn RemoteSource>,
    mirrors: MirrorList,
    store: LocalCacheStore,
    in_flight: SingleFlight<PathBuf>,
}

impl ArchiveFetcher {
    pub fn new(source: Arc<dyn RemoteSource>, mirrors: MirrorList, store: LocalCacheStore) -> Self {
        ArchiveFetcher {
            source,
            mirrors,
            store,
            in_flight: SingleFlight::new(),
        }
    }

    pub fn store(&self) -> &LocalCacheStore {
        &self.store
    }

    /// Local path of the coordinate's archive, downloading it on first use
    pub async fn ensure_cached(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        let target = self.store.archive_path(coordinate);
        if is_file(&target).await {
            debug!(%coordinate, "archive cache hit");
            return Ok(target);
        }

        self.in_flight
            .run(target.clone(), self.populate(coordinate, &target))
            .await
    }

    async fn populate(&self, coordinate: &Coordinate, target: &Path) -> Result<PathBuf> {
        // a concurrent caller may have published it while we waited
        if is_file(target).await {
            debug!(%coordinate, "archive published by concurrent request");
            return Ok(target.to_path_buf());
        }

        let layout = self.store.layout();
        let source = &self.source;
        let outcome = try_in_order(&self.mirrors, |mirror| async move {
            let url = mirror.archive_url(coordinate, layout);
            let body = source.open(&url).await?;
            let written = persist_atomically(body, target)
                .await
                .map_err(|source| FetchError::Io { url, source })?;
            Ok(Attempt::Found(written))
        })
        .await;

        match outcome {
            MirrorOutcome::Found { mirror, value } => {
                info!(
                    %coordinate,
                    mirror = mirror.base(),
                    size = %humansize::format_size(value, humansize::BINARY),
                    "cached archive"
                );
            }
            MirrorOutcome::Absent { mirror } => {
                warn!(%coordinate, mirror = mirror.base(), "mirror reported archive absent");
            }
            MirrorOutcome::Exhausted { failures } => {
                warn!(%coordinate, attempts = failures.len(), "archive not available from any mirror");
            }
        }

        if is_file(target).await {
            Ok(target.to_path_buf())
        } else {
            Err(DocsError::not_found(format!("archive for {coordinate}")))
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

/// Stream `body` to `target` via a hidden temporary file and rename.
///
/// Returns the number of bytes written. On failure, or when the future is
/// dropped part way, the temporary file and any directories created for
/// `target` are removed and `target` is left untouched.
pub async fn persist_atomically(body: RemoteBody, target: &Path) -> io::Result<u64> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::other(format!("{} has no parent directory", target.display())))?;
    let mut created = CreatedDirs::create(parent).await?;

    let written = write_then_rename(body, parent, target).await?;
    created.keep();
    Ok(written)
}

async fn write_then_rename(body: RemoteBody, parent: &Path, target: &Path) -> io::Result<u64> {
    let RemoteBody {
        content_length,
        mut reader,
    } = body;

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // removed when dropped unless persisted
    let (file, temp) = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".part")
        .tempfile_in(parent)?
        .into_parts();

    let mut file = tokio::fs::File::from_std(file);
    let written = tokio::io::copy(&mut reader, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    if let Some(expected) = content_length {
        if expected != written {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {expected} bytes, received {written}"),
            ));
        }
    }

    temp.persist(target).map_err(io::Error::from)?;
    Ok(written)
}

/// Directories created for a download, removed again unless kept
struct CreatedDirs {
    leaf: PathBuf,
    /// Outermost directory that did not exist before
    top: Option<PathBuf>,
}

impl CreatedDirs {
    async fn create(dir: &Path) -> io::Result<Self> {
        let mut top = None;
        let mut next = Some(dir);
        while let Some(candidate) = next {
            if tokio::fs::try_exists(candidate).await? {
                break;
            }
            top = Some(candidate.to_path_buf());
            next = candidate.parent();
        }
        tokio::fs::create_dir_all(dir).await?;
        Ok(CreatedDirs {
            leaf: dir.to_path_buf(),
            top,
        })
    }

    fn keep(&mut self) {
        self.top = None;
    }
}

impl Drop for CreatedDirs {
    fn drop(&mut self) {
        let Some(top) = self.top.take() else {
            return;
        };
        // only empty directories go; a concurrent download elsewhere keeps its parents
        let mut dir = self.leaf.as_path();
        while std::fs::remove_dir(dir).is_ok() && dir != top {
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
}

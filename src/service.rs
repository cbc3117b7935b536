use std::sync::Arc;
use tracing::debug;

use crate::archive::{ArchiveReader, EntryStream};
use crate::cache::{LocalCacheStore, VersionMemo};
use crate::config::DocsConfig;
use crate::coordinate::{Coordinate, RELEASE_TOKEN, validate_segment};
use crate::error::Result;
use crate::fetcher::ArchiveFetcher;
use crate::remote::{FetchMetrics, HttpSource, RemoteSource};
use crate::resolver::VersionResolver;

/// Everything a request needs: resolve, fetch, read, list.
pub struct DocService {
    resolver: VersionResolver,
    fetcher: ArchiveFetcher,
    reader: ArchiveReader,
    metrics: Option<Arc<FetchMetrics>>,
}

impl DocService {
    /// Service backed by HTTP mirrors. Creates the cache root.
    pub async fn new(config: &DocsConfig) -> Result<Self> {
        let http = Arc::new(HttpSource::new(config)?);
        let metrics = Arc::clone(http.metrics());
        let mut service = Self::with_source(config, http).await?;
        service.metrics = Some(metrics);
        Ok(service)
    }

    pub async fn with_source(config: &DocsConfig, source: Arc<dyn RemoteSource>) -> Result<Self> {
        let store = LocalCacheStore::new(config.cache_root.clone(), config.layout.clone());
        store.ensure_root().await?;

        let memo = VersionMemo::new(config.memo_capacity, config.memo_ttl);
        Ok(DocService {
            resolver: VersionResolver::new(Arc::clone(&source), config.mirrors.clone(), memo),
            fetcher: ArchiveFetcher::new(source, config.mirrors.clone(), store),
            reader: ArchiveReader::default(),
            metrics: None,
        })
    }

    pub fn store(&self) -> &LocalCacheStore {
        self.fetcher.store()
    }

    /// Outbound request counters, when running against real mirrors
    pub fn metrics(&self) -> Option<&Arc<FetchMetrics>> {
        self.metrics.as_ref()
    }

    /// Open `path` inside the archive for the coordinate.
    ///
    /// `version` may be the release token. An empty `path` opens the
    /// archive's index page.
    pub async fn open_document(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
        path: &str,
    ) -> Result<EntryStream> {
        validate_segment("group", group)?;
        validate_segment("artifact", artifact)?;

        let version = if version == RELEASE_TOKEN {
            self.resolver.resolve(group, artifact).await
        } else {
            version.to_string()
        };
        let coordinate = Coordinate::new(group, artifact, version)?;
        debug!(%coordinate, path, "opening document");

        let archive = self.fetcher.ensure_cached(&coordinate).await?;
        self.reader.open_entry(&archive, path).await
    }

    pub async fn list_groups(&self) -> Result<Vec<String>> {
        self.store().list_groups().await
    }

    pub async fn list_artifacts(&self, group: &str) -> Result<Vec<String>> {
        validate_segment("group", group)?;
        self.store().list_artifacts(group).await
    }

    pub async fn list_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>> {
        validate_segment("group", group)?;
        validate_segment("artifact", artifact)?;
        self.store().list_versions(group, artifact).await
    }
}

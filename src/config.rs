use std::path::PathBuf;
use std::time::Duration;

use crate::coordinate::ArchiveLayout;
use crate::mirrors::MirrorList;

/// Maven repositories searched for javadoc archives, in priority order
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://repo1.maven.org/maven2",
    "https://maven.vaadin.com/vaadin-addons",
];

pub const DEFAULT_MEMO_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MEMO_CAPACITY: usize = 1000;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Static configuration for the resolver, fetcher and cache store
#[derive(Debug, Clone)]
pub struct DocsConfig {
    /// Repositories consulted in order for metadata and archives
    pub mirrors: MirrorList,
    /// Root of the on-disk archive cache
    pub cache_root: PathBuf,
    /// Archive naming (classifier and extension)
    pub layout: ArchiveLayout,
    /// How long a resolved release version is trusted
    pub memo_ttl: Duration,
    /// Maximum number of memoised release versions
    pub memo_capacity: usize,
    pub connect_timeout: Duration,
    /// Bound on a whole metadata request, body included
    pub metadata_timeout: Duration,
    /// Bound on a whole archive download, body included
    pub download_timeout: Duration,
}

impl DocsConfig {
    /// Defaults rooted at the given cache directory
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        DocsConfig {
            mirrors: MirrorList::from_urls(DEFAULT_MIRRORS.iter().copied()),
            cache_root: cache_root.into(),
            layout: ArchiveLayout::default(),
            memo_ttl: DEFAULT_MEMO_TTL,
            memo_capacity: DEFAULT_MEMO_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    /// `~/jdoccache`, falling back to a relative directory without a home
    pub fn default_cache_root() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join("jdoccache"))
            .unwrap_or_else(|| PathBuf::from("jdoccache"))
    }

    pub fn with_mirrors(mut self, mirrors: MirrorList) -> Self {
        self.mirrors = mirrors;
        self
    }

    pub fn with_layout(mut self, layout: ArchiveLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_memo(mut self, ttl: Duration, capacity: usize) -> Self {
        self.memo_ttl = ttl;
        self.memo_capacity = capacity;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, metadata: Duration, download: Duration) -> Self {
        self.connect_timeout = connect;
        self.metadata_timeout = metadata;
        self.download_timeout = download;
        self
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self::new(Self::default_cache_root())
    }
}

mod attempt;

pub use attempt::{Attempt, MirrorFailure, MirrorOutcome, try_in_order};

use std::sync::Arc;

use crate::coordinate::{ArchiveLayout, Coordinate, group_path};

/// One Maven2-layout repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    base: String,
}

impl Mirror {
    /// Create a mirror from its base URL. A trailing slash is dropped.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Mirror {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<base>/<group/with/slashes>/<artifact>/maven-metadata.xml`
    pub fn metadata_url(&self, group: &str, artifact: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            self.base,
            group_path(group),
            artifact
        )
    }

    /// `<base>/<group/with/slashes>/<artifact>/<version>/<archive file name>`
    pub fn archive_url(&self, coordinate: &Coordinate, layout: &ArchiveLayout) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base,
            coordinate.group_path(),
            coordinate.artifact(),
            coordinate.version(),
            layout.file_name(coordinate)
        )
    }
}

/// Fixed, ordered list of mirrors. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MirrorList {
    mirrors: Arc<[Mirror]>,
}

impl MirrorList {
    pub fn new(mirrors: Vec<Mirror>) -> Self {
        MirrorList {
            mirrors: mirrors.into(),
        }
    }

    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(urls.into_iter().map(Mirror::new).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mirror> {
        self.mirrors.iter()
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
}

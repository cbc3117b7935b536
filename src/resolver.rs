use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::cache::{SingleFlight, VersionMemo};
use crate::coordinate::memo_key;
use crate::mirrors::{Attempt, MirrorList, MirrorOutcome, try_in_order};
use crate::remote::RemoteSource;

/// Returned when no mirror yields a release version. It is not a real
/// version, so fetching it fails later with a not-found.
pub const UNRESOLVED_VERSION: &str = "LATEST";

static RELEASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<release[^>]*>(.*?)</release>").expect("release pattern is valid")
});

/// Pull the first `<release>` value out of a `maven-metadata.xml` body
pub fn extract_release(metadata: &str) -> Option<&str> {
    RELEASE_PATTERN
        .captures(metadata)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|version| !version.is_empty())
}

/// Resolves the symbolic `release` version against mirror metadata
pub struct VersionResolver {
    source: Arc<dyn RemoteSource>,
    mirrors: MirrorList,
    memo: VersionMemo,
    lookups: SingleFlight<String>,
}

impl VersionResolver {
    pub fn new(source: Arc<dyn RemoteSource>, mirrors: MirrorList, memo: VersionMemo) -> Self {
        VersionResolver {
            source,
            mirrors,
            memo,
            lookups: SingleFlight::new(),
        }
    }

    pub fn memo(&self) -> &VersionMemo {
        &self.memo
    }

    /// Latest release of `group:artifact`, or [`UNRESOLVED_VERSION`].
    ///
    /// Mirrors are consulted in order. A transport failure moves on to the
    /// next mirror; a mirror that answers without a `<release>` element ends
    /// the search.
    pub async fn resolve(&self, group: &str, artifact: &str) -> String {
        let key = memo_key(group, artifact);
        if let Some(version) = self.memo.get(&key) {
            debug!(%key, %version, "release version served from memo");
            return version;
        }

        self.lookups
            .run(key.clone(), async {
                // an earlier caller for this key may have just resolved it
                if let Some(version) = self.memo.get(&key) {
                    return version;
                }
                self.lookup(group, artifact, key.clone()).await
            })
            .await
    }

    async fn lookup(&self, group: &str, artifact: &str, key: String) -> String {
        let source = &self.source;
        let outcome = try_in_order(&self.mirrors, |mirror| async move {
            let metadata = source
                .fetch_text(&mirror.metadata_url(group, artifact))
                .await?;
            Ok(match extract_release(&metadata) {
                Some(version) => Attempt::Found(version.to_string()),
                None => Attempt::Absent,
            })
        })
        .await;

        match outcome {
            MirrorOutcome::Found { mirror, value } => {
                info!(%key, version = %value, mirror = mirror.base(), "resolved release version");
                self.memo.put(key, value.clone());
                value
            }
            MirrorOutcome::Absent { mirror } => {
                warn!(%key, mirror = mirror.base(), "metadata has no release element");
                UNRESOLVED_VERSION.to_string()
            }
            MirrorOutcome::Exhausted { failures } => {
                warn!(%key, attempts = failures.len(), "no mirror answered for release metadata");
                UNRESOLVED_VERSION.to_string()
            }
        }
    }
}

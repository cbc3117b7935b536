use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of "now" for expiry decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct MemoEntry {
    version: String,
    written_at: Instant,
}

/// Bounded, expire-after-write memo of resolved release versions
///
/// Keys are `group:artifact`. Entries older than the TTL are treated as
/// missing and dropped on access; beyond `capacity` the least recently used
/// entry is evicted.
pub struct VersionMemo {
    entries: Arc<Mutex<LruCache<String, MemoEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl VersionMemo {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        VersionMemo {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
            clock,
        }
    }

    /// Get a live entry, dropping it if it has expired
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.written_at) < self.ttl {
            return Some(entry.version.clone());
        }
        entries.pop(key);
        None
    }

    pub fn put(&self, key: String, version: String) {
        let written_at = self.clock.now();
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key, MemoEntry { version, written_at });
        }
    }

    /// Number of stored entries, expired ones included until next access
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Clone for VersionMemo {
    fn clone(&self) -> Self {
        VersionMemo {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    now: Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(ManualClock {
            now: Mutex::new(Instant::now()),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

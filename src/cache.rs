use std::collections::BTreeMap;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// TtlCache – explicit time-to-live cache owned by the calling layer
// ---------------------------------------------------------------------------

/// A small keyed cache with per-call time-to-live, for dataset snapshots
/// that are expensive to refetch. The pipeline itself never reads or
/// writes it; the hosting layer decides what is cached and for how long.
#[derive(Debug, Default)]
pub struct TtlCache<T> {
    entries: BTreeMap<String, Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        TtlCache {
            entries: BTreeMap::new(),
        }
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise run `compute`, store the result, and return it.
    pub fn get_or_compute(
        &mut self,
        key: &str,
        ttl: Duration,
        compute: impl FnOnce() -> T,
    ) -> T {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < ttl {
                log::debug!("cache hit for '{key}'");
                return entry.value.clone();
            }
            log::debug!("cache entry for '{key}' expired");
        }
        let value = compute();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                stored_at: Instant::now(),
            },
        );
        value
    }

    /// Drop a single entry, forcing the next access to recompute.
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Result cache - last known outcome per correlation id.
//!
//! Every delivery on the result queue lands here regardless of whether a
//! waiter still exists, so a status poll after the synchronous call returned
//! (or timed out) can still see the outcome.

use crate::domain::correlation::CorrelationId;
use crate::ipc::responses::WorkOutcome;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached outcome with its arrival time.
struct CachedOutcome {
    outcome: WorkOutcome,
    stored_at: Instant,
}

/// Best-effort store of the most recent outcome per correlation id.
///
/// In-memory and process-lifetime: a restart loses it, which is accepted.
/// Entries are retained forever unless a TTL is configured.
pub struct ResultCache {
    entries: DashMap<CorrelationId, CachedOutcome>,
    ttl: Option<Duration>,
}

impl ResultCache {
    /// Create a cache. `ttl` of `None` retains entries for the process
    /// lifetime.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Store an outcome, overwriting any previous entry for the same id.
    pub fn store(&self, outcome: WorkOutcome) {
        let process_id = outcome.process_id;
        self.entries.insert(
            process_id,
            CachedOutcome {
                outcome,
                stored_at: Instant::now(),
            },
        );
        debug!(process_id = %process_id, "Cached outcome");
    }

    /// Look up the outcome for a correlation id.
    pub fn get(&self, process_id: &CorrelationId) -> Option<WorkOutcome> {
        self.entries.get(process_id).map(|e| e.outcome.clone())
    }

    /// Number of cached outcomes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict entries older than the configured TTL.
    ///
    /// Returns the number of entries removed; always 0 without a TTL.
    pub fn remove_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|id, entry| {
            if now.duration_since(entry.stored_at) > ttl {
                debug!(process_id = %id, "Evicting stale cached outcome");
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

/// Background task evicting stale cache entries.
///
/// Pointless without a TTL; callers should only spawn it when one is
/// configured.
pub async fn eviction_task(cache: Arc<ResultCache>, interval: Duration) {
    let mut sweep = tokio::time::interval(interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep.tick().await;
        let removed = cache.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Evicted stale cached outcomes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_get() {
        let cache = ResultCache::new(None);
        let id = CorrelationId::new();

        assert!(cache.get(&id).is_none());

        cache.store(WorkOutcome::done(id).with_rows(42));
        let outcome = cache.get(&id).expect("cached");
        assert_eq!(outcome.rows_processed, Some(42));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let cache = ResultCache::new(None);
        let id = CorrelationId::new();

        cache.store(WorkOutcome::done(id).with_rows(1));
        cache.store(WorkOutcome::done(id).with_rows(2));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id).unwrap().rows_processed, Some(2));
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let cache = ResultCache::new(None);
        cache.store(WorkOutcome::done(CorrelationId::new()));

        assert_eq!(cache.remove_expired(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_ttl_eviction() {
        let cache = ResultCache::new(Some(Duration::from_millis(10)));
        let id = CorrelationId::new();
        cache.store(WorkOutcome::done(id));

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.remove_expired(), 1);
        assert!(cache.get(&id).is_none());
        assert!(cache.is_empty());
    }
}

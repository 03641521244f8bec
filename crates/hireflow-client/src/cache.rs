//! Entitlement caching — freshness tracking for the premium gate.
//!
//! Casual `is_premium` checks (nav badges, feature gates) should not re-hit
//! the backend on every render; the activation poller always bypasses this
//! cache because it exists precisely to observe the record changing.

use std::time::Instant;

use crate::types::EntitlementStatus;

/// In-memory cache of the last entitlement read, with freshness tracking.
#[derive(Debug, Clone)]
pub struct EntitlementCache {
    pub(crate) data: Option<EntitlementStatus>,
    /// When the entitlement was last fetched from the server.
    last_fetched: Option<Instant>,
    /// Maximum age in seconds before the cache is considered stale.
    max_age_secs: u64,
}

impl EntitlementCache {
    /// Create a new empty cache.
    pub fn new(max_age_secs: u64) -> Self {
        Self {
            data: None,
            last_fetched: None,
            max_age_secs,
        }
    }

    /// Store an entitlement read, updating the freshness timestamp.
    pub fn set(&mut self, data: EntitlementStatus) {
        self.data = Some(data);
        self.last_fetched = Some(Instant::now());
    }

    /// Get the cached entitlement if it's still fresh.
    pub fn get_if_fresh(&self) -> Option<&EntitlementStatus> {
        let data = self.data.as_ref()?;
        let last = self.last_fetched?;
        if last.elapsed().as_secs() < self.max_age_secs {
            Some(data)
        } else {
            None
        }
    }

    /// Clear the cache entirely.
    pub fn clear(&mut self) {
        self.data = None;
        self.last_fetched = None;
    }

    /// Mark the cache as stale without removing the data.
    pub fn invalidate(&mut self) {
        self.last_fetched = None;
    }

    /// Check if the cache has any data (fresh or stale).
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Check if the cache is fresh.
    pub fn is_fresh(&self) -> bool {
        self.get_if_fresh().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basics() {
        let mut cache = EntitlementCache::new(60);
        assert!(cache.get_if_fresh().is_none());
        assert!(!cache.has_data());

        cache.set(EntitlementStatus::inactive());
        assert!(cache.get_if_fresh().is_some());
        assert!(cache.is_fresh());

        cache.clear();
        assert!(cache.get_if_fresh().is_none());
        assert!(!cache.has_data());
    }

    #[test]
    fn test_cache_invalidate_keeps_data() {
        let mut cache = EntitlementCache::new(60);
        cache.set(EntitlementStatus::inactive());
        cache.invalidate();
        assert!(cache.get_if_fresh().is_none());
        assert!(cache.has_data());
    }

    #[test]
    fn test_cache_zero_max_age_is_always_stale() {
        let mut cache = EntitlementCache::new(0);
        cache.set(EntitlementStatus::inactive());
        assert!(cache.get_if_fresh().is_none());
    }
}

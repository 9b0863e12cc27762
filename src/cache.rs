//! Keyed in-memory cache with an injectable clock and eviction policy.
//!
//! Used for extraction results and exchange rates. Concurrent misses for the
//! same key may both compute and insert; the last write wins.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Entries live for the whole process.
    Never,
    Ttl(Duration),
}

impl EvictionPolicy {
    /// `0` means never evict.
    pub fn from_ttl_secs(secs: u64) -> Self {
        match secs {
            0 => EvictionPolicy::Never,
            secs => EvictionPolicy::Ttl(Duration::from_secs(secs)),
        }
    }

    pub fn is_expired(&self, inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            EvictionPolicy::Never => false,
            EvictionPolicy::Ttl(ttl) => (now - inserted_at)
                .to_std()
                .map(|age| age >= *ttl)
                .unwrap_or(false),
        }
    }
}

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

pub struct Cache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    policy: EvictionPolicy,
    clock: Arc<dyn Clock>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(policy: EvictionPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: EvictionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if self.policy.is_expired(entry.inserted_at, self.clock.now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Stores `value` under `key`. Under a TTL policy, expired entries for
    /// every other key are dropped in the same write.
    pub async fn insert(&self, key: K, value: V) {
        let inserted_at = self.clock.now();
        let policy = self.policy;
        let mut entries = self.entries.write().await;
        if let EvictionPolicy::Ttl(_) = policy {
            entries.retain(|_, e| !policy.is_expired(e.inserted_at, inserted_at));
        }
        entries.insert(key, Entry { value, inserted_at });
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|e| !self.policy.is_expired(e.inserted_at, now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

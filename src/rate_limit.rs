use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::metrics::RATE_LIMIT_KEYS;

// Rate limit record - tracks submissions per client key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

/// Backing storage for rate records.
///
/// The in-process [`MemoryStore`] only limits a single instance; a shared
/// store (Redis or similar) can be plugged in behind this trait.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<RateRecord>, StoreError>;

    async fn set(
        &self,
        key: &str,
        record: RateRecord,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

struct StoredRecord {
    record: RateRecord,
    expires_at: DateTime<Utc>,
}

impl StoredRecord {
    // inclusive, a window is only over strictly after window_start + window
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at >= now
    }
}

// Default store - lives as long as the process
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, StoredRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    // Drop expired records, returns how many went
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, stored| stored.is_live(now));
        before.saturating_sub(self.records.len())
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<RateRecord>, StoreError> {
        Ok(self
            .records
            .get(key)
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.record))
    }

    async fn set(
        &self,
        key: &str,
        record: RateRecord,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let expires_at = now
            .checked_add_signed(to_delta(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.records
            .insert(key.to_string(), StoredRecord { record, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records.remove(key);
        Ok(())
    }
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}

// Fixed window limiter over any RateStore
pub struct RateLimiter {
    store: Arc<dyn RateStore>,
    max_requests: u32,
    window: TimeDelta,
    retention: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn RateStore>,
        max_requests: u32,
        window: Duration,
        retention: Duration,
    ) -> Self {
        Self {
            store,
            max_requests,
            window: to_delta(window),
            retention: retention.max(window),
        }
    }

    /// Returns `true` when `key` has used up its submissions for the
    /// current window. Admitted calls count against the window; rejected
    /// ones do not.
    pub async fn is_limited(&self, key: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let record = self.store.get(key, now).await?;

        let record = match record {
            // first request or window expired..? start over
            None => RateRecord { count: 1, window_start: now },
            Some(r) if now - r.window_start > self.window => {
                RateRecord { count: 1, window_start: now }
            }
            Some(r) if r.count >= self.max_requests => {
                debug!(key, count = r.count, "Rate limit reached");
                return Ok(true);
            }
            Some(r) => RateRecord { count: r.count + 1, ..r },
        };

        self.store.set(key, record, self.retention, now).await?;
        Ok(false)
    }
}

// Sweeper - evicts idle records so the map does not grow forever
pub async fn sweeper(store: Arc<MemoryStore>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    info!(interval = ?sweep_interval, "Rate store sweeper started");

    loop {
        interval.tick().await;

        let removed = store.purge_expired(Utc::now());
        RATE_LIMIT_KEYS.set(store.len() as f64);
        if removed > 0 {
            debug!(removed, remaining = store.len(), "Swept expired rate records");
        }
    }
}

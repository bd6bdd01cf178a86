//! Time-bound cache for remote mirror content.
//!
//! One entry per `(owner, repo)`, stored in the [`KvStore`] as JSON:
//!
//! ```json
//! { "content": "# KB\n...", "timestamp": 1760000000000 }
//! ```
//!
//! `timestamp` is milliseconds since the Unix epoch. A lookup yields one
//! of three outcomes: [`CacheLookup::Hit`] while the entry is younger
//! than the freshness window, [`CacheLookup::Expired`] once it is not,
//! and [`CacheLookup::Miss`] when there is no usable entry. An entry that
//! fails to parse is deleted and reported as a miss.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClipperError, Result};
use crate::store::{cache_key, KvStore};

/// Default freshness window (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(String),
    Miss,
    Expired,
}

/// Cache view bound to one repository.
pub struct RemoteCache<'a> {
    store: &'a dyn KvStore,
    key: String,
    ttl: Duration,
}

impl<'a> RemoteCache<'a> {
    pub fn new(store: &'a dyn KvStore, owner: &str, repo: &str, ttl: Duration) -> Self {
        Self {
            store,
            key: cache_key(owner, repo),
            ttl,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn lookup(&self, now: DateTime<Utc>) -> Result<CacheLookup> {
        let Some(raw) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "cache miss");
            return Ok(CacheLookup::Miss);
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                let err = ClipperError::CacheCorruption {
                    key: self.key.clone(),
                    reason: e.to_string(),
                };
                warn!("{}; discarding", err);
                self.store.remove(&self.key).await?;
                return Ok(CacheLookup::Miss);
            }
        };

        let age_ms = now.timestamp_millis() - entry.timestamp;
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms >= ttl_ms {
            debug!(key = %self.key, age_ms, "cache expired");
            Ok(CacheLookup::Expired)
        } else {
            debug!(key = %self.key, age_ms, "cache hit");
            Ok(CacheLookup::Hit(entry.content))
        }
    }

    pub async fn write(&self, content: &str, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            content: content.to_string(),
            timestamp: now.timestamp_millis(),
        };
        let json = serde_json::to_string(&entry).map_err(anyhow::Error::from)?;
        self.store.set(&self.key, &json).await?;
        Ok(())
    }

    pub async fn invalidate(&self) -> Result<()> {
        self.store.remove(&self.key).await?;
        Ok(())
    }
}

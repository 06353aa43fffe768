use crate::models::OptionChain;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

type Slot = Arc<Mutex<Option<(OptionChain, Instant)>>>;

/// Time-bounded memo of option chains keyed by provider symbol.
///
/// Lookups for different symbols never block each other. For a single symbol
/// only one caller fetches at a time; anyone arriving meanwhile waits on the
/// slot and then reads the fresh entry.
pub struct ChainCache {
    ttl: Duration,
    slots: RwLock<HashMap<String, Slot>>,
}

impl ChainCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, key: &str) -> Slot {
        if let Some(slot) = self.slots.read().await.get(key) {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Return the cached chain for `key` if still fresh.
    pub async fn get(&self, key: &str) -> Option<OptionChain> {
        let slot = self.slot(key).await;
        let entry = slot.lock().await;
        match entry.as_ref() {
            Some((chain, stored)) if stored.elapsed() < self.ttl => Some(chain.clone()),
            _ => None,
        }
    }

    /// Return a fresh cached chain or run `fetch` to produce one.
    ///
    /// Only `Ok` values are stored; errors are handed back untouched so the
    /// next call retries upstream.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<OptionChain, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OptionChain, E>>,
    {
        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;

        if let Some((chain, stored)) = entry.as_ref() {
            if stored.elapsed() < self.ttl {
                debug!(symbol = key, "option chain served from cache");
                return Ok(chain.clone());
            }
        }

        let chain = fetch().await?;
        *entry = Some((chain.clone(), Instant::now()));
        Ok(chain)
    }
}

impl Default for ChainCache {
    fn default() -> Self {
        Self::new(crate::config::CACHE_TTL)
    }
}

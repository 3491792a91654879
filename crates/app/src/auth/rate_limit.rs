//! Cache-backed rate limits.
//!
//! Limits fail open: when the cache cannot be reached the request is allowed and a
//! warning is logged.

use std::{sync::Arc, time::Duration};

use tracing::warn;

use crate::cache::Cache;

#[derive(Clone)]
pub(crate) struct RateLimiter {
    cache: Arc<dyn Cache>,
}

impl RateLimiter {
    pub(crate) fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Allow one hit per `cooldown`.
    pub(crate) async fn cooldown(&self, key: &str, cooldown: Duration) -> bool {
        match self.cache.get(key).await {
            Ok(Some(_)) => false,
            Ok(None) => {
                if let Err(error) = self.cache.set(key, "1", cooldown).await {
                    warn!(%error, key, "rate limit not recorded; cache unavailable");
                }

                true
            }
            Err(error) => {
                warn!(%error, key, "rate limit skipped; cache unavailable");

                true
            }
        }
    }

    /// Allow up to `limit` hits per fixed `window` starting at the first hit.
    pub(crate) async fn within_limit(&self, key: &str, limit: i64, window: Duration) -> bool {
        let count = match self.cache.incr(key).await {
            Ok(count) => count,
            Err(error) => {
                warn!(%error, key, "rate limit skipped; cache unavailable");

                return true;
            }
        };

        if count == 1
            && let Err(error) = self.cache.expire(key, window).await
        {
            // A counter without a window would never reset; drop it and let this hit
            // through uncounted.
            warn!(%error, key, "rate limit window not set; counter discarded");

            if let Err(error) = self.cache.delete(key).await {
                warn!(%error, key, "rate limit counter not discarded; cache unavailable");
            }

            return true;
        }

        count <= limit
    }
}

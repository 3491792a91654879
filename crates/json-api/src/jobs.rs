//! Background jobs

use std::{sync::Arc, time::Duration};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use tenantry_app::{cache::InMemoryCache, domain::refresh_tokens::RefreshTokenStore};

/// How often the in-process cache drops expired rate-limit and OAuth state keys.
pub(crate) const CACHE_PURGE_PERIOD: Duration = Duration::from_secs(60);

/// Delete expired refresh tokens every `period`, forever.
///
/// The first sweep runs one full period after start-up.
pub(crate) async fn sweep_refresh_tokens(store: Arc<dyn RefreshTokenStore>, period: Duration) {
    let mut ticker = interval(period);

    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        sweep_once(store.as_ref()).await;
    }
}

/// Drop expired cache entries every `period`, forever.
pub(crate) async fn purge_cache(cache: Arc<InMemoryCache>, period: Duration) {
    let mut ticker = interval(period);

    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        cache.purge_expired();
    }
}

async fn sweep_once(store: &dyn RefreshTokenStore) {
    match store.sweep_expired().await {
        Ok(deleted) => info!(deleted, "swept expired refresh tokens"),
        Err(error) => error!(%error, "failed to sweep expired refresh tokens"),
    }
}

#[cfg(test)]
mod tests {
    use tenantry_app::domain::refresh_tokens::{MockRefreshTokenStore, RefreshTokenError};
    use testresult::TestResult;

    use crate::test_helpers::state_with_refresh_tokens;

    use super::*;

    #[tokio::test]
    async fn test_sweep_once_calls_store() -> TestResult {
        let mut store = MockRefreshTokenStore::new();

        store.expect_sweep_expired().once().return_once(|| Ok(3));

        sweep_once(&store).await;

        Ok(())
    }

    #[tokio::test]
    async fn test_sweep_failure_is_not_fatal() -> TestResult {
        let mut store = MockRefreshTokenStore::new();

        store
            .expect_sweep_expired()
            .once()
            .return_once(|| Err(RefreshTokenError::Invalid));

        sweep_once(&store).await;

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_on_each_period() -> TestResult {
        let mut store = MockRefreshTokenStore::new();

        store.expect_sweep_expired().times(2).returning(|| Ok(0));

        let state = state_with_refresh_tokens(store);
        let task = tokio::spawn(sweep_refresh_tokens(
            state.app.refresh_tokens.clone(),
            Duration::from_secs(60),
        ));

        // Nothing happens before the first full period.
        tokio::time::sleep(Duration::from_secs(59)).await;
        tokio::time::sleep(Duration::from_secs(62)).await;

        task.abort();

        Ok(())
    }
}

//! Background Jobs Config

use std::time::Duration;

use clap::Args;

/// Background job settings.
#[derive(Debug, Args)]
pub struct JobsConfig {
    /// Seconds between expired refresh token sweeps; 0 disables the sweep
    #[arg(long, env = "REFRESH_TOKEN_SWEEP_INTERVAL_SECONDS", default_value_t = 3_600)]
    pub refresh_token_sweep_interval_seconds: u64,
}

impl JobsConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.refresh_token_sweep_interval_seconds > 0)
            .then(|| Duration::from_secs(self.refresh_token_sweep_interval_seconds))
    }
}

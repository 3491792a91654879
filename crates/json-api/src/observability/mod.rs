//! Logging setup, metrics and request tracing middleware.

use thiserror::Error;

mod init;
mod metrics;
mod request;

pub(crate) use init::init_logging;
pub(crate) use metrics::metrics_handler;
pub(crate) use request::{REQUEST_ID_DEPOT_KEY, request_logging};

/// Errors raised while initialising observability.
#[derive(Debug, Error)]
pub(crate) enum ObservabilityError {
    /// Failed to initialise tracing subscriber.
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),
}

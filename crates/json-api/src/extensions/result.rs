//! Result helper extensions for HTTP handlers.

use std::error::Error;

use salvo::prelude::StatusError;
use tracing::error;

/// Map any error to a logged, opaque internal server error.
pub(crate) trait ResultExt<T> {
    fn or_500(self, context: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error,
{
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|failure| {
            // Storage errors keep the useful part in their source.
            let mut cause = failure.to_string();
            let mut source = failure.source();

            while let Some(inner) = source {
                cause.push_str(": ");
                cause.push_str(&inner.to_string());
                source = inner.source();
            }

            error!(error = %cause, "{context}");

            StatusError::internal_server_error()
        })
    }
}

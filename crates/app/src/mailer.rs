//! Outbound email.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("failed to deliver email to {to}: {reason}")]
    Delivery { to: String, reason: String },
}

#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError>;
}

/// Mailer that only records messages in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        info!(to, subject, bytes = html.len(), "email dispatched to log");

        Ok(())
    }
}

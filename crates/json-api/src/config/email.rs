//! Email Config

use clap::Args;
use tenantry_app::auth::AuthSettings;

use crate::config::ConfigError;

/// Outbound email settings.
#[derive(Debug, Args)]
pub struct EmailConfig {
    /// Deliver verification and password reset emails
    #[arg(long, env = "EMAILS_ENABLED")]
    pub emails_enabled: bool,

    /// Sender address for outbound email
    #[arg(long, env = "EMAILS_FROM_EMAIL")]
    pub emails_from_email: Option<String>,

    /// Frontend base URL used in email links
    #[arg(long, env = "FRONTEND_HOST", default_value = "http://localhost:5173")]
    pub frontend_host: String,

    /// Product name used in email subjects
    #[arg(long, env = "PROJECT_NAME", default_value = "Tenantry")]
    pub project_name: String,
}

impl EmailConfig {
    pub(super) fn check_sender(&self) -> Result<(), ConfigError> {
        let has_sender = self
            .emails_from_email
            .as_deref()
            .is_some_and(|sender| !sender.trim().is_empty());

        if self.emails_enabled && !has_sender {
            return Err(ConfigError::MissingSender);
        }

        Ok(())
    }

    #[must_use]
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            emails_enabled: self.emails_enabled,
            frontend_host: self.frontend_host.trim_end_matches('/').to_string(),
            project_name: self.project_name.clone(),
        }
    }
}

//! Email bodies.

use crate::auth::AuthSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Email {
    pub subject: String,
    pub html: String,
}

pub(crate) fn verification_email(settings: &AuthSettings, email: &str, token: &str) -> Email {
    let link = format!("{}/verify-email?token={token}", settings.frontend_host);

    Email {
        subject: format!("{} - Verify your email", settings.project_name),
        html: format!(
            "<p>Hello {email},</p>\
             <p>Confirm your address to finish creating your account.</p>\
             <p><a href=\"{link}\">Verify email</a></p>\
             <p>This link is valid for 24 hours.</p>"
        ),
    }
}

pub(crate) fn password_reset_email(settings: &AuthSettings, email: &str, token: &str) -> Email {
    let link = format!("{}/reset-password?token={token}", settings.frontend_host);

    Email {
        subject: format!("{} - Password reset", settings.project_name),
        html: format!(
            "<p>Hello {email},</p>\
             <p>We received a request to reset your password.</p>\
             <p><a href=\"{link}\">Reset password</a></p>\
             <p>This link is valid for 1 hour. If you did not ask for it, ignore this email.</p>"
        ),
    }
}

pub(crate) fn password_changed_email(settings: &AuthSettings, email: &str) -> Email {
    Email {
        subject: format!("{} - Your password was changed", settings.project_name),
        html: format!(
            "<p>Hello {email},</p>\
             <p>Your password was just changed and all sessions were signed out.</p>\
             <p>If this was not you, reset your password immediately.</p>"
        ),
    }
}

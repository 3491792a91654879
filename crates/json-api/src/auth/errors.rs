//! Auth Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use tenantry_app::auth::AuthServiceError;

/// Map a pipeline failure to its HTTP rendering.
///
/// Every credential failure shares the 401 status, and refresh failures never say
/// whether a token was expired, revoked or reused.
pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::Validation { field, message } => StatusError::unprocessable_entity()
            .brief(message)
            .detail(format!("field: {field}")),
        AuthServiceError::EmailTaken | AuthServiceError::InactiveUser => {
            StatusError::bad_request().brief(error.to_string())
        }
        AuthServiceError::InvalidCredentials
        | AuthServiceError::EmailNotVerified
        | AuthServiceError::InvalidRefreshToken
        | AuthServiceError::Unauthenticated => {
            StatusError::unauthorized().brief(error.to_string())
        }
        AuthServiceError::UserNotFound => StatusError::not_found().brief(error.to_string()),
        AuthServiceError::InvalidToken
        | AuthServiceError::InvalidResetToken
        | AuthServiceError::InvalidOAuthState => {
            StatusError::bad_request().brief(error.to_string())
        }
        AuthServiceError::ResetTokenReused => StatusError::gone().brief(error.to_string()),
        AuthServiceError::RateLimited(limit) => {
            warn!(?limit, "rate limit exceeded");

            StatusError::too_many_requests().brief(limit.message())
        }
        AuthServiceError::MissingTenant => {
            error!("authenticated user has no tenant");

            StatusError::internal_server_error().brief(error.to_string())
        }
        AuthServiceError::Sql(_)
        | AuthServiceError::Hash(_)
        | AuthServiceError::Token(_)
        | AuthServiceError::Secret(_)
        | AuthServiceError::RefreshStore(_)
        | AuthServiceError::Cache(_) => {
            error!(error = ?error, "auth pipeline failure");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use tenantry_app::auth::RateLimit;

    use super::*;

    #[test]
    fn credential_failures_share_401() {
        for error in [
            AuthServiceError::InvalidCredentials,
            AuthServiceError::EmailNotVerified,
            AuthServiceError::InvalidRefreshToken,
            AuthServiceError::Unauthenticated,
        ] {
            assert_eq!(into_status_error(error).code, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn missing_tenant_is_500_with_reason() {
        let status = into_status_error(AuthServiceError::MissingTenant);

        assert_eq!(status.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status.brief,
            "User has no tenant association - data isolation cannot be guaranteed"
        );
    }

    #[test]
    fn validation_names_the_field() {
        let status = into_status_error(AuthServiceError::Validation {
            field: "password",
            message: "Password must be at least 8 characters long",
        });

        assert_eq!(status.code, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status.detail.as_deref(), Some("field: password"));
    }

    #[test]
    fn reused_reset_token_is_gone() {
        assert_eq!(
            into_status_error(AuthServiceError::ResetTokenReused).code,
            StatusCode::GONE
        );
    }

    #[test]
    fn rate_limits_are_429() {
        let status = into_status_error(AuthServiceError::RateLimited(RateLimit::OAuth));

        assert_eq!(status.code, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status.brief,
            "Too many OAuth requests. Please try again in 1 minute."
        );
    }
}

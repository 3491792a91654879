//! Confirm Password Reset Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{errors::into_status_error, models::MessageResponse},
    extensions::*,
    state::State,
};

/// Confirm Reset Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmResetRequest {
    /// Token from the reset email
    pub token: String,

    /// At least 8 characters.
    pub new_password: String,
}

/// Confirm Password Reset Handler
///
/// Sets the new password and signs out every session of the user. A reset link
/// works once.
#[endpoint(
    tags("auth"),
    summary = "Confirm Password Reset",
    responses(
        (status_code = StatusCode::OK, description = "Password changed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid or expired reset token"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::GONE, description = "Reset link already used"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Password too short"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ConfirmResetRequest>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    state
        .app
        .auth
        .confirm_password_reset(&request.token, &request.new_password)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse::new(
        "Password reset successful. You can now log in with your new password.",
    )))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use tenantry_app::auth::{AuthServiceError, MockAuthService};

    use crate::test_helpers::auth_service;

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service(auth, Router::with_path("auth/confirm-reset").post(handler))
    }

    fn body() -> serde_json::Value {
        json!({ "token": "reset-token", "new_password": "new-correct-horse" })
    }

    #[tokio::test]
    async fn test_confirm_reset_succeeds() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_confirm_password_reset()
            .once()
            .withf(|token, password| token == "reset-token" && password == "new-correct-horse")
            .return_once(|_, _| Ok(()));

        let res = TestClient::post("http://example.com/auth/confirm-reset")
            .json(&body())
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_reset_replay_returns_410() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_confirm_password_reset()
            .once()
            .return_once(|_, _| Err(AuthServiceError::ResetTokenReused));

        let res = TestClient::post("http://example.com/auth/confirm-reset")
            .json(&body())
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::GONE));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_reset_bad_token_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_confirm_password_reset()
            .once()
            .return_once(|_, _| Err(AuthServiceError::InvalidResetToken));

        let res = TestClient::post("http://example.com/auth/confirm-reset")
            .json(&body())
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}

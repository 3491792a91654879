//! Resend Verification Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    auth::{
        errors::into_status_error,
        models::{EmailRequest, MessageResponse},
    },
    extensions::*,
    state::State,
};

const RESENT_MESSAGE: &str =
    "If this email exists and is not verified, a verification link has been sent";

/// Resend Verification Handler
///
/// Answers the same way for unknown, verified and unverified addresses.
#[endpoint(
    tags("auth"),
    summary = "Resend Verification Email",
    responses(
        (status_code = StatusCode::OK, description = "Request accepted"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Requested again within 60 seconds"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<EmailRequest>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .resend_verification(&json.into_inner().email)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse::new(RESENT_MESSAGE)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use tenantry_app::auth::{AuthServiceError, MockAuthService, RateLimit};

    use crate::test_helpers::auth_service;

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service(
            auth,
            Router::with_path("auth/resend-verification").post(handler),
        )
    }

    #[tokio::test]
    async fn test_resend_returns_neutral_message() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_resend_verification()
            .once()
            .withf(|email| email == "unknown@example.com")
            .return_once(|_| Ok(()));

        let mut res = TestClient::post("http://example.com/auth/resend-verification")
            .json(&json!({ "email": "unknown@example.com" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: MessageResponse = res.take_json().await?;

        assert_eq!(body.message, RESENT_MESSAGE);

        Ok(())
    }

    #[tokio::test]
    async fn test_resend_too_soon_returns_429() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_resend_verification()
            .once()
            .return_once(|_| Err(AuthServiceError::RateLimited(RateLimit::ResendVerification)));

        let res = TestClient::post("http://example.com/auth/resend-verification")
            .json(&json!({ "email": "new@example.com" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::TOO_MANY_REQUESTS));

        Ok(())
    }
}

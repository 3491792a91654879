//! Verify Email Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use tenantry_app::auth::VerificationOutcome;

use crate::{
    auth::{errors::into_status_error, models::MessageResponse},
    extensions::*,
    state::State,
};

/// Verify Email Handler
///
/// Safe to call twice: a second call with the same token reports that the address
/// is already verified.
#[endpoint(
    tags("auth"),
    summary = "Verify Email",
    responses(
        (status_code = StatusCode::OK, description = "Email verified"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid or expired verification token"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    token: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let outcome = state
        .app
        .auth
        .verify_email(&token.into_inner())
        .await
        .map_err(into_status_error)?;

    let message = match outcome {
        VerificationOutcome::Verified => "Email verified successfully",
        VerificationOutcome::AlreadyVerified => "Email already verified",
    };

    Ok(Json(MessageResponse::new(message)))
}

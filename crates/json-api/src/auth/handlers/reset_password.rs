//! Request Password Reset Handler

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

const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists with this email, you will receive a password reset link";

/// Request Password Reset Handler
#[endpoint(
    tags("auth"),
    summary = "Request Password Reset",
    responses(
        (status_code = StatusCode::OK, description = "Request accepted"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "More than 3 requests in an hour"),
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
        .request_password_reset(&json.into_inner().email)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessageResponse::new(RESET_REQUESTED_MESSAGE)))
}

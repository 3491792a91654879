//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    auth::{errors::into_status_error, models::MessageResponse},
    extensions::*,
    state::State,
};

/// Logout Handler
///
/// Revokes every refresh token of the caller. Access tokens already issued stay
/// valid until they expire.
#[endpoint(
    tags("auth"),
    summary = "Logout",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Logged out"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Not authenticated"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user.uuid;

    let revoked = state
        .app
        .auth
        .logout(user)
        .await
        .map_err(into_status_error)?;

    info!(user_uuid = %user, revoked, "logged out");

    Ok(Json(MessageResponse::new("Successfully logged out")))
}

//! Current User Handler

use salvo::prelude::*;

use crate::{auth::models::UserResponse, extensions::*};

/// Current User Handler
///
/// Returns the caller as loaded for this request, so role or tenant changes show
/// up without a new token.
#[endpoint(
    tags("users"),
    summary = "Current User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The authenticated user"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Not authenticated"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<UserResponse>, StatusError> {
    let principal = depot.principal_or_401()?;

    Ok(Json(principal.current_user().clone().into()))
}

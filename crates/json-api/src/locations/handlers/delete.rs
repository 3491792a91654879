//! Delete Location Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, locations::errors::into_status_error, state::State};

/// Delete Location Handler
///
/// Soft delete: the location stops being listed but its row is kept.
#[endpoint(
    tags("locations"),
    summary = "Delete Location",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Location deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Location not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    location: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    state
        .app
        .locations
        .delete_location(tenant, location.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

//! Create Location Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenantry_app::domain::locations::{data::NewLocation, records::LocationUuid};

use crate::{
    extensions::*,
    locations::{errors::into_status_error, index::LocationResponse},
    state::State,
};

/// Create Location Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateLocationRequest {
    /// Display name
    pub name: String,

    /// Street address
    #[serde(default)]
    pub address: Option<String>,

    /// Public website
    #[serde(default)]
    pub website: Option<String>,

    /// Main site of the company
    #[serde(default)]
    pub is_primary: bool,
}

impl From<CreateLocationRequest> for NewLocation {
    fn from(request: CreateLocationRequest) -> Self {
        NewLocation {
            uuid: LocationUuid::new(),
            name: request.name,
            address: request.address,
            website: request.website,
            is_primary: request.is_primary,
        }
    }
}

/// Create Location Handler
#[endpoint(
    tags("locations"),
    summary = "Create Location",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Location created"),
        (status_code = StatusCode::NOT_FOUND, description = "Company not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    company: PathParam<Uuid>,
    json: JsonBody<CreateLocationRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<LocationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    let location = state
        .app
        .locations
        .create_location(tenant, company.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(location.into()))
}

//! Location Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenantry_app::domain::locations::records::LocationRecord;

use crate::{extensions::*, locations::errors::into_status_error, state::State};

/// Location Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LocationResponse {
    /// The unique identifier of the location
    pub uuid: Uuid,

    /// Owning company
    pub company_uuid: Uuid,

    /// Display name
    pub name: String,

    /// Street address
    pub address: Option<String>,

    /// Public website
    pub website: Option<String>,

    /// Main site of the company
    pub is_primary: bool,

    /// The date and time the location was created
    pub created_at: String,

    /// The date and time the location was last updated
    pub updated_at: String,
}

impl From<LocationRecord> for LocationResponse {
    fn from(location: LocationRecord) -> Self {
        LocationResponse {
            uuid: location.uuid.into(),
            company_uuid: location.company_uuid.into(),
            name: location.name,
            address: location.address,
            website: location.website,
            is_primary: location.is_primary,
            created_at: location.created_at.to_string(),
            updated_at: location.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LocationsResponse {
    /// Active locations of the company
    pub locations: Vec<LocationResponse>,
}

/// Location Index Handler
#[endpoint(
    tags("locations"),
    summary = "List Company Locations",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Active locations"),
        (status_code = StatusCode::NOT_FOUND, description = "Company not found"),
    ),
)]
pub(crate) async fn handler(
    company: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<LocationsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    let locations = state
        .app
        .locations
        .list_locations(tenant, company.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(LocationsResponse {
        locations: locations.into_iter().map(Into::into).collect(),
    }))
}

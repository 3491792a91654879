//! Update Company Handler

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

use tenantry_app::domain::companies::data::{CompanyUpdate, DEFAULT_TIMEZONE};

use crate::{
    companies::{errors::into_status_error, get::CompanyResponse},
    extensions::*,
    state::State,
};

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

const fn opted_in() -> bool {
    true
}

/// Update Company Request
///
/// Replaces every editable field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCompanyRequest {
    /// Display name
    pub name: String,

    /// Tax or registry identifier
    #[serde(default)]
    pub identifier: Option<String>,

    /// ISO 3166-1 alpha-2 country code
    pub country: String,

    /// Free-form industry label
    #[serde(default)]
    pub industry: Option<String>,

    /// IANA time zone name, defaults to America/Santiago
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Defaults to opted in
    #[serde(default = "opted_in")]
    pub opt_in_benchmarking: bool,
}

impl From<UpdateCompanyRequest> for CompanyUpdate {
    fn from(request: UpdateCompanyRequest) -> Self {
        CompanyUpdate {
            name: request.name,
            identifier: request.identifier,
            country: request.country,
            industry: request.industry,
            timezone: request.timezone,
            opt_in_benchmarking: request.opt_in_benchmarking,
        }
    }
}

/// Update Company Handler
#[endpoint(
    tags("companies"),
    summary = "Update Company",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Company updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Company not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "companies.update",
    skip(company, json, depot),
    fields(tenant_uuid = tracing::field::Empty, company_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    company: PathParam<Uuid>,
    json: JsonBody<UpdateCompanyRequest>,
    depot: &mut Depot,
) -> Result<Json<CompanyResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;
    let company = company.into_inner();

    let span = tracing::Span::current();

    span.record("tenant_uuid", tracing::field::display(tenant));
    span.record("company_uuid", tracing::field::display(company));

    let updated = state
        .app
        .companies
        .update_company(tenant, company.into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}

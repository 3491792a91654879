//! Company Index Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{companies::get::CompanyResponse, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CompaniesResponse {
    /// Companies of the caller's tenant
    pub companies: Vec<CompanyResponse>,
}

/// Company Index Handler
#[endpoint(
    tags("companies"),
    summary = "List Companies",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CompaniesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    let companies = state
        .app
        .companies
        .list_companies(tenant)
        .await
        .or_500("failed to fetch companies")?;

    Ok(Json(CompaniesResponse {
        companies: companies.into_iter().map(Into::into).collect(),
    }))
}

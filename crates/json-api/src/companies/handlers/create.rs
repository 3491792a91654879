//! Create Company Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use tenantry_app::domain::companies::{data::NewCompany, records::CompanyUuid};

use crate::{
    companies::{errors::into_status_error, get::CompanyResponse},
    extensions::*,
    state::State,
};

/// Create Company Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCompanyRequest {
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

    /// Defaults to America/Santiago
    #[serde(default)]
    pub timezone: Option<String>,

    /// Defaults to opted in
    #[serde(default)]
    pub opt_in_benchmarking: Option<bool>,
}

impl From<CreateCompanyRequest> for NewCompany {
    fn from(request: CreateCompanyRequest) -> Self {
        NewCompany {
            uuid: CompanyUuid::new(),
            name: request.name,
            identifier: request.identifier,
            country: request.country,
            industry: request.industry,
            timezone: request.timezone,
            opt_in_benchmarking: request.opt_in_benchmarking,
            is_demo: false,
        }
    }
}

/// Create Company Handler
///
/// The company always belongs to the caller's tenant.
#[endpoint(
    tags("companies"),
    summary = "Create Company",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Company created"),
        (status_code = StatusCode::CONFLICT, description = "Company already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "No tenant associated with this user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCompanyRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CompanyResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    let company = state
        .app
        .companies
        .create_company(tenant, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/companies/{}", company.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(company.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use tenantry_app::domain::companies::{CompaniesServiceError, MockCompaniesService};

    use crate::test_helpers::{TEST_TENANT_UUID, companies_service, make_company};

    use super::*;

    fn make_service(companies: MockCompaniesService) -> Service {
        companies_service(companies, Router::with_path("companies").post(handler))
    }

    #[tokio::test]
    async fn test_create_company_success() -> TestResult {
        let mut companies = MockCompaniesService::new();

        companies
            .expect_create_company()
            .once()
            .withf(|tenant, new| {
                *tenant == TEST_TENANT_UUID
                    && new.name == "Acme SpA"
                    && new.country == "CL"
                    && new.timezone.is_none()
                    && !new.is_demo
            })
            .return_once(|_, new| Ok(make_company(new.uuid)));

        companies.expect_list_companies().never();
        companies.expect_get_company().never();
        companies.expect_update_company().never();
        companies.expect_delete_company().never();

        let mut res = TestClient::post("http://example.com/companies")
            .json(&json!({ "name": "Acme SpA", "country": "CL" }))
            .send(&make_service(companies))
            .await;

        let body: CompanyResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/companies/{}", body.uuid).as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_company_invalid_data_returns_400() -> TestResult {
        let mut companies = MockCompaniesService::new();

        companies
            .expect_create_company()
            .once()
            .return_once(|_, _| Err(CompaniesServiceError::InvalidData));

        let res = TestClient::post("http://example.com/companies")
            .json(&json!({ "name": "Acme SpA", "country": "Chile" }))
            .send(&make_service(companies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}

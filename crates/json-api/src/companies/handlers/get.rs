//! Get Company Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenantry_app::domain::companies::records::CompanyRecord;

use crate::{companies::errors::into_status_error, extensions::*, state::State};

/// Company Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CompanyResponse {
    /// The unique identifier of the company
    pub uuid: Uuid,

    /// Display name
    pub name: String,

    /// Tax or registry identifier
    pub identifier: Option<String>,

    /// ISO 3166-1 alpha-2 country code
    pub country: String,

    /// Free-form industry label
    pub industry: Option<String>,

    /// IANA time zone name
    pub timezone: String,

    /// Whether the company shares anonymised data for benchmarks
    pub opt_in_benchmarking: bool,

    /// Seeded demonstration data
    pub is_demo: bool,

    /// The date and time the company was created
    pub created_at: String,

    /// The date and time the company was last updated
    pub updated_at: String,
}

impl From<CompanyRecord> for CompanyResponse {
    fn from(company: CompanyRecord) -> Self {
        CompanyResponse {
            uuid: company.uuid.into(),
            name: company.name,
            identifier: company.identifier,
            country: company.country,
            industry: company.industry,
            timezone: company.timezone,
            opt_in_benchmarking: company.opt_in_benchmarking,
            is_demo: company.is_demo,
            created_at: company.created_at.to_string(),
            updated_at: company.updated_at.to_string(),
        }
    }
}

/// Get Company Handler
///
/// Returns a company of the caller's tenant.
#[endpoint(
    tags("companies"),
    summary = "Get Company",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The company"),
        (status_code = StatusCode::NOT_FOUND, description = "Company not found"),
        (status_code = StatusCode::FORBIDDEN, description = "No tenant associated with this user"),
    ),
)]
pub(crate) async fn handler(
    company: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CompanyResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    let company = state
        .app
        .companies
        .get_company(tenant, company.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(company.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use tenantry_app::domain::companies::{
        CompaniesServiceError, MockCompaniesService, records::CompanyUuid,
    };

    use crate::test_helpers::{TEST_TENANT_UUID, companies_service, make_company};

    use super::*;

    fn make_service(companies: MockCompaniesService) -> Service {
        companies_service(companies, Router::with_path("companies/{company}").get(handler))
    }

    #[tokio::test]
    async fn test_get_returns_200() -> TestResult {
        let mut companies = MockCompaniesService::new();
        let uuid = CompanyUuid::new();
        let company = make_company(uuid);

        companies
            .expect_get_company()
            .once()
            .withf(move |tenant, u| *tenant == TEST_TENANT_UUID && *u == uuid)
            .return_once(move |_, _| Ok(company));

        companies.expect_list_companies().never();
        companies.expect_create_company().never();
        companies.expect_update_company().never();
        companies.expect_delete_company().never();

        let mut res = TestClient::get(format!("http://example.com/companies/{uuid}"))
            .send(&make_service(companies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CompanyResponse = res.take_json().await?;

        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.country, "CL");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_foreign_company_returns_404() -> TestResult {
        let mut companies = MockCompaniesService::new();
        let uuid = CompanyUuid::new();

        companies
            .expect_get_company()
            .once()
            .withf(move |tenant, u| *tenant == TEST_TENANT_UUID && *u == uuid)
            .return_once(|_, _| Err(CompaniesServiceError::NotFound));

        companies.expect_list_companies().never();
        companies.expect_create_company().never();
        companies.expect_update_company().never();
        companies.expect_delete_company().never();

        let res = TestClient::get(format!("http://example.com/companies/{uuid}"))
            .send(&make_service(companies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}

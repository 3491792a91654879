//! Delete Company Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{companies::errors::into_status_error, extensions::*, state::State};

/// Delete Company Handler
///
/// Deletes the company together with its locations.
#[endpoint(
    tags("companies"),
    summary = "Delete Company",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Company deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Company not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    company: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let tenant = depot.tenant_or_403()?;

    state
        .app
        .companies
        .delete_company(tenant, company.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use tenantry_app::domain::companies::{
        CompaniesServiceError, MockCompaniesService, records::CompanyUuid,
    };

    use crate::test_helpers::{TEST_TENANT_UUID, companies_service};

    use super::*;

    fn make_service(companies: MockCompaniesService) -> Service {
        companies_service(
            companies,
            Router::with_path("companies/{company}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_delete_company_success() -> TestResult {
        let mut companies = MockCompaniesService::new();
        let uuid = CompanyUuid::new();

        companies
            .expect_delete_company()
            .once()
            .withf(move |tenant, u| *tenant == TEST_TENANT_UUID && *u == uuid)
            .return_once(|_, _| Ok(()));

        companies.expect_list_companies().never();
        companies.expect_get_company().never();
        companies.expect_create_company().never();
        companies.expect_update_company().never();

        let res = TestClient::delete(format!("http://example.com/companies/{uuid}"))
            .send(&make_service(companies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_company_returns_404() -> TestResult {
        let mut companies = MockCompaniesService::new();

        companies
            .expect_delete_company()
            .once()
            .return_once(|_, _| Err(CompaniesServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/companies/{}", CompanyUuid::new()))
            .send(&make_service(companies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}

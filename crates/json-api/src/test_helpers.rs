//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use tenantry_app::{
    auth::{MockAuthService, MockOAuthService},
    context::AppContext,
    domain::{
        companies::{
            MockCompaniesService,
            records::{CompanyRecord, CompanyUuid},
        },
        locations::{
            MockLocationsService,
            records::{LocationRecord, LocationUuid},
        },
        refresh_tokens::MockRefreshTokenStore,
        tenants::records::TenantUuid,
        users::records::{Role, UserRecord, UserUuid},
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_TENANT_UUID: TenantUuid = TenantUuid::from_uuid(Uuid::nil());

/// A verified owner of `tenant`, or a superuser when `tenant` is `None`.
pub(crate) fn make_user(tenant: Option<TenantUuid>) -> UserRecord {
    UserRecord {
        uuid: UserUuid::from_uuid(Uuid::from_u128(1)),
        email: "owner@example.com".to_string(),
        hashed_password: None,
        full_name: Some("Owner".to_string()),
        tenant_uuid: tenant,
        role: Role::Owner,
        is_active: true,
        is_superuser: tenant.is_none(),
        is_verified: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_company(uuid: CompanyUuid) -> CompanyRecord {
    CompanyRecord {
        uuid,
        tenant_uuid: TEST_TENANT_UUID,
        name: "Acme SpA".to_string(),
        identifier: Some("76.123.456-7".to_string()),
        country: "CL".to_string(),
        industry: None,
        timezone: "America/Santiago".to_string(),
        opt_in_benchmarking: true,
        is_demo: false,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_location(uuid: LocationUuid, company: CompanyUuid) -> LocationRecord {
    LocationRecord {
        uuid,
        company_uuid: company,
        name: "Providencia".to_string(),
        address: None,
        website: None,
        is_primary: true,
        deleted_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

#[salvo::handler]
pub(crate) async fn inject_principal(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(make_user(Some(TEST_TENANT_UUID)).into());
    ctrl.call_next(req, depot, res).await;
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_register().never();
    auth.expect_login().never();
    auth.expect_refresh().never();
    auth.expect_logout().never();
    auth.expect_authenticate().never();
    auth.expect_verify_email().never();
    auth.expect_resend_verification().never();
    auth.expect_request_password_reset().never();
    auth.expect_confirm_password_reset().never();

    auth
}

fn strict_oauth_mock() -> MockOAuthService {
    let mut oauth = MockOAuthService::new();

    oauth.expect_begin_oauth().never();
    oauth.expect_complete_oauth().never();

    oauth
}

fn strict_companies_mock() -> MockCompaniesService {
    let mut companies = MockCompaniesService::new();

    companies.expect_list_companies().never();
    companies.expect_get_company().never();
    companies.expect_create_company().never();
    companies.expect_update_company().never();
    companies.expect_delete_company().never();

    companies
}

fn strict_locations_mock() -> MockLocationsService {
    let mut locations = MockLocationsService::new();

    locations.expect_list_locations().never();
    locations.expect_create_location().never();
    locations.expect_delete_location().never();

    locations
}

fn strict_refresh_tokens_mock() -> MockRefreshTokenStore {
    let mut refresh_tokens = MockRefreshTokenStore::new();

    refresh_tokens.expect_issue_and_store().never();
    refresh_tokens.expect_redeem().never();
    refresh_tokens.expect_mark_used().never();
    refresh_tokens.expect_mark_revoked().never();
    refresh_tokens.expect_revoke_all().never();
    refresh_tokens.expect_sweep_expired().never();

    refresh_tokens
}

fn strict_context() -> AppContext {
    AppContext {
        auth: Arc::new(strict_auth_mock()),
        oauth: Arc::new(strict_oauth_mock()),
        companies: Arc::new(strict_companies_mock()),
        locations: Arc::new(strict_locations_mock()),
        refresh_tokens: Arc::new(strict_refresh_tokens_mock()),
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    State::from_app_context(AppContext {
        auth: Arc::new(auth),
        ..strict_context()
    })
}

pub(crate) fn state_with_refresh_tokens(refresh_tokens: MockRefreshTokenStore) -> Arc<State> {
    State::from_app_context(AppContext {
        refresh_tokens: Arc::new(refresh_tokens),
        ..strict_context()
    })
}

/// Public auth routes: no principal is injected.
pub(crate) fn auth_service(auth: MockAuthService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_auth(auth)))
            .push(route),
    )
}

/// Routes behind the auth middleware, with a tenant owner already resolved.
pub(crate) fn signed_in_service(auth: MockAuthService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_auth(auth)))
            .hoop(inject_principal)
            .push(route),
    )
}

pub(crate) fn companies_service(companies: MockCompaniesService, route: Router) -> Service {
    let state = State::from_app_context(AppContext {
        companies: Arc::new(companies),
        ..strict_context()
    });

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_principal)
            .push(route),
    )
}

pub(crate) fn locations_service(locations: MockLocationsService, route: Router) -> Service {
    let state = State::from_app_context(AppContext {
        locations: Arc::new(locations),
        ..strict_context()
    });

    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_principal)
            .push(route),
    )
}

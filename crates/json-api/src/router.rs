//! App Router

use salvo::Router;

use crate::{auth, companies, locations, users};

/// Routes that need no credentials.
fn public_router() -> Router {
    Router::with_path("auth")
        .push(Router::with_path("register").post(auth::register::handler))
        .push(Router::with_path("login").post(auth::login::handler))
        .push(Router::with_path("refresh").post(auth::refresh::handler))
        .push(Router::with_path("verify-email").post(auth::verify_email::handler))
        .push(Router::with_path("resend-verification").post(auth::resend_verification::handler))
        .push(Router::with_path("reset-password").post(auth::reset_password::handler))
        .push(Router::with_path("confirm-reset").post(auth::confirm_reset::handler))
}

/// Routes behind the bearer token middleware.
fn protected_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(Router::with_path("auth/logout").post(auth::logout::handler))
        .push(Router::with_path("users/me").get(users::me::handler))
        .push(
            Router::with_path("companies")
                .get(companies::index::handler)
                .post(companies::create::handler)
                .push(
                    Router::with_path("{company}")
                        .get(companies::get::handler)
                        .put(companies::update::handler)
                        .delete(companies::delete::handler)
                        .push(
                            Router::with_path("locations")
                                .get(locations::index::handler)
                                .post(locations::create::handler),
                        ),
                ),
        )
        .push(Router::with_path("locations/{location}").delete(locations::delete::handler))
}

pub(crate) fn app_router() -> Router {
    Router::new().push(public_router()).push(protected_router())
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::{StatusCode, header::AUTHORIZATION},
        oapi::OpenApi,
        prelude::Service,
        test::TestClient,
    };
    use serde_json::json;
    use testresult::TestResult;

    use tenantry_app::auth::{AuthServiceError, MockAuthService, TokenPair};

    use crate::test_helpers::state_with_auth;

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(state_with_auth(auth)))
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn test_public_routes_skip_authentication() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate().never();
        auth.expect_login()
            .once()
            .return_once(|_, _| Ok(TokenPair::bearer("a".to_string(), "r".to_string())));

        let res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "email": "owner@example.com", "password": "correct-horse" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_token() -> TestResult {
        let service = make_service(MockAuthService::new());

        for (method, path) in [
            ("GET", "/users/me"),
            ("GET", "/companies"),
            ("POST", "/auth/logout"),
            ("DELETE", "/locations/0190f1a2-b3c4-7d5e-8f60-718293a4b5c6"),
        ] {
            let url = format!("http://example.com{path}");

            let request = match method {
                "GET" => TestClient::get(url),
                "POST" => TestClient::post(url),
                _ => TestClient::delete(url),
            };

            let res = request.send(&service).await;

            assert_eq!(
                res.status_code,
                Some(StatusCode::UNAUTHORIZED),
                "{method} {path}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected_before_handlers() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate()
            .once()
            .return_once(|_| Err(AuthServiceError::InactiveUser));
        auth.expect_logout().never();

        let res = TestClient::post("http://example.com/auth/logout")
            .add_header(AUTHORIZATION, "Bearer deactivated", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[test]
    fn test_openapi_schemas_describe_fields() -> TestResult {
        let json = OpenApi::new("Tenantry API", "test")
            .merge_router(&app_router())
            .to_json()?;

        for description in [
            "Bearer token for protected routes",
            "Refresh token from login or a previous refresh",
            "Token from the reset email",
            "Main site of the company",
            "Whether the company shares anonymised data for benchmarks",
        ] {
            assert!(
                json.contains(description),
                "schema field description missing: {description}"
            );
        }

        Ok(())
    }
}

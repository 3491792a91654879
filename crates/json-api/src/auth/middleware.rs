//! Auth middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::{debug, warn};

use tenantry_app::auth::AuthServiceError;

use crate::{auth::errors::into_status_error, extensions::*, state::State};

/// Resolve the bearer token into a [`Principal`](tenantry_app::auth::Principal) for
/// the rest of the chain.
///
/// The tenant itself is bound later, inside each service transaction.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Not authenticated"));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => state,
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();

            return;
        }
    };

    let principal = match state.app.auth.authenticate(token).await {
        Ok(principal) => principal,
        Err(AuthServiceError::UserNotFound) => {
            warn!(request_id = ?depot.request_id(), "token subject no longer exists");

            res.render(StatusError::unauthorized().brief("Could not validate credentials"));
            ctrl.skip_rest();

            return;
        }
        Err(error) => {
            warn!(request_id = ?depot.request_id(), %error, "bearer token rejected");

            res.render(into_status_error(error));
            ctrl.skip_rest();

            return;
        }
    };

    debug!(user_uuid = %principal.user.uuid, tenant_uuid = ?principal.tenant, "authenticated");

    depot.insert_principal(principal);

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

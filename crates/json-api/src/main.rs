//! Tenantry JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info, warn};

use tenantry_app::{
    auth::AuthCredentials,
    cache::InMemoryCache,
    context::{AppContext, AppSettings},
    credentials::{SecretBox, TokenCodec},
    mailer::LogMailer,
};

use crate::{config::ServerConfig, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod companies;
mod config;
mod extensions;
mod healthcheck;
mod jobs;
mod locations;
mod observability;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod users;

/// Tenantry JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let (config, warnings) = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init_logging(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        process::exit(1);
    }

    for warning in warnings {
        warn!("{warning}");
    }

    let hasher = match config.auth.password_hasher() {
        Ok(hasher) => hasher,
        Err(hash_error) => {
            error!("invalid password hashing parameters: {hash_error}");

            process::exit(1);
        }
    };

    let cache = Arc::new(InMemoryCache::new());

    let settings = AppSettings {
        database: config.database.settings(),
        credentials: AuthCredentials {
            codec: TokenCodec::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttls()),
            hasher,
            secrets: SecretBox::from_master_secret(&config.auth.jwt_secret),
        },
        auth: config.email.auth_settings(),
        cache: cache.clone(),
        mailer: Arc::new(LogMailer),
    };

    let app = match AppContext::connect(settings).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let mut jobs = vec![tokio::spawn(jobs::purge_cache(
        cache,
        jobs::CACHE_PURGE_PERIOD,
    ))];

    if let Some(period) = config.jobs.sweep_interval() {
        jobs.push(tokio::spawn(jobs::sweep_refresh_tokens(
            app.refresh_tokens.clone(),
            period,
        )));
    }

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(State::from_app_context(app)))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(router::app_router());

    let doc = OpenApi::new("Tenantry API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, jobs).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;
}

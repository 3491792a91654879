//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    auth::{AuthCredentials, AuthService, AuthSettings, OAuthService, PgAuthService},
    cache::Cache,
    database::{self, DatabaseSettings, Db, RoleCheckError},
    domain::{
        companies::{CompaniesService, PgCompaniesService},
        locations::{LocationsService, PgLocationsService},
        refresh_tokens::RefreshTokenStore,
    },
    mailer::Mailer,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("database role is unsafe for tenant data")]
    RoleCheck(#[source] RoleCheckError),
}

/// Everything needed to assemble the services.
#[derive(Clone)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub credentials: AuthCredentials,
    pub auth: AuthSettings,
    pub cache: Arc<dyn Cache>,
    pub mailer: Arc<dyn Mailer>,
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub oauth: Arc<dyn OAuthService>,
    pub companies: Arc<dyn CompaniesService>,
    pub locations: Arc<dyn LocationsService>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl AppContext {
    /// Connect to the database and build the application context.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the
    /// connected role would bypass row-level security.
    pub async fn connect(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database)
            .await
            .map_err(AppInitError::Database)?;

        database::ensure_rls_enforced_role(&pool)
            .await
            .map_err(AppInitError::RoleCheck)?;

        Ok(Self::from_pool(pool, settings))
    }

    /// Build the application context on an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool, settings: AppSettings) -> Self {
        let db = Db::new(pool.clone());

        let auth = Arc::new(PgAuthService::new(
            pool,
            settings.credentials,
            settings.cache,
            settings.mailer,
            settings.auth,
        ));

        Self {
            refresh_tokens: auth.refresh_tokens(),
            oauth: auth.clone(),
            auth,
            companies: Arc::new(PgCompaniesService::new(db.clone())),
            locations: Arc::new(PgLocationsService::new(db)),
        }
    }
}

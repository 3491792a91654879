use std::sync::Arc;

use clap::Args;
use tenantry_app::{
    auth::{AuthCredentials, AuthServiceError, AuthSettings, PgAuthService},
    cache::InMemoryCache,
    credentials::{PasswordHasher, SecretBox, TokenCodec, TokenTtls},
    database::{self, DatabaseSettings},
    mailer::LogMailer,
};

#[derive(Debug, Args)]
pub(crate) struct CreateSuperuserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Deployment secret shared with the API server
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Superuser email address
    #[arg(long, env = "FIRST_SUPERUSER")]
    email: String,

    /// Superuser password
    #[arg(long, env = "FIRST_SUPERUSER_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(args: CreateSuperuserArgs) -> Result<(), String> {
    let pool = database::connect(&DatabaseSettings::new(&args.database_url))
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAuthService::new(
        pool,
        AuthCredentials {
            codec: TokenCodec::new(args.jwt_secret.as_bytes(), TokenTtls::default()),
            hasher: PasswordHasher::default(),
            secrets: SecretBox::from_master_secret(&args.jwt_secret),
        },
        Arc::new(InMemoryCache::new()),
        Arc::new(LogMailer),
        AuthSettings::default(),
    );

    match service.create_superuser(&args.email, &args.password).await {
        Ok(user) => {
            println!("user_uuid: {}", user.uuid);
            println!("email: {}", user.email);

            Ok(())
        }
        Err(AuthServiceError::EmailTaken) => {
            println!("a user with email {} already exists; nothing to do", args.email);

            Ok(())
        }
        Err(error) => Err(format!("failed to create superuser: {error}")),
    }
}

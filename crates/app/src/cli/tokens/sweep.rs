use clap::Args;
use tenantry_app::{
    credentials::{PasswordHasher, TokenCodec, TokenTtls},
    database::{self, DatabaseSettings},
    domain::refresh_tokens::{PgRefreshTokenStore, RefreshTokenStore},
};

#[derive(Debug, Args)]
pub(crate) struct SweepTokensArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Deployment secret shared with the API server
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,
}

pub(crate) async fn run(args: SweepTokensArgs) -> Result<(), String> {
    let pool = database::connect(&DatabaseSettings::new(&args.database_url))
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let store = PgRefreshTokenStore::new(
        pool,
        TokenCodec::new(args.jwt_secret.as_bytes(), TokenTtls::default()),
        PasswordHasher::default(),
    );

    let deleted = store
        .sweep_expired()
        .await
        .map_err(|error| format!("failed to sweep refresh tokens: {error}"))?;

    println!("deleted expired refresh tokens: {deleted}");

    Ok(())
}

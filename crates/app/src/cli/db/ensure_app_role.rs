use clap::Args;
use sqlx::{Postgres, Transaction, query, query_scalar};
use tenantry_app::database::{self, DatabaseSettings};

/// Flags that keep the runtime role subject to row-level security.
const RUNTIME_ROLE_FLAGS: &str = "NOSUPERUSER NOCREATEDB NOCREATEROLE NOREPLICATION NOBYPASSRLS";

#[derive(Debug, Args)]
pub(crate) struct EnsureAppRoleArgs {
    /// Administrative PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Application runtime role name
    #[arg(long = "role", default_value = "tenantry_app")]
    role_name: String,

    /// Application role password
    #[arg(long, env = "APP_DB_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(args: EnsureAppRoleArgs) -> Result<(), String> {
    if args.role_name.trim().is_empty() {
        return Err("role cannot be empty".to_string());
    }

    if args.password.trim().is_empty() {
        return Err("password cannot be empty".to_string());
    }

    // CREATE ROLE and GRANT need the administrative role, not the runtime one.
    let pool = database::connect(&DatabaseSettings {
        min_connections: 1,
        max_connections: 1,
        ..DatabaseSettings::new(&args.database_url)
    })
    .await
    .map_err(|error| format!("failed to connect to database: {error}"))?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|error| format!("failed to start transaction: {error}"))?;

    let role_ident = quote(&mut tx, "quote_ident", &args.role_name).await?;
    let password_lit = quote(&mut tx, "quote_literal", &args.password).await?;

    let role_exists: bool =
        query_scalar("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)")
            .bind(&args.role_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|error| format!("failed to check role existence: {error}"))?;

    let database_ident: String = query_scalar("SELECT quote_ident(current_database())")
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| format!("failed to resolve database name: {error}"))?;

    for sql in role_statements(&role_ident, &password_lit, role_exists, &database_ident) {
        query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(|error| format!("failed to apply `{}`: {error}", redact(&sql)))?;
    }

    tx.commit()
        .await
        .map_err(|error| format!("failed to commit changes: {error}"))?;

    println!(
        "{} app role: {}",
        if role_exists { "updated" } else { "created" },
        args.role_name
    );
    println!("granted DML on public tables and sequences");

    Ok(())
}

/// Quote a value server-side with `quote_ident` or `quote_literal`.
async fn quote(
    tx: &mut Transaction<'_, Postgres>,
    function: &str,
    value: &str,
) -> Result<String, String> {
    query_scalar(&format!("SELECT {function}($1)"))
        .bind(value)
        .fetch_one(&mut **tx)
        .await
        .map_err(|error| format!("failed to {function} value: {error}"))
}

/// Statements that create or realign the runtime role and its privileges.
fn role_statements(
    role_ident: &str,
    password_lit: &str,
    role_exists: bool,
    database_ident: &str,
) -> Vec<String> {
    let verb = if role_exists { "ALTER" } else { "CREATE" };

    vec![
        format!("{verb} ROLE {role_ident} LOGIN PASSWORD {password_lit} {RUNTIME_ROLE_FLAGS}"),
        format!("GRANT CONNECT ON DATABASE {database_ident} TO {role_ident}"),
        format!("GRANT USAGE ON SCHEMA public TO {role_ident}"),
        format!(
            "GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {role_ident}"
        ),
        format!("GRANT USAGE, SELECT, UPDATE ON ALL SEQUENCES IN SCHEMA public TO {role_ident}"),
        format!(
            "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT SELECT, INSERT, UPDATE, DELETE ON TABLES TO {role_ident}"
        ),
        format!(
            "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT USAGE, SELECT, UPDATE ON SEQUENCES TO {role_ident}"
        ),
    ]
}

/// Keep the password out of error messages.
fn redact(sql: &str) -> &str {
    sql.split_once(" PASSWORD ").map_or(sql, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_role_is_created_without_rls_bypass() {
        let statements = role_statements("tenantry_app", "'secret'", false, "tenantry");

        assert_eq!(
            statements[0],
            "CREATE ROLE tenantry_app LOGIN PASSWORD 'secret' \
             NOSUPERUSER NOCREATEDB NOCREATEROLE NOREPLICATION NOBYPASSRLS"
        );
        assert_eq!(
            statements[1],
            "GRANT CONNECT ON DATABASE tenantry TO tenantry_app"
        );
    }

    #[test]
    fn existing_role_is_realigned() {
        let statements = role_statements("tenantry_app", "'secret'", true, "tenantry");

        assert!(
            statements[0].starts_with("ALTER ROLE tenantry_app LOGIN"),
            "{}",
            statements[0]
        );
        assert!(statements[0].ends_with("NOBYPASSRLS"), "{}", statements[0]);
    }

    #[test]
    fn redaction_drops_the_password() {
        assert_eq!(
            redact("ALTER ROLE app LOGIN PASSWORD 'secret' NOSUPERUSER"),
            "ALTER ROLE app LOGIN"
        );
        assert_eq!(redact("GRANT USAGE ON SCHEMA public TO app"), "GRANT USAGE ON SCHEMA public TO app");
    }
}

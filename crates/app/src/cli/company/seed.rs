use clap::Args;
use tenantry_app::{
    database::{self, DatabaseSettings, Db},
    domain::{
        companies::{PgCompaniesService, data::NewCompany, records::CompanyUuid},
        tenants::records::TenantUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct SeedCompanyArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Tenant that owns the company
    #[arg(long)]
    tenant: Uuid,

    /// Company display name
    #[arg(long)]
    name: String,

    /// ISO country code
    #[arg(long, default_value = "CL")]
    country: String,

    /// Mark the company as demo data
    #[arg(long)]
    demo: bool,
}

pub(crate) async fn run(args: SeedCompanyArgs) -> Result<(), String> {
    if args.name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }

    let pool = database::connect(&DatabaseSettings::new(&args.database_url))
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCompaniesService::new(Db::new(pool));

    let company_uuid = service
        .seed_company_unscoped(
            TenantUuid::from_uuid(args.tenant),
            NewCompany {
                uuid: CompanyUuid::new(),
                name: args.name,
                identifier: None,
                country: args.country,
                industry: None,
                timezone: None,
                opt_in_benchmarking: None,
                is_demo: args.demo,
            },
        )
        .await
        .map_err(|error| format!("failed to seed company: {error}"))?;

    println!("company_uuid: {company_uuid}");
    println!("tenant_uuid: {}", args.tenant);

    Ok(())
}

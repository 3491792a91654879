use clap::{Parser, Subcommand};

mod company;
mod db;
mod superuser;
mod tokens;

#[derive(Debug, Parser)]
#[command(name = "tenantry-app", about = "Tenantry administration CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Superuser(superuser::SuperuserCommand),
    Tokens(tokens::TokensCommand),
    Company(company::CompanyCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Superuser(command) => superuser::run(command).await,
            Commands::Tokens(command) => tokens::run(command).await,
            Commands::Company(command) => company::run(command).await,
        }
    }
}

use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct SuperuserCommand {
    #[command(subcommand)]
    command: SuperuserSubcommand,
}

#[derive(Debug, Subcommand)]
enum SuperuserSubcommand {
    Create(create::CreateSuperuserArgs),
}

pub(crate) async fn run(command: SuperuserCommand) -> Result<(), String> {
    match command.command {
        SuperuserSubcommand::Create(args) => create::run(args).await,
    }
}

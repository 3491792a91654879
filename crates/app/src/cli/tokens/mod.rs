use clap::{Args, Subcommand};

mod sweep;

#[derive(Debug, Args)]
pub(crate) struct TokensCommand {
    #[command(subcommand)]
    command: TokensSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokensSubcommand {
    /// Delete every expired refresh token
    Sweep(sweep::SweepTokensArgs),
}

pub(crate) async fn run(command: TokensCommand) -> Result<(), String> {
    match command.command {
        TokensSubcommand::Sweep(args) => sweep::run(args).await,
    }
}

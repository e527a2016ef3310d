mod apply;
mod common;
mod delete;
mod error;
pub mod parser;
mod preview;
mod render;
mod status;
mod ui;
mod validate;

use clap::Parser;
pub use error::CliError;
use parser::Cli;

// Helper function to parse args
pub fn parse_args() -> Cli {
    Cli::parse()
}

// Main CLI execution function, receives parsed args
pub async fn run(cli: Cli) -> Result<(), CliError> {
    match &cli.command {
        parser::Commands::Render(cmd) => cmd.run(&cli).await,
        parser::Commands::Validate(cmd) => cmd.run(&cli).await,
        parser::Commands::Preview(cmd) => cmd.run(&cli).await,
        parser::Commands::Apply(cmd) => cmd.run(&cli).await,
        parser::Commands::Status(cmd) => cmd.run(&cli).await,
        parser::Commands::Delete(cmd) => cmd.run(&cli).await,
    }
}

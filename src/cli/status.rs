use super::common::{write_stack, CommandContext};
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::stack::StackManager;
use clap::Args;
use std::io;
use tracing::instrument;

#[derive(Debug, Args)]
pub struct Status {}

impl Status {
    #[instrument(name = "status", skip_all)]
    pub async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let context = CommandContext::load(cli)?;
        let templates = context.selected(cli)?;
        let client = context.connect().await;
        let manager = StackManager::new(&client);

        for (i, (name, _)) in templates.iter().enumerate() {
            let stack = context.stack_name(name)?;
            let pb = ui::spinner(
                !cli.no_progress,
                &format!("Fetching status of {}...", ui::format_highlight(&stack)),
            );
            let result = manager.status(&stack).await;
            pb.finish_and_clear();

            match result.map_err(CliError::stack("Status check", &stack))? {
                Some(description) => write_stack(&mut io::stdout().lock(), &description)?,
                None => println!(
                    "{}",
                    ui::format_warning(&format!("Stack `{}` does not exist.", stack))
                ),
            }

            ui::print_separator(i, templates.len());
        }

        Ok(())
    }
}

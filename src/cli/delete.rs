use super::common::CommandContext;
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::stack::StackManager;
use clap::Args;
use dialoguer::Confirm;
use tracing::{info, instrument, warn};

#[derive(Debug, Args)]
pub struct Delete {
    /// Logical id of a resource to keep when the stack is deleted. May be repeated
    #[arg(short, long = "retain", value_name = "RESOURCE")]
    pub retain: Vec<String>,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl Delete {
    #[instrument(name = "delete", skip_all)]
    pub async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let context = CommandContext::load(cli)?;
        let templates = context.selected(cli)?;
        let [(name, _)] = templates.as_slice() else {
            return Err(CliError::ConfigError(
                "Delete one stack at a time; select it with --template".to_string(),
            ));
        };
        let stack = context.stack_name(name)?;

        let client = context.connect().await;
        let manager = StackManager::new(&client);

        let pb = ui::spinner(!cli.no_progress, "Checking stack...");
        let existing = manager.status(&stack).await;
        pb.finish_and_clear();
        if existing.map_err(CliError::stack("Status check", &stack))?.is_none() {
            println!(
                "{}",
                ui::format_warning(&format!("Stack `{}` does not exist.", stack))
            );
            return Ok(());
        }

        if !self.yes {
            warn!("This deletes every resource of the stack that is not retained.");
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to delete stack {}?",
                    ui::format_highlight(&stack)
                ))
                .default(false)
                .interact()
                .map_err(|e| {
                    CliError::OperationFailed(format!("Failed to get confirmation: {}", e))
                })?;
            if !confirmed {
                info!("Deletion cancelled by user.");
                return Ok(());
            }
        }

        let pb = ui::spinner(
            !cli.no_progress,
            &format!("Deleting stack {}...", ui::format_highlight(&stack)),
        );
        let result = manager.delete(&stack, &self.retain).await;
        pb.finish_and_clear();
        result.map_err(CliError::stack("Delete", &stack))?;

        println!(
            "{}",
            ui::format_success(&format!("Deletion of stack `{}` has started.", stack))
        );
        if !self.retain.is_empty() {
            println!("Retained resources: {}", self.retain.join(", "));
        }
        Ok(())
    }
}

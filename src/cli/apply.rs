use super::common::CommandContext;
use super::error::CliError;
use super::parser::{Cli, StackInputs};
use super::ui;
use crate::stack::{stack_request, ApplyOutcome, StackManager};
use clap::Args;
use tracing::{debug, instrument};

#[derive(Debug, Args)]
pub struct Apply {
    /// Execute this change set instead of updating stacks directly
    #[arg(
        long = "change-set",
        alias = "changeset",
        value_name = "ID",
        conflicts_with_all = ["tags", "params", "capabilities"]
    )]
    pub change_set: Option<String>,

    #[command(flatten)]
    pub inputs: StackInputs,
}

impl Apply {
    #[instrument(name = "apply", skip_all, fields(change_set = ?self.change_set))]
    pub async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        if let Some(change_set) = &self.change_set {
            return self.execute_change_set(cli, change_set).await;
        }

        let context = CommandContext::load(cli)?;
        let templates = context.selected(cli)?;
        let options = context.stack_options(&self.inputs)?;
        let client = context.connect().await;
        let manager = StackManager::new(&client);

        for (i, (name, template)) in templates.iter().enumerate() {
            let stack = context.stack_name(name)?;
            let request = stack_request(&stack, template, &options)
                .map_err(CliError::stack("Stack preparation", &stack))?;

            let pb = ui::spinner(
                !cli.no_progress,
                &format!("Applying {}...", ui::format_highlight(&stack)),
            );
            let result = manager.apply(&request).await;
            pb.finish_and_clear();

            match result.map_err(CliError::stack("Apply", &stack))? {
                ApplyOutcome::Created { stack_id } => {
                    debug!(stack_id = %stack_id, "Stack creation started");
                    println!("{}", ui::format_success(&format!("Creating stack `{}`.", stack)));
                }
                ApplyOutcome::Updated { stack_id } => {
                    debug!(stack_id = %stack_id, "Stack update started");
                    println!("{}", ui::format_success(&format!("Updating stack `{}`.", stack)));
                }
                ApplyOutcome::Unchanged => {
                    println!(
                        "{}",
                        ui::format_warning(&format!("Stack `{}` is already up to date.", stack))
                    );
                }
            }

            ui::print_separator(i, templates.len());
        }

        Ok(())
    }

    async fn execute_change_set(&self, cli: &Cli, change_set: &str) -> Result<(), CliError> {
        let context = CommandContext::load(cli)?;
        let client = context.connect().await;
        let manager = StackManager::new(&client);

        let pb = ui::spinner(!cli.no_progress, "Executing change set...");
        let result = manager.execute_change_set(change_set).await;
        pb.finish_and_clear();
        result.map_err(|e| {
            CliError::OperationFailed(format!("Executing change set {} failed: {}", change_set, e))
        })?;

        println!("{}", ui::format_success("Change set has been executed."));
        Ok(())
    }
}

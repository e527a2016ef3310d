use super::common::CommandContext;
use super::error::CliError;
use super::parser::{Cli, StackInputs};
use super::ui;
use crate::client::ChangeSetDescription;
use crate::stack::{stack_request, StackManager};
use clap::Args;
use std::io::{self, Write};
use tracing::instrument;

#[derive(Debug, Args)]
pub struct Preview {
    #[command(flatten)]
    pub inputs: StackInputs,
}

impl Preview {
    #[instrument(name = "preview", skip_all)]
    pub async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let context = CommandContext::load(cli)?;
        let templates = context.selected(cli)?;
        let options = context.stack_options(&self.inputs)?;
        let client = context.connect().await;
        let manager = StackManager::new(&client);

        for (i, (name, template)) in templates.iter().enumerate() {
            let stack = context.stack_name(name)?;
            let request = stack_request(&stack, template, &options)
                .map_err(CliError::stack("Change set preparation", &stack))?;

            let pb = ui::spinner(
                !cli.no_progress,
                &format!("Creating change set for {}...", ui::format_highlight(&stack)),
            );
            let result = manager.preview(request).await;
            pb.finish_and_clear();
            let change_set = result.map_err(CliError::stack("Change set creation", &stack))?;

            write_change_set(&mut io::stdout().lock(), &stack, &change_set)?;
            ui::print_separator(i, templates.len());
        }

        Ok(())
    }
}

fn write_change_set(
    out: &mut impl Write,
    stack: &str,
    change_set: &ChangeSetDescription,
) -> io::Result<()> {
    writeln!(out, "{}", ui::format_header(&format!("Stack: {}", stack)))?;
    writeln!(out, "Change set id: {}", change_set.id)?;
    writeln!(out, "Status: {}", ui::format_status(&change_set.status))?;
    if let Some(reason) = &change_set.status_reason {
        writeln!(out, "Status reason: {}", reason)?;
    }
    if let Some(execution_status) = &change_set.execution_status {
        writeln!(out, "Execution status: {}", execution_status)?;
    }
    writeln!(out)?;

    if change_set.changes.is_empty() {
        writeln!(out, "{}", ui::format_warning("No resource changes."))?;
    }
    for change in &change_set.changes {
        writeln!(out, "{}", change)?;
    }

    if !change_set.is_failed() {
        writeln!(out)?;
        writeln!(
            out,
            "To execute this change set, run `cfnctl apply --change-set {}`",
            change_set.id
        )?;
    }
    Ok(())
}

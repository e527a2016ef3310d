use super::common::CommandContext;
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::client::TemplateValidation;
use crate::stack::StackManager;
use clap::Args;
use std::io::{self, Write};
use tracing::instrument;

#[derive(Debug, Args)]
pub struct Validate {}

impl Validate {
    #[instrument(name = "validate", skip_all)]
    pub async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let context = CommandContext::load(cli)?;
        let templates = context.selected(cli)?;
        let client = context.connect().await;
        let manager = StackManager::new(&client);

        for (i, (name, template)) in templates.iter().enumerate() {
            let body = template.to_json()?;
            let pb = ui::spinner(!cli.no_progress, &format!("Validating template {}...", name));
            let result = manager.validate(&body).await;
            pb.finish_and_clear();
            let validation = result.map_err(|e| {
                CliError::OperationFailed(format!("Validation of template `{}` failed: {}", name, e))
            })?;

            write_validation(&mut io::stdout().lock(), name, &validation)?;
            ui::print_separator(i, templates.len());
        }

        Ok(())
    }
}

fn write_validation(
    out: &mut impl Write,
    name: &str,
    validation: &TemplateValidation,
) -> io::Result<()> {
    writeln!(out, "{}", ui::format_header(&format!("Template: {}", name)))?;
    writeln!(out, "--------------------------")?;
    writeln!(out, "Valid: {}", ui::format_success("True"))?;
    if let Some(description) = &validation.description {
        writeln!(out, "Description: {}", description)?;
    }
    writeln!(
        out,
        "Required Capabilities: [{}]",
        validation.capabilities.join(", ")
    )?;
    writeln!(
        out,
        "Capabilities Reason: {}",
        validation.capabilities_reason.as_deref().unwrap_or("None")
    )?;
    if !validation.parameters.is_empty() {
        writeln!(out, "Parameters: [{}]", validation.parameters.join(", "))?;
    }
    Ok(())
}

use super::error::CliError;
use super::parser::{Cli, StackInputs};
use super::ui;
use crate::client::{AwsStackClient, StackDescription};
use crate::config::{Settings, SettingsFile, SettingsOverrides};
use crate::stack::StackOptions;
use crate::template::{Template, TemplateRegistry};
use std::io::{self, Write};
use tabled::{
    settings::{object::Rows, Color, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info};

/// Settings and templates every subcommand starts from.
pub struct CommandContext {
    pub settings: Settings,
    pub registry: TemplateRegistry,
}

impl CommandContext {
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let cwd = std::env::current_dir().map_err(|e| {
            CliError::ConfigError(format!("Cannot determine working directory: {}", e))
        })?;

        let file = SettingsFile::discover(cli.config.as_deref(), &cwd)
            .map_err(|e| CliError::ConfigError(format!("{:#}", e)))?;
        let overrides = SettingsOverrides {
            project: cli.project.clone(),
            profile: cli.profile.clone(),
            region: cli.region.clone(),
            template_dir: cli.template_dir.clone(),
        };
        let settings = Settings::resolve(overrides, file, &cwd)
            .map_err(|e| CliError::ConfigError(format!("{:#}", e)))?;
        debug!(project = %settings.project, "Resolved settings");

        let mut registry = TemplateRegistry::with_builtins();
        if let Some(dir) = &settings.template_dir {
            let loaded = registry.load_dir(dir)?;
            info!("Loaded {} template(s) from {}", loaded, dir.display());
        }

        Ok(Self { settings, registry })
    }

    pub fn selected<'a>(&'a self, cli: &Cli) -> Result<Vec<(&'a str, &'a Template)>, CliError> {
        Ok(self.registry.select(&cli.templates)?)
    }

    pub fn stack_name(&self, template_name: &str) -> Result<String, CliError> {
        Ok(crate::stack::stack_name(&self.settings.project, template_name)?)
    }

    pub fn stack_options(&self, inputs: &StackInputs) -> Result<StackOptions, CliError> {
        Ok(StackOptions::new(
            &inputs.params,
            &inputs.capabilities,
            &inputs.tags,
            self.settings.default_tags.clone(),
        )?)
    }

    pub async fn connect(&self) -> AwsStackClient {
        AwsStackClient::connect(
            self.settings.profile.as_deref(),
            self.settings.region.as_deref(),
        )
        .await
    }
}

#[derive(Tabled)]
struct OutputRow<'a> {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: &'a str,
    #[tabled(rename = "Description")]
    description: &'a str,
    #[tabled(rename = "Export")]
    export: &'a str,
}

pub fn write_stack(out: &mut impl Write, stack: &StackDescription) -> io::Result<()> {
    writeln!(out, "Stack name: {}", ui::format_highlight(&stack.name))?;
    writeln!(out, "Stack arn: {}", stack.id)?;
    if let Some(description) = &stack.description {
        writeln!(out, "Description: {}", description)?;
    }
    writeln!(out, "Status: {}", ui::format_status(&stack.status))?;
    if let Some(reason) = &stack.status_reason {
        writeln!(out, "Status reason: {}", reason)?;
    }
    if let Some(updated) = &stack.last_updated_time {
        writeln!(out, "Last updated at: {}", updated)?;
    }
    writeln!(out, "Created at: {}", stack.creation_time)?;

    if stack.outputs.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", ui::format_header("Outputs:"))?;
    let rows: Vec<_> = stack
        .outputs
        .iter()
        .map(|output| OutputRow {
            key: ui::format_highlight(&output.key),
            value: &output.value,
            description: output.description.as_deref().unwrap_or(""),
            export: output.export_name.as_deref().unwrap_or(""),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::blank())
        .with(Modify::new(Rows::first()).with(Color::FG_GREEN));
    writeln!(out, "{}", table)
}

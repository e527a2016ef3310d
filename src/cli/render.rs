use super::common::CommandContext;
use super::error::CliError;
use super::parser::Cli;
use super::ui;
use crate::template::RenderFormat;
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, instrument};

#[derive(Debug, Args)]
pub struct Render {
    /// Output format for templates
    #[arg(long, value_enum, default_value_t = RenderFormat::Yaml)]
    pub format: RenderFormat,

    /// Directory the rendered files are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl Render {
    #[instrument(name = "render", skip_all, fields(format = ?self.format))]
    pub async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let context = CommandContext::load(cli)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                CliError::OperationFailed(format!(
                    "Cannot create output directory {}: {}",
                    self.output_dir.display(),
                    e
                ))
            })?;

        for (name, template) in context.selected(cli)? {
            let path = self
                .output_dir
                .join(format!("{}.{}", name, self.format.extension()));
            let rendered = self.format.render(template)?;
            debug!(template = name, bytes = rendered.len(), "Rendered template");

            tokio::fs::write(&path, rendered).await.map_err(|e| {
                CliError::OperationFailed(format!("Cannot write {}: {}", path.display(), e))
            })?;
            println!(
                "Rendered {} to {}",
                ui::format_highlight(name),
                path.display()
            );
        }

        Ok(())
    }
}

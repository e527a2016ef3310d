mod builtin;
pub mod errors;
pub mod intrinsic;
pub mod registry;
pub mod types;

pub use errors::{TemplateError, TemplateResult};
pub use registry::TemplateRegistry;
pub use types::{Export, Output, Parameter, Resource, Template};

/// Output format for rendered templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RenderFormat {
    Json,
    #[default]
    Yaml,
}

impl RenderFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Json => "json",
            RenderFormat::Yaml => "yaml",
        }
    }

    pub fn render(&self, template: &Template) -> TemplateResult<String> {
        match self {
            RenderFormat::Json => template.to_json(),
            RenderFormat::Yaml => template.to_yaml(),
        }
    }
}

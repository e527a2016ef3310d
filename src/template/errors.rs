use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid template name `{name}`; available templates: [{available}]")]
    UnknownTemplate { name: String, available: String },

    #[error("Template name `{0}` must start with a letter and contain only letters, digits and hyphens")]
    InvalidName(String),

    #[error("Template `{0}` is already defined")]
    DuplicateTemplate(String),

    #[error("Failed to load template from {path}: {details}")]
    InvalidTemplateFile { path: PathBuf, details: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TemplateError {
    pub fn invalid_file(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        TemplateError::InvalidTemplateFile {
            path: path.into(),
            details: details.into(),
        }
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;

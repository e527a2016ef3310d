use crate::client::ClientError;
use crate::template::TemplateError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("Malformed tag string: `{0}`")]
    MalformedTag(String),

    #[error("Malformed parameter string: `{0}`")]
    MalformedParameter(String),

    #[error("Stack name `{name}` is longer than {max} characters; choose a shorter project or template name")]
    StackNameTooLong { name: String, max: usize },
}

#[derive(Debug, Error)]
pub enum StackError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Change set {change_set} still {status} after {attempts} checks")]
    ChangeSetTimeout {
        change_set: String,
        status: String,
        attempts: u32,
    },

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StackResult<T> = Result<T, StackError>;

use crate::stack::{ArgsError, StackError};
use crate::template::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    InvalidArgument(#[from] ArgsError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{action} failed for stack `{stack}`: {source}")]
    StackOperation {
        action: &'static str,
        stack: String,
        #[source]
        source: StackError,
    },

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn stack(action: &'static str, stack: impl Into<String>) -> impl FnOnce(StackError) -> Self {
        let stack = stack.into();
        move |source| CliError::StackOperation {
            action,
            stack,
            source,
        }
    }
}

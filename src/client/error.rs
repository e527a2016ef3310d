use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ClientError {
    /// CloudFormation answered the call with an error.
    #[error("{operation} failed ({code}): {message}")]
    Service {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// The call never produced a service answer (network, credentials, timeouts).
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("Unexpected response from {operation}: {message}")]
    UnexpectedResponse {
        operation: &'static str,
        message: String,
    },
}

impl ClientError {
    /// CloudFormation rejects an update whose template and parameters match
    /// the deployed stack with this validation error.
    pub fn is_no_updates(&self) -> bool {
        match self {
            ClientError::Service { code, message, .. } => {
                code == "ValidationError" && message.contains("No updates are to be performed")
            }
            _ => false,
        }
    }
}

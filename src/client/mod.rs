pub mod aws;
pub mod error;
pub mod traits;
pub mod types;

pub use aws::AwsStackClient;
pub use error::ClientError;
pub use traits::StackApi;
pub use types::{
    Capability, ChangeSetDescription, ChangeSetRequest, ChangeSetType, Replacement,
    ResourceChange, StackDescription, StackOutput, StackParameter, StackRequest, StackTag,
    TemplateValidation,
};

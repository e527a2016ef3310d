use async_trait::async_trait;

use super::types::{
    ChangeSetDescription, ChangeSetRequest, StackDescription, StackRequest, TemplateValidation,
};
use super::ClientError;

/// The subset of the CloudFormation API the stack commands drive.
#[async_trait]
pub trait StackApi: Send + Sync {
    async fn validate_template(&self, template_body: &str)
        -> Result<TemplateValidation, ClientError>;

    /// Returns the id (ARN) of the new change set.
    async fn create_change_set(&self, request: &ChangeSetRequest) -> Result<String, ClientError>;

    /// `change_set` may be an id or a name.
    async fn describe_change_set(
        &self,
        change_set: &str,
    ) -> Result<ChangeSetDescription, ClientError>;

    async fn execute_change_set(&self, change_set: &str) -> Result<(), ClientError>;

    /// Returns the id of the new stack.
    async fn create_stack(&self, request: &StackRequest) -> Result<String, ClientError>;

    async fn update_stack(&self, request: &StackRequest) -> Result<String, ClientError>;

    /// `Ok(None)` when CloudFormation answers with an error, which is how it
    /// reports a stack that does not exist.
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> Result<Option<StackDescription>, ClientError>;

    async fn delete_stack(
        &self,
        stack_name: &str,
        retain_resources: &[String],
    ) -> Result<(), ClientError>;
}

use super::args::{change_set_name, change_set_type};
use super::errors::{StackError, StackResult};
use crate::client::{
    ChangeSetDescription, ChangeSetRequest, StackApi, StackDescription, StackRequest,
    TemplateValidation,
};
use std::time::Duration;
use tracing::{debug, info};

/// Result of `StackManager::apply` for one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created { stack_id: String },
    Updated { stack_id: String },
    /// CloudFormation found nothing to change.
    Unchanged,
}

/// Drives stack operations against a `StackApi`, one call sequence per command.
pub struct StackManager<'a> {
    client: &'a dyn StackApi,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl<'a> StackManager<'a> {
    const CHANGE_SET_POLL_INTERVAL: Duration = Duration::from_secs(2);
    const CHANGE_SET_MAX_ATTEMPTS: u32 = 150;

    pub fn new(client: &'a dyn StackApi) -> Self {
        Self {
            client,
            poll_interval: Self::CHANGE_SET_POLL_INTERVAL,
            max_poll_attempts: Self::CHANGE_SET_MAX_ATTEMPTS,
        }
    }

    pub fn with_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts.max(1);
        self
    }

    /// A stack only counts as existing once it has left `REVIEW_IN_PROGRESS`,
    /// the state a never-executed CREATE change set leaves behind.
    pub async fn stack_exists(&self, stack_name: &str) -> StackResult<bool> {
        let exists = self
            .client
            .describe_stack(stack_name)
            .await?
            .is_some_and(|stack| !stack.is_review_in_progress());
        debug!(stack_name, exists, "Checked stack existence");
        Ok(exists)
    }

    pub async fn validate(&self, template_body: &str) -> StackResult<TemplateValidation> {
        Ok(self.client.validate_template(template_body).await?)
    }

    /// Creates a change set for `request` and waits until CloudFormation has
    /// computed it. A change set that ends up `FAILED` (for example because it
    /// contains no changes) is returned as is.
    pub async fn preview(&self, request: StackRequest) -> StackResult<ChangeSetDescription> {
        let exists = self.stack_exists(&request.stack_name).await?;
        let change_set = ChangeSetRequest {
            change_set_name: change_set_name(&request)?,
            change_set_type: change_set_type(exists),
            stack: request,
        };
        info!(
            change_set = %change_set.change_set_name,
            change_set_type = change_set.change_set_type.as_str(),
            "Creating change set"
        );

        let id = self.client.create_change_set(&change_set).await?;
        self.wait_for_change_set(&id).await
    }

    pub async fn wait_for_change_set(&self, change_set: &str) -> StackResult<ChangeSetDescription> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let description = self.client.describe_change_set(change_set).await?;
            if !description.is_pending() {
                debug!(change_set, status = %description.status, attempts, "Change set ready");
                return Ok(description);
            }
            if attempts >= self.max_poll_attempts {
                return Err(StackError::ChangeSetTimeout {
                    change_set: change_set.to_string(),
                    status: description.status,
                    attempts,
                });
            }
            debug!(change_set, status = %description.status, attempts, "Change set pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn execute_change_set(&self, change_set: &str) -> StackResult<()> {
        info!(change_set, "Executing change set");
        Ok(self.client.execute_change_set(change_set).await?)
    }

    /// Updates the stack if it exists, creates it otherwise.
    pub async fn apply(&self, request: &StackRequest) -> StackResult<ApplyOutcome> {
        if !self.stack_exists(&request.stack_name).await? {
            info!(stack = %request.stack_name, "Creating stack");
            let stack_id = self.client.create_stack(request).await?;
            return Ok(ApplyOutcome::Created { stack_id });
        }

        info!(stack = %request.stack_name, "Updating stack");
        match self.client.update_stack(request).await {
            Ok(stack_id) => Ok(ApplyOutcome::Updated { stack_id }),
            Err(e) if e.is_no_updates() => Ok(ApplyOutcome::Unchanged),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn status(&self, stack_name: &str) -> StackResult<Option<StackDescription>> {
        Ok(self.client.describe_stack(stack_name).await?)
    }

    pub async fn delete(&self, stack_name: &str, retain_resources: &[String]) -> StackResult<()> {
        info!(stack_name, retained = retain_resources.len(), "Deleting stack");
        Ok(self.client.delete_stack(stack_name, retain_resources).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChangeSetType, ClientError, ResourceChange, StackTag};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Validate,
        CreateChangeSet(ChangeSetRequest),
        DescribeChangeSet(String),
        ExecuteChangeSet(String),
        CreateStack(String),
        UpdateStack(String),
        DescribeStack(String),
        DeleteStack(String, Vec<String>),
    }

    #[derive(Default)]
    struct MockStackApi {
        stack: Option<StackDescription>,
        change_set_statuses: Mutex<VecDeque<&'static str>>,
        update_error: Option<ClientError>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockStackApi {
        fn new() -> Self {
            Self::default()
        }

        fn with_stack(mut self, status: &str) -> Self {
            self.stack = Some(StackDescription {
                name: "demo-stack-batch".into(),
                id: "arn:aws:cloudformation:eu-west-1:123456789012:stack/demo-stack-batch/1".into(),
                status: status.into(),
                creation_time: "2026-01-01T00:00:00Z".into(),
                ..StackDescription::default()
            });
            self
        }

        fn with_change_set_statuses(self, statuses: &[&'static str]) -> Self {
            *self.change_set_statuses.lock().unwrap() = statuses.iter().copied().collect();
            self
        }

        fn with_update_error(mut self, error: ClientError) -> Self {
            self.update_error = Some(error);
            self
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StackApi for MockStackApi {
        async fn validate_template(
            &self,
            _template_body: &str,
        ) -> Result<TemplateValidation, ClientError> {
            self.record(Call::Validate);
            Ok(TemplateValidation {
                capabilities: vec!["CAPABILITY_IAM".into()],
                capabilities_reason: Some("The following resource(s) require capabilities: [AWS::IAM::Role]".into()),
                ..TemplateValidation::default()
            })
        }

        async fn create_change_set(
            &self,
            request: &ChangeSetRequest,
        ) -> Result<String, ClientError> {
            self.record(Call::CreateChangeSet(request.clone()));
            Ok(format!("arn:aws:cloudformation:changeSet/{}", request.change_set_name))
        }

        async fn describe_change_set(
            &self,
            change_set: &str,
        ) -> Result<ChangeSetDescription, ClientError> {
            self.record(Call::DescribeChangeSet(change_set.to_string()));
            let status = self
                .change_set_statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or("CREATE_COMPLETE");
            Ok(ChangeSetDescription {
                id: change_set.to_string(),
                status: status.to_string(),
                changes: vec![ResourceChange {
                    action: "Add".into(),
                    logical_id: "JobQueue".into(),
                    physical_id: None,
                    resource_type: "AWS::Batch::JobQueue".into(),
                    scope: Vec::new(),
                    replacement: None,
                }],
                ..ChangeSetDescription::default()
            })
        }

        async fn execute_change_set(&self, change_set: &str) -> Result<(), ClientError> {
            self.record(Call::ExecuteChangeSet(change_set.to_string()));
            Ok(())
        }

        async fn create_stack(&self, request: &StackRequest) -> Result<String, ClientError> {
            self.record(Call::CreateStack(request.stack_name.clone()));
            Ok(format!("arn:aws:cloudformation:stack/{}", request.stack_name))
        }

        async fn update_stack(&self, request: &StackRequest) -> Result<String, ClientError> {
            self.record(Call::UpdateStack(request.stack_name.clone()));
            match &self.update_error {
                Some(err) => Err(err.clone()),
                None => Ok(format!("arn:aws:cloudformation:stack/{}", request.stack_name)),
            }
        }

        async fn describe_stack(
            &self,
            stack_name: &str,
        ) -> Result<Option<StackDescription>, ClientError> {
            self.record(Call::DescribeStack(stack_name.to_string()));
            Ok(self.stack.clone())
        }

        async fn delete_stack(
            &self,
            stack_name: &str,
            retain_resources: &[String],
        ) -> Result<(), ClientError> {
            self.record(Call::DeleteStack(
                stack_name.to_string(),
                retain_resources.to_vec(),
            ));
            Ok(())
        }
    }

    fn request() -> StackRequest {
        StackRequest {
            stack_name: "demo-stack-batch".into(),
            template_body: "{\"Resources\": {}}".into(),
            parameters: Vec::new(),
            capabilities: Vec::new(),
            tags: vec![StackTag {
                key: "team".into(),
                value: "ml".into(),
            }],
        }
    }

    fn manager(api: &MockStackApi) -> StackManager<'_> {
        StackManager::new(api).with_polling(Duration::ZERO, 5)
    }

    fn created_change_set(calls: &[Call]) -> ChangeSetRequest {
        calls
            .iter()
            .find_map(|call| match call {
                Call::CreateChangeSet(request) => Some(request.clone()),
                _ => None,
            })
            .expect("no change set was created")
    }

    #[tokio::test]
    async fn test_preview_creates_change_set_for_missing_stack() {
        let api = MockStackApi::new();
        let description = manager(&api).preview(request()).await.unwrap();

        let calls = api.calls();
        let change_set = created_change_set(&calls);
        assert_eq!(change_set.change_set_type, ChangeSetType::Create);
        assert_eq!(change_set.stack.stack_name, "demo-stack-batch");
        assert!(change_set.change_set_name.starts_with("demo-stack-batch-"));
        assert_eq!(description.status, "CREATE_COMPLETE");
        assert_eq!(description.changes.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_updates_existing_stack() {
        let api = MockStackApi::new().with_stack("UPDATE_COMPLETE");
        manager(&api).preview(request()).await.unwrap();

        let change_set = created_change_set(&api.calls());
        assert_eq!(change_set.change_set_type, ChangeSetType::Update);
    }

    #[tokio::test]
    async fn test_review_in_progress_stack_counts_as_missing() {
        let api = MockStackApi::new().with_stack("REVIEW_IN_PROGRESS");
        assert!(!manager(&api).stack_exists("demo-stack-batch").await.unwrap());

        manager(&api).preview(request()).await.unwrap();
        let change_set = created_change_set(&api.calls());
        assert_eq!(change_set.change_set_type, ChangeSetType::Create);
    }

    #[tokio::test]
    async fn test_preview_waits_while_change_set_is_pending() {
        let api = MockStackApi::new().with_change_set_statuses(&[
            "CREATE_PENDING",
            "CREATE_IN_PROGRESS",
            "CREATE_COMPLETE",
        ]);
        let description = manager(&api).preview(request()).await.unwrap();

        let describes = api
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::DescribeChangeSet(_)))
            .count();
        assert_eq!(describes, 3);
        assert_eq!(description.status, "CREATE_COMPLETE");
    }

    #[tokio::test]
    async fn test_preview_returns_failed_change_set() {
        let api = MockStackApi::new().with_change_set_statuses(&["FAILED"]);
        let description = manager(&api).preview(request()).await.unwrap();
        assert!(description.is_failed());
    }

    #[tokio::test]
    async fn test_preview_gives_up_after_max_attempts() {
        let api = MockStackApi::new().with_change_set_statuses(&["CREATE_PENDING"; 10]);
        let err = StackManager::new(&api)
            .with_polling(Duration::ZERO, 3)
            .preview(request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StackError::ChangeSetTimeout { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_apply_creates_missing_stack() {
        let api = MockStackApi::new();
        let outcome = manager(&api).apply(&request()).await.unwrap();

        assert!(matches!(outcome, ApplyOutcome::Created { .. }));
        assert_eq!(
            api.calls(),
            vec![
                Call::DescribeStack("demo-stack-batch".into()),
                Call::CreateStack("demo-stack-batch".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_updates_existing_stack() {
        let api = MockStackApi::new().with_stack("CREATE_COMPLETE");
        let outcome = manager(&api).apply(&request()).await.unwrap();

        assert!(matches!(outcome, ApplyOutcome::Updated { .. }));
        assert!(api
            .calls()
            .contains(&Call::UpdateStack("demo-stack-batch".into())));
    }

    #[tokio::test]
    async fn test_apply_without_changes_is_unchanged() {
        let api = MockStackApi::new()
            .with_stack("UPDATE_COMPLETE")
            .with_update_error(ClientError::Service {
                operation: "UpdateStack",
                code: "ValidationError".into(),
                message: "No updates are to be performed.".into(),
            });
        let outcome = manager(&api).apply(&request()).await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_apply_propagates_other_update_errors() {
        let api = MockStackApi::new()
            .with_stack("UPDATE_ROLLBACK_FAILED")
            .with_update_error(ClientError::Service {
                operation: "UpdateStack",
                code: "ValidationError".into(),
                message: "Stack is in UPDATE_ROLLBACK_FAILED state and can not be updated.".into(),
            });
        let err = manager(&api).apply(&request()).await.unwrap_err();
        assert!(matches!(err, StackError::Client(ClientError::Service { .. })));
    }

    #[tokio::test]
    async fn test_delete_passes_retained_resources() {
        let api = MockStackApi::new();
        let retain = vec!["ModelBucket".to_string()];
        manager(&api).delete("demo-stack-inference", &retain).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::DeleteStack(
                "demo-stack-inference".into(),
                vec!["ModelBucket".into()]
            )]
        );
    }

    #[tokio::test]
    async fn test_execute_and_validate_pass_through() {
        let api = MockStackApi::new();
        let manager = manager(&api);
        manager.execute_change_set("arn:cs").await.unwrap();
        let validation = manager.validate("{}").await.unwrap();

        assert_eq!(validation.capabilities, vec!["CAPABILITY_IAM".to_string()]);
        assert_eq!(
            api.calls(),
            vec![Call::ExecuteChangeSet("arn:cs".into()), Call::Validate]
        );
    }
}

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::primitives::{DateTime, DateTimeFormat};
use aws_sdk_cloudformation::types as cfn;
use aws_sdk_cloudformation::Client;
use std::fmt::Debug;
use tracing::{debug, instrument};

use super::traits::StackApi;
use super::types::{
    ChangeSetDescription, ChangeSetRequest, Replacement, ResourceChange, StackDescription,
    StackOutput, StackRequest, TemplateValidation,
};
use super::ClientError;

/// `StackApi` backed by the AWS SDK. Credentials and region follow the usual
/// SDK resolution chain, narrowed by an optional profile and region.
#[derive(Clone, Debug)]
pub struct AwsStackClient {
    client: Client,
}

impl AwsStackClient {
    pub async fn connect(profile: Option<&str>, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            debug!(profile, "Using AWS profile");
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            debug!(region, "Using AWS region");
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl StackApi for AwsStackClient {
    #[instrument(skip_all)]
    async fn validate_template(
        &self,
        template_body: &str,
    ) -> Result<TemplateValidation, ClientError> {
        let output = self
            .client
            .validate_template()
            .template_body(template_body)
            .send()
            .await
            .map_err(|e| sdk_error("ValidateTemplate", e))?;

        let capabilities = output
            .capabilities()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        let parameters = output
            .parameters()
            .iter()
            .filter_map(|p| p.parameter_key().map(String::from))
            .collect();

        Ok(TemplateValidation {
            description: output.description,
            capabilities,
            capabilities_reason: output.capabilities_reason,
            parameters,
        })
    }

    #[instrument(skip_all, fields(change_set = %request.change_set_name))]
    async fn create_change_set(&self, request: &ChangeSetRequest) -> Result<String, ClientError> {
        let output = self
            .client
            .create_change_set()
            .stack_name(&request.stack.stack_name)
            .template_body(&request.stack.template_body)
            .set_parameters(Some(sdk_parameters(&request.stack)))
            .set_capabilities(Some(sdk_capabilities(&request.stack)))
            .set_tags(Some(sdk_tags(&request.stack)))
            .change_set_name(&request.change_set_name)
            .change_set_type(cfn::ChangeSetType::from(request.change_set_type.as_str()))
            .send()
            .await
            .map_err(|e| sdk_error("CreateChangeSet", e))?;

        output.id.ok_or_else(|| ClientError::UnexpectedResponse {
            operation: "CreateChangeSet",
            message: "response carries no change set id".to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn describe_change_set(
        &self,
        change_set: &str,
    ) -> Result<ChangeSetDescription, ClientError> {
        let output = self
            .client
            .describe_change_set()
            .change_set_name(change_set)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeChangeSet", e))?;

        let changes = output
            .changes()
            .iter()
            .filter_map(|change| change.resource_change())
            .map(resource_change)
            .collect();

        Ok(ChangeSetDescription {
            id: output
                .change_set_id
                .unwrap_or_else(|| change_set.to_string()),
            status: output
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            status_reason: output.status_reason,
            execution_status: output.execution_status.map(|s| s.as_str().to_string()),
            changes,
        })
    }

    #[instrument(skip(self))]
    async fn execute_change_set(&self, change_set: &str) -> Result<(), ClientError> {
        self.client
            .execute_change_set()
            .change_set_name(change_set)
            .send()
            .await
            .map_err(|e| sdk_error("ExecuteChangeSet", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(stack = %request.stack_name))]
    async fn create_stack(&self, request: &StackRequest) -> Result<String, ClientError> {
        let output = self
            .client
            .create_stack()
            .stack_name(&request.stack_name)
            .template_body(&request.template_body)
            .set_parameters(Some(sdk_parameters(request)))
            .set_capabilities(Some(sdk_capabilities(request)))
            .set_tags(Some(sdk_tags(request)))
            .send()
            .await
            .map_err(|e| sdk_error("CreateStack", e))?;

        Ok(output
            .stack_id
            .unwrap_or_else(|| request.stack_name.clone()))
    }

    #[instrument(skip_all, fields(stack = %request.stack_name))]
    async fn update_stack(&self, request: &StackRequest) -> Result<String, ClientError> {
        let output = self
            .client
            .update_stack()
            .stack_name(&request.stack_name)
            .template_body(&request.template_body)
            .set_parameters(Some(sdk_parameters(request)))
            .set_capabilities(Some(sdk_capabilities(request)))
            .set_tags(Some(sdk_tags(request)))
            .send()
            .await
            .map_err(|e| sdk_error("UpdateStack", e))?;

        Ok(output
            .stack_id
            .unwrap_or_else(|| request.stack_name.clone()))
    }

    #[instrument(skip(self))]
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> Result<Option<StackDescription>, ClientError> {
        match self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
        {
            Ok(output) => Ok(member::<Vec<cfn::Stack>>(output.stacks)
                .unwrap_or_default()
                .into_iter()
                .next()
                .map(stack_description)),
            Err(SdkError::ServiceError(err)) => {
                debug!(
                    code = err.err().code().unwrap_or("Unknown"),
                    message = err.err().message().unwrap_or_default(),
                    "DescribeStacks returned a service error; treating stack as absent"
                );
                Ok(None)
            }
            Err(err) => Err(sdk_error("DescribeStacks", err)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_stack(
        &self,
        stack_name: &str,
        retain_resources: &[String],
    ) -> Result<(), ClientError> {
        let retain = (!retain_resources.is_empty()).then(|| retain_resources.to_vec());
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .set_retain_resources(retain)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteStack", e))?;
        Ok(())
    }
}

fn sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> ClientError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(service) => ClientError::Service {
            operation,
            code: service.err().code().unwrap_or("Unknown").to_string(),
            message: service.err().message().unwrap_or_default().to_string(),
        },
        _ => ClientError::Transport {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

/// Reads a response member as an `Option` whether the service model marks it
/// required (plain value) or optional.
fn member<T>(value: impl Into<Option<T>>) -> Option<T> {
    value.into()
}

fn sdk_parameters(request: &StackRequest) -> Vec<cfn::Parameter> {
    request
        .parameters
        .iter()
        .map(|p| {
            cfn::Parameter::builder()
                .parameter_key(&p.key)
                .parameter_value(&p.value)
                .build()
        })
        .collect()
}

fn sdk_capabilities(request: &StackRequest) -> Vec<cfn::Capability> {
    request
        .capabilities
        .iter()
        .map(|c| cfn::Capability::from(c.as_str()))
        .collect()
}

fn sdk_tags(request: &StackRequest) -> Vec<cfn::Tag> {
    request
        .tags
        .iter()
        .map(|t| cfn::Tag::builder().key(&t.key).value(&t.value).build())
        .collect()
}

fn resource_change(change: &cfn::ResourceChange) -> ResourceChange {
    ResourceChange {
        action: change
            .action()
            .map(|a| a.as_str().to_string())
            .unwrap_or_default(),
        logical_id: change.logical_resource_id().unwrap_or_default().to_string(),
        physical_id: change
            .physical_resource_id()
            .filter(|id| !id.is_empty())
            .map(String::from),
        resource_type: change.resource_type().unwrap_or_default().to_string(),
        scope: change.scope().iter().map(|s| s.as_str().to_string()).collect(),
        replacement: change
            .replacement()
            .and_then(|r| Replacement::parse(r.as_str())),
    }
}

fn stack_description(stack: cfn::Stack) -> StackDescription {
    let outputs = stack
        .outputs()
        .iter()
        .map(|o| StackOutput {
            key: o.output_key().unwrap_or_default().to_string(),
            value: o.output_value().unwrap_or_default().to_string(),
            description: o.description().map(String::from),
            export_name: o.export_name().map(String::from),
        })
        .collect();

    StackDescription {
        name: member::<String>(stack.stack_name).unwrap_or_default(),
        id: member::<String>(stack.stack_id).unwrap_or_default(),
        description: stack.description,
        status: member::<cfn::StackStatus>(stack.stack_status)
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        status_reason: stack.stack_status_reason,
        creation_time: member::<DateTime>(stack.creation_time)
            .map(format_time)
            .unwrap_or_default(),
        last_updated_time: stack.last_updated_time.map(format_time),
        outputs,
    }
}

fn format_time(time: DateTime) -> String {
    time.fmt(DateTimeFormat::DateTime)
        .unwrap_or_else(|_| format!("{}s since epoch", time.secs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Capability, StackParameter, StackTag};

    fn request() -> StackRequest {
        StackRequest {
            stack_name: "demo-stack-batch".into(),
            template_body: "{}".into(),
            parameters: vec![StackParameter {
                key: "MaxVcpus".into(),
                value: "16".into(),
            }],
            capabilities: vec![Capability::Iam, Capability::AutoExpand],
            tags: vec![StackTag {
                key: "team".into(),
                value: "ml".into(),
            }],
        }
    }

    #[test]
    fn test_request_lists_map_to_sdk_types() {
        let request = request();

        let parameters = sdk_parameters(&request);
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].parameter_key(), Some("MaxVcpus"));
        assert_eq!(parameters[0].parameter_value(), Some("16"));

        assert_eq!(
            sdk_capabilities(&request),
            vec![cfn::Capability::CapabilityIam, cfn::Capability::CapabilityAutoExpand]
        );

        let tags = sdk_tags(&request);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key(), Some("team"));
        assert_eq!(tags[0].value(), Some("ml"));
    }

    #[test]
    fn test_resource_change_conversion() {
        let change = cfn::ResourceChange::builder()
            .action(cfn::ChangeAction::Modify)
            .logical_resource_id("JobQueue")
            .physical_resource_id("arn:aws:batch:queue/demo")
            .resource_type("AWS::Batch::JobQueue")
            .scope(cfn::ResourceAttribute::Properties)
            .scope(cfn::ResourceAttribute::Tags)
            .replacement(cfn::Replacement::Conditional)
            .build();

        assert_eq!(
            resource_change(&change).to_string(),
            "Change: Modify resource JobQueue (arn:aws:batch:queue/demo) of type AWS::Batch::JobQueue at scope(s) [Properties, Tags] with conditional replacement"
        );
    }

    #[test]
    fn test_resource_change_without_physical_id_or_replacement() {
        let change = cfn::ResourceChange::builder()
            .action(cfn::ChangeAction::Add)
            .logical_resource_id("JobRole")
            .physical_resource_id("")
            .resource_type("AWS::IAM::Role")
            .build();

        let converted = resource_change(&change);
        assert_eq!(converted.physical_id, None);
        assert_eq!(converted.replacement, None);
        assert_eq!(
            converted.to_string(),
            "Change: Add resource JobRole of type AWS::IAM::Role"
        );
    }

    #[test]
    fn test_stack_description_conversion() {
        let stack = cfn::Stack::builder()
            .stack_name("demo-stack-batch")
            .stack_id("arn:aws:cloudformation:eu-west-1:123456789012:stack/demo-stack-batch/1")
            .description("Batch processing")
            .stack_status(cfn::StackStatus::UpdateComplete)
            .creation_time(DateTime::from_secs(1_700_000_000))
            .outputs(
                cfn::Output::builder()
                    .output_key("JobQueueArn")
                    .output_value("arn:aws:batch:queue/demo")
                    .description("Queue jobs are submitted to")
                    .export_name("demo-job-queue")
                    .build(),
            )
            .build();

        let description = stack_description(stack);
        assert_eq!(description.name, "demo-stack-batch");
        assert!(description.id.ends_with("stack/demo-stack-batch/1"));
        assert_eq!(description.description.as_deref(), Some("Batch processing"));
        assert_eq!(description.status, "UPDATE_COMPLETE");
        assert_eq!(description.creation_time, "2023-11-14T22:13:20Z");
        assert_eq!(description.last_updated_time, None);
        assert_eq!(
            description.outputs,
            vec![StackOutput {
                key: "JobQueueArn".into(),
                value: "arn:aws:batch:queue/demo".into(),
                description: Some("Queue jobs are submitted to".into()),
                export_name: Some("demo-job-queue".into()),
            }]
        );
    }
}

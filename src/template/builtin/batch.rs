use crate::template::intrinsic::{fn_ref, get_att, sub};
use crate::template::types::{Output, Parameter, Resource, Template};
use serde_json::json;

/// AWS Batch compute environment, job queue and a container job definition.
pub fn template() -> Template {
    let mut t = Template::new().with_description("Batch processing: compute environment, job queue and job definition");

    t.add_parameter(
        "SubnetIds",
        Parameter::new("List<AWS::EC2::Subnet::Id>")
            .with_description("Subnets the compute environment launches instances into"),
    )
    .add_parameter(
        "SecurityGroupIds",
        Parameter::new("List<AWS::EC2::SecurityGroup::Id>")
            .with_description("Security groups attached to compute resources"),
    )
    .add_parameter(
        "MaxVcpus",
        Parameter::number()
            .with_default(64)
            .with_range(1, 4096)
            .with_description("Upper bound on vCPUs the compute environment may scale to"),
    )
    .add_parameter(
        "JobImage",
        Parameter::string()
            .with_default("public.ecr.aws/amazonlinux/amazonlinux:latest")
            .with_description("Container image the job definition runs"),
    );

    t.add_resource(
        "BatchServiceRole",
        Resource::new("AWS::IAM::Role")
            .property(
                "AssumeRolePolicyDocument",
                assume_role_policy("batch.amazonaws.com"),
            )
            .property(
                "ManagedPolicyArns",
                json!(["arn:aws:iam::aws:policy/service-role/AWSBatchServiceRole"]),
            ),
    )
    .add_resource(
        "JobRole",
        Resource::new("AWS::IAM::Role").property(
            "AssumeRolePolicyDocument",
            assume_role_policy("ecs-tasks.amazonaws.com"),
        ),
    )
    .add_resource(
        "ComputeEnvironment",
        Resource::new("AWS::Batch::ComputeEnvironment")
            .property("Type", "MANAGED")
            .property("ServiceRole", get_att("BatchServiceRole", "Arn"))
            .property(
                "ComputeResources",
                json!({
                    "Type": "FARGATE",
                    "MaxvCpus": fn_ref("MaxVcpus"),
                    "Subnets": fn_ref("SubnetIds"),
                    "SecurityGroupIds": fn_ref("SecurityGroupIds"),
                }),
            ),
    )
    .add_resource(
        "JobQueue",
        Resource::new("AWS::Batch::JobQueue")
            .property("Priority", 1)
            .property("State", "ENABLED")
            .property(
                "ComputeEnvironmentOrder",
                json!([{ "Order": 1, "ComputeEnvironment": fn_ref("ComputeEnvironment") }]),
            ),
    )
    .add_resource(
        "JobLogGroup",
        Resource::new("AWS::Logs::LogGroup")
            .property("LogGroupName", sub("/batch/${AWS::StackName}"))
            .property("RetentionInDays", 30),
    )
    .add_resource(
        "JobDefinition",
        Resource::new("AWS::Batch::JobDefinition")
            .property("Type", "container")
            .property("PlatformCapabilities", json!(["FARGATE"]))
            .property(
                "ContainerProperties",
                json!({
                    "Image": fn_ref("JobImage"),
                    "JobRoleArn": get_att("JobRole", "Arn"),
                    "ExecutionRoleArn": get_att("JobRole", "Arn"),
                    "ResourceRequirements": [
                        { "Type": "VCPU", "Value": "1" },
                        { "Type": "MEMORY", "Value": "2048" },
                    ],
                    "LogConfiguration": {
                        "LogDriver": "awslogs",
                        "Options": { "awslogs-group": fn_ref("JobLogGroup") },
                    },
                }),
            )
            .depends_on("JobLogGroup"),
    );

    t.add_output(
        "JobQueueArn",
        Output::new(fn_ref("JobQueue"))
            .with_description("Job queue to submit jobs to")
            .with_export(sub("${AWS::StackName}-job-queue")),
    )
    .add_output(
        "JobDefinitionArn",
        Output::new(fn_ref("JobDefinition")).with_export(sub("${AWS::StackName}-job-definition")),
    );

    t
}

pub(super) fn assume_role_policy(service: &str) -> serde_json::Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": [service] },
            "Action": ["sts:AssumeRole"],
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_template_references_resolve() {
        let t = template();
        assert!(t.resources.contains_key("ComputeEnvironment"));
        assert!(t.resources.contains_key("JobQueue"));
        for dependency in &t.resources["JobDefinition"].depends_on {
            assert!(t.resources.contains_key(dependency));
        }
    }
}

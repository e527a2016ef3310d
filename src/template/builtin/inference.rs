use super::batch::assume_role_policy;
use crate::template::intrinsic::{equals, fn_ref, get_att, if_condition, no_value, not, sub};
use crate::template::types::{Output, Parameter, Resource, Template};
use serde_json::json;

/// SageMaker real-time inference endpoint serving a model artifact from S3.
pub fn template() -> Template {
    let mut t = Template::new()
        .with_description("Model inference: SageMaker model, endpoint configuration and endpoint");

    t.add_parameter(
        "ModelImage",
        Parameter::string().with_description("Inference container image URI"),
    )
    .add_parameter(
        "ModelDataUrl",
        Parameter::string()
            .with_default("")
            .with_description("S3 URL of the model artifact; leave empty for images that bundle the model"),
    )
    .add_parameter(
        "InstanceType",
        Parameter::string()
            .with_default("ml.m5.large")
            .with_allowed_values(["ml.t2.medium", "ml.m5.large", "ml.m5.xlarge", "ml.g4dn.xlarge"]),
    )
    .add_parameter(
        "InstanceCount",
        Parameter::number().with_default(1).with_range(1, 10),
    );

    t.add_condition(
        "HasModelData",
        not(equals(fn_ref("ModelDataUrl"), json!(""))),
    );

    t.add_resource(
        "ExecutionRole",
        Resource::new("AWS::IAM::Role")
            .property(
                "AssumeRolePolicyDocument",
                assume_role_policy("sagemaker.amazonaws.com"),
            )
            .property(
                "ManagedPolicyArns",
                json!(["arn:aws:iam::aws:policy/AmazonSageMakerFullAccess"]),
            ),
    )
    .add_resource(
        "Model",
        Resource::new("AWS::SageMaker::Model")
            .property("ExecutionRoleArn", get_att("ExecutionRole", "Arn"))
            .property(
                "PrimaryContainer",
                json!({
                    "Image": fn_ref("ModelImage"),
                    "ModelDataUrl": if_condition("HasModelData", fn_ref("ModelDataUrl"), no_value())
                }),
            ),
    )
    .add_resource(
        "EndpointConfig",
        Resource::new("AWS::SageMaker::EndpointConfig").property(
            "ProductionVariants",
            json!([{
                "VariantName": "primary",
                "ModelName": get_att("Model", "ModelName"),
                "InstanceType": fn_ref("InstanceType"),
                "InitialInstanceCount": fn_ref("InstanceCount"),
                "InitialVariantWeight": 1.0
            }]),
        ),
    )
    .add_resource(
        "Endpoint",
        Resource::new("AWS::SageMaker::Endpoint")
            .property("EndpointName", sub("${AWS::StackName}-endpoint"))
            .property("EndpointConfigName", get_att("EndpointConfig", "EndpointConfigName")),
    );

    t.add_output(
        "EndpointName",
        Output::new(get_att("Endpoint", "EndpointName"))
            .with_description("Name to pass to InvokeEndpoint")
            .with_export(sub("${AWS::StackName}-endpoint-name")),
    );

    t
}

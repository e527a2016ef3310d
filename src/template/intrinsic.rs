//! Builders for CloudFormation intrinsic functions.

use serde_json::{json, Value};

pub fn fn_ref(name: &str) -> Value {
    json!({ "Ref": name })
}

pub fn get_att(resource: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [resource, attribute] })
}

pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

pub fn equals(left: Value, right: Value) -> Value {
    json!({ "Fn::Equals": [left, right] })
}

pub fn not(condition: Value) -> Value {
    json!({ "Fn::Not": [condition] })
}

pub fn if_condition(condition: &str, when_true: Value, when_false: Value) -> Value {
    json!({ "Fn::If": [condition, when_true, when_false] })
}

/// `{"Ref": "AWS::NoValue"}`, removes a property when used inside `Fn::If`.
pub fn no_value() -> Value {
    fn_ref("AWS::NoValue")
}

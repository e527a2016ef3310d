use super::errors::TemplateResult;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "2010-09-09";

/// A CloudFormation template document.
///
/// Map-valued sections are `BTreeMap`s so every rendering is key-sorted and
/// therefore stable, which keeps change-set name hashes reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Template {
    #[serde(
        rename = "AWSTemplateFormatVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub format_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mappings: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, Value>,

    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

/// Attributes without a field of their own are kept in `extra` and rendered
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub param_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_echo: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// `CreationPolicy`, `UpdatePolicy` and any other resource attribute.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: Value,
}

/// `DependsOn` takes a single logical id or a list of them.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => vec![id],
        OneOrMany::Many(ids) => ids,
    })
}

/// Rewrites YAML short-form intrinsics (`!Ref x`, `!Sub ..`, `!GetAtt a.b`)
/// into their mapping form so the document converts to plain JSON values.
fn expand_short_form(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let tag = tag.to_string();
            let name = tag.trim_start_matches('!');
            let value = expand_short_form(value);
            let (key, value) = match name {
                "Ref" | "Condition" => (name.to_string(), value),
                "GetAtt" => ("Fn::GetAtt".to_string(), split_get_att(value)),
                other => (format!("Fn::{}", other), value),
            };
            let mut mapping = Mapping::new();
            mapping.insert(YamlValue::String(key), value);
            YamlValue::Mapping(mapping)
        }
        YamlValue::Sequence(items) => {
            YamlValue::Sequence(items.into_iter().map(expand_short_form).collect())
        }
        YamlValue::Mapping(mapping) => YamlValue::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| (key, expand_short_form(value)))
                .collect(),
        ),
        other => other,
    }
}

/// `!GetAtt Resource.Attribute` is the short form of `[Resource, Attribute]`.
fn split_get_att(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::String(path) => match path.split_once('.') {
            Some((resource, attribute)) => YamlValue::Sequence(vec![
                YamlValue::String(resource.to_string()),
                YamlValue::String(attribute.to_string()),
            ]),
            None => YamlValue::String(path),
        },
        other => other,
    }
}

impl Template {
    pub fn new() -> Self {
        Self {
            format_version: Some(FORMAT_VERSION.to_string()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, parameter: Parameter) -> &mut Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    pub fn add_condition(&mut self, name: impl Into<String>, condition: Value) -> &mut Self {
        self.conditions.insert(name.into(), condition);
        self
    }

    pub fn add_resource(&mut self, name: impl Into<String>, resource: Resource) -> &mut Self {
        self.resources.insert(name.into(), resource);
        self
    }

    pub fn add_output(&mut self, name: impl Into<String>, output: Output) -> &mut Self {
        self.outputs.insert(name.into(), output);
        self
    }

    /// Renders the template as JSON with four-space indentation.
    pub fn to_json(&self) -> TemplateResult<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn to_yaml(&self) -> TemplateResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json(source: &str) -> TemplateResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a YAML template, accepting the `!Ref`/`!Sub`/`!GetAtt` short forms.
    pub fn from_yaml(source: &str) -> TemplateResult<Self> {
        let document: YamlValue = serde_yaml::from_str(source)?;
        Ok(serde_yaml::from_value(expand_short_form(document))?)
    }
}

impl Parameter {
    pub fn new(param_type: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            default: None,
            description: None,
            allowed_values: Vec::new(),
            allowed_pattern: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            constraint_description: None,
            no_echo: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn string() -> Self {
        Self::new("String")
    }

    pub fn number() -> Self {
        Self::new("Number")
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min_value = Some(min.into());
        self.max_value = Some(max.into());
        self
    }
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: Map::new(),
            depends_on: Vec::new(),
            condition: None,
            deletion_policy: None,
            update_replace_policy: None,
            metadata: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn depends_on(mut self, resource: impl Into<String>) -> Self {
        self.depends_on.push(resource.into());
        self
    }

    pub fn with_deletion_policy(mut self, policy: impl Into<String>) -> Self {
        self.deletion_policy = Some(policy.into());
        self
    }
}

impl Output {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            description: None,
            condition: None,
            export: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_export(mut self, name: impl Into<Value>) -> Self {
        self.export = Some(Export { name: name.into() });
        self
    }
}

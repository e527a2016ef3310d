use serde::Serialize;
use std::fmt;

/// Stack status CloudFormation reports for a stack created by a change set
/// that has not been executed yet.
pub const REVIEW_IN_PROGRESS: &str = "REVIEW_IN_PROGRESS";

/// Capabilities a caller may acknowledge when creating or updating a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Capability {
    #[value(name = "CAPABILITY_IAM")]
    Iam,
    #[value(name = "CAPABILITY_NAMED_IAM")]
    NamedIam,
    #[value(name = "CAPABILITY_AUTO_EXPAND")]
    AutoExpand,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Iam => "CAPABILITY_IAM",
            Capability::NamedIam => "CAPABILITY_NAMED_IAM",
            Capability::AutoExpand => "CAPABILITY_AUTO_EXPAND",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Capability {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackParameter {
    #[serde(rename = "ParameterKey")]
    pub key: String,
    #[serde(rename = "ParameterValue")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackTag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Fields shared by CreateStack, UpdateStack and CreateChangeSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackRequest {
    pub stack_name: String,
    pub template_body: String,
    pub parameters: Vec<StackParameter>,
    pub capabilities: Vec<Capability>,
    pub tags: Vec<StackTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSetType {
    Create,
    Update,
}

impl ChangeSetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSetType::Create => "CREATE",
            ChangeSetType::Update => "UPDATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetRequest {
    pub stack: StackRequest,
    pub change_set_name: String,
    pub change_set_type: ChangeSetType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValidation {
    pub description: Option<String>,
    pub capabilities: Vec<String>,
    pub capabilities_reason: Option<String>,
    pub parameters: Vec<String>,
}

/// Whether applying a resource change replaces the physical resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    True,
    False,
    Conditional,
}

impl Replacement {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "True" => Some(Replacement::True),
            "False" => Some(Replacement::False),
            "Conditional" => Some(Replacement::Conditional),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Replacement::True => "with replacement",
            Replacement::False => "without replacement",
            Replacement::Conditional => "with conditional replacement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    pub action: String,
    pub logical_id: String,
    pub physical_id: Option<String>,
    pub resource_type: String,
    pub scope: Vec<String>,
    pub replacement: Option<Replacement>,
}

impl fmt::Display for ResourceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Change: {} resource {}", self.action, self.logical_id)?;
        if let Some(physical_id) = &self.physical_id {
            write!(f, " ({})", physical_id)?;
        }
        write!(f, " of type {}", self.resource_type)?;
        if !self.scope.is_empty() {
            write!(f, " at scope(s) [{}]", self.scope.join(", "))?;
        }
        if let Some(replacement) = &self.replacement {
            write!(f, " {}", replacement.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSetDescription {
    pub id: String,
    pub status: String,
    pub status_reason: Option<String>,
    pub execution_status: Option<String>,
    pub changes: Vec<ResourceChange>,
}

impl ChangeSetDescription {
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status.as_str(),
            "CREATE_PENDING" | "CREATE_IN_PROGRESS"
        )
    }

    pub fn is_failed(&self) -> bool {
        self.status == "FAILED"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub export_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackDescription {
    pub name: String,
    pub id: String,
    pub description: Option<String>,
    pub status: String,
    pub status_reason: Option<String>,
    pub creation_time: String,
    pub last_updated_time: Option<String>,
    pub outputs: Vec<StackOutput>,
}

impl StackDescription {
    pub fn is_review_in_progress(&self) -> bool {
        self.status == REVIEW_IN_PROGRESS
    }
}

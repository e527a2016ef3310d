//! Assembly of stack and change-set requests from command-line input.

use super::errors::{ArgsError, StackResult};
use crate::client::{Capability, ChangeSetType, StackParameter, StackRequest, StackTag};
use crate::template::Template;
use sha2::{Digest, Sha256};

/// Length of the request hash embedded in change-set names.
const CHANGE_SET_HASH_LEN: usize = 8;

/// Longest stack name CloudFormation accepts.
pub const MAX_STACK_NAME_LEN: usize = 128;

pub fn stack_name(project: &str, template_name: &str) -> Result<String, ArgsError> {
    let name = format!("{}-stack-{}", project, template_name);
    if name.len() > MAX_STACK_NAME_LEN {
        return Err(ArgsError::StackNameTooLong {
            name,
            max: MAX_STACK_NAME_LEN,
        });
    }
    Ok(name)
}

/// Splits `key=value` on the first `=`. The value may be empty or contain
/// further `=` characters; the key may not be empty.
fn split_pair(raw: &str) -> Option<(&str, &str)> {
    raw.split_once('=').filter(|(key, _)| !key.is_empty())
}

pub fn parse_tags<S: AsRef<str>>(raw_tags: &[S]) -> Result<Vec<StackTag>, ArgsError> {
    raw_tags
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            split_pair(raw)
                .map(|(key, value)| StackTag {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .ok_or_else(|| ArgsError::MalformedTag(raw.to_string()))
        })
        .collect()
}

pub fn parse_parameters<S: AsRef<str>>(raw_params: &[S]) -> Result<Vec<StackParameter>, ArgsError> {
    raw_params
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            split_pair(raw)
                .map(|(key, value)| StackParameter {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .ok_or_else(|| ArgsError::MalformedParameter(raw.to_string()))
        })
        .collect()
}

/// Layers `overrides` over `defaults`; an override replaces the default with
/// the same key in place, new keys are appended.
pub fn merge_tags(defaults: Vec<StackTag>, overrides: Vec<StackTag>) -> Vec<StackTag> {
    let mut merged = defaults;
    for tag in overrides {
        match merged.iter_mut().find(|existing| existing.key == tag.key) {
            Some(existing) => existing.value = tag.value,
            None => merged.push(tag),
        }
    }
    merged
}

/// Stack-level inputs shared by every template a command touches.
#[derive(Debug, Clone, Default)]
pub struct StackOptions {
    pub parameters: Vec<StackParameter>,
    pub capabilities: Vec<Capability>,
    pub tags: Vec<StackTag>,
}

impl StackOptions {
    pub fn new(
        raw_params: &[String],
        capabilities: &[Capability],
        raw_tags: &[String],
        default_tags: Vec<StackTag>,
    ) -> Result<Self, ArgsError> {
        let tags = merge_tags(default_tags, parse_tags(raw_tags)?);
        let parameters = parse_parameters(raw_params)?;

        let mut unique_capabilities: Vec<Capability> = Vec::with_capacity(capabilities.len());
        for capability in capabilities {
            if !unique_capabilities.contains(capability) {
                unique_capabilities.push(*capability);
            }
        }

        Ok(Self {
            parameters,
            capabilities: unique_capabilities,
            tags,
        })
    }
}

pub fn stack_request(
    stack_name: &str,
    template: &Template,
    options: &StackOptions,
) -> StackResult<StackRequest> {
    Ok(StackRequest {
        stack_name: stack_name.to_string(),
        template_body: template.to_json()?,
        parameters: options.parameters.clone(),
        capabilities: options.capabilities.clone(),
        tags: options.tags.clone(),
    })
}

/// First eight hex digits of the SHA-256 of the request, serialized as JSON
/// with sorted keys.
pub fn request_hash(request: &StackRequest) -> StackResult<String> {
    // Going through `Value` sorts object keys (serde_json's default map is a BTreeMap).
    let canonical = serde_json::to_string(&serde_json::to_value(request)?)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    Ok(digest[..CHANGE_SET_HASH_LEN].to_string())
}

pub fn change_set_name(request: &StackRequest) -> StackResult<String> {
    Ok(format!(
        "{}-{}-change-set",
        request.stack_name,
        request_hash(request)?
    ))
}

pub fn change_set_type(stack_exists: bool) -> ChangeSetType {
    if stack_exists {
        ChangeSetType::Update
    } else {
        ChangeSetType::Create
    }
}

use super::builtin::BUILTIN_TEMPLATES;
use super::errors::{TemplateError, TemplateResult};
use super::types::Template;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

lazy_static! {
    // The name ends up in `<project>-stack-<name>`, which CloudFormation restricts.
    static ref TEMPLATE_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap();
}

const TEMPLATE_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Maps short template names to template documents.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the templates compiled into the binary.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, build) in BUILTIN_TEMPLATES {
            registry.templates.insert(name.to_string(), build());
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, template: Template) -> TemplateResult<()> {
        let name = name.into();
        validate_name(&name)?;
        if self.templates.contains_key(&name) {
            return Err(TemplateError::DuplicateTemplate(name));
        }
        self.templates.insert(name, template);
        Ok(())
    }

    /// Registers every `*.json`, `*.yaml` and `*.yml` file in `dir`, named by file stem.
    pub fn load_dir(&mut self, dir: &Path) -> TemplateResult<usize> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !TEMPLATE_EXTENSIONS.contains(&extension) {
                debug!("Skipping non-template file {}", path.display());
                continue;
            }

            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| TemplateError::invalid_file(&path, "file name is not valid UTF-8"))?
                .to_string();

            let source = fs::read_to_string(&path)?;
            let template = if extension == "json" {
                Template::from_json(&source)
            } else {
                Template::from_yaml(&source)
            }
            .map_err(|e| TemplateError::invalid_file(&path, e.to_string()))?;

            debug!("Loaded template `{}` from {}", name, path.display());
            self.register(name, template)?;
            loaded += 1;
        }

        if loaded == 0 {
            warn!("No templates found in {}", dir.display());
        }
        Ok(loaded)
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Resolves the templates a command operates on.
    ///
    /// An empty selection means every registered template. Repeated names are
    /// collapsed and the order of first appearance is kept.
    pub fn select(&self, names: &[String]) -> TemplateResult<Vec<(&str, &Template)>> {
        if names.is_empty() {
            return Ok(self
                .templates
                .iter()
                .map(|(name, template)| (name.as_str(), template))
                .collect());
        }

        let mut selected: Vec<(&str, &Template)> = Vec::with_capacity(names.len());
        for name in names {
            let (key, template) = self.templates.get_key_value(name.as_str()).ok_or_else(|| {
                TemplateError::UnknownTemplate {
                    name: name.clone(),
                    available: self.names().join(", "),
                }
            })?;
            if !selected.iter().any(|(existing, _)| *existing == key.as_str()) {
                selected.push((key.as_str(), template));
            }
        }
        Ok(selected)
    }
}

pub fn validate_name(name: &str) -> TemplateResult<()> {
    if TEMPLATE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(name.to_string()))
    }
}

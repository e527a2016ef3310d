//! Settings resolution: command-line flag > environment > settings file > default.
//!
//! Flags and their environment variables are handled by clap; this module
//! loads the settings file and fills in whatever the command line left unset.

use crate::client::StackTag;
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SETTINGS_FILE_NAME: &str = "cfnctl.yaml";
const USER_SETTINGS_DIR: &str = "cfnctl";
const USER_SETTINGS_FILE_NAME: &str = "config.yaml";
const FALLBACK_PROJECT: &str = "default";

lazy_static! {
    static ref PROJECT_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap();
}

/// Contents of a `cfnctl.yaml` settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub project: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub template_dir: Option<PathBuf>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl SettingsFile {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings = Self::parse(&source)
            .with_context(|| format!("invalid settings file {}", path.display()))?;

        // template_dir is relative to the file that names it
        if let (Some(dir), Some(parent)) = (settings.template_dir.as_ref(), path.parent()) {
            if dir.is_relative() {
                settings.template_dir = Some(parent.join(dir));
            }
        }
        Ok(settings)
    }

    /// Finds the settings file: an explicit path must exist; otherwise
    /// `./cfnctl.yaml`, then `<config dir>/cfnctl/config.yaml`, are used when present.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("settings file {} does not exist", path.display());
            }
            return Self::load(path).map(Some);
        }

        let candidates = std::iter::once(cwd.join(SETTINGS_FILE_NAME)).chain(
            dirs::config_dir().map(|dir| dir.join(USER_SETTINGS_DIR).join(USER_SETTINGS_FILE_NAME)),
        );
        for candidate in candidates {
            if candidate.is_file() {
                debug!("Using settings file {}", candidate.display());
                return Self::load(&candidate).map(Some);
            }
        }
        Ok(None)
    }
}

/// Values given on the command line (or through their environment variables).
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub project: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub project: String,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub default_tags: Vec<StackTag>,
}

impl Settings {
    pub fn resolve(
        overrides: SettingsOverrides,
        file: Option<SettingsFile>,
        cwd: &Path,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();

        let project = match overrides.project.or(file.project) {
            Some(project) => project,
            None => project_from_dir(cwd),
        };
        if !PROJECT_NAME.is_match(&project) {
            bail!(
                "project name `{}` must start with a letter and contain only letters, digits and hyphens",
                project
            );
        }

        let default_tags = file
            .tags
            .into_iter()
            .map(|(key, value)| StackTag { key, value })
            .collect();

        Ok(Self {
            project,
            profile: overrides.profile.or(file.profile),
            region: overrides.region.or(file.region),
            template_dir: overrides.template_dir.or(file.template_dir),
            default_tags,
        })
    }
}

/// Derives a project name from a directory name, mapping characters a stack
/// name cannot hold to `-`.
fn project_from_dir(dir: &Path) -> String {
    let raw = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sanitized: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = sanitized.trim_matches('-');

    if trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
        trimmed.to_string()
    } else {
        tracing::warn!(
            "Could not derive a project name from '{}', using '{}'",
            dir.display(),
            FALLBACK_PROJECT
        );
        FALLBACK_PROJECT.to_string()
    }
}

use super::{apply, delete, preview, render, status, validate};
use crate::client::Capability;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

const VERSION_INFO: &str = env!("CFNCTL_BUILD_VERSION");

#[derive(Parser, Debug)]
#[command(name = "cfnctl")]
#[command(about = "Render CloudFormation templates and manage their stacks", long_about = None, version = VERSION_INFO)]
#[command(propagate_version = true)]
pub struct Cli {
    /// AWS profile used for template validation and stack operations
    #[arg(long, env = "CFNCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// AWS region (defaults to the profile's region)
    #[arg(long, env = "CFNCTL_REGION", global = true)]
    pub region: Option<String>,

    /// Template to operate on; may be repeated. Defaults to every known template
    #[arg(long = "template", global = true)]
    pub templates: Vec<String>,

    /// Project name, used as the stack name prefix (defaults to the current directory name)
    #[arg(long, env = "CFNCTL_PROJECT", global = true)]
    pub project: Option<String>,

    /// Directory with additional JSON/YAML templates
    #[arg(long, global = true)]
    pub template_dir: Option<PathBuf>,

    /// Settings file (defaults to ./cfnctl.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the selected templates to files
    Render(render::Render),

    /// Validate the selected templates with CloudFormation
    Validate(validate::Validate),

    /// Create change sets and show what they would change
    Preview(preview::Preview),

    /// Create or update stacks, or execute a change set
    Apply(apply::Apply),

    /// Show stack status and outputs
    Status(status::Status),

    /// Delete a stack
    Delete(delete::Delete),
}

/// Stack inputs shared by `preview` and `apply`.
#[derive(Args, Debug, Default)]
pub struct StackInputs {
    /// Stack tag as KEY=VALUE; propagated to resources where supported. May be repeated
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// Template parameter override as KEY=VALUE; applies to every selected template. May be repeated
    #[arg(short = 'p', long = "param")]
    pub params: Vec<String>,

    /// Capability to acknowledge. May be repeated
    #[arg(short = 'c', long = "capability", value_enum)]
    pub capabilities: Vec<Capability>,
}

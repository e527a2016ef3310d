//! Runs the built binary for commands that never reach AWS.

use std::path::Path;
use std::process::Output;
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;

/// Runs `cfnctl` in `workdir` with a clean environment for its own settings.
async fn cfnctl(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cfnctl"))
        .args(args)
        .arg("--no-progress")
        .current_dir(workdir)
        .env_remove("CFNCTL_PROFILE")
        .env_remove("CFNCTL_REGION")
        .env_remove("CFNCTL_PROJECT")
        .env_remove("CFNCTL_LOG")
        // keep a user-level settings file out of the picture
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("failed to run cfnctl")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[tokio::test]
async fn test_render_json_writes_selected_template() {
    let temp_dir = TempDir::new().unwrap();
    let output = cfnctl(
        temp_dir.path(),
        &["render", "--template", "batch", "--format", "json", "--project", "acme"],
    )
    .await;
    assert!(output.status.success(), "render failed: {}", stderr(&output));

    let rendered = fs::read_to_string(temp_dir.path().join("batch.json"))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(value["Resources"]["JobQueue"]["Type"], "AWS::Batch::JobQueue");
    assert!(!temp_dir.path().join("inference.json").exists());
}

#[tokio::test]
async fn test_render_defaults_to_every_template_as_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("rendered");
    let output = cfnctl(
        temp_dir.path(),
        &["render", "--project", "acme", "--output-dir", out_dir.to_str().unwrap()],
    )
    .await;
    assert!(output.status.success(), "render failed: {}", stderr(&output));

    for name in ["batch", "inference"] {
        let rendered = fs::read_to_string(out_dir.join(format!("{}.yaml", name)))
            .await
            .unwrap();
        assert!(rendered.contains("AWSTemplateFormatVersion"));
    }
}

#[tokio::test]
async fn test_render_includes_templates_from_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("templates")).await.unwrap();
    fs::write(
        temp_dir.path().join("templates").join("queue.json"),
        r#"{"Resources": {"Queue": {"Type": "AWS::SQS::Queue"}}}"#,
    )
    .await
    .unwrap();
    fs::write(
        temp_dir.path().join("cfnctl.yaml"),
        "project: acme\ntemplate_dir: templates\n",
    )
    .await
    .unwrap();

    let output = cfnctl(temp_dir.path(), &["render", "--template", "queue"]).await;
    assert!(output.status.success(), "render failed: {}", stderr(&output));

    let rendered = fs::read_to_string(temp_dir.path().join("queue.yaml"))
        .await
        .unwrap();
    assert!(rendered.contains("AWS::SQS::Queue"));
}

#[tokio::test]
async fn test_unknown_template_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = cfnctl(temp_dir.path(), &["render", "--template", "web", "--project", "acme"]).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid template name `web`"));
}

#[tokio::test]
async fn test_delete_refuses_several_templates() {
    let temp_dir = TempDir::new().unwrap();
    let output = cfnctl(temp_dir.path(), &["delete", "--project", "acme", "--yes"]).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Delete one stack at a time"));
}

#[tokio::test]
async fn test_malformed_tag_fails_before_any_aws_call() {
    let temp_dir = TempDir::new().unwrap();
    let output = cfnctl(
        temp_dir.path(),
        &["apply", "--template", "batch", "--project", "acme", "-t", "owner"],
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Malformed tag string: `owner`"));
}

#[tokio::test]
async fn test_change_set_rejects_stack_inputs() {
    let temp_dir = TempDir::new().unwrap();
    let output = cfnctl(
        temp_dir.path(),
        &["apply", "--change-set", "arn:cs", "--param", "MaxVcpus=4"],
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));
}

#[tokio::test]
async fn test_overlong_stack_name_fails_before_any_aws_call() {
    let temp_dir = TempDir::new().unwrap();
    let project = "a".repeat(120);
    let output = cfnctl(
        temp_dir.path(),
        &["delete", "--template", "batch", "--project", &project, "--yes"],
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("is longer than 128 characters"));
}

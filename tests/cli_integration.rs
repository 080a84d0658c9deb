//! CLI integration tests
//!
//! These run the compiled binary and check:
//! - Argument parsing and help
//! - Configuration errors and exit codes
//! - Report output of a dry run against mocked services

use serde_json::{json, Value};
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The binary under test, started with an empty environment.
fn drone_trigger() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_drone-trigger"));
    command.env_clear();
    command
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[tokio::test]
async fn test_cli_help() {
    let output = drone_trigger()
        .arg("--help")
        .output()
        .await
        .expect("Failed to execute drone-trigger");

    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("--dry-run"));
    assert!(help.contains("--from"));
    assert!(help.contains("config"));
}

#[tokio::test]
async fn test_cli_version() {
    let output = drone_trigger().arg("--version").output().await.unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_missing_configuration_fails() {
    let output = drone_trigger().output().await.unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("drone_api"));
}

#[tokio::test]
async fn test_quiet_conflicts_with_verbose() {
    let output = drone_trigger().args(["-q", "-v"]).output().await.unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_config_command_masks_tokens() {
    let output = drone_trigger()
        .env("PLUGIN_DRONE_API", "http://drone.local")
        .env("TRIGGER_DRONE_TOKEN", "hunter2")
        .args(["config", "--format", "json"])
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let config: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["drone_api"], "http://drone.local");
    assert_eq!(config["drone_token"], "<set>");
    assert!(!stdout(&output).contains("hunter2"));
}

#[tokio::test]
async fn test_dry_run_reports_without_triggering() {
    let drone = MockServer::start().await;
    let gogs = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"owner": "team", "name": "app"}])),
        )
        .mount(&drone)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"number": 1})))
        .expect(0)
        .mount(&drone)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/team/app/branches"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"name": "main", "commit": {"id": "abc"}}])),
        )
        .mount(&gogs)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/team/app/raw/main/Dockerfile"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("FROM alpine:3.18\n", "text/plain"))
        .mount(&gogs)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/team/app/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "type": "gogs",
            "events": ["push"],
            "config": {"url": "http://drone.local/hook?access_token=tok"}
        }])))
        .mount(&gogs)
        .await;

    let output = drone_trigger()
        .env("PLUGIN_DRONE_API", drone.uri())
        .env("PLUGIN_GOGS_API", gogs.uri())
        .env("PLUGIN_FROM", "alpine:3.18")
        .env("DRONE_REPO", "docker/alpine")
        .args(["--dry-run", "--format", "json", "-q"])
        .output()
        .await
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["source"], "docker/alpine");
    assert_eq!(report["with_triggers"], 1);
    assert_eq!(report["triggered"], 0);
}

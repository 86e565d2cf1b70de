//! Integration tests for junit-checks
//!
//! These tests drive the binary end to end against report files on disk.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONTEXT_VARS: &[&str] = &[
    "INPUT_PATH",
    "INPUT_STRIPFROMPATH",
    "INPUT_ACCESSTOKEN",
    "GITHUB_TOKEN",
    "GITHUB_REPOSITORY",
    "GITHUB_SHA",
    "GITHUB_JOB",
    "GITHUB_API_URL",
    "RUST_LOG",
];

/// Helper to create a junit-checks Command isolated from the caller's CI env
fn junit_checks(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("junit-checks");
    cmd.current_dir(dir.path());
    for var in CONTEXT_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_report(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, xml).unwrap();
    path
}

const PASSING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="pkg" tests="3" errors="0" failures="0" time="1.5">
    <testcase name="a"/>
    <testcase name="b"/>
    <testcase name="c"/>
  </testsuite>
</testsuites>"#;

const FAILING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="pkg" tests="2" errors="0" failures="1" time="0.3">
    <testcase name="ok" file="/src/a.go" line="4"/>
    <testcase name="broken" file="/src/a.go" line="0">
      <failure message="mismatch">want 1
got 2</failure>
    </testcase>
  </testsuite>
</testsuites>"#;

const FLAT: &str = r#"<testsuites>
  <testsuite name="pkg" tests="2" errors="0" failures="1" time="0.75">
    <testcase name="a" file="a.go" line="9"><failure>boom</failure></testcase>
    <testcase name="b"/>
  </testsuite>
</testsuites>"#;

const NESTED: &str = r#"<testsuites>
  <testsuite name="wrapper">
    <testsuite name="pkg" tests="2" errors="0" failures="1" time="0.75">
      <testcase name="a" file="a.go" line="9"><failure>boom</failure></testcase>
      <testcase name="b"/>
    </testsuite>
  </testsuite>
</testsuites>"#;

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        junit_checks(&dir).arg("--help").assert().success();
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        junit_checks(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_config_show_defaults() {
        let dir = TempDir::new().unwrap();
        junit_checks(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No config file found"))
            .stdout(predicate::str::contains("**/TEST-*.xml"));
    }

    #[test]
    fn test_config_reads_default_file_location() {
        let dir = TempDir::new().unwrap();
        write_report(
            &dir,
            ".github/junit-checks.toml",
            "[report]\nstrip_from_path = \"/work/\"\n",
        );
        junit_checks(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("strip_from_path = \"/work/\""));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = TempDir::new().unwrap();
        let config = write_report(&dir, "checks.toml", "[github]\nannotations_per_request = 0\n");
        junit_checks(&dir)
            .arg("--config")
            .arg(&config)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("annotations_per_request is 0"));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        junit_checks(&dir)
            .args(["--config", "missing.toml", "summarize"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::"));
    }
}

// =============================================================================
// Summarize (offline)
// =============================================================================

mod summarize {
    use super::*;

    #[test]
    fn test_passing_report_summary_message() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "reports/TEST-pkg.xml", PASSING);

        junit_checks(&dir)
            .args(["summarize", "--path", "reports/*.xml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[notice]"))
            .stdout(predicate::str::contains(
                "Junit Results ran 3 in 1.5 seconds 0 Errored, 0 Failed, 0 Skipped",
            ));
    }

    #[test]
    fn test_default_pattern_finds_nested_reports() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "build/test-results/TEST-pkg.xml", FAILING);

        junit_checks(&dir)
            .arg("summarize")
            .assert()
            .success()
            .stdout(predicate::str::contains("[failure]"))
            .stdout(predicate::str::contains("/src/a.go:1 pkg::broken"));
    }

    #[test]
    fn test_self_wrap_and_nested_shapes_agree() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "flat.xml", FLAT);
        write_report(&dir, "nested.xml", NESTED);

        let output = junit_checks(&dir)
            .args(["summarize", "--json", "--path", "*.xml"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let docs: Vec<serde_json::Value> = stdout
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["summary"], docs[1]["summary"]);
        assert_eq!(docs[0]["annotations"], docs[1]["annotations"]);
        assert_eq!(docs[0]["summary"]["total_duration"], 0.75);
        assert_eq!(docs[0]["verdict"], "failure");
    }

    #[test]
    fn test_each_file_gets_its_own_summary() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "a.xml", PASSING);
        write_report(&dir, "b.xml", PASSING);

        junit_checks(&dir)
            .args(["summarize", "--path", "*.xml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ran 3 in 1.5 seconds").count(2))
            .stdout(predicate::str::contains("ran 6").not());
    }

    #[test]
    fn test_skips_documents_without_suite_collection() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "single.xml", r#"<testsuite name="x" tests="1"/>"#);

        junit_checks(&dir)
            .args(["summarize", "--path", "*.xml"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }
}

// =============================================================================
// Publish
// =============================================================================

mod publish {
    use super::*;

    #[test]
    fn test_failure_verdict_emits_warnings_only() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "TEST-pkg.xml", FAILING);

        // No repository, sha or token: a failure verdict never calls the API
        junit_checks(&dir)
            .args(["publish", "--path", "*.xml", "--strip-from-path", "/src/"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "::warning title=Test summary,file=test,line=0::Junit Results ran 2 in 0.3 seconds 0 Errored, 1 Failed, 0 Skipped",
            ))
            .stdout(predicate::str::contains(
                "::warning title=pkg%3A%3Abroken,file=a.go,line=1::want 1%0Agot 2",
            ));
    }

    #[test]
    fn test_action_inputs_from_environment() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "out/TEST-pkg.xml", FAILING);

        junit_checks(&dir)
            .arg("publish")
            .env("INPUT_PATH", "out/*.xml")
            .env("INPUT_STRIPFROMPATH", "/src/")
            .assert()
            .success()
            .stdout(predicate::str::contains("file=a.go,line=1"));
    }

    #[test]
    fn test_no_matching_files_succeeds() {
        let dir = TempDir::new().unwrap();
        junit_checks(&dir)
            .args(["publish", "--path", "nothing/*.xml"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn test_malformed_count_fails_run() {
        let dir = TempDir::new().unwrap();
        write_report(
            &dir,
            "bad.xml",
            r#"<testsuites><testsuite name="s" tests="many" errors="0" failures="0" time="1"/></testsuites>"#,
        );

        junit_checks(&dir)
            .args(["publish", "--path", "*.xml"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::"))
            .stdout(predicate::str::contains("tests=\"many\""));
    }

    #[test]
    fn test_invalid_markup_fails_run() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "broken.xml", "<testsuites><testsuite>");

        junit_checks(&dir)
            .args(["publish", "--path", "*.xml"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::Failed to parse report"));
    }

    #[test]
    fn test_notice_without_commit_context_fails() {
        let dir = TempDir::new().unwrap();
        write_report(&dir, "TEST-pkg.xml", PASSING);

        junit_checks(&dir)
            .args(["publish", "--path", "*.xml"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("GITHUB_SHA"));
    }
}

// =============================================================================
// Publish against a mock GitHub API
// =============================================================================

mod publish_remote {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        routing::{get, patch},
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Updates = Arc<Mutex<Vec<(u64, Value)>>>;

    async fn list_runs() -> Json<Value> {
        Json(json!({
            "total_count": 2,
            "check_runs": [
                {"id": 11, "name": "build"},
                {"id": 12, "name": "test"}
            ]
        }))
    }

    async fn update_run(
        State(updates): State<Updates>,
        Path((_owner, _repo, id)): Path<(String, String, u64)>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        updates.lock().unwrap().push((id, body));
        Json(json!({"id": id}))
    }

    /// Returns `None` when the sandbox forbids binding a socket.
    async fn start_mock() -> Option<(String, Updates)> {
        let updates = Updates::default();
        let app = Router::new()
            .route("/repos/{owner}/{repo}/commits/{sha}/check-runs", get(list_runs))
            .route("/repos/{owner}/{repo}/check-runs/{id}", patch(update_run))
            .with_state(updates.clone());
        let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(e) => {
                eprintln!("Skipping mock API test (sandbox): {:?}", e);
                return None;
            }
        };
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Some((format!("http://{}", addr), updates))
    }

    fn publish_cmd(dir: &TempDir, api_url: &str, job: &str) -> Command {
        let mut cmd = junit_checks(dir);
        cmd.args(["publish", "--path", "*.xml"])
            .env("GITHUB_API_URL", api_url)
            .env("GITHUB_REPOSITORY", "octo/app")
            .env("GITHUB_SHA", "abc123")
            .env("GITHUB_JOB", job)
            .env("INPUT_ACCESSTOKEN", "ghs_test");
        cmd
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_notice_updates_running_check() {
        let Some((url, updates)) = start_mock().await else {
            return;
        };
        let dir = TempDir::new().unwrap();
        write_report(&dir, "TEST-pkg.xml", PASSING);

        let mut cmd = publish_cmd(&dir, &url, "test");
        let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
            .await
            .unwrap();
        assert!(output.status.success(), "{:?}", output);
        assert!(!String::from_utf8_lossy(&output.stdout).contains("::warning"));

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (id, body) = &updates[0];
        assert_eq!(*id, 12);
        assert_eq!(body["output"]["title"], "Junit Results");
        assert_eq!(body["output"]["summary"], "jUnit Results");
        let annotations = body["output"]["annotations"].as_array().unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0]["title"], "Test summary");
        assert_eq!(annotations[0]["annotation_level"], "notice");
        assert_eq!(
            annotations[0]["message"],
            "Junit Results ran 3 in 1.5 seconds 0 Errored, 0 Failed, 0 Skipped"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_job_is_benign() {
        let Some((url, updates)) = start_mock().await else {
            return;
        };
        let dir = TempDir::new().unwrap();
        write_report(&dir, "TEST-pkg.xml", PASSING);

        let mut cmd = publish_cmd(&dir, &url, "fork-job");
        let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
            .await
            .unwrap();
        assert!(output.status.success(), "{:?}", output);
        assert!(updates.lock().unwrap().is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("can not identify test suite"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_job_stops_before_later_reports() {
        let Some((url, updates)) = start_mock().await else {
            return;
        };
        let dir = TempDir::new().unwrap();
        write_report(&dir, "a.xml", PASSING);
        write_report(&dir, "b.xml", FAILING);

        let mut cmd = publish_cmd(&dir, &url, "fork-job");
        let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
            .await
            .unwrap();
        assert!(output.status.success(), "{:?}", output);
        assert!(updates.lock().unwrap().is_empty());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("::warning"), "b.xml was published: {}", stdout);
    }
}

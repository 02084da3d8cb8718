use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use httpmock::prelude::*;
use httpmock::Method::HEAD;
use predicates::prelude::*;
use serde_json::json;
use std::process::Command;

const BLOG_IDEAS: &str = "/v2/business/content/blog-ideas";

fn cargo_bin(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("apiprobe").expect("binary exists");
    for key in apiprobe::config::keys::ALL {
        cmd.env_remove(key);
    }
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(dir.path());
    cmd
}

#[test]
fn displays_help() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin(&temp);
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "End-to-end checks for the content generation API",
    ));
}

#[test]
fn displays_version() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin(&temp);
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn lists_scenarios_without_sending_requests() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin(&temp);
    cmd.args(["--list", "--env", "staging", "--endpoint", "blog-ideas"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Environments: staging"))
        .stdout(predicate::str::contains("rejects empty topic"))
        .stdout(predicate::str::contains("youtube-intros").not());
}

#[test]
fn errors_on_unknown_endpoint() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin(&temp);
    cmd.args(["--endpoint", "blog-poems"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown endpoint \"blog-poems\""));
}

#[test]
fn runs_selected_scenario_against_server() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(BLOG_IDEAS)
            .header("x-api-key", "stage-key");
        then.status(200).json_body(json!([{"text": "Idea"}]));
    });

    let mut cmd = cargo_bin(&temp);
    cmd.env("STAGING_BASE_URL", server.base_url())
        .env("STAGING_X_API_KEY", "stage-key")
        .env("STAGING_TOKEN", "Bearer stage")
        .args([
            "--env",
            "staging",
            "--endpoint",
            "blog-ideas",
            "--grep",
            "^accepts a valid request$",
        ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("accepts a valid request"))
        .stdout(predicate::str::contains("1 of 1 scenarios passed"));
    mock.assert();
}

#[test]
fn reads_settings_from_env_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(BLOG_IDEAS)
            .header("x-api-key", "file-key");
        then.status(200).json_body(json!([]));
    });
    temp.child(".env")
        .write_str(&format!(
            "TEST_ENV=staging\nSTAGING_BASE_URL={}\nSTAGING_X_API_KEY=file-key\n",
            server.base_url()
        ))
        .unwrap();

    let mut cmd = cargo_bin(&temp);
    cmd.args([
        "--endpoint",
        "blog-ideas",
        "--grep",
        "^accepts a valid request$",
    ]);

    cmd.assert().success();
    mock.assert();
}

#[test]
fn failing_run_exits_with_error_and_saves_artifacts() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(BLOG_IDEAS);
        then.status(500).body("Internal Server Error");
    });

    let mut cmd = cargo_bin(&temp);
    cmd.env("STAGING_BASE_URL", server.base_url())
        .env("STAGING_X_API_KEY", "stage-key")
        .args([
            "--env",
            "staging",
            "--endpoint",
            "blog-ideas",
            "--grep",
            "^accepts a valid request$",
            "--retries",
            "1",
            "--artifacts",
            "out",
        ]);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("expected status 200, got 500"))
        .stderr(predicate::str::contains("1 of 1 scenarios did not pass"));
    mock.assert_hits(2);
    temp.child("out/staging/blog-ideas")
        .assert(predicate::path::is_dir());
}

#[test]
fn diagnose_reports_keys_and_probes_base_url() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(HEAD).path("/");
        then.status(204);
    });

    let mut cmd = cargo_bin(&temp);
    cmd.env("STAGING_BASE_URL", server.base_url())
        .env("STAGING_X_API_KEY", "abcdefghij")
        .args(["diagnose", "--env", "staging"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("abcde..."))
        .stdout(predicate::str::contains("abcdefghij").not())
        .stdout(predicate::str::contains("Missing"))
        .stdout(predicate::str::contains("204"));
    mock.assert();
}

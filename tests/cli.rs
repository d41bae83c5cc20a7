//! End-to-end tests of the `jobs-uploader` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_PEM: &str = include_str!("fixtures/test_private_key.pem");

fn write_service_account_key(dir: &std::path::Path) {
    let key = json!({
        "type": "service_account",
        "project_id": "demo-project",
        "private_key_id": "key-1",
        "private_key": TEST_PEM,
        "client_email": "uploader@demo-project.iam.gserviceaccount.com"
    });
    fs::write(
        dir.join("firebase_service_account.json"),
        key.to_string(),
    )
    .expect("writing service account key failed");
}

#[test]
fn missing_credentials_fail_the_run_before_any_upload() {
    // Nest three levels down so the upward search never escapes the tempdir.
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().join("a").join("b").join("c");
    fs::create_dir_all(&cwd).unwrap();

    let mut cmd = Command::cargo_bin("jobs-uploader").expect("Binary exists");
    cmd.current_dir(&cwd)
        .assert()
        .failure()
        .stderr(predicate::str::contains("service account key"));
}

// Multi-threaded runtime: the mock server must serve the child process
// while the test thread blocks on it.
#[tokio::test(flavor = "multi_thread")]
async fn uploads_every_job_and_reports_completion() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/v1/projects/demo-project/.*/documents/jobs/.*$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_service_account_key(dir.path());
    let data_dir = dir.path().join("lib").join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("jobs.json"),
        r#"{"jobs": {"job1": {"title": "Engineer"}, "job2": {"title": "Analyst"}}}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("jobs-uploader").expect("Binary exists");
    cmd.current_dir(dir.path())
        .env("FIRESTORE_BASE_URL", server.uri())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Successfully uploaded job")
                .and(predicate::str::contains("Job upload complete!")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_jobs_file_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_service_account_key(dir.path());
    let data_dir = dir.path().join("lib").join("data");
    fs::create_dir_all(&data_dir).unwrap();
    // Valid JSON, but no top-level "jobs" key.
    fs::write(data_dir.join("jobs.json"), r#"{"positions": {}}"#).unwrap();

    let mut cmd = Command::cargo_bin("jobs-uploader").expect("Binary exists");
    cmd.current_dir(dir.path())
        .env("FIRESTORE_BASE_URL", server.uri())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse jobs file"));
}

#[test]
fn credentials_found_in_scripts_directory_of_an_ancestor() {
    // Key lives in <root>/scripts/, binary runs from <root>/a/b.
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    write_service_account_key(&scripts);

    let cwd = dir.path().join("a").join("b");
    fs::create_dir_all(&cwd).unwrap();

    // No jobs file: the run must get past credential lookup and then fail
    // on the jobs file instead.
    let mut cmd = Command::cargo_bin("jobs-uploader").expect("Binary exists");
    cmd.current_dir(&cwd)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read jobs file"));
}

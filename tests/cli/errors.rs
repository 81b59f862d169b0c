//! Deploy failures that happen before any network call.

use predicates::prelude::*;

use crate::support::*;

/// Nothing listens here; reaching it would fail with a transport error.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";

#[test]
fn test_malformed_secret_fails_before_network() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", DEAD_ENDPOINT)
        .env("INPUT_SECRETS", "123=id")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "broken reference to Lockbox secret: 123=id",
        ))
        .stderr(predicate::str::contains("request to").not());

    assert!(t.summary().contains("❌ Error: broken reference to Lockbox secret: 123=id"));
    assert!(t.outputs().is_empty());
}

#[test]
fn test_missing_credentials() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credentials"))
        .stdout(predicate::str::contains("YC_IAM_TOKEN"));
}

#[test]
fn test_missing_required_input() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .env_remove("INPUT_RUNTIME")
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required input: runtime"));

    let summary = t.summary();
    assert!(summary.contains("Function Name: hello"));
    assert!(summary.contains("❌ Error"));
}

#[test]
fn test_invalid_memory() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("INPUT_MEMORY", "lots")
        .assert()
        .failure()
        .stderr(predicate::str::contains("memory has unknown format: lots"));
}

#[test]
fn test_async_queue_without_service_account() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("INPUT_ASYNC", "true")
        .env("INPUT_ASYNC-SUCCESS-YMQ-ARN", "yrn:yc:ymq:ru-central1:b1g:ok")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "either async-success-sa-id or async-success-sa-name must be set if async-success-ymq-arn is set",
        ));
}

#[test]
fn test_bucket_requires_commit_sha() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", DEAD_ENDPOINT)
        .env("INPUT_BUCKET", "artifacts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required input: GITHUB_SHA"));
}

#[test]
fn test_inline_archive_too_big() {
    let t = Test::new();
    // xorshift noise does not compress
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let noise: Vec<u8> = (0..4 * 1024 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect();
    std::fs::write(t.dir.path().join("index.js"), noise).unwrap();

    t.deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", DEAD_ENDPOINT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("zip file is too big"))
        .stdout(predicate::str::contains("bucket"));
}

#[test]
fn test_errors_annotated_on_runner() {
    let t = Test::with_files(&[("index.js", "1\n")]);
    t.deploy_cmd()
        .env("GITHUB_ACTIONS", "true")
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("INPUT_LOG-LEVEL", "loud")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "::error::log level has unknown value: loud",
        ));
}

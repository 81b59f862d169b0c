//! `ycfn deploy` end to end against a mock Yandex Cloud.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::*;

async fn existing_function(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/functions/v1/functions"))
        .and(query_param("filter", "name = \"hello\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "functions": [{ "id": "d4e1", "name": "hello" }]
        })))
        .mount(server)
        .await;
}

fn version_created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "op-version",
        "done": true,
        "metadata": { "functionVersionId": id }
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_inline_with_secrets() {
    let server = MockServer::start().await;
    existing_function(&server).await;
    Mock::given(method("GET"))
        .and(path("/iam/v1/serviceAccounts"))
        .and(query_param("filter", "name = \"deployer\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "serviceAccounts": [{ "id": "aje1", "name": "deployer" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lockbox/v1/secrets/e6q1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "e6q1",
            "name": "db",
            "currentVersion": { "id": "v9" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/versions"))
        .and(body_partial_json(json!({
            "functionId": "d4e1",
            "runtime": "nodejs18",
            "entrypoint": "index.handler",
            "resources": { "memory": "268435456" },
            "executionTimeout": "10s",
            "serviceAccountId": "aje1",
            "environment": { "MODE": "prod" },
            "secrets": [{
                "environmentVariable": "DB_PASSWORD",
                "id": "e6q1",
                "versionId": "v9",
                "key": "password"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "op-version", "done": false })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/op-version"))
        .respond_with(version_created("d4e9"))
        .mount(&server)
        .await;

    let t = Test::with_files(&[("index.js", "exports.handler = () => 1;\n")]);
    let output = t
        .deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", server.uri())
        .env("INPUT_MEMORY", "256Mb")
        .env("INPUT_EXECUTION-TIMEOUT", "10")
        .env("INPUT_SERVICE-ACCOUNT-NAME", "deployer")
        .env("INPUT_ENVIRONMENT", "MODE=prod")
        .env("INPUT_SECRETS", "DB_PASSWORD=e6q1/latest/password")
        .output()
        .unwrap();

    assert_success(&output);
    let outputs = t.outputs();
    assert!(outputs.contains("function-id=d4e1\n"), "{}", outputs);
    assert!(outputs.contains("version-id=d4e9\n"), "{}", outputs);
    assert!(outputs.contains("time="), "{}", outputs);

    let summary = t.summary();
    assert!(summary.contains("Version ID: d4e9"));
    assert!(summary.contains("/folders/b1gfolder/functions/functions/d4e1/overview"));
    assert!(summary.contains("✅ Success"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_creates_function_and_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/functions/v1/functions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/functions"))
        .and(body_partial_json(json!({
            "folderId": "b1gfolder",
            "name": "hello",
            "description": "Created from octo/hello"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "op-function",
            "done": true,
            "metadata": { "functionId": "d4e2" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/artifacts/d4e2/abc123.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/versions"))
        .and(body_partial_json(json!({
            "functionId": "d4e2",
            "package": { "bucketName": "artifacts", "objectName": "d4e2/abc123.zip" }
        })))
        .respond_with(version_created("d4e8"))
        .expect(1)
        .mount(&server)
        .await;

    let t = Test::with_files(&[("index.js", "exports.handler = () => 1;\n")]);
    let output = t
        .deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", server.uri())
        .env("INPUT_BUCKET", "artifacts")
        .env("GITHUB_SHA", "abc123")
        .env("GITHUB_REPOSITORY", "octo/hello")
        .output()
        .unwrap();

    assert_success(&output);
    assert!(t.outputs().contains("function-id=d4e2\n"));
    let summary = t.summary();
    assert!(summary.contains("Bucket: artifacts"));
    assert!(summary.contains("Bucket Object: d4e2/abc123.zip"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unresolved_secret_stops_deploy() {
    let server = MockServer::start().await;
    existing_function(&server).await;
    Mock::given(method("GET"))
        .and(path("/lockbox/v1/secrets/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lockbox/v1/secrets"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "secrets": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/versions"))
        .respond_with(version_created("never"))
        .expect(0)
        .mount(&server)
        .await;

    let t = Test::with_files(&[("index.js", "1\n")]);
    let output = t
        .deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", server.uri())
        .env("INPUT_SECRETS", "TOKEN=ghost/latest/value")
        .output()
        .unwrap();

    assert_failure(&output);
    assert_stderr_contains(
        &output,
        "failed to resolve latest versions for secrets: failed to resolve secret: ghost",
    );
    let summary = t.summary();
    assert!(summary.contains("Function ID:"));
    assert!(summary.contains("❌ Error: failed to resolve latest versions"));
    assert!(!t.outputs().contains("version-id"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_reported_with_request_id() {
    let server = MockServer::start().await;
    existing_function(&server).await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/versions"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-request-id", "req-7")
                .set_body_json(json!({ "code": 3, "message": "unknown runtime" })),
        )
        .mount(&server)
        .await;

    let t = Test::with_files(&[("index.js", "1\n")]);
    let output = t
        .deploy_cmd()
        .env("INPUT_YC-IAM-TOKEN", "t0ken")
        .env("YCFN_ENDPOINT", server.uri())
        .output()
        .unwrap();

    assert_failure(&output);
    assert_stderr_contains(&output, "unknown runtime");
    assert_stdout_contains(&output, "x-request-id: req-7");
}

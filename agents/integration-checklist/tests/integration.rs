//! Integration tests for the Integration Checklist
//!
//! Tests the checklist end to end:
//! - Full runs against on-disk repositories
//! - UUID continuity and tag uniqueness against a mocked GitHub API
//! - Determinism and invalid-token reporting of the validator

use base64::Engine;
use integration_checklist::checks::LicenseCheck;
use integration_checklist::config::LicenseSettings;
use integration_checklist::{
    Checklist, ChecklistError, ChecklistSettings, CollectingProgress, ConfigValidator, ErrorKind,
    ExitCode, GitHubClientBuilder, RemoteServices, RuleContext, RuleSet, SilentProgress,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn valid_config(uuid: &str) -> Value {
    json!({
        "name": "Example",
        "acronym": "EX",
        "logging": { "level": "info" },
        "defaultColor": "light-gray",
        "request": { "cert": "", "key": "", "passphrase": "", "ca": "", "proxy": "" },
        "options": [
            { "key": "apiKey", "name": "API Key", "description": "Your API key" }
        ],
        "entityTypes": ["domain", "IPv4", "url"],
        "polarityIntegrationUuid": uuid
    })
}

/// Write a repository that passes every check
fn write_repository(root: &Path, config: &Value) {
    std::fs::create_dir_all(root.join("config")).unwrap();
    std::fs::write(
        root.join("config/config.json"),
        serde_json::to_string_pretty(config).unwrap(),
    )
    .unwrap();

    let license = LicenseCheck::new(LicenseSettings::default()).expected_texts()[0].clone();
    std::fs::write(root.join("LICENSE"), license).unwrap();
    std::fs::write(root.join("README.md"), "# Example\n").unwrap();
    std::fs::write(root.join(".prettierrc"), "{}\n").unwrap();
    std::fs::write(root.join(".gitignore"), "node_modules\n").unwrap();
    std::fs::write(
        root.join("package.json"),
        json!({ "name": "example", "version": "3.1.0", "private": true }).to_string(),
    )
    .unwrap();
    std::fs::write(
        root.join("package-lock.json"),
        json!({ "name": "example", "version": "3.1.0", "lockfileVersion": 2 }).to_string(),
    )
    .unwrap();
}

fn remote_for(server: &MockServer) -> RemoteServices {
    let client = Arc::new(
        GitHubClientBuilder::new()
            .api_url(server.uri())
            .token(Some("test-token".to_string()))
            .build()
            .unwrap(),
    );
    RemoteServices::new(client.clone(), client)
}

fn connected_settings(base_branch: Option<&str>) -> ChecklistSettings {
    let mut settings = ChecklistSettings::default();
    settings.github.repository = Some("polarityio/example".to_string());
    settings.github.base_branch = base_branch.map(str::to_string);
    settings
}

fn contents_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "type": "file",
        "encoding": "base64",
        "content": base64::engine::general_purpose::STANDARD.encode(text),
    }))
}

async fn mount_tags(server: &MockServer, tags: &[&str]) {
    let body: Vec<Value> = tags.iter().map(|t| json!({ "name": t })).collect();
    Mock::given(method("GET"))
        .and(path("/repos/polarityio/example/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_offline_checklist_passes() {
    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("11111111-1111-1111-1111-111111111111"));

    let checklist = Checklist::standard(dir.path(), &ChecklistSettings::default(), None).unwrap();
    let progress = CollectingProgress::new();
    let report = checklist.run(&progress).await;

    assert!(report.passed, "{:?}", report.failure);
    assert_eq!(ExitCode::from_report(&report), ExitCode::Success);
    assert_eq!(report.confirmations, progress.lines());
    assert_eq!(report.confirmations.len(), 14);
    assert_eq!(
        report.confirmations.first().map(String::as_str),
        Some("Config Logging Level set to 'info' in config.json")
    );
    assert_eq!(
        report.confirmations.last().map(String::as_str),
        Some("package-lock.json and package.json are in sync")
    );
    assert!(!report
        .confirmations
        .iter()
        .any(|c| c.contains("unique on GitHub")));
}

#[tokio::test]
async fn test_missing_readme_stops_the_run() {
    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("11111111-1111-1111-1111-111111111111"));
    std::fs::remove_file(dir.path().join("README.md")).unwrap();

    let checklist = Checklist::standard(dir.path(), &ChecklistSettings::default(), None).unwrap();
    let report = checklist.run(&SilentProgress).await;

    assert!(!report.passed);
    assert_eq!(report.confirmations.len(), 8);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.check, "file:README.md");
    assert_eq!(failure.kind, ErrorKind::FileMissing);
    assert_eq!(ExitCode::from_report(&report), ExitCode::FileMissing);
}

#[tokio::test]
async fn test_missing_config_is_reported_first() {
    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("11111111-1111-1111-1111-111111111111"));
    std::fs::remove_file(dir.path().join("config/config.json")).unwrap();
    std::fs::remove_file(dir.path().join("LICENSE")).unwrap();

    let checklist = Checklist::standard(dir.path(), &ChecklistSettings::default(), None).unwrap();
    let report = checklist.run(&SilentProgress).await;

    let failure = report.failure.unwrap();
    assert_eq!(failure.kind, ErrorKind::ConfigMissing);
    assert!(failure.message.starts_with("File Not Found: config.json"));
    assert!(report.confirmations.is_empty());
}

#[tokio::test]
async fn test_changed_uuid_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/polarityio/example/contents/config/config.json"))
        .and(query_param("ref", "develop"))
        .respond_with(contents_response(&valid_config("xyz-999").to_string()))
        .expect(1)
        .mount(&server)
        .await;
    mount_tags(&server, &["3.0.0"]).await;

    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("abc-123"));

    let checklist = Checklist::standard(
        dir.path(),
        &connected_settings(Some("develop")),
        Some(remote_for(&server)),
    )
    .unwrap();
    let report = checklist.run(&SilentProgress).await;

    let failure = report.failure.unwrap();
    assert_eq!(failure.kind, ErrorKind::ConfigInvalid);
    assert!(failure.message.contains("\"polarityIntegrationUuid\": \"xyz-999\""));
    assert!(!failure.message.contains("abc-123"));
    assert_eq!(report.confirmations.len(), 7);
}

#[tokio::test]
async fn test_connected_checklist_passes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/polarityio/example/contents/config/config.json"))
        .and(query_param("ref", "develop"))
        .respond_with(contents_response(&valid_config("abc-123").to_string()))
        .mount(&server)
        .await;
    mount_tags(&server, &["3.0.0", "2.4.1"]).await;

    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("abc-123"));

    let checklist = Checklist::standard(
        dir.path(),
        &connected_settings(Some("develop")),
        Some(remote_for(&server)),
    )
    .unwrap();
    let report = checklist.run(&SilentProgress).await;

    assert!(report.passed, "{:?}", report.failure);
    assert_eq!(report.confirmations.len(), 16);
    assert!(report
        .confirmations
        .contains(&"Version in package.json is new and unique on GitHub".to_string()));
}

#[tokio::test]
async fn test_released_version_fails_connected_run() {
    let server = MockServer::start().await;
    mount_tags(&server, &["3.1.0"]).await;

    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("abc-123"));

    let checklist =
        Checklist::standard(dir.path(), &connected_settings(None), Some(remote_for(&server)))
            .unwrap();
    let report = checklist.run(&SilentProgress).await;

    let failure = report.failure.unwrap();
    assert_eq!(failure.check, "package-json");
    assert_eq!(failure.kind, ErrorKind::FileInvalid);
    assert!(failure.message.contains("(3.1.0)"));
}

#[tokio::test]
async fn test_no_base_branch_fetches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/polarityio/example/contents/config/config.json"))
        .respond_with(contents_response("{}"))
        .expect(0)
        .mount(&server)
        .await;
    mount_tags(&server, &[]).await;

    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("abc-123"));

    let checklist =
        Checklist::standard(dir.path(), &connected_settings(None), Some(remote_for(&server)))
            .unwrap();
    let report = checklist.run(&SilentProgress).await;

    assert!(report.passed, "{:?}", report.failure);
    server.verify().await;
}

#[tokio::test]
async fn test_upstream_failure_maps_to_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_repository(dir.path(), &valid_config("abc-123"));

    let checklist = Checklist::standard(
        dir.path(),
        &connected_settings(Some("develop")),
        Some(remote_for(&server)),
    )
    .unwrap();
    let report = checklist.run(&SilentProgress).await;

    assert_eq!(
        report.failure.as_ref().map(|f| f.kind),
        Some(ErrorKind::UpstreamFetchFailed)
    );
    assert_eq!(ExitCode::from_report(&report), ExitCode::UpstreamError);
}

fn validate_blocking(config: &Value) -> Result<Vec<String>, ChecklistError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        ConfigValidator::new(RuleSet::default())
            .validate(config, &RuleContext::default(), &SilentProgress)
            .await
            .map(|report| report.confirmations)
    })
}

fn entity_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("domain".to_string()),
        Just("url".to_string()),
        Just("IPv4".to_string()),
        Just("hash".to_string()),
        Just("IP".to_string()),
        "[a-zA-Z*]{1,8}",
    ]
}

proptest! {
    #[test]
    fn prop_validation_is_deterministic(
        level in prop_oneof![Just("info"), Just("debug"), Just("trace")],
        tokens in prop::collection::vec(entity_token(), 0..6),
        cert in prop_oneof![Just(""), Just("/etc/cert.pem")],
    ) {
        let mut config = valid_config("11111111-1111-1111-1111-111111111111");
        config["logging"]["level"] = json!(level);
        config["entityTypes"] = json!(tokens);
        config["request"]["cert"] = json!(cert);

        let first = validate_blocking(&config).map_err(|e| e.to_string());
        let second = validate_blocking(&config).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_invalid_tokens_listed_once_in_order(
        tokens in prop::collection::vec("[a-z]{3,8}", 1..8),
    ) {
        let invalid: Vec<String> = tokens
            .iter()
            .filter(|t| t.parse::<integration_checklist::EntityType>().is_err())
            .cloned()
            .collect();
        prop_assume!(!invalid.is_empty());

        let mut expected: Vec<String> = Vec::new();
        for token in &invalid {
            if !expected.contains(token) {
                expected.push(token.clone());
            }
        }

        let mut config = valid_config("11111111-1111-1111-1111-111111111111");
        config["entityTypes"] = json!(tokens);

        let message = validate_blocking(&config).unwrap_err().to_string();
        let listed = message
            .lines()
            .find_map(|line| line.strip_prefix("  * "))
            .unwrap_or_default()
            .to_string();
        prop_assert_eq!(listed, expected.join(", "));
    }
}

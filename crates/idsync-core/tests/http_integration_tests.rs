//! Integration tests for the HTTP transport and lister using wiremock.
//!
//! The transport is blocking, so every call into it runs on a blocking
//! thread while the mock server lives on the async runtime.

use serde_json::json;
use std::path::PathBuf;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idsync_core::lister::{ResourceLister, DEFAULT_PAGE_SIZE};
use idsync_core::reconcile;
use idsync_core::{provider_for, HttpTransport, ResourceType, SyncConfig, SyncError};

// =============================================================================
// Test Helpers
// =============================================================================

const APPS_PATH: &str = "/t/carbon.super/api/server/v1/applications";
const IDPS_PATH: &str = "/t/carbon.super/api/server/v1/identity-providers";

fn config_for(uri: &str, extra: &str) -> SyncConfig {
    SyncConfig::from_yaml(&format!("server:\n  base_url: {uri}\n{extra}")).unwrap()
}

fn three_apps() -> serde_json::Value {
    json!({
        "totalResults": 3,
        "applications": [
            {"id": "1", "name": "console"},
            {"id": "2", "name": "myaccount"},
            {"id": "3", "name": "pickup"}
        ]
    })
}

async fn mount_count(server: &MockServer, list_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(list_path))
        .and(query_param_is_missing("limit"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_list(server: &MockServer, list_path: &str, limit: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(list_path))
        .and(query_param("limit", limit.to_string()))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn list_apps(config: SyncConfig) -> Result<Vec<String>, SyncError> {
    tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config.server)?;
        ResourceLister::new(transport).get_deployed_names(ResourceType::Application)
    })
    .await
    .unwrap()
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_count_then_list() {
    let server = MockServer::start().await;

    mount_count(
        &server,
        APPS_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"totalResults": 3})),
    )
    .await;
    mount_list(
        &server,
        APPS_PATH,
        3,
        ResponseTemplate::new(200).set_body_json(three_apps()),
    )
    .await;

    let names = list_apps(config_for(&server.uri(), "")).await.unwrap();
    assert_eq!(names, vec!["console", "myaccount", "pickup"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_count_failure_uses_default_page_size() {
    let server = MockServer::start().await;

    mount_count(&server, APPS_PATH, ResponseTemplate::new(500)).await;
    mount_list(
        &server,
        APPS_PATH,
        DEFAULT_PAGE_SIZE,
        ResponseTemplate::new(200).set_body_json(three_apps()),
    )
    .await;

    let names = list_apps(config_for(&server.uri(), "")).await.unwrap();
    assert_eq!(names.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bearer_token_and_accept_header_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(APPS_PATH))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalResults": 0})))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server.uri(), "  token: secret-token\n");
    let names = list_apps(config).await.unwrap();
    assert!(names.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_status_error() {
    let server = MockServer::start().await;

    mount_count(
        &server,
        APPS_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"totalResults": 3})),
    )
    .await;
    mount_list(&server, APPS_PATH, 3, ResponseTemplate::new(401)).await;

    let err = list_apps(config_for(&server.uri(), "")).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error while retrieving application list. Status code: 401, Error: Unauthorized"
    );
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unrecognized_status_code() {
    let server = MockServer::start().await;

    mount_count(
        &server,
        APPS_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"totalResults": 1})),
    )
    .await;
    mount_list(&server, APPS_PATH, 1, ResponseTemplate::new(418)).await;

    let err = list_apps(config_for(&server.uri(), "")).await.unwrap_err();
    assert!(err.to_string().ends_with("Status code: 418, Error: Unrecognized status code"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undecodable_list_is_fatal() {
    let server = MockServer::start().await;

    mount_count(
        &server,
        APPS_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"totalResults": 2})),
    )
    .await;
    mount_list(
        &server,
        APPS_PATH,
        2,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let err = list_apps(config_for(&server.uri(), "")).await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.exit_code(), 6);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_server_is_network_error() {
    let err = list_apps(config_for("http://127.0.0.1:1", "  timeout_secs: 5\n"))
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

// =============================================================================
// Export Tests
// =============================================================================

const PICKUP_EXPORT: &str = "applicationName: pickup
inboundAuthenticationConfig:
  inboundAuthenticationRequestConfigs:
  - inboundAuthKey: pickup-client
    inboundAuthType: oauth2
    inboundConfigurationProtocol:
      oauthConsumerSecret: null
";

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_masked_files() {
    let server = MockServer::start().await;

    mount_count(
        &server,
        APPS_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"totalResults": 2})),
    )
    .await;
    mount_list(
        &server,
        APPS_PATH,
        2,
        ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 2,
            "applications": [
                {"id": "a1", "name": "pickup"},
                {"id": "a2", "name": "broken"}
            ]
        })),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{APPS_PATH}/a1/exportFile")))
        .and(header("accept", "application/yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PICKUP_EXPORT))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{APPS_PATH}/a2/exportFile")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let root: PathBuf = dir.path().to_path_buf();
    let config = config_for(&server.uri(), "");

    let report = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config.server)?;
        let identity = config.identity();
        let provider = provider_for(
            ResourceType::Application,
            transport,
            &config.keywords,
            &identity,
        );
        reconcile::export(&*provider, &root, false)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.exported, vec!["pickup"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "broken");

    let written = std::fs::read_to_string(dir.path().join("Applications/pickup.yaml")).unwrap();
    assert!(written.contains("oauthConsumerSecret: '********'"));
    assert!(!dir.path().join("Applications/broken.yaml").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_identity_providers_uses_export_endpoint() {
    let server = MockServer::start().await;

    mount_count(
        &server,
        IDPS_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"totalResults": 1})),
    )
    .await;
    mount_list(
        &server,
        IDPS_PATH,
        1,
        ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 1,
            "identityProviders": [{"id": "g1", "name": "Google"}]
        })),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{IDPS_PATH}/g1/export")))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("identityProviderName: Google\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let config = config_for(&server.uri(), "");

    let report = tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&config.server)?;
        let identity = config.identity();
        let provider = provider_for(
            ResourceType::IdentityProvider,
            transport,
            &config.keywords,
            &identity,
        );
        reconcile::export(&*provider, &root, false)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.exported, vec!["Google"]);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("IdentityProviders/Google.yaml")).unwrap(),
        "identityProviderName: Google\n"
    );
}

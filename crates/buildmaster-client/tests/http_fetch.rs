//! HTTP behaviour of the build-master client against a mock server.

use buildmaster_client::{BuildMasterClient, BuildMasterConfig, BuildMasterError};
use httpmock::prelude::*;
use std::time::Duration;

fn client_for(server: &MockServer) -> BuildMasterClient {
    let config = BuildMasterConfig::new(&server.base_url(), &server.url("/codereview.settings"))
        .with_timeout(Duration::from_secs(1));
    BuildMasterClient::new(config).expect("client")
}

#[tokio::test]
async fn fetch_builder_names_returns_listing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"["Linux_Trybot", "Mac_Trybot", "Linux"]"#);
        })
        .await;

    let names = client_for(&server).fetch_builder_names().await.unwrap();

    mock.assert_async().await;
    assert_eq!(names, vec!["Linux_Trybot", "Mac_Trybot", "Linux"]);
}

#[tokio::test]
async fn fetch_builder_names_maps_server_error_to_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(503);
        })
        .await;

    let err = client_for(&server).fetch_builder_names().await.unwrap_err();
    assert!(
        matches!(err, BuildMasterError::Status { status: 503, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn fetch_builder_names_rejects_malformed_json() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(200).body("not json at all");
        })
        .await;

    let err = client_for(&server).fetch_builder_names().await.unwrap_err();
    assert!(matches!(err, BuildMasterError::MalformedListing(_)));
}

#[tokio::test]
async fn fetch_builder_names_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(200)
                .body("[]")
                .delay(Duration::from_secs(3));
        })
        .await;

    let err = client_for(&server).fetch_builder_names().await.unwrap_err();
    assert!(
        matches!(err, BuildMasterError::Timeout { secs: 1, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn fetch_builder_names_reports_unreachable_host() {
    let config = BuildMasterConfig::new("http://127.0.0.1:9", "http://127.0.0.1:9/settings")
        .with_timeout(Duration::from_secs(1));
    let client = BuildMasterClient::new(config).unwrap();

    let err = client.fetch_builder_names().await.unwrap_err();
    assert!(matches!(
        err,
        BuildMasterError::Http { .. } | BuildMasterError::Timeout { .. }
    ));
}

#[tokio::test]
async fn fetch_settings_parses_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/codereview.settings");
            then.status(200).body(
                "CODE_REVIEW_SERVER: codereview.chromium.org\n\
                 TRYSERVER_SVN_URL: svn://svn.example.org/try/trunk\n",
            );
        })
        .await;

    let settings = client_for(&server).fetch_settings().await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        settings.get("TRYSERVER_SVN_URL"),
        Some("svn://svn.example.org/try/trunk")
    );
}

#[tokio::test]
async fn fetch_settings_maps_missing_resource_to_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/codereview.settings");
            then.status(404);
        })
        .await;

    let err = client_for(&server).fetch_settings().await.unwrap_err();
    assert!(matches!(err, BuildMasterError::Status { status: 404, .. }));
}

#[tokio::test]
async fn fetch_settings_tolerates_body_without_entries() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/codereview.settings");
            then.status(200).body("# no settings here\n");
        })
        .await;

    let settings = client_for(&server).fetch_settings().await.unwrap();
    assert!(settings.is_empty());
    assert_eq!(settings.get("TRYSERVER_SVN_URL"), None);
}

// SPDX-FileCopyrightText: 2026 Callconsole Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint-level tests for the call and admin adapters.

use std::time::Duration;

use callconsole_api::ApiClient;
use callconsole_config::ServerConfig;
use callconsole_core::{AdminApi, CallApi, CallId, CallStatus, ConsoleError, Credential};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    let config = ServerConfig {
        base_url: format!("{}/api/v1", server.uri()),
        ..ServerConfig::default()
    };
    ApiClient::new(&config)
        .unwrap()
        .with_retry_policy(0, Duration::from_millis(1))
        .with_credential(Credential::new("tok-1"))
}

#[tokio::test]
async fn fetch_calls_parses_server_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/calls"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [
                {
                    "id": 2,
                    "call_id": "c2",
                    "customer_number": "+15550102",
                    "timestamp": "2025-03-01T10:16:00Z",
                    "assigned_agent_id": "100200",
                    "status": "assigned",
                    "notes": "",
                    "created_at": "2025-03-01T10:16:01Z",
                    "updated_at": "2025-03-01T10:16:01Z"
                },
                {
                    "id": 1,
                    "call_id": "c1",
                    "customer_number": "+15550101",
                    "timestamp": "2025-03-01T10:15:00Z",
                    "assigned_agent_id": "100200",
                    "status": "completed",
                    "notes": "Call completed successfully",
                    "created_at": "2025-03-01T10:15:01Z",
                    "updated_at": "2025-03-01T10:20:00Z"
                }
            ]
        })))
        .mount(&server)
        .await;

    let calls = client(&server).await.fetch_calls().await.unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].call_id, CallId::from("c2"));
    assert_eq!(calls[1].status, CallStatus::Completed);
}

#[tokio::test]
async fn null_call_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/calls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true, "data": null})),
        )
        .mount(&server)
        .await;

    let calls = client(&server).await.fetch_calls().await.unwrap();
    assert!(calls.is_empty());
}

#[tokio::test]
async fn fetch_failure_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/calls"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "success": false,
            "message": "Failed to fetch calls",
            "error": "connection refused"
        })))
        .mount(&server)
        .await;

    let err = client(&server).await.fetch_calls().await.unwrap_err();
    match err {
        ConsoleError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to fetch calls: connection refused");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_call_posts_status_and_notes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/calls/c1/complete"))
        .and(body_json(serde_json::json!({
            "status": "completed",
            "notes": "Call completed successfully"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Call completed successfully",
            "data": {"call_id": "c1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .await
        .complete_call(&CallId::from("c1"), "Call completed successfully")
        .await
        .unwrap();
}

#[tokio::test]
async fn ids_cannot_escape_their_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/calls/a%2Fb%3Fq/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/agents/stats%23x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    api.complete_call(&CallId::from("a/b?q"), "n").await.unwrap();
    api.delete_agent("stats#x").await.unwrap();
}

#[tokio::test]
async fn success_false_on_200_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/calls/c9/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "call not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .complete_call(&CallId::from("c9"), "n")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("call not found"), "got: {err}");
}

#[tokio::test]
async fn agent_stats_and_provisioning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [
                {"agent_id": "100200", "agent_name": "Dana", "status": "active",
                 "total_calls": 5, "completed_calls": 3}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/agents"))
        .and(body_json(serde_json::json!({"agent_name": "Lee", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "success": true,
            "message": "Agent created successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/agents/100200"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "message": "Agent not found"
        })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let stats = api.agent_stats().await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].completed_calls, 3);

    api.create_agent("Lee", "secret1").await.unwrap();

    let err = api.delete_agent("100200").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Api { status: 404, ref message } if message == "Agent not found"));
}

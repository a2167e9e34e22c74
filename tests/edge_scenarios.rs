//! End-to-end edge scenarios against a stubbed backing service.
//!
//! Drives the real router in-process with `tower::ServiceExt::oneshot`
//! while `httpmock` plays the upstream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use user_relay::config::RelayConfig;
use user_relay::envelope::Envelope;
use user_relay::http::{build_router, AppState};
use user_relay::model::User;
use user_relay::relay::RelayClient;

fn router_for(base_url: &str) -> axum::Router {
    let mut config = RelayConfig::default();
    config.upstream.base_url = base_url.to_string();
    let relay = RelayClient::new(&config.upstream).unwrap();
    build_router(
        &config,
        AppState {
            relay: Arc::new(relay),
        },
    )
}

async fn send(router: axum::Router, method: &str, path: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn parsed(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn create_user_should_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/user")
                .json_body(json!({"id": null, "name": "test", "age": 18}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "success": true,
                    "code": 200,
                    "msg": "Success",
                    "data": {"id": 1, "name": "test", "age": 18}
                }));
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "POST", "/v1/user").await;
    mock.assert_async().await;

    assert_eq!(status, StatusCode::OK);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["code"], json!(200));
    assert_eq!(value["msg"], json!("Success"));
    assert_eq!(value["data"]["id"], json!(1));
    assert_eq!(value["data"]["name"], json!("test"));
    assert_eq!(value["data"]["age"], json!(18));
}

#[tokio::test]
async fn retrieve_user_should_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/user").query_param("id", "1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "success": true,
                    "code": 200,
                    "msg": "Success",
                    "data": {"id": 1, "name": "test", "age": 18}
                }));
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "GET", "/v1/user").await;

    assert_eq!(status, StatusCode::OK);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["data"]["name"], json!("test"));
    assert_eq!(value["data"]["age"], json!(18));
}

#[tokio::test]
async fn update_user_should_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/user")
                .json_body(json!({"id": 1, "name": null, "age": null}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "success": true,
                    "code": 200,
                    "msg": "Success",
                    "data": {"id": 1, "name": "updated", "age": null}
                }));
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "PUT", "/v1/user").await;

    assert_eq!(status, StatusCode::OK);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["data"]["id"], json!(1));
    assert_eq!(value["data"]["name"], json!("updated"));
}

#[tokio::test]
async fn delete_user_should_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/user").query_param("id", "1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "success": true,
                    "code": 200,
                    "msg": "Success",
                    "data": null
                }));
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "DELETE", "/v1/user").await;

    assert_eq!(status, StatusCode::OK);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["code"], json!(200));
    assert_eq!(value["msg"], json!("Success"));
    assert!(value.get("data").is_none());
}

#[tokio::test]
async fn extract_users_should_success() {
    let server = MockServer::start_async().await;
    let mut upstream_body = String::new();
    let mut expected_users = Vec::new();
    for i in 1..=18i64 {
        let user = User {
            id: Some(i),
            name: Some(format!("test{i}")),
            age: Some(i as i32),
        };
        upstream_body.push_str(&serde_json::to_string(&user).unwrap());
        upstream_body.push('\n');
        expected_users.push(user);
    }
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/users");
            then.status(200)
                .header("content-type", "application/json")
                .body(upstream_body);
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "GET", "/v1/users").await;

    assert_eq!(status, StatusCode::OK);
    // The edge re-buffers the NDJSON stream into one JSON document.
    assert_eq!(
        body,
        serde_json::to_string(&Envelope::success(expected_users)).unwrap()
    );
}

#[tokio::test]
async fn create_user_should_fail_with_exact_message_on_upstream_500() {
    let server = MockServer::start_async().await;
    let upstream_body =
        r#"{"success":false,"code":500,"msg":"Internal Server Error","data":null}"#;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/user");
            then.status(500)
                .header("content-type", "application/json")
                .body(upstream_body);
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "POST", "/v1/user").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["code"], json!(500));
    assert_eq!(
        value["msg"],
        json!(format!(
            "[500 Server Error] during [POST] to [{base}/user] [create]: [{upstream_body}]"
        ))
    );
    assert!(value.get("data").is_none());
}

#[tokio::test]
async fn create_user_should_fail_when_upstream_unreachable() {
    // Bind then drop a listener so the port is closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{port}/v1");
    let (status, body) = send(router_for(&base), "POST", "/v1/user").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["code"], json!(500));
    let msg = value["msg"].as_str().unwrap();
    assert!(msg.starts_with(&format!(
        "[500 Server Error] during [POST] to [{base}/user] [create]: ["
    )));
    assert!(msg.ends_with(']'));
    assert!(value.get("data").is_none());
}

#[tokio::test]
async fn extract_users_should_fail_on_type_mismatched_line() {
    let server = MockServer::start_async().await;
    let upstream_body = "{\"id\":1,\"name\":\"test1\",\"age\":1}\n\
                         {\"id\":2,\"name\":\"test2\",\"age\":2}\n\
                         {\"id\":3,\"name\":\"test3\",\"age\":\"three\"}\n";
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/users");
            then.status(200)
                .header("content-type", "application/json")
                .body(upstream_body);
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "GET", "/v1/users").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["code"], json!(500));
    let msg = value["msg"].as_str().unwrap();
    assert!(msg.contains("line 3"));
    assert!(value.get("data").is_none());
}

#[tokio::test]
async fn extract_users_should_fail_on_upstream_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/users");
            then.status(503)
                .header("content-type", "text/plain")
                .body("maintenance");
        })
        .await;

    let base = format!("{}/v1", server.base_url());
    let (status, body) = send(router_for(&base), "GET", "/v1/users").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let value = parsed(&body);
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["code"], json!(503));
    assert_eq!(
        value["msg"],
        json!(format!(
            "[503 Service Unavailable] during [GET] to [{base}/users] [extract]: [maintenance]"
        ))
    );
}

//! HTTP API tests
//!
//! Drives the router directly with in-memory request bodies; no socket is
//! bound.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use wedding_rsvp::{HttpServer, MemoryStore, RsvpService, ServiceConfig};

const PASSWORD: &str = "http-secret";

fn create_server() -> HttpServer {
    let service = RsvpService::new(ServiceConfig::new(PASSWORD), Arc::new(MemoryStore::new()));
    HttpServer::new(Arc::new(service), "127.0.0.1:0".parse().unwrap())
}

fn remote() -> SocketAddr {
    "192.0.2.10:40000".parse().unwrap()
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Full<Bytes>> {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

async fn send(server: &HttpServer, req: Request<Full<Bytes>>) -> (StatusCode, Value) {
    let response: Response<Full<Bytes>> = server.handle_request(req, remote()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rsvp(names: &str) -> Value {
    json!({
        "names": names,
        "phone": "555-123-4567",
        "attending": "yes",
        "guests": 2,
    })
}

#[tokio::test]
async fn test_health() {
    let server = create_server();
    let (status, body) = send(&server, request(Method::GET, "/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    assert!(body["uptime"].is_number());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_submit_and_list() {
    let server = create_server();

    let (status, body) = send(&server, request(Method::POST, "/api/rsvp", Some(rsvp("John Smith")))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Thank you for your RSVP! We can't wait to celebrate with you!");
    let id = body["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin?password={PASSWORD}");
    let (status, body) = send(&server, request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["attending"], 1);
    assert_eq!(body["notAttending"], 0);
    assert_eq!(body["totalGuests"], 2);
    assert_eq!(body["rsvps"][0]["id"], id.as_str());
    assert_eq!(body["rsvps"][0]["ipAddress"], "192.0.2.10");
}

#[tokio::test]
async fn test_declining_message() {
    let server = create_server();
    let sub = json!({ "names": "Jane Doe", "phone": "5551234567", "attending": "no" });
    let (status, body) = send(&server, request(Method::POST, "/api/rsvp", Some(sub))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Thank you for letting us know. We'll miss you on our special day!");
}

#[tokio::test]
async fn test_guest_count_as_string() {
    let server = create_server();
    let sub = json!({ "names": "Jane Doe", "phone": "5551234567", "attending": "yes", "guests": "3" });
    let (status, _) = send(&server, request(Method::POST, "/api/rsvp", Some(sub))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_rejection_statuses() {
    let server = create_server();

    let missing = json!({ "names": "John Smith", "attending": "yes" });
    let (status, body) = send(&server, request(Method::POST, "/api/rsvp", Some(missing))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Names, phone number, and attendance status are required.");

    let too_many = json!({ "names": "A B", "phone": "5551234567", "attending": "yes", "guests": 9 });
    let (status, _) = send(&server, request(Method::POST, "/api/rsvp", Some(too_many))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_phone = json!({ "names": "A B", "phone": "12345", "attending": "yes", "guests": 1 });
    let (status, body) = send(&server, request(Method::POST, "/api/rsvp", Some(bad_phone))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide a valid phone number.");

    send(&server, request(Method::POST, "/api/rsvp", Some(rsvp("John Smith")))).await;
    let (status, _) = send(&server, request(Method::POST, "/api/rsvp", Some(rsvp("john smith")))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_body() {
    let server = create_server();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/rsvp")
        .body(Full::new(Bytes::from("{not json")))
        .unwrap();
    let (status, body) = send(&server, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_oversized_body() {
    let service = RsvpService::new(ServiceConfig::new(PASSWORD), Arc::new(MemoryStore::new()));
    let server = HttpServer::new(Arc::new(service), "127.0.0.1:0".parse().unwrap())
        .with_max_body_bytes(64);
    let big = json!({ "names": "x".repeat(200), "phone": "5551234567", "attending": "no" });
    let (status, _) = send(&server, request(Method::POST, "/api/rsvp", Some(big))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_admin_requires_password() {
    let server = create_server();

    let (status, body) = send(&server, request(Method::GET, "/api/admin", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(&server, request(Method::GET, "/api/admin?password=wrong", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &server,
        request(Method::POST, "/api/admin/guests", Some(json!({ "name": "X" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/admin/guests")
        .header("X-Admin-Password", PASSWORD)
        .body(Full::new(Bytes::new()))
        .unwrap();
    let (status, body) = send(&server, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_guest_list_management() {
    let server = create_server();
    let q = format!("?password={PASSWORD}");

    let (status, body) = send(
        &server,
        request(
            Method::POST,
            &format!("/api/admin/guests{q}"),
            Some(json!({ "name": "John Smith" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guest"], "John Smith");
    assert_eq!(body["total"], 1);

    let (status, _) = send(
        &server,
        request(
            Method::POST,
            &format!("/api/admin/guests{q}"),
            Some(json!({ "name": "JOHN SMITH" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &server,
        request(Method::POST, &format!("/api/admin/guests{q}"), Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the list now gates submissions
    let (status, _) = send(&server, request(Method::POST, "/api/rsvp", Some(rsvp("Someone Else")))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &server,
        request(Method::DELETE, &format!("/api/admin/guests/john%20smith{q}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedGuest"], "John Smith");
    assert_eq!(body["total"], 0);

    let (status, _) = send(
        &server,
        request(Method::DELETE, &format!("/api/admin/guests/john%20smith{q}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_rsvp() {
    let server = create_server();
    let (_, body) = send(&server, request(Method::POST, "/api/rsvp", Some(rsvp("John Smith")))).await;
    let id = body["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/rsvp/{id}?password={PASSWORD}");
    let (status, body) = send(&server, request(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deletedRsvp"]["id"], id.as_str());
    assert_eq!(body["deletedRsvp"]["names"], "John Smith");

    let (status, _) = send(&server, request(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_routes_and_preflight() {
    let server = create_server();

    let (status, body) = send(&server, request(Method::GET, "/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "API endpoint not found");

    let response = server
        .handle_request(request(Method::OPTIONS, "/api/rsvp", None), remote())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

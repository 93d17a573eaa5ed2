//! Drives the router over a real socket with hand-written HTTP/1.1 requests.

use std::net::SocketAddr;

use kanban::store::JsonFileStore;
use kanban_web::{router, AppState, HEALTH_TEXT};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn serve(store: JsonFileStore) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::new(store)))
            .await
            .unwrap();
    });
    addr
}

/// Send one request and return (status code, headers, body).
async fn request(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let body = body.unwrap_or("");
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nOrigin: http://example.test\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    (status, head.to_ascii_lowercase(), body.to_string())
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");
    let addr = serve(JsonFileStore::open(&db).unwrap()).await;

    let (status, _, body) = request(addr, "GET", "/", None).await;
    assert_eq!(status, 200);
    assert_eq!(body, HEALTH_TEXT);

    let (status, _, body) = request(
        addr,
        "POST",
        "/tasks",
        Some(r#"{"title":"Write docs","status":"todo","storyPoints":2}"#),
    )
    .await;
    assert_eq!(status, 200);
    let created: Value = serde_json::from_str(&body).unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _, body) = request(
        addr,
        "PATCH",
        &format!("/tasks/{id}"),
        Some(r#"{"status":"review"}"#),
    )
    .await;
    assert_eq!(status, 200);
    let merged: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(merged["status"], "review");
    assert_eq!(merged["title"], "Write docs");

    // The file on disk matches what the API reports.
    let on_disk: Value = serde_json::from_slice(&std::fs::read(&db).unwrap()).unwrap();
    assert_eq!(on_disk["tasks"][0], merged);

    let (status, _, body) = request(addr, "PATCH", "/tasks/missing", Some("{}")).await;
    assert_eq!(status, 404);
    assert!(body.is_empty());

    let (status, _, _) = request(addr, "DELETE", &format!("/tasks/{id}"), None).await;
    assert_eq!(status, 204);

    let (status, _, body) = request(addr, "GET", "/tasks", None).await;
    assert_eq!(status, 200);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn malformed_and_non_object_bodies_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let addr = serve(JsonFileStore::open(dir.path().join("db.json")).unwrap()).await;

    let (status, _, _) = request(addr, "POST", "/tasks", Some("[1,2]")).await;
    assert_eq!(status, 400);

    let (status, _, _) = request(addr, "POST", "/tasks", Some("{not json")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn responses_allow_any_origin() {
    let dir = tempfile::tempdir().unwrap();
    let addr = serve(JsonFileStore::open(dir.path().join("db.json")).unwrap()).await;

    let (_, head, _) = request(addr, "GET", "/tasks", None).await;
    assert!(head.contains("access-control-allow-origin: *"), "{head}");
}

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use todo_core::{MemoryCollection, TaskGateway};
use todo_web::{create_router, state::AppState};
use tower::ServiceExt;

fn app() -> (Router, AppState) {
    let state = AppState::new(TaskGateway::new(Arc::new(MemoryCollection::new())));
    (create_router(state.clone(), Some("http://todo.example")), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, title: &str, description: &str) -> String {
    let (status, body) = send(
        app,
        "PUT",
        "/create",
        Some(json!({ "title": title, "description": description })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task Created");
    body["id"].as_str().unwrap().to_string()
}

/// Read the next SSE data frame, skipping keep-alive comments.
async fn next_frame<S>(body: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Bytes, axum::Error>> + Unpin,
{
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        if let Some(data) = text.strip_prefix("data: ") {
            assert!(data.ends_with("\n\n"), "frame not terminated: {text:?}");
            return serde_json::from_str(data.trim_end()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_index() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "crappy_todo_app api" }));
}

#[tokio::test]
async fn test_create_and_list() {
    let (app, _) = app();
    let id = create(&app, "Buy milk", "2%").await;

    let (status, body) = send(&app, "GET", "/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "tasks": [{ "_id": id, "title": "Buy milk", "description": "2%", "completed": false }] })
    );
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        "PUT",
        "/create",
        Some(json!({ "title": "", "description": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_update_toggles_completed() {
    let (app, _) = app();
    let id = create(&app, "Buy milk", "2%").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/update/{id}"),
        Some(json!({ "updatedValues": { "completed": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedValues"], json!({ "completed": true }));

    let (_, body) = send(&app, "GET", "/tasks", None).await;
    let task = &body["tasks"][0];
    assert_eq!(task["completed"], true);
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["description"], "2%");
}

#[tokio::test]
async fn test_update_unknown_id() {
    let (app, _) = app();
    let (status, _) = send(
        &app,
        "POST",
        "/update/missing",
        Some(json!({ "updatedValues": { "completed": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice() {
    let (app, _) = app();
    let id = create(&app, "a", "b").await;

    let (status, _) = send(&app, "DELETE", &format!("/delete/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "DELETE", &format!("/delete/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_stream_receives_snapshot_then_change() {
    let (app, state) = app();
    let existing = create(&app, "first", "one").await;

    let response = app
        .clone()
        .oneshot(Request::get("/tasksSub").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let mut body = response.into_body().into_data_stream();

    let first = next_frame(&mut body).await;
    assert_eq!(first["tasks"][0]["_id"], existing.as_str());
    assert_eq!(state.notifier.subscriber_count(), 1);

    let id = create(&app, "second", "two").await;
    let frame = next_frame(&mut body).await;
    let tasks = frame["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1]["_id"], id.as_str());

    drop(body);
    assert_eq!(state.notifier.subscriber_count(), 0);
}

#[tokio::test]
async fn test_two_streams_each_get_one_frame() {
    let (app, state) = app();
    let mut streams = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(Request::get("/tasksSub").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        assert_eq!(next_frame(&mut body).await, json!({ "tasks": [] }));
        streams.push(body);
    }

    let id = state.tasks.create("Buy milk", "2%").await.unwrap();
    let (status, _) = send(&app, "POST", "/internal/notify", None).await;
    assert_eq!(status, StatusCode::OK);

    for body in &mut streams {
        let frame = next_frame(body).await;
        assert_eq!(frame["tasks"][0]["_id"], id.as_str());
    }
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::get("/tasks")
                .header(header::ORIGIN, "http://todo.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://todo.example"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

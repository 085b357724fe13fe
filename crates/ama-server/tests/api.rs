//! Drive the router in-process with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use ama::store::MemoryStore;
use ama::{Ama, AmaConfig};
use ama_server::{error::NOT_FOUND_MESSAGE, router};

fn app() -> Router {
    router(Ama::new(MemoryStore::new(), AmaConfig::default()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), &[]).await
}

async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body), &[]).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, &[]).await
}

async fn vote(app: &Router, question_id: &str, ask: &str, ip: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/votes",
        Some(json!({ "questionId": question_id, "askToken": ask })),
        &[("x-forwarded-for", ip)],
    )
    .await
}

/// Create and publish a session; returns the creation response.
async fn published_session(app: &Router) -> Value {
    let (status, created) = post(app, "/api/ama", json!({ "title": "Topic A" })).await;
    assert_eq!(status, StatusCode::OK);
    let host = created["hostToken"].as_str().unwrap();
    let (status, _) = put(app, &format!("/api/ama/{host}"), json!({ "action": "publish" })).await;
    assert_eq!(status, StatusCode::OK);
    created
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_session_returns_all_tokens() {
    let app = app();
    let (status, body) = post(&app, "/api/ama", json!({ "title": " Topic ", "description": "" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Topic");
    assert!(body["description"].is_null());
    assert_eq!(body["isPublished"], false);
    for key in ["hostToken", "askToken", "answerToken", "digestToken"] {
        assert_eq!(body[key].as_str().unwrap().len(), 43, "{key}");
    }
}

#[tokio::test]
async fn test_create_session_without_title() {
    let (status, body) = post(&app(), "/api/ama", json!({ "title": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ama")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_flow() {
    let app = app();
    let created = published_session(&app).await;
    let host = created["hostToken"].as_str().unwrap();
    let ask = created["askToken"].as_str().unwrap();
    let answer = created["answerToken"].as_str().unwrap();
    let digest = created["digestToken"].as_str().unwrap();

    let (status, question) = post(
        &app,
        "/api/questions",
        json!({ "text": "Why X?", "askToken": ask }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(question["voteCount"], 0);
    assert_eq!(question["isHidden"], false);
    let qid = question["id"].as_str().unwrap();

    let (status, receipt) = vote(&app, qid, ask, "1.2.3.4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["voteCount"], 1);
    assert_eq!(receipt["hasVoted"], true);

    let (status, _) = vote(&app, qid, ask, "1.2.3.4, 10.0.0.1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, voted) = send(
        &app,
        Method::GET,
        &format!("/api/questions/{qid}/votes?askToken={ask}"),
        None,
        &[("x-real-ip", "1.2.3.4")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voted["hasVoted"], true);

    let draft = json!({
        "questionId": qid,
        "answerToken": answer,
        "core": " c ",
        "steps": "s",
        "limits": "l",
    });
    let (status, stored) = post(&app, "/api/answers", draft.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["core"], "c");
    let (status, _) = post(&app, "/api/answers", draft).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, hidden) = put(
        &app,
        &format!("/api/questions/{qid}/hide"),
        json!({ "hostToken": host, "isHidden": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hidden["isHidden"], true);

    let (_, ask_list) = get(&app, &format!("/api/ama/{ask}/questions")).await;
    assert_eq!(ask_list.as_array().unwrap().len(), 0);

    let (_, host_list) = get(&app, &format!("/api/ama/{host}/questions")).await;
    assert_eq!(host_list[0]["answer"]["core"], "c");

    let (status, digest_view) = get(&app, &format!("/api/ama/{digest}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(digest_view["permissions"]["isDigest"], true);
    assert!(digest_view.get("tokens").is_none());

    let (_, host_view) = get(&app, &format!("/api/ama/{host}")).await;
    assert_eq!(host_view["tokens"]["askToken"], ask);
    assert_eq!(host_view["questions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_token_is_indistinguishable_from_missing() {
    let app = app();
    let created = published_session(&app).await;
    let ask = created["askToken"].as_str().unwrap();

    let missing = put(&app, "/api/ama/nope", json!({ "action": "publish" })).await;
    let wrong_role = put(&app, &format!("/api/ama/{ask}"), json!({ "action": "publish" })).await;

    assert_eq!(missing.0, StatusCode::NOT_FOUND);
    assert_eq!(missing, wrong_role);
    assert_eq!(missing.1["error"], NOT_FOUND_MESSAGE);

    let (status, body) = get(&app, "/api/ama/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn test_update_only_before_publish() {
    let app = app();
    let (_, created) = post(&app, "/api/ama", json!({ "title": "Draft" })).await;
    let host = created["hostToken"].as_str().unwrap();
    let uri = format!("/api/ama/{host}");

    let (status, body) = put(&app, &uri, json!({ "action": "update", "title": "Renamed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");

    put(&app, &uri, json!({ "action": "publish" })).await;
    let (status, _) = put(&app, &uri, json!({ "action": "update", "title": "Again" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = put(&app, &uri, json!({ "action": "publish" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_question_before_publish_is_rejected() {
    let app = app();
    let (_, created) = post(&app, "/api/ama", json!({ "title": "Draft" })).await;
    let ask = created["askToken"].as_str().unwrap();

    let (status, _) = post(
        &app,
        "/api/questions",
        json!({ "text": "Why?", "askToken": ask }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_on_unknown_question() {
    let app = app();
    let created = published_session(&app).await;
    let ask = created["askToken"].as_str().unwrap();

    let (status, _) = vote(&app, "not-an-id", ask, "1.2.3.4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = vote(&app, &"0".repeat(32), ask, "1.2.3.4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = get(&app(), "/api/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], NOT_FOUND_MESSAGE);
}

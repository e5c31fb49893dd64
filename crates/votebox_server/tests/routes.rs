use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN,
};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;
use votebox_core::{AdminSecret, Identity};
use votebox_server::state::AppState;
use votebox_server::{bootstrap_storage, build_router};

const SECRET: &str = "s3cret";
const ORIGIN_OK: &str = "http://localhost:5173";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

fn app_for(db_path: impl Into<std::path::PathBuf>, dir: TempDir) -> TestApp {
    let state = AppState::new(db_path, AdminSecret::new(SECRET));
    TestApp {
        router: build_router(state, &[ORIGIN_OK.to_string()]),
        _dir: dir,
    }
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("votebox.db");
    let seed_path = dir.path().join("data.json");
    std::fs::write(
        &seed_path,
        r#"{"projects":[
            {"id":1,"name":"Solar oven","description":"Cooks with sunlight","image":"oven.png","votes":0},
            {"id":2,"name":"Water filter","description":"Sand and charcoal","image":null,"votes":0}
        ]}"#,
    )
    .unwrap();
    bootstrap_storage(&db_path, Some(Path::new(&seed_path))).unwrap();

    app_for(db_path, dir)
}

async fn send(app: &TestApp, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

async fn vote(app: &TestApp, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/vote", &body.to_string()).await
}

#[tokio::test]
async fn projects_lists_seeded_catalog() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/projects", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id":1,"name":"Solar oven","description":"Cooks with sunlight","image":"oven.png","votes":0},
            {"id":2,"name":"Water filter","description":"Sand and charcoal","image":null,"votes":0}
        ])
    );
}

#[tokio::test]
async fn vote_returns_updated_project() {
    let app = test_app();
    let (status, body) = vote(&app, json!({"id": 1, "email": "a@b.com"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["project"]["id"], json!(1));
    assert_eq!(body["project"]["votes"], json!(1));
}

#[tokio::test]
async fn duplicate_votes_are_forbidden_case_insensitively() {
    let app = test_app();
    vote(&app, json!({"id": 1, "email": "a@b.com"})).await;

    let (status, body) = vote(&app, json!({"id": 1, "email": "A@B.COM"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (_, projects) = send(&app, Method::GET, "/projects", "").await;
    assert_eq!(projects[0]["votes"], json!(1));
}

#[tokio::test]
async fn vote_status_codes_follow_error_taxonomy() {
    let app = test_app();

    let cases = [
        (json!({"id": 99, "email": "a@b.com"}), StatusCode::NOT_FOUND),
        (json!({"id": 1, "email": "not-an-email"}), StatusCode::BAD_REQUEST),
        (json!({"id": 1}), StatusCode::BAD_REQUEST),
        (json!({"id": "1", "email": "a@b.com"}), StatusCode::BAD_REQUEST),
        (json!({"email": "a@b.com"}), StatusCode::BAD_REQUEST),
    ];
    for (body, expected) in cases {
        let (status, response) = vote(&app, body.clone()).await;
        assert_eq!(status, expected, "{body}");
        assert!(response["error"].is_string(), "{body}");
    }

    let (status, _) = send(&app, Method::POST, "/vote", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_requires_secret_and_reopens_voting() {
    let app = test_app();
    vote(&app, json!({"id": 1, "email": "a@b.com"})).await;

    let (status, _) = send(&app, Method::POST, "/reset", r#"{"secret":"wrong"}"#).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::POST, "/reset", "{}").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::POST, "/reset", r#"{"secret":"s3cret"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, projects) = send(&app, Method::GET, "/projects", "").await;
    assert_eq!(projects[0]["votes"], json!(0));

    let (status, body) = vote(&app, json!({"id": 1, "email": "a@b.com"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["votes"], json!(1));
}

#[tokio::test]
async fn api_prefix_serves_same_routes() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/vote",
        &json!({"id": 2, "email": "x@y.io"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["votes"], json!(1));

    let (status, projects) = send(&app, Method::GET, "/api/projects", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects[1]["votes"], json!(1));
}

#[tokio::test]
async fn cors_preflight_allows_only_configured_origins() {
    let app = test_app();

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/vote")
            .header(ORIGIN, origin)
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app.router.clone().oneshot(preflight(ORIGIN_OK)).await.unwrap();
    assert_eq!(
        allowed
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(ORIGIN_OK)
    );

    let denied = app
        .router
        .clone()
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();
    assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn invalid_identity_is_rejected_without_storage() {
    let dir = tempfile::tempdir().unwrap();
    let unreachable = dir.path().join("missing").join("votebox.db");
    let app = app_for(unreachable, dir);

    for body in [
        json!({"id": 1, "email": "not-an-email"}),
        json!({"id": 1, "email": ""}),
        json!({"id": 1}),
    ] {
        let (status, response) = vote(&app, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response["error"].is_string(), "{body}");
    }

    let (status, _) = vote(&app, json!({"id": 1, "email": "a@b.com"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn reset_with_unreadable_body_is_forbidden() {
    let app = test_app();
    vote(&app, json!({"id": 1, "email": "a@b.com"})).await;

    for body in ["{not json", "", r#"{"secret":42}"#] {
        let (status, response) = send(&app, Method::POST, "/reset", body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
        assert!(response["error"].is_string());
    }

    let (_, projects) = send(&app, Method::GET, "/projects", "").await;
    assert_eq!(projects[0]["votes"], json!(1));
}

#[tokio::test]
async fn reset_storage_failure_answers_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("votebox.db");
    bootstrap_storage(&db_path, None).unwrap();
    rusqlite::Connection::open(&db_path)
        .unwrap()
        .execute_batch("DROP TABLE vote_records;")
        .unwrap();
    let app = app_for(db_path, dir);

    let (status, body) = send(&app, Method::POST, "/reset", r#"{"secret":"s3cret"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal storage error"}));
}

#[tokio::test]
async fn vote_reports_the_tally_it_produced() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("votebox.db");
    let seed_path = dir.path().join("data.json");
    std::fs::write(&seed_path, r#"{"projects":[{"id":7,"name":"Kite"}]}"#).unwrap();
    bootstrap_storage(&db_path, Some(seed_path.as_path())).unwrap();
    let state = AppState::new(&db_path, AdminSecret::new(SECRET));

    let first = Identity::parse("a@b.com").unwrap();
    let (receipt, entry) = state.cast_vote(7, &first).unwrap();
    assert_eq!(receipt.new_vote_count, 1);
    assert_eq!(entry.unwrap().votes, 1);

    let second = Identity::parse("c@d.org").unwrap();
    let (receipt, entry) = state.cast_vote(7, &second).unwrap();
    assert_eq!(receipt.new_vote_count, 2);
    assert_eq!(entry.unwrap().votes, receipt.new_vote_count);
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_root() {
    let store = common::create_store().await;
    let app = common::create_test_app(&store);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_live() {
    let store = common::create_store().await;
    let app = common::create_test_app(&store);

    let response = app.oneshot(get("/health/live", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_unauthorized_without_user_header() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .oneshot(get("/api/vocabulary/session", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_vocabulary_session_with_defaults() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .oneshot(get("/api/vocabulary/session?locale=ru", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let words = body["data"]["words"].as_array().unwrap();
    assert_eq!(words.len(), kotoba_review::seed::word_count());
    assert_eq!(body["data"]["total"], words.len());
    assert!(words.iter().all(|w| w["due"] == false));
}

#[tokio::test]
async fn test_invalid_locale_is_validation_error() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .oneshot(get("/api/vocabulary/session?locale=jp", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_vocabulary_results_and_word_lookup() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/vocabulary/results",
            "u1",
            json!({ "results": [{ "id": 1, "period": 3 }, { "wordId": 2, "difficulty": "easy" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["periodDays"], 3);
    assert_eq!(body["data"][1]["periodDays"], 14);

    let response = app
        .clone()
        .oneshot(get("/api/vocabulary/words/1?locale=de", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["translation"], "Wasser");

    let response = app
        .oneshot(get("/api/vocabulary/words/999", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_kana_test_results_and_history_flow() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .clone()
        .oneshot(get("/api/kana/test?script=hiragana&skill=reading&count=5", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let items = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(items.len(), 5);

    let results: Vec<Value> = items
        .iter()
        .map(|item| json!({ "id": item["characterId"], "passed": true }))
        .collect();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/kana/results",
            "u1",
            json!({ "script": "hiragana", "skill": "reading", "results": results }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["askForRepeat"], false);
    assert_eq!(body["data"]["repeatFlag"], "in question");
    assert_eq!(body["data"]["updated"].as_array().unwrap().len(), 5);

    let response = app
        .oneshot(get("/api/kana/history", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(history.len(), 5);
    assert!(history.iter().all(|h| h["hiraganaReading"].as_f64().unwrap() > 0.0));
}

#[tokio::test]
async fn test_kana_test_requires_script_and_skill() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .clone()
        .oneshot(get("/api/kana/test?skill=reading", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/kana/test?script=hiragana&skill=speaking", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_character_lookup() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);

    let response = app
        .clone()
        .oneshot(get("/api/kana/characters/12?locale=ru", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["hiragana"], "し");
    assert_eq!(body["data"]["reading"], "си");

    let response = app
        .oneshot(get("/api/kana/characters/500", Some("u1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_maintenance_requires_token() {
    let store = common::create_seeded_store().await;
    let app = common::create_test_app(&store);
    let uri = "/api/maintenance/users/u1/drop-marks";

    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("x-maintenance-token", common::MAINTENANCE_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["userId"], "u1");
    assert_eq!(body["data"]["recordsDecayed"], 0);
}

#[tokio::test]
async fn test_maintenance_disabled_without_configured_token() {
    let store = common::create_store().await;
    let state = kotoba_review::state::AppState::new(
        std::sync::Arc::clone(&store.proxy),
        kotoba_review::services::test_results::IngestionPolicy::default(),
    );
    let app = kotoba_review::create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/maintenance/users/u1/drop-marks")
                .header("x-maintenance-token", "anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_route_returns_not_found() {
    let store = common::create_store().await;
    let app = common::create_test_app(&store);

    let response = app.oneshot(get("/api/nope", Some("u1"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

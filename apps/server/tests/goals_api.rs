use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use novanest_server::{
    api::app_router, build_state, config::Config, scope::USER_ID_HEADER, AppState,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tokio_stream::StreamExt;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _tmp: TempDir,
}

async fn build_test_app() -> TestApp {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(10),
        timezone: chrono_tz::UTC,
    };
    let state = build_state(&config).await.unwrap();
    TestApp {
        router: app_router(state.clone(), &config),
        state,
        _tmp: tmp,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn open_stream(&self, uri: &str, user: &str) -> axum::response::Response {
        let request = Request::builder()
            .uri(uri)
            .header(USER_ID_HEADER, user)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = build_test_app().await;
    let (status, _) = app.call(Method::GET, "/api/v1/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, "/api/v1/readyz", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_caller_is_unauthorized() {
    let app = build_test_app().await;
    let (status, body) = app
        .call(Method::GET, "/api/v1/achievify/goals", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) = app
        .call(Method::GET, "/api/v1/achievify/goals", Some("   "), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn personal_goal_lifecycle() {
    let app = build_test_app().await;
    let mut events = app.state.event_bus.subscribe();

    let (status, goal) = app
        .call(
            Method::POST,
            "/api/v1/achievify/goals",
            Some("alice"),
            Some(json!({
                "title": "Learn Spanish",
                "category": "learning",
                "milestones": [{ "title": "A1", "xpReward": 20 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["status"], "active");
    assert_eq!(goal["totalXp"], 0);
    assert_eq!(goal["scope"]["kind"], "user");
    assert_eq!(events.try_recv().unwrap().name, "goal:created");

    let goal_id = goal["id"].as_str().unwrap().to_string();
    let milestone_id = goal["milestones"][0]["id"].as_str().unwrap().to_string();
    let base = format!("/api/v1/achievify/goals/{}", goal_id);

    let (status, goal) = app
        .call(
            Method::POST,
            &format!("{}/logs", base),
            Some("alice"),
            Some(json!({ "content": "First lesson", "mood": "good" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["totalXp"], 5);
    assert_eq!(goal["streakDays"], 1);
    assert_eq!(goal["logs"][0]["userId"], "alice");

    let (status, goal) = app
        .call(
            Method::POST,
            &format!("{}/milestones/{}/complete", base, milestone_id),
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["totalXp"], 25);

    let (status, goal) = app
        .call(Method::POST, &format!("{}/complete", base), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["status"], "completed");
    assert_eq!(goal["totalXp"], 75);

    let (status, goal) = app
        .call(Method::POST, &format!("{}/reopen", base), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["status"], "active");
    assert_eq!(goal["totalXp"], 25);

    let (status, stats) = app
        .call(Method::GET, "/api/v1/achievify/stats", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalGoals"], 1);
    assert_eq!(stats["totalXp"], 25);

    let (status, _) = app.call(Method::DELETE, &base, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.call(Method::GET, &base, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let app = build_test_app().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/achievify/goals",
            Some("alice"),
            Some(json!({ "title": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (_, goal) = app
        .call(
            Method::POST,
            "/api/v1/achievify/goals",
            Some("alice"),
            Some(json!({ "title": "Meditate" })),
        )
        .await;
    let base = format!("/api/v1/achievify/goals/{}", goal["id"].as_str().unwrap());

    let (status, _) = app
        .call(
            Method::POST,
            &format!("{}/logs", base),
            Some("alice"),
            Some(json!({ "content": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::PUT,
            &base,
            Some("alice"),
            Some(json!({ "status": "abandoned" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::PUT,
            &base,
            Some("alice"),
            Some(json!({ "status": "active" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    // Another user cannot see the goal
    let (status, _) = app.call(Method::GET, &base, Some("mallory"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn team_goals_are_shared_and_earn_no_bonus() {
    let app = build_test_app().await;
    let team_base = "/api/v1/teamsync/teams/t-42/goals";

    let (status, goal) = app
        .call(
            Method::POST,
            team_base,
            Some("alice"),
            Some(json!({
                "title": "Launch beta",
                "category": "development",
                "priority": "urgent",
                "assignees": ["bob"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["createdBy"], "alice");
    assert_eq!(goal["scope"]["kind"], "team");
    let goal_url = format!("{}/{}", team_base, goal["id"].as_str().unwrap());

    let (status, goal) = app
        .call(
            Method::POST,
            &format!("{}/logs", goal_url),
            Some("bob"),
            Some(json!({ "content": "Wrote the changelog", "xpEarned": 12 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["totalXp"], 12);

    let (status, goal) = app
        .call(Method::POST, &format!("{}/complete", goal_url), Some("bob"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["totalXp"], 12);

    let (status, analytics) = app
        .call(
            Method::GET,
            "/api/v1/teamsync/teams/t-42/analytics",
            Some("carol"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["completedGoals"], 1);
    assert_eq!(analytics["recentActivity"][0]["userId"], "bob");
    assert_eq!(analytics["recentActivity"][0]["goalTitle"], "Launch beta");

    // Personal scope never sees team goals
    let (_, personal) = app
        .call(Method::GET, "/api/v1/achievify/goals", Some("alice"), None)
        .await;
    assert_eq!(personal.as_array().map(Vec::len), Some(0));

    let (status, _) = app
        .call(
            Method::POST,
            team_base,
            Some("alice"),
            Some(json!({ "title": "Get fit", "category": "health" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = build_test_app().await;
    for title in ["One", "Two"] {
        app.call(
            Method::POST,
            "/api/v1/achievify/goals",
            Some("alice"),
            Some(json!({ "title": title })),
        )
        .await;
    }
    let (_, all) = app
        .call(Method::GET, "/api/v1/achievify/goals", Some("alice"), None)
        .await;
    let first_id = all[0]["id"].as_str().unwrap().to_string();
    app.call(
        Method::POST,
        &format!("/api/v1/achievify/goals/{}/complete", first_id),
        Some("alice"),
        None,
    )
    .await;

    let (status, completed) = app
        .call(
            Method::GET,
            "/api/v1/achievify/goals?status=completed",
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let completed = completed.as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], first_id.as_str());
}

#[tokio::test]
async fn event_stream_requires_a_caller() {
    let app = build_test_app().await;
    let (status, body) = app
        .call(Method::GET, "/api/v1/events/stream", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let response = app.open_stream("/api/v1/events/stream", "alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}

#[tokio::test]
async fn event_stream_only_carries_the_callers_scopes() {
    let app = build_test_app().await;
    let response = app
        .open_stream("/api/v1/events/stream?teamId=t-42", "bob")
        .await;
    let mut stream = response.into_body().into_data_stream();

    for (uri, user, title) in [
        ("/api/v1/achievify/goals", "alice", "secret diet plan"),
        ("/api/v1/teamsync/teams/t-7/goals", "alice", "other team roadmap"),
        ("/api/v1/teamsync/teams/t-42/goals", "alice", "shared launch"),
        ("/api/v1/achievify/goals", "bob", "bob reads more"),
    ] {
        let (status, _) = app
            .call(Method::POST, uri, Some(user), Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Events arrive in publish order, so anything leaked would precede bob's own
    let mut text = String::new();
    while !text.contains("bob reads more") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("no event within timeout")
            .expect("stream closed")
            .unwrap();
        text.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(text.contains("event: goal:created"));
    assert!(text.contains("shared launch"));
    assert!(!text.contains("secret diet plan"));
    assert!(!text.contains("other team roadmap"));
}

#[tokio::test]
async fn malformed_input_is_a_validation_error() {
    let app = build_test_app().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/achievify/goals",
            Some("alice"),
            Some(json!({ "title": "x", "category": "bogus" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().unwrap().contains("bogus"));

    let (status, body) = app
        .call(
            Method::GET,
            "/api/v1/achievify/goals?status=someday",
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (_, goal) = app
        .call(
            Method::POST,
            "/api/v1/teamsync/teams/t-1/goals",
            Some("alice"),
            Some(json!({ "title": "Beta" })),
        )
        .await;
    let (status, _) = app
        .call(
            Method::POST,
            &format!(
                "/api/v1/teamsync/teams/t-1/goals/{}/logs",
                goal["id"].as_str().unwrap()
            ),
            Some("alice"),
            Some(json!({ "content": "done", "mood": "ecstatic" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

//! End-to-end tests: a real server on a local port driven with reqwest.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use trie_router::config::RouteConfig;
use trie_router::http::middleware::{recovery, request_id, X_REQUEST_ID};
use trie_router::lifecycle::{build_engine, runtime};
use trie_router::{Engine, EngineOptions, ServerConfig, ShutdownKind};

mod common;

fn route(method: &str, path: &str, name: Option<&str>) -> RouteConfig {
    RouteConfig {
        method: method.to_string(),
        path: path.to_string(),
        name: name.map(str::to_string),
    }
}

#[tokio::test]
async fn test_configured_routes_bind_params() {
    let mut config = ServerConfig::default();
    config.routes = vec![
        route("GET", "/a/prefix:key1/b", Some("first")),
        route("GET", "/a/:key1/c", Some("second")),
        route("GET", "/static/:filename", None),
    ];
    let engine = build_engine(&config).unwrap();
    let server = common::start_server(config, engine).await;
    let client = common::client();

    let body: Value = client
        .get(server.url("/a/prefixvalue/b"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["name"], "first");
    assert_eq!(body["params"], json!({"key1": "value"}));

    let body: Value = client
        .get(server.url("/a/other/c"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["name"], "second");
    assert_eq!(body["pattern"], "/a/:key1/c");
    assert_eq!(body["params"], json!({"key1": "other"}));

    let body: Value = client
        .get(server.url("/static/site.css"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["name"], Value::Null);
    assert_eq!(body["params"], json!({"filename": "site.css"}));

    let res = client.get(server.url("/a/prefixvalue/c")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/static/css/site.css")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(server.url("/healthz")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "ok");

    server.shutdown.trigger(ShutdownKind::Immediate);
}

#[tokio::test]
async fn test_method_not_allowed_when_enabled() {
    let mut config = ServerConfig::default();
    config.routing.handle_method_not_allowed = true;
    config.routes = vec![route("GET", "/items/:id", None), route("PUT", "/items/:id", None)];
    let engine = build_engine(&config).unwrap();
    let server = common::start_server(config, engine).await;
    let client = common::client();

    let res = client.post(server.url("/items/3")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET, PUT");
    assert!(res.headers().contains_key(X_REQUEST_ID));

    let res = client.post(server.url("/nothing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.shutdown.trigger(ShutdownKind::Immediate);
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

#[tokio::test]
async fn test_groups_binding_and_recovery() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.use_middleware(recovery());
    engine.use_middleware(request_id());
    {
        let mut api = engine.group("/api", Vec::new());
        api.post("/teams/:team/users", |ctx| match ctx.bind_json::<NewUser>() {
            Ok(user) => {
                let team = ctx.param("team").unwrap_or_default().to_string();
                let _ = ctx.json(
                    StatusCode::CREATED,
                    &json!({"team": team, "user": user.name}),
                );
            }
            Err(e) => ctx.string(StatusCode::BAD_REQUEST, &e.to_string()),
        })
        .unwrap();
        api.get("/panic", |_| panic!("handler exploded")).unwrap();
    }
    let server = common::start_server(ServerConfig::default(), engine).await;
    let client = common::client();

    let res = client
        .post(server.url("/api/teams/red/users"))
        .json(&json!({"name": "ann"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"team": "red", "user": "ann"}));

    let res = client
        .post(server.url("/api/teams/red/users"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(server.url("/api/panic"))
        .header(X_REQUEST_ID, "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()[X_REQUEST_ID], "trace-me");

    // the server survives a panicking handler
    let res = client
        .post(server.url("/api/teams/blue/users"))
        .json(&json!({"name": "bob"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    server.shutdown.trigger(ShutdownKind::Immediate);
}

#[tokio::test]
async fn test_graceful_shutdown_drains_in_flight_request() {
    let mut engine = Engine::default();
    engine
        .get("/slow", |ctx| {
            std::thread::sleep(Duration::from_millis(300));
            ctx.string(StatusCode::OK, "done");
        })
        .unwrap();
    let server = common::start_server(ServerConfig::default(), engine).await;
    let client = common::client();

    let url = server.url("/slow");
    let in_flight = tokio::spawn(async move { client.get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger(ShutdownKind::Graceful);

    let res = in_flight.await.unwrap().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "done");

    let stopped = tokio::time::timeout(Duration::from_secs(5), server.handle).await;
    assert!(matches!(stopped, Ok(Ok(Ok(())))));

    let refused = common::client()
        .get(format!("http://{}/slow", server.addr))
        .send()
        .await;
    assert!(refused.is_err());
}

#[tokio::test]
async fn test_grace_period_forces_shutdown() {
    let mut config = ServerConfig::default();
    config.timeouts.shutdown_grace_secs = 1;

    let mut engine = Engine::default();
    engine
        .get("/stuck", |ctx| {
            std::thread::sleep(Duration::from_secs(3));
            ctx.string(StatusCode::OK, "late");
        })
        .unwrap();
    let server = common::start_server(config, engine).await;

    let url = server.url("/stuck");
    let _in_flight = tokio::spawn(async move { common::client().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger(ShutdownKind::Graceful);
    let stopped = tokio::time::timeout(Duration::from_millis(2500), server.handle).await;
    assert!(matches!(stopped, Ok(Ok(Ok(())))));
}

#[test]
fn test_immediate_stop_exits_runtime_with_stuck_handler() {
    let start = Instant::now();
    runtime::run(async {
        let mut engine = Engine::default();
        engine
            .get("/stuck", |ctx| {
                std::thread::sleep(Duration::from_secs(6));
                ctx.string(StatusCode::OK, "late");
            })
            .unwrap();
        let server = common::start_server(ServerConfig::default(), engine).await;

        let url = server.url("/stuck");
        let _in_flight = tokio::spawn(async move { common::client().get(url).send().await });
        tokio::time::sleep(Duration::from_millis(100)).await;

        server.shutdown.trigger(ShutdownKind::Immediate);
        let stopped = tokio::time::timeout(Duration::from_secs(2), server.handle).await;
        assert!(matches!(stopped, Ok(Ok(Ok(())))));
    })
    .unwrap();

    // runtime teardown must not wait out the 6s handler
    assert!(start.elapsed() < Duration::from_secs(4), "{:?}", start.elapsed());
}

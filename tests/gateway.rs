use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use admin_backend::gateway::{self, ApiClient, ApiError, RequestOptions};
use axum::{
    Json, Router,
    http::{HeaderMap, Method, StatusCode, header},
    routing::{get, post},
};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::{Value, json};

// 模拟上游 API，记录收到的 Authorization 头和会话端点的访问次数
struct MockUpstream {
    base: String,
    auth_seen: Arc<Mutex<Option<String>>>,
    session_reads: Arc<AtomicUsize>,
}

impl MockUpstream {
    fn session_url(&self) -> String {
        format!("{}/api/auth/session", self.base)
    }

    fn auth_seen(&self) -> Option<String> {
        self.auth_seen.lock().unwrap().clone()
    }
}

async fn spawn_upstream() -> MockUpstream {
    let auth_seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let session_reads = Arc::new(AtomicUsize::new(0));

    let auth = auth_seen.clone();
    let reads = session_reads.clone();
    let router = Router::new()
        .route(
            "/api/auth/session",
            get(move || {
                let reads = reads.clone();
                async move {
                    reads.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "isLoggedIn": true, "token": "tok-999" }))
                }
            }),
        )
        .route(
            "/items",
            get(move |headers: HeaderMap| {
                let auth = auth.clone();
                async move {
                    *auth.lock().unwrap() = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string);
                    Json(json!({ "a": 1 }))
                }
            }),
        )
        .route("/secure", get(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        )
        .route("/plain", get(|| async { "hello" }))
        .route(
            "/echo",
            post(|method: Method, Json(body): Json<Value>| async move {
                Json(json!({ "method": method.as_str(), "body": body }))
            })
            .put(|method: Method, Json(body): Json<Value>| async move {
                Json(json!({ "method": method.as_str(), "body": body }))
            })
            .patch(|method: Method, Json(body): Json<Value>| async move {
                Json(json!({ "method": method.as_str(), "body": body }))
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockUpstream {
        base: format!("http://{addr}"),
        auth_seen,
        session_reads,
    }
}

#[tokio::test]
async fn attaches_bearer_token_from_session() {
    let upstream = spawn_upstream().await;
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url()).unwrap();

    let response = client
        .get("/items", RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.auth_seen().as_deref(), Some("Bearer tok-999"));

    let body: Value = gateway::parse_response(response).await.unwrap();
    assert_eq!(body, json!({ "a": 1 }));
}

#[tokio::test]
async fn skip_auth_never_touches_the_session_endpoint() {
    let upstream = spawn_upstream().await;
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url()).unwrap();

    let options = RequestOptions {
        skip_auth: true,
        ..RequestOptions::default()
    };
    let response = client.get("/items", options).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.auth_seen(), None);
    assert_eq!(upstream.session_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_token_omits_the_header() {
    let upstream = spawn_upstream().await;
    // 会话端点不存在，令牌取回降级为 None
    let client = ApiClient::new(
        upstream.base.clone(),
        format!("{}/missing", upstream.base),
    )
    .unwrap();

    let response = client
        .get("/items", RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.auth_seen(), None);
}

#[tokio::test]
async fn caller_authorization_header_wins() {
    let upstream = spawn_upstream().await;
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url()).unwrap();

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer custom"));
    let options = RequestOptions {
        headers,
        ..RequestOptions::default()
    };
    client.get("/items", options).await.unwrap();

    assert_eq!(upstream.auth_seen().as_deref(), Some("Bearer custom"));
    // 调用方已提供凭证时不访问会话端点
    assert_eq!(upstream.session_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unauthorized_response_fires_hook_exactly_once() {
    let upstream = spawn_upstream().await;
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url())
        .unwrap()
        .with_unauthorized_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let response = client
        .get("/secure", RequestOptions::default())
        .await
        .unwrap();

    // 401 触发回调，但响应仍然交还给调用方
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn parse_response_surfaces_status_and_body() {
    let upstream = spawn_upstream().await;
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url()).unwrap();

    let options = RequestOptions {
        skip_auth: true,
        ..RequestOptions::default()
    };
    let response = client.get("/missing", options).await.unwrap();
    let err = gateway::parse_response::<Value>(response).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    let message = err.to_string();
    assert!(message.contains("404"), "message: {message}");
    assert!(message.contains("not found"), "message: {message}");
}

#[tokio::test]
async fn invalid_json_on_success_is_a_decode_error() {
    let upstream = spawn_upstream().await;
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url()).unwrap();

    let options = RequestOptions {
        skip_auth: true,
        ..RequestOptions::default()
    };
    let response = client.get("/plain", options).await.unwrap();
    let err = gateway::parse_response::<Value>(response).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn write_verbs_serialize_json_bodies() {
    let upstream = spawn_upstream().await;
    let client = ApiClient::new(upstream.base.clone(), upstream.session_url()).unwrap();

    let payload = json!({ "title": "Launch event", "active": true });

    let options = || RequestOptions {
        skip_auth: true,
        ..RequestOptions::default()
    };

    let response = client.post("/echo", Some(&payload), options()).await.unwrap();
    let body: Value = gateway::parse_response(response).await.unwrap();
    assert_eq!(body, json!({ "method": "POST", "body": payload }));

    let response = client.put("/echo", Some(&payload), options()).await.unwrap();
    let body: Value = gateway::parse_response(response).await.unwrap();
    assert_eq!(body["method"], "PUT");

    let response = client.patch("/echo", Some(&payload), options()).await.unwrap();
    let body: Value = gateway::parse_response(response).await.unwrap();
    assert_eq!(body["method"], "PATCH");

    let response = client.delete("/echo", options()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn absolute_urls_bypass_the_base_url() {
    let upstream = spawn_upstream().await;
    // 基础地址故意指向无人监听的端口
    let client = ApiClient::new("http://127.0.0.1:1", upstream.session_url()).unwrap();

    let options = RequestOptions {
        skip_auth: true,
        ..RequestOptions::default()
    };
    let response = client
        .get(&format!("{}/items", upstream.base), options)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

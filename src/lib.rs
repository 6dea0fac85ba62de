use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use config::Config;
use gateway::ApiClient;
use reqwest::Client;

pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod session;

pub mod routes;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Config,
    pub http: Client,
    pub gateway: ApiClient,
    pub key: Key,
}

// 认证相关的路由
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::session))
}

// 控制台页面消费的资源透传路由
fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/admin/{resource}", get(routes::resources::list))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(auth_routes())
        .merge(admin_routes())
        // 路由守卫拦截除白名单外的所有请求
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::route_guard,
        ))
        .layer(axum::middleware::from_fn(middleware::log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}

use std::net::{IpAddr, SocketAddr};

use admin_backend::{
    AppState, config::Config, create_router,
    gateway::{APP_USER_AGENT, ApiClient},
};
use axum_extra::extract::cookie::Key;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 从密钥派生会话 Cookie 的加密密钥
    let key = Key::derive_from(config.session_secret.as_bytes());

    // 上游身份服务的 HTTP 客户端
    let http = reqwest::Client::builder()
        .user_agent(APP_USER_AGENT)
        .build()
        .expect("Failed to build HTTP client");

    // 页面路由使用的认证网关
    let gateway = ApiClient::new(
        config.api_base_url.clone(),
        config.session_api_url.clone(),
    )
    .expect("Failed to build API gateway");

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        http,
        gateway,
        key,
    };

    let app = create_router(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}

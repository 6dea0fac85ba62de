use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header::COOKIE},
    response::Json,
};
use serde_json::Value;

use crate::{
    AppState,
    error::AppError,
    gateway::{self, ApiError, RequestOptions},
};

// 控制台已知的上游资源集合
const RESOURCES: &[&str] = &[
    "users",
    "events",
    "category",
    "subcategory",
    "subject",
    "topic",
    "posts",
];

/// 资源列表透传：带着会话令牌转发分页查询给上游 API。
pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    if !RESOURCES.contains(&resource.as_str()) {
        return Err(AppError::UnknownResource);
    }

    // limit/page 等查询参数原样转发
    let mut path = format!("/{resource}");
    if let Some(query) = query {
        path.push('?');
        path.push_str(&query);
    }

    let options = RequestOptions {
        session_cookie: headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        ..RequestOptions::default()
    };

    let response = state.gateway.get(&path, options).await.map_err(|e| {
        tracing::error!("Upstream request for {} failed: {}", resource, e);
        AppError::Internal
    })?;

    match gateway::parse_response::<Value>(response).await {
        Ok(body) => Ok(Json(body)),
        Err(ApiError::Status { status, body }) => Err(AppError::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            body,
        }),
        Err(e) => {
            tracing::error!("Failed to decode {} response: {}", resource, e);
            Err(AppError::Internal)
        }
    }
}

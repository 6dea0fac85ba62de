use axum::Json;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    UnknownResource,
    Upstream { status: StatusCode, body: String },
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::UnknownResource => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Unknown resource".into(),
                }),
            )
                .into_response(),
            // 上游的错误状态和消息体原样转发给控制台
            AppError::Upstream { status, body } => (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".into(),
                }),
            )
                .into_response(),
        }
    }
}

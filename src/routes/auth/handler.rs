use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::{
    AppState,
    session::{self, SessionRecord},
};

use super::model::{
    LoginRequest, LoginResponse, LogoutResponse, UpstreamErrorResponse, UpstreamLoginResponse,
};

pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    // 将凭证转发给上游身份服务
    let upstream = match state
        .http
        .post(format!("{}/login", state.config.api_base_url))
        .json(&req)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Login request to upstream failed: {}", e);
            return login_error();
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        // 凭证被拒绝：转发上游状态码和消息，不修改会话
        let message = upstream
            .json::<UpstreamErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| "Invalid username or password".to_string());

        let status = StatusCode::from_u16(status.as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(serde_json::json!({ "error": message }))).into_response();
    }

    let body = match upstream.json::<UpstreamLoginResponse>().await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to decode upstream login response: {}", e);
            return login_error();
        }
    };

    // 登录成功，把用户和令牌写入会话
    let record = SessionRecord {
        is_logged_in: true,
        user: Some(body.user.clone()),
        token: Some(body.token),
    };
    let jar = session::save(jar, &record, state.config.production());

    (
        jar,
        Json(LoginResponse {
            success: true,
            user: body.user,
        }),
    )
        .into_response()
}

// 网络或解析异常统一回 500，不泄露内部细节
fn login_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "An error occurred during login" })),
    )
        .into_response()
}

pub async fn logout(jar: PrivateCookieJar) -> impl IntoResponse {
    (session::destroy(jar), Json(LogoutResponse { success: true }))
}

pub async fn session(jar: PrivateCookieJar) -> Json<SessionRecord> {
    let record = session::load(&jar);

    // 未登录时返回默认记录，绝不带出残留字段
    if !record.is_logged_in {
        return Json(SessionRecord::default());
    }

    Json(record)
}

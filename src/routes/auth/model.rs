use serde::{Deserialize, Serialize};

use crate::session::UserData;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// 上游身份服务的登录响应
#[derive(Debug, Deserialize)]
pub struct UpstreamLoginResponse {
    pub user: UserData,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamErrorResponse {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserData,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

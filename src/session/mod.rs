use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use time::Duration;

pub const SESSION_COOKIE: &str = "dawa-admin-session";
pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_ROOT: &str = "/admin";

// 会话有效期 7 天，只在显式保存时刷新
const SESSION_MAX_AGE_DAYS: i64 = 7;

// 上游身份服务返回的用户档案，除登录状态外对本服务不透明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub username: String,
    pub admin_panel_access: bool,
    pub active: bool,
    pub author: bool,
    pub featured: bool,
    pub subject_count: i64,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "__v")]
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// 读取会话。Cookie 缺失、无法解密或内容损坏时一律回退到未登录状态。
pub fn load(jar: &PrivateCookieJar) -> SessionRecord {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SessionRecord::default();
    };

    serde_json::from_str(cookie.value()).unwrap_or_default()
}

/// 加密并写入会话 Cookie。
pub fn save(jar: PrivateCookieJar, record: &SessionRecord, secure: bool) -> PrivateCookieJar {
    let payload = match serde_json::to_string(record) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("failed to serialize session record: {}", e);
            return jar;
        }
    };

    let mut cookie = Cookie::new(SESSION_COOKIE, payload);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::days(SESSION_MAX_AGE_DAYS));

    jar.add(cookie)
}

/// 清除会话 Cookie，重复调用是安全的。
pub fn destroy(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::session::{self, ADMIN_ROOT, LOGIN_PATH};

// 守卫白名单：认证接口、静态资源和常见图片后缀
const PUBLIC_PREFIXES: &[&str] = &["/api/auth", "/static", "/assets"];
const PUBLIC_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".svg"];

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || path == "/favicon.ico"
        || PUBLIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// 路由守卫：每个请求求值一次，只读会话，从不修改。
pub async fn route_guard(jar: PrivateCookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path();

    if is_public(path) {
        return next.run(request).await;
    }

    let record = session::load(&jar);

    // 未登录且不在登录页，重定向到登录页
    if !record.is_logged_in && !path.starts_with(LOGIN_PATH) {
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    // 已登录却访问登录页，重定向到控制台首页
    if record.is_logged_in && path == LOGIN_PATH {
        return Redirect::temporary(ADMIN_ROOT).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_api_and_assets_are_public() {
        assert!(is_public("/api/auth/session"));
        assert!(is_public("/api/auth/login"));
        assert!(is_public("/static/app.css"));
        assert!(is_public("/assets/chunk.js"));
        assert!(is_public("/favicon.ico"));
        assert!(is_public("/images/logo.png"));
        assert!(is_public("/banner.jpeg"));
    }

    #[test]
    fn pages_are_guarded() {
        assert!(!is_public("/"));
        assert!(!is_public("/login"));
        assert!(!is_public("/admin"));
        assert!(!is_public("/admin/users"));
        assert!(!is_public("/api/admin/users"));
    }
}

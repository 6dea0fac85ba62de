use std::sync::Arc;

use reqwest::{
    Client, Method, Response, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::session::SessionRecord;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse JSON response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// 跳过令牌附加，登录等公开调用使用
    pub skip_auth: bool,
    /// 调用方附加的请求头，优先于默认头
    pub headers: HeaderMap,
    /// 转发给会话端点的 Cookie 头
    pub session_cookie: Option<String>,
}

/// 面向上游 API 的统一出口：透明附加 Bearer 令牌，对 401 做统一处理。
/// 每次调用相互独立，不重试、不排队、不缓存。
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session_url: String,
    on_unauthorized: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session_url: session_url.into(),
            on_unauthorized: None,
        })
    }

    /// 注入收到 401 时触发的回调，由调用方决定跳转策略。
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    // 通过会话端点取回当前令牌，任何失败都降级为 None
    async fn session_token(&self, cookie: Option<&str>) -> Option<String> {
        let mut request = self.http.get(&self.session_url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let record = match request.send().await {
            Ok(response) => response.json::<SessionRecord>().await,
            Err(e) => Err(e),
        };

        match record {
            Ok(record) => record.token,
            Err(e) => {
                tracing::error!("Failed to get session token: {}", e);
                None
            }
        }
    }

    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);

        // 调用方自带 Authorization 时不覆盖
        if !options.skip_auth && !headers.contains_key(AUTHORIZATION) {
            match self.session_token(options.session_cookie.as_deref()).await {
                Some(token) => match HeaderValue::from_str(&format!("Bearer {token}")) {
                    Ok(value) => {
                        headers.insert(AUTHORIZATION, value);
                    }
                    Err(_) => tracing::warn!("Session token is not a valid header value"),
                },
                None => tracing::warn!("No authentication token available"),
            }
        }

        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };

        let mut builder = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::error!("Unauthorized: invalid or expired token");
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }

        // 401 也原样交还给调用方
        Ok(response)
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Response, ApiError> {
        self.request::<()>(Method::GET, path, None, options).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        self.request(Method::POST, path, body, options).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        self.request(Method::PUT, path, body, options).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        self.request(Method::PATCH, path, body, options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Response, ApiError> {
        self.request::<()>(Method::DELETE, path, None, options)
            .await
    }
}

/// 按资源类型解码响应体：非 2xx 带着状态码和原始消息体失败，
/// 2xx 但不是合法 JSON 时作为独立的解码错误返回。
pub async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

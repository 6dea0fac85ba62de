use std::env;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub session_secret: String,
    pub session_api_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub app_env: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(#[from] env::VarError),
    #[error("SESSION_SECRET must be at least 32 bytes")]
    WeakSecret,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 会话加密密钥太短时直接拒绝启动
        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(ConfigError::WeakSecret);
        }

        let server_port = env::var("SERVER_PORT")?.parse().unwrap_or(3000);

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")?,
            session_secret,
            // 网关通过会话端点取回令牌，默认指向本服务自身
            session_api_url: env::var("SESSION_API_URL").unwrap_or_else(|_| {
                format!("http://127.0.0.1:{server_port}/api/auth/session")
            }),
            server_host: env::var("SERVER_HOST")?,
            server_port,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        })
    }

    pub fn production(&self) -> bool {
        self.app_env == "production"
    }
}

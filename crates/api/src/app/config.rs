//! Environment configuration for the API binary.

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// When false, everything runs on in-memory stores (dev mode).
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub mongodb_url: String,
    pub redis_url: String,
    /// Notifications per page.
    pub page_size: u32,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            jwt_secret,
            use_persistent_stores: std::env::var("USE_PERSISTENT_STORES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            database_url: std::env::var("DATABASE_URL").ok(),
            mongodb_url: env_or("MONGODB_URL", "mongodb://127.0.0.1:27017"),
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            page_size: std::env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

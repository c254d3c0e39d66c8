//! Environment configuration. Read once at startup; no module reads env
//! vars after that.

/// Runtime configuration. `database_url` absent means the in-memory backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl AppConfig {
    /// Build from environment: `DATABASE_URL`, `ALLOWED_ORIGINS`
    /// (comma-separated, `*` for any), `PORT`, `DB_MIN_CONNECTIONS`,
    /// `DB_MAX_CONNECTIONS`.
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            allowed_origins,
            port: env_parse("PORT", 8000),
            min_connections: env_parse("DB_MIN_CONNECTIONS", 1),
            max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

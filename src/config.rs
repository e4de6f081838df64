use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: String,
    pub debug: bool,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "tirestore".into()),
            cookie_name: std::env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| "tirestore_session".into()),
        };
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let debug = std::env::var("APP_DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        Ok(Self {
            database_url,
            environment,
            debug,
            session,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

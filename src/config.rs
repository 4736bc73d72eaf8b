use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub environment: String,
}

impl AppConfig {
    /// Reads configuration from the environment. `DATABASE_URL` and
    /// `JWT_SECRET` are mandatory; the error bubbles up through `main` and
    /// the process never binds a socket without them.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
        };
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "production".into());
        Ok(Self {
            database_url,
            jwt,
            environment,
        })
    }
}

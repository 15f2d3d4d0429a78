use std::env;

use anyhow::Context;

/// Deployment environment; steers cookie security and log format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Read `ENVIRONMENT`; anything other than "production" counts as
    /// development.
    fn detect() -> Self {
        match env::var("ENVIRONMENT") {
            Ok(value) if value.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub cookie_secret: String,
    pub frontend_url: String,
    pub env: Environment,
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // TODO: proper message error for cookie_secret too short
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL is not set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            cookie_secret: env::var("COOKIE_SECRET").context("COOKIE_SECRET is not set")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            env: Environment::detect(),
            bcrypt_cost: match env::var("BCRYPT_COST") {
                Ok(value) => value.parse().context("BCRYPT_COST is not a number")?,
                Err(_) => bcrypt::DEFAULT_COST,
            },
        })
    }
}

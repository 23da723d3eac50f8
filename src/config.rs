use std::{str::FromStr, time::Duration};

use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// Longest token lifetime accepted, one leap year.
pub const MAX_TTL_MINUTES: i64 = 366 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Parsed signing algorithm. Only the HMAC family is accepted since the
    /// key is a shared secret.
    pub fn algorithm(&self) -> anyhow::Result<Algorithm> {
        let alg = Algorithm::from_str(&self.algorithm)
            .with_context(|| format!("unknown JWT algorithm {:?}", self.algorithm))?;
        match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
            other => bail!("JWT algorithm {other:?} needs an asymmetric key; use HS256/HS384/HS512"),
        }
    }

    pub fn ttl(&self) -> anyhow::Result<Duration> {
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}");
        }
        Ok(Duration::from_secs(self.ttl_minutes as u64 * 60))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub pool: PoolConfig,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mtaa".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mtaa-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
        };
        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs),
        };

        let config = Self {
            database_url,
            jwt,
            pool,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        self.jwt.ttl()?;
        if self.pool.max_connections == 0 || self.pool.min_connections > self.pool.max_connections {
            bail!(
                "invalid pool bounds: min={} max={}",
                self.pool.min_connections,
                self.pool.max_connections
            );
        }
        self.jwt.algorithm()?;
        Ok(())
    }
}

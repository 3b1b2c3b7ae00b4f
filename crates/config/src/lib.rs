//! Configuration module for the Iqrah adaptive practice engine (C12, §3a).

use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration loaded once from the environment at process
/// start and cloned into shared state.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Address to bind the HTTP server to.
    pub bind_address: String,
    /// Shared secret the `AuthUser` extractor (C11) decodes bearer tokens
    /// with. The concrete issuance/verification scheme is the external
    /// collaborator named in §6; this secret is the seam.
    pub jwt_secret: String,
    /// Per-subtopic stock floor that triggers generation (§6).
    pub min_stock: u32,
    /// Generation Coordinator worker pool size.
    pub gen_workers: usize,
    /// Per-job retry cap before a job is marked failed.
    pub gen_max_attempts: u32,
    /// Base delay for exponential backoff between generation attempts.
    pub gen_backoff_base_ms: u64,
    /// Jitter fraction applied on top of the backoff delay, in `[0, 1]`.
    pub gen_backoff_jitter_fraction: f64,
    /// Per-generator-call timeout.
    pub gen_deadline_ms: u64,
    /// Caller-facing wait when stock is empty at fetch time; 0 means return eagerly.
    pub sync_wait_ms: u64,
    /// When true, the Generation Coordinator uses a deterministic in-memory
    /// generator instead of calling out to the real one. For tests only.
    pub mock_generator: bool,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults in §6 for anything not marked required.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env_var("DATABASE_URL")?,
            bind_address: env_var("BIND_ADDRESS")?,
            jwt_secret: env_var("JWT_SECRET")?,
            min_stock: env_var_parsed_or("MIN_STOCK", 10)?,
            gen_workers: env_var_parsed_or("GEN_WORKERS", 4)?,
            gen_max_attempts: env_var_parsed_or("GEN_MAX_ATTEMPTS", 5)?,
            gen_backoff_base_ms: env_var_parsed_or("GEN_BACKOFF_BASE_MS", 500)?,
            gen_backoff_jitter_fraction: env_var_parsed_or("GEN_BACKOFF_JITTER_FRACTION", 0.2)?,
            gen_deadline_ms: env_var_parsed_or("GEN_DEADLINE_MS", 30_000)?,
            sync_wait_ms: env_var_parsed_or("SYNC_WAIT_MS", 0)?,
            mock_generator: env_var_parsed_or("MOCK_GENERATOR", false)?,
        })
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_parsed_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parsed_or_uses_default() {
        let val: u32 = env_var_parsed_or("NON_EXISTENT_VAR_12345", 10).unwrap();
        assert_eq!(val, 10);
    }

    #[test]
    fn test_env_var_parsed_or_rejects_bad_value() {
        // SAFETY: test-only, single-threaded within this function's lifetime.
        unsafe { env::set_var("CONFIG_TEST_BAD_INT", "not-a-number") };
        let err = env_var_parsed_or::<u32>("CONFIG_TEST_BAD_INT", 10).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_, _)));
        unsafe { env::remove_var("CONFIG_TEST_BAD_INT") };
    }
}

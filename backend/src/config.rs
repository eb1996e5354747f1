//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CATALOG_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::PaginationConfig;
use serde::Deserialize;

use crate::domain::Error;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for the catalog service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CATALOG")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Idle connections the pool keeps open.
    #[ortho_config(default = 2)]
    pub pool_min_idle: u32,
    /// Seconds to wait for a pooled connection.
    #[ortho_config(default = 30)]
    pub pool_timeout_secs: u64,
    /// Page size used when a request asks for none.
    #[ortho_config(default = 10)]
    pub pagination_default_size: u32,
    /// Largest page size a request may ask for.
    #[ortho_config(default = 100)]
    pub pagination_max_size: u32,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl AppSettings {
    /// The configured database URL.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when no URL is configured.
    pub fn database_url(&self) -> Result<&str, Error> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::bad_request("database_url must be configured"))
    }

    /// Pool settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when no database URL is configured.
    pub fn pool_config(&self) -> Result<PoolConfig, Error> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_max_size)
            .with_min_idle(Some(self.pool_min_idle))
            .with_connection_timeout(Duration::from_secs(self.pool_timeout_secs)))
    }

    /// Page-size policy derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when a size is zero or the default
    /// exceeds the maximum.
    pub fn pagination(&self) -> Result<PaginationConfig, Error> {
        PaginationConfig::new(self.pagination_default_size, self.pagination_max_size)
            .map_err(|err| Error::bad_request(format!("invalid pagination settings: {err}")))
    }

    /// The log filter, falling back to `info`.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and derived configuration.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    use crate::domain::ErrorCode;

    const KEYS: [&str; 7] = [
        "CATALOG_DATABASE_URL",
        "CATALOG_POOL_MAX_SIZE",
        "CATALOG_POOL_MIN_IDLE",
        "CATALOG_POOL_TIMEOUT_SECS",
        "CATALOG_PAGINATION_DEFAULT_SIZE",
        "CATALOG_PAGINATION_MAX_SIZE",
        "CATALOG_LOG_FILTER",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("catalog-core")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| (*value).to_owned());
                (*key, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(settings.database_url, None);
        assert_eq!(
            (settings.pool_max_size, settings.pool_min_idle, settings.pool_timeout_secs),
            (10, 2, 30)
        );
        assert_eq!(settings.log_filter(), "info");
        let pagination = settings.pagination().expect("default pagination is valid");
        assert_eq!(pagination.default_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(pagination.max_size(), MAX_PAGE_SIZE);
        let err = settings.pool_config().expect_err("url is required");
        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert_eq!(err.message(), "database_url must be configured");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("CATALOG_DATABASE_URL", "postgres://catalog@db/catalog"),
            ("CATALOG_PAGINATION_DEFAULT_SIZE", "25"),
            ("CATALOG_PAGINATION_MAX_SIZE", "50"),
            ("CATALOG_POOL_MAX_SIZE", "4"),
            ("CATALOG_LOG_FILTER", "debug"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.database_url().expect("url set"), "postgres://catalog@db/catalog");
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://catalog@db/catalog");
        assert_eq!(settings.pool_max_size, 4);
        let pagination = settings.pagination().expect("valid pagination");
        assert_eq!((pagination.default_size(), pagination.max_size()), (25, 50));
        assert_eq!(settings.log_filter(), "debug");
    }

    #[rstest]
    fn default_above_max_is_rejected() {
        let _guard = lock_env(env_with(&[
            ("CATALOG_PAGINATION_DEFAULT_SIZE", "80"),
            ("CATALOG_PAGINATION_MAX_SIZE", "40"),
        ]));

        let err = load_from_empty_args().pagination().expect_err("default > max");

        assert_eq!(err.code(), ErrorCode::BadRequest);
    }
}

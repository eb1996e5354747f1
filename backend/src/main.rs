//! Catalog core entry point: loads settings, prepares the store and checks
//! that the pool can serve connections.

use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use catalog_core::config::AppSettings;
use catalog_core::outbound::persistence::{DbContext, DbPool, run_pending_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    init_tracing(settings.log_filter());

    let pool_config = settings.pool_config().wrap_err("invalid pool settings")?;
    let pagination = settings.pagination().wrap_err("invalid pagination settings")?;

    let database_url = pool_config.database_url().to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to run migrations")?;
    for version in &applied {
        info!(%version, "migration applied");
    }

    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to build connection pool")?;
    let mut ctx = DbContext::new(pool.clone());
    drop(
        ctx.connection()
            .await
            .wrap_err("store did not hand out a connection")?,
    );

    let (idle, in_use) = pool.state();
    info!(
        idle,
        in_use,
        default_page_size = pagination.default_size(),
        max_page_size = pagination.max_size(),
        "catalog store ready"
    );
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

//! Embedded schema migrations.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::Error;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration over a blocking connection and return the
/// applied versions.
///
/// Call from a blocking context (for example `tokio::task::spawn_blocking`).
///
/// # Errors
///
/// Returns an internal error when the database is unreachable or a
/// migration fails.
pub fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, Error> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| Error::internal(format!("connect for migrations: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| Error::internal(format!("run migrations: {err}")))?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    info!(count = applied.len(), "migrations applied");
    Ok(applied)
}

//! Request-scoped database handle.
//!
//! A [`DbContext`] is created per inbound request and passed explicitly to
//! every repository call. Inside a transaction scope it carries the
//! transaction's connection, so nested repository calls join the open
//! transaction; outside one it hands out pooled connections.

use std::ops::{Deref, DerefMut};

use diesel_async::AsyncPgConnection;

use crate::domain::Error;

use super::error_mapping::map_pool_error;
use super::pool::{DbPool, OwnedConnection};

/// Ambient store handle for one request.
pub struct DbContext {
    pool: DbPool,
    pub(super) transaction: Option<OwnedConnection>,
}

impl DbContext {
    /// Create a context with no open transaction.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            transaction: None,
        }
    }

    /// Whether a transaction scope is currently open on this context.
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Pool backing this context.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Connection for the next statement: the open transaction's connection
    /// when there is one, otherwise a fresh pooled connection.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the pool cannot supply a connection.
    pub async fn connection(&mut self) -> Result<DbConnection<'_>, Error> {
        match &mut self.transaction {
            Some(conn) => Ok(DbConnection::Transaction(conn)),
            None => {
                let conn = self.pool.get_owned().await.map_err(map_pool_error)?;
                Ok(DbConnection::Pooled(conn))
            }
        }
    }
}

impl std::fmt::Debug for DbContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbContext")
            .field("pool", &self.pool)
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

/// Connection lent out by [`DbContext::connection`].
pub enum DbConnection<'a> {
    /// Borrowed from the enclosing transaction scope.
    Transaction(&'a mut OwnedConnection),
    /// Checked out for this statement only; returned to the pool on drop.
    Pooled(OwnedConnection),
}

impl Deref for DbConnection<'_> {
    type Target = AsyncPgConnection;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Transaction(conn) => conn,
            Self::Pooled(conn) => conn,
        }
    }
}

impl DerefMut for DbConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Transaction(conn) => conn,
            Self::Pooled(conn) => conn,
        }
    }
}

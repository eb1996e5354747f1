//! Unit of work.
//!
//! [`DbContext::transaction`] runs a closure inside one store transaction.
//! The closure receives the same context back, now carrying the transaction
//! connection, and passes it on to repository calls. The transaction commits
//! when the closure returns `Ok` and rolls back when it returns `Err`.
//! Entering a scope while one is already open joins it; there are no
//! savepoints, so the outermost scope alone decides commit or rollback.
//!
//! If the scope's future is dropped before it finishes, the connection is
//! released while still inside the transaction. The pool treats such a
//! connection as broken and closes it, which makes the server roll back.

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use tracing::warn;

use crate::domain::Error;

use super::context::DbContext;
use super::error_mapping::{map_diesel_error, map_pool_error};

/// Commit and rollback of an open transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionControl: Send {
    /// Make the transaction's writes durable.
    async fn commit(&mut self) -> Result<(), Error>;

    /// Discard the transaction's writes.
    async fn rollback(&mut self) -> Result<(), Error>;
}

#[async_trait]
impl TransactionControl for AsyncPgConnection {
    async fn commit(&mut self) -> Result<(), Error> {
        AnsiTransactionManager::commit_transaction(self)
            .await
            .map_err(|err| map_diesel_error(err, "commit transaction"))
    }

    async fn rollback(&mut self) -> Result<(), Error> {
        AnsiTransactionManager::rollback_transaction(self)
            .await
            .map_err(|err| map_diesel_error(err, "rollback transaction"))
    }
}

/// Settle a transaction from the closure's outcome.
///
/// `Ok` commits; a failed commit is reported as the scope's error. `Err`
/// rolls back exactly once; a failed rollback is joined onto the original
/// error without changing its classification.
pub async fn finish<T, C>(conn: &mut C, outcome: Result<T, Error>) -> Result<T, Error>
where
    T: Send,
    C: TransactionControl + ?Sized,
{
    match outcome {
        Ok(value) => {
            conn.commit().await?;
            Ok(value)
        }
        Err(err) => match conn.rollback().await {
            Ok(()) => Err(err),
            Err(rollback_err) => {
                warn!(error = %rollback_err, "rollback failed");
                Err(err.joined(&rollback_err))
            }
        },
    }
}

/// Clears the transaction slot if the scope is abandoned mid-flight.
struct ScopeGuard<'c> {
    ctx: &'c mut DbContext,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.ctx.transaction.take().is_some() {
            warn!("transaction scope dropped before completion; discarding connection");
        }
    }
}

impl DbContext {
    /// Run `f` inside a transaction, joining the open one if any.
    ///
    /// ```ignore
    /// use diesel_async::scoped_futures::ScopedFutureExt;
    ///
    /// ctx.transaction(|ctx| async move {
    ///     movies.update(ctx, id, &update).await
    /// }.scope_boxed()).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the closure's error after rolling back, or an internal error
    /// when beginning or committing the transaction fails.
    pub async fn transaction<'a, T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: for<'r> FnOnce(&'r mut Self) -> ScopedBoxFuture<'a, 'r, Result<T, Error>> + Send + 'a,
        T: Send + 'a,
    {
        if self.in_transaction() {
            return f(self).await;
        }

        let mut conn = self.pool().get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "begin transaction"))?;

        let guard = ScopeGuard { ctx: self };
        guard.ctx.transaction = Some(conn);
        let outcome = f(&mut *guard.ctx).await;
        let Some(mut conn) = guard.ctx.transaction.take() else {
            return Err(Error::internal("transaction connection lost during scope"));
        };
        drop(guard);

        finish(&mut *conn, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn ok_outcome_commits_once() {
        let mut control = MockTransactionControl::new();
        control.expect_commit().times(1).returning(|| Ok(()));
        control.expect_rollback().never();

        let value = finish(&mut control, Ok(5)).await.expect("commit succeeds");

        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn err_outcome_rolls_back_once_and_keeps_error() {
        let mut control = MockTransactionControl::new();
        control.expect_commit().never();
        control.expect_rollback().times(1).returning(|| Ok(()));

        let err = finish::<(), _>(&mut control, Err(Error::not_found("movie", "id", 3)))
            .await
            .expect_err("closure failed");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.cause().is_none());
    }

    #[tokio::test]
    async fn failed_rollback_is_joined_not_swallowed() {
        let mut control = MockTransactionControl::new();
        control.expect_commit().never();
        control
            .expect_rollback()
            .times(1)
            .returning(|| Err(Error::internal("connection closed")));

        let err = finish::<(), _>(
            &mut control,
            Err(Error::version_mismatch("movie", "id", 3, 1)),
        )
        .await
        .expect_err("closure failed");

        assert_eq!(err.code(), ErrorCode::VersionMismatch);
        assert!(
            err.cause()
                .is_some_and(|cause| cause.contains("connection closed"))
        );
    }

    #[tokio::test]
    async fn failed_commit_is_reported() {
        let mut control = MockTransactionControl::new();
        control
            .expect_commit()
            .times(1)
            .returning(|| Err(Error::internal("could not serialize access")));
        control.expect_rollback().never();

        let err = finish(&mut control, Ok("written"))
            .await
            .expect_err("commit failed");

        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[tokio::test]
    async fn context_starts_outside_transaction() {
        let pool = super::super::pool::DbPool::new_lazy(
            &super::super::pool::PoolConfig::new("postgres://catalog@127.0.0.1:1/catalog")
                .with_min_idle(None),
        );
        let ctx = DbContext::new(pool);
        assert!(!ctx.in_transaction());
    }
}

//! Classification of pool and Diesel failures into domain errors.
//!
//! Callers that expect a specific constraint to fire check for it with
//! [`is_unique_violation`] or [`is_foreign_key_violation`] and build the
//! matching domain error themselves. Everything else goes through
//! [`map_diesel_error`] and becomes an internal error, so no raw store
//! message reaches a caller.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::Error;

use super::pool::PoolError;

/// Map a pool checkout or build failure to an internal error.
pub fn map_pool_error(error: PoolError) -> Error {
    Error::internal(error)
}

/// Map an unclassified Diesel error to an internal error, logging the
/// operation that failed.
pub fn map_diesel_error(error: DieselError, operation: &str) -> Error {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            %operation,
            "diesel operation failed"
        ),
    }
    Error::internal(format!("{operation}: {error}"))
}

fn violated_constraint(error: &DieselError, expected: DatabaseErrorKind) -> Option<&str> {
    match error {
        DieselError::DatabaseError(kind, info)
            if std::mem::discriminant(kind) == std::mem::discriminant(&expected) =>
        {
            info.constraint_name()
        }
        _ => None,
    }
}

/// Whether `error` is a unique violation of the named constraint or index.
pub fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    violated_constraint(error, DatabaseErrorKind::UniqueViolation) == Some(constraint)
}

/// Whether `error` is a foreign-key violation of the named constraint.
pub fn is_foreign_key_violation(error: &DieselError, constraint: &str) -> bool {
    violated_constraint(error, DatabaseErrorKind::ForeignKeyViolation) == Some(constraint)
}

#[cfg(test)]
mod tests {
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    struct StubInfo {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(StubInfo { constraint }))
    }

    #[rstest]
    fn unique_violation_matches_constraint_name() {
        let err = db_error(DatabaseErrorKind::UniqueViolation, Some("genres_name_live_key"));
        assert!(is_unique_violation(&err, "genres_name_live_key"));
        assert!(!is_unique_violation(&err, "users_email_live_key"));
        assert!(!is_foreign_key_violation(&err, "genres_name_live_key"));
    }

    #[rstest]
    fn foreign_key_violation_matches_constraint_name() {
        let err = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            Some("movie_genres_genre_id_fkey"),
        );
        assert!(is_foreign_key_violation(&err, "movie_genres_genre_id_fkey"));
    }

    #[rstest]
    fn missing_constraint_name_never_matches() {
        let err = db_error(DatabaseErrorKind::UniqueViolation, None);
        assert!(!is_unique_violation(&err, "genres_name_live_key"));
        assert!(!is_unique_violation(&DieselError::NotFound, "genres_name_live_key"));
    }

    #[rstest]
    fn unclassified_errors_become_internal() {
        let err = map_diesel_error(
            db_error(DatabaseErrorKind::SerializationFailure, None),
            "load movie",
        );
        assert_eq!(err.code(), ErrorCode::Internal);
        assert_eq!(err.safe_message(), "internal error");
        assert!(err.cause().is_some_and(|cause| cause.starts_with("load movie")));
    }

    #[rstest]
    fn pool_errors_become_internal() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(err.incident_id().is_some());
    }
}

//! Optimistic concurrency helpers.
//!
//! A versioned write is a single conditional `UPDATE` matching the id, a live
//! row and the caller's expected version. Its affected-row count cannot tell
//! "missing" from "stale", so a zero-row outcome is followed by a probe of
//! the row by id alone and classified here.
//!
//! The probe runs after the failed write, so the row may change in between.
//! That only affects which error is reported; no data is written on this
//! path.

use chrono::{DateTime, Utc};

use crate::domain::Error;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// At least one row matched and was written.
    Success,
    /// No row matched the conditions.
    ZeroRows,
}

/// Classify the affected-row count of a conditional write or soft delete.
pub fn classify_affected_rows(updated_rows: usize) -> UpdateResult {
    if updated_rows == 0 {
        UpdateResult::ZeroRows
    } else {
        UpdateResult::Success
    }
}

/// What a by-id probe found after a zero-row write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPresence {
    /// No row with that id.
    Missing,
    /// The row exists but is soft-deleted.
    Deleted,
    /// The row exists and is live.
    Live,
}

impl RowPresence {
    /// Build from the `deleted_at` column of an optional probe result.
    pub fn from_probe(deleted_at: Option<Option<DateTime<Utc>>>) -> Self {
        match deleted_at {
            None => Self::Missing,
            Some(Some(_)) => Self::Deleted,
            Some(None) => Self::Live,
        }
    }
}

/// Map a failed versioned update to NotFound or VersionMismatch.
///
/// Only a live row can be stale; a missing or deleted row is always NotFound
/// whatever version was supplied.
pub fn disambiguate_update_failure(
    presence: RowPresence,
    subject: &str,
    key: &str,
    value: impl std::fmt::Display,
    expected_version: u32,
) -> Error {
    match presence {
        RowPresence::Live => Error::version_mismatch(subject, key, value, expected_version),
        RowPresence::Missing | RowPresence::Deleted => Error::not_found(subject, key, value),
    }
}

/// Map a zero-row soft delete; deletes carry no version check.
pub fn delete_failure(subject: &str, key: &str, value: impl std::fmt::Display) -> Error {
    Error::not_found(subject, key, value)
}

/// Cast a stored version (`i32`) to the domain version (`u32`).
///
/// The column carries a `CHECK (version >= 0)` constraint.
pub fn cast_version(version: i32) -> u32 {
    u32::try_from(version).unwrap_or_default()
}

/// Cast a domain version (`u32`) to the stored version (`i32`).
///
/// Versions beyond `i32::MAX` cannot be stored, so they saturate; such a
/// version never matches and the write reports a mismatch.
pub fn cast_version_for_db(version: u32) -> i32 {
    i32::try_from(version).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(0, UpdateResult::ZeroRows)]
    #[case(1, UpdateResult::Success)]
    #[case(3, UpdateResult::Success)]
    fn affected_rows_classification(#[case] rows: usize, #[case] expected: UpdateResult) {
        assert_eq!(classify_affected_rows(rows), expected);
    }

    #[rstest]
    #[case(None, RowPresence::Missing)]
    #[case(Some(Some(DateTime::<Utc>::UNIX_EPOCH)), RowPresence::Deleted)]
    #[case(Some(None), RowPresence::Live)]
    fn presence_classification(
        #[case] probe: Option<Option<DateTime<Utc>>>,
        #[case] expected: RowPresence,
    ) {
        assert_eq!(RowPresence::from_probe(probe), expected);
    }

    #[rstest]
    fn live_row_is_version_mismatch_with_rejected_version() {
        let err = disambiguate_update_failure(RowPresence::Live, "movie", "id", 4, 2);
        assert_eq!(err.code(), ErrorCode::VersionMismatch);
        assert_eq!(err.details().and_then(|d| d.get("version")), Some(&serde_json::json!(2)));
    }

    #[rstest]
    #[case(RowPresence::Missing)]
    #[case(RowPresence::Deleted)]
    fn absent_row_is_not_found_for_any_version(#[case] presence: RowPresence) {
        for version in [0, 1, u32::MAX] {
            let err = disambiguate_update_failure(presence, "movie", "id", 4, version);
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    }

    #[rstest]
    fn version_casts() {
        assert_eq!(cast_version(7), 7);
        assert_eq!(cast_version_for_db(7), 7);
        assert_eq!(cast_version_for_db(u32::MAX), i32::MAX);
    }
}

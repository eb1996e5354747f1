//! Tests for error classification, messages and serialization.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn internal_hides_cause_and_assigns_incident() {
    let err = Error::internal("connection reset by peer");

    assert_eq!(err.code(), ErrorCode::Internal);
    assert_eq!(err.safe_message(), "internal error");
    assert!(err.incident_id().is_some());
    assert_eq!(err.cause(), Some("connection reset by peer"));
    assert_eq!(err.to_string(), "internal error: connection reset by peer");
}

#[rstest]
fn internal_incident_ids_are_unique() {
    let first = Error::internal("a");
    let second = Error::internal("a");
    assert_ne!(first.incident_id(), second.incident_id());
}

#[rstest]
fn serialized_internal_error_omits_cause() {
    let err = Error::internal("password=hunter2");
    let value = serde_json::to_value(&err).expect("serialize error");

    assert_eq!(value["code"], json!("internal"));
    assert_eq!(value["message"], json!("internal error"));
    assert!(value.get("incidentId").is_some());
    assert!(!value.to_string().contains("hunter2"));
}

#[rstest]
#[case(Error::not_found("movie", "id", 4), "movie id:4 not found", ErrorCode::NotFound)]
#[case(
    Error::already_exists("review", "(movie_id,user_id)", "(1,2)"),
    "review (movie_id,user_id):(1,2) already exists",
    ErrorCode::AlreadyExists
)]
#[case(
    Error::version_mismatch("movie", "id", 9, 3),
    "movie id:9 version 3 is stale",
    ErrorCode::VersionMismatch
)]
fn classified_messages_surface_subject_key_value(
    #[case] err: Error,
    #[case] message: &str,
    #[case] code: ErrorCode,
) {
    assert_eq!(err.code(), code);
    assert_eq!(err.message(), message);
    assert_eq!(err.to_string(), message);
    assert!(err.incident_id().is_none());
}

#[rstest]
fn version_mismatch_details_carry_rejected_version() {
    let err = Error::version_mismatch("movie", "id", 9, 3);
    assert_eq!(
        err.details(),
        Some(&json!({ "subject": "movie", "key": "id", "value": "9", "version": 3 }))
    );
}

#[rstest]
fn conflict_kinds_share_status_but_not_code() {
    let exists = Error::already_exists("genre", "name", "Drama");
    let stale = Error::version_mismatch("movie", "id", 1, 0);

    assert_eq!(exists.code().http_status(), 409);
    assert_eq!(stale.code().http_status(), 409);
    assert!(exists.code().is_conflict() && stale.code().is_conflict());
    assert_ne!(exists.code(), stale.code());
    assert_ne!(exists.message(), stale.message());
}

#[rstest]
#[case(ErrorCode::Internal, 500)]
#[case(ErrorCode::BadRequest, 400)]
#[case(ErrorCode::NotFound, 404)]
#[case(ErrorCode::Unauthorized, 401)]
#[case(ErrorCode::Forbidden, 403)]
fn status_mapping(#[case] code: ErrorCode, #[case] status: u16) {
    assert_eq!(code.http_status(), status);
}

#[rstest]
fn joined_keeps_primary_classification() {
    let primary = Error::not_found("movie", "id", 1);
    let rollback = Error::internal("rollback failed");

    let joined = primary.joined(&rollback);

    assert_eq!(joined.code(), ErrorCode::NotFound);
    assert_eq!(joined.message(), "movie id:1 not found");
    assert_eq!(
        joined.cause(),
        Some("internal error: rollback failed")
    );
}

#[rstest]
fn joined_appends_to_existing_cause() {
    let primary = Error::internal("write failed");
    let joined = primary.joined(&Error::bad_request("second"));
    assert_eq!(joined.cause(), Some("write failed; second"));
}

#[rstest]
fn dto_round_trip_drops_cause_only() {
    let err = Error::bad_request("title must not be empty")
        .with_details(json!({ "field": "title" }));
    let text = serde_json::to_string(&err).expect("serialize");
    let back: Error = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, err);
}

#[rstest]
fn error_is_send_and_sync() {
    fn assert_bounds<T: Send + Sync + 'static>() {}
    assert_bounds::<Error>();
}

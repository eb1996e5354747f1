//! Policy for suites that need the embedded PostgreSQL cluster.
//!
//! A cluster that cannot be started fails the suite. Environments that
//! genuinely lack one (no network to fetch binaries, no permission to run
//! them) opt out with `SKIP_TEST_CLUSTER`, and the suites then print a
//! `SKIP-TEST-CLUSTER` marker and return early.

/// Returns true when `SKIP_TEST_CLUSTER` is set to a truthy value.
///
/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles embedded cluster setup failures consistently across suites.
///
/// Prints a skip marker and returns `None` when skipping is allowed,
/// otherwise panics with the setup failure.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if !should_skip_test_cluster() {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

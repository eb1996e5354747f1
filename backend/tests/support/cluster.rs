//! Access to the process-wide embedded PostgreSQL cluster.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns the shared cluster handle, retrying transient bootstrap failures.
///
/// A bootstrap that panics (for example when the privileged worker cannot
/// be located) is reported as an error without retrying.
pub fn shared_cluster_handle() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    ensure_worker_binary();
    let mut attempt = 1;
    loop {
        let outcome = panic::catch_unwind(AssertUnwindSafe(
            pg_embedded_setup_unpriv::test_support::shared_cluster_handle,
        ))
        .map_err(|payload| format!("cluster bootstrap panicked: {}", panic_message(&*payload)))?;
        match outcome {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("cluster bootstrap attempt {attempt} failed: {error:?}");
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload")
}

/// Pins `PG_PASSWORD` so a data directory reused by a later test process
/// still accepts the password it was initialised with.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads and the
        // shared handle initialises at most once per process.
        unsafe {
            std::env::set_var("PG_PASSWORD", "catalog_embedded_test");
        }
    }
}

/// Points the bootstrap at this package's `pg_worker` helper, which it runs
/// to drop privileges when the tests execute as root.
pub fn ensure_worker_binary() {
    if std::env::var_os("PG_EMBEDDED_WORKER").is_none() {
        // SAFETY: same single-threaded window as `ensure_stable_password`.
        unsafe {
            std::env::set_var("PG_EMBEDDED_WORKER", env!("CARGO_BIN_EXE_pg_worker"));
        }
    }
}

pub mod builders;
pub mod fake_executor;
pub mod fake_worker;

use std::sync::Once;
use std::time::Duration;

use tokio_stream::{Stream, StreamExt};
use tracing_subscriber::{fmt, EnvFilter};
use workchain::work::{WorkInfo, WorkState};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Pull snapshots from `updates` until one satisfies `pred`, and return it.
///
/// Panics after 5 seconds or if the stream ends first.
pub async fn wait_for<S, P>(updates: &mut S, mut pred: P) -> Vec<WorkInfo>
where
    S: Stream<Item = Vec<WorkInfo>> + Unpin,
    P: FnMut(&[WorkInfo]) -> bool,
{
    with_timeout(async {
        while let Some(units) = updates.next().await {
            if pred(&units) {
                return units;
            }
        }
        panic!("status stream ended before the condition was met");
    })
    .await
}

/// Unit states in snapshot order.
pub fn states(units: &[WorkInfo]) -> Vec<WorkState> {
    units.iter().map(|u| u.state).collect()
}

/// `true` if every unit in `units` is in a terminal state.
pub fn all_finished(units: &[WorkInfo]) -> bool {
    !units.is_empty() && units.iter().all(|u| u.state.is_finished())
}

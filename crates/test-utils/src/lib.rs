pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use nowcast::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// How long a manager run may take in a test before it counts as hung.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(5);

/// Send manager and worker logs to the test writer, filtered like the
/// manager itself: `NOWCAST_LOG=nowcast=debug cargo test -- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .init();
    });
}

/// Await a manager run, failing the test if workers never stop reporting.
pub async fn with_timeout<F, T>(run: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(RUN_TIMEOUT, run).await {
        Ok(out) => out,
        Err(_) => panic!("manager still running after {RUN_TIMEOUT:?}; a launch never reported"),
    }
}

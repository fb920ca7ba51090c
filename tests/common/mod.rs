#![allow(dead_code)]

use std::sync::Once;

use cmdloop::resource::{ResourceId, ResourceSet};
use tracing_subscriber::{EnvFilter, fmt};

pub use cmdloop_test_utils::{builders, with_timeout};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=cmdloop=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

pub fn set(resources: &[ResourceId]) -> ResourceSet {
    resources.iter().copied().collect()
}

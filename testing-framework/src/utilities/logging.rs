use env_logger::{Builder, Env};

/// Route `log` output through the test harness
///
/// The level comes from `RUST_LOG` (default `warn`). Safe to call from every
/// test: only the first call installs the logger.
pub fn init_test_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

// File: testing-framework/src/utilities/mod.rs
//
// Testing Utilities
//
// Log setup and ready-made fixtures shared by contract test suites.

/// env_logger setup for tests
pub mod logging;

/// Signed-message and funded-account fixtures
pub mod fixtures;

// Re-export commonly used utilities
pub use fixtures::{fund_wallet, signed_message_fixture};
pub use logging::init_test_logging;

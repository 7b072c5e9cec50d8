pub mod aggregate;
pub mod charts;
pub mod cli;
pub mod compare;
pub mod config;
pub mod config_cmd;
pub mod data;
pub mod defaults;
pub mod filter;
pub mod loader;
pub mod reporting;
pub mod stats;
pub mod summary_text;
pub mod tables;
pub mod units;

// Test helpers module - made public for use in unit tests, integration tests, and benchmarks
// This is conditionally compiled to avoid including test code in release builds
#[doc(hidden)]
#[cfg(any(test, doctest, feature = "test-helpers"))]
pub mod test_helpers;

//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// voxelforge::core::logging::init();
/// log::info!("Editor session started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
}

/// Initialize logging for tests
///
/// Safe to call from multiple tests; repeated initialization is ignored.
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    )
    .is_test(true)
    .try_init();
}

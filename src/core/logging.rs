//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// sylva::core::logging::init();
/// log::info!("generation started");
/// ```
pub fn init() {
    init_with("info");
}

/// Initialize with an explicit default filter, for tools that want a
/// different baseline than `info`.
pub fn init_with(default_filter: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter)
    ).init();
}

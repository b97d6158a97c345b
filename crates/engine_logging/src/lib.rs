#![deny(missing_docs)]
//! Shared logging utilities for the crawler workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line carries
//! the tag of the thread that emitted it, so interleaved output from workers
//! and dispatchers of different partitions stays readable.

use std::cell::RefCell;

const DEFAULT_TAG: &str = "main";

thread_local! {
    /// Thread-local name of the engine thread, e.g. `sport/worker-1`.
    static WORKER_TAG: RefCell<String> = RefCell::new(DEFAULT_TAG.to_string());
}

/// Sets the tag prefixed to every line logged from the current thread.
/// Engine threads call this once, right after they are spawned.
pub fn set_worker_tag(tag: impl Into<String>) {
    let tag = tag.into();
    WORKER_TAG.with(|v| *v.borrow_mut() = tag);
}

/// Retrieves the tag of the current thread.
/// Returns `main` if the tag has not been set.
pub fn worker_tag() -> String {
    WORKER_TAG.with(|v| v.borrow().clone())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[{}] {}", $crate::worker_tag(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("[{}] {}", $crate::worker_tag(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[{}] {}", $crate::worker_tag(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("[{}] {}", $crate::worker_tag(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("[{}] {}", $crate::worker_tag(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

//! Configuration and logging setup for the `frontier` binary.
pub mod config;
pub mod logging;

pub use config::AppConfig;
pub use logging::LogDestination;

//! Utility modules for drone-trigger

pub mod logging;

pub use logging::{init_logging, LoggingConfig};

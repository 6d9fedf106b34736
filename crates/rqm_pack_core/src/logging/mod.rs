//! Logging infrastructure for rqm-pack.
//!
//! This module provides:
//! - A per-build logger with optional file + callback output
//! - Compact mode that keeps per-file chatter in a tail buffer
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use rqm_pack_core::logging::{BuildLogger, LogConfig};
//!
//! let logger = BuildLogger::new("render_queue_manager_x", Some("/tmp/logs".as_ref()), LogConfig::default(), None).unwrap();
//! logger.phase("Stage");
//! logger.success("Archive written");
//! ```

mod build_logger;
mod types;

pub use build_logger::BuildLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// - Respects the RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Should be called once at startup. Later calls are ignored.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

//! Logging macros.
//!
//! Thin wrappers over `tracing` so call sites stay short and every diagnostic
//! from this crate lands under the `roomchat` target.

/// Target every macro below logs under.
pub const LOG_TARGET: &str = "roomchat";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "roomchat=info";

pub fn log_info_impl(msg: &str) {
    tracing::info!(target: LOG_TARGET, "{}", msg);
}

pub fn log_error_impl(msg: &str) {
    tracing::error!(target: LOG_TARGET, "{}", msg);
}

pub fn log_warn_impl(msg: &str) {
    tracing::warn!(target: LOG_TARGET, "{}", msg);
}

pub fn log_debug_impl(msg: &str) {
    tracing::debug!(target: LOG_TARGET, "{}", msg);
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used. Safe to call
/// more than once, later calls are ignored.
pub fn init(default_filter: &str) {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log an info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::log_info_impl(&format!($($arg)*))
    };
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::log_error_impl(&format!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::log_warn_impl(&format!($($arg)*))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::log_debug_impl(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn default_filter_covers_log_target() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert_eq!(DEFAULT_FILTER.split('=').next(), Some(LOG_TARGET));
    }
}

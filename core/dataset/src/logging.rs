//! FILENAME: core/dataset/src/logging.rs
// PURPOSE: Category logging macros shared by every crate in the workspace.
// CONTEXT: The category becomes the `log` target, so the installed backend
// can print it as the CATEGORY field of the unified `seq|LEVEL|CATEGORY|message` line.

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::debug!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::info!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::warn!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::error!(target: $cat, $($arg)*)
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::log::debug!(target: $cat, "ENTER {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::log::debug!(target: $cat, "ENTER {} {}", $func, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::log::debug!(target: $cat, "EXIT {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::log::debug!(target: $cat, "EXIT {} {}", $func, format!($($arg)*))
    };
}

pub use crate::log_debug;
pub use crate::log_enter;
pub use crate::log_error;
pub use crate::log_exit;
pub use crate::log_info;
pub use crate::log_warn;

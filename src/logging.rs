//! Operational diagnostics, kept separate from the protocol trace in
//! [`crate::logger`]. `env_logger`-backed, with thin wrappers around the
//! `log` crate's macros guarded by `log_enabled!` to avoid formatting costs
//! when a level is disabled.

use log::Level;

/// Initializes the `env_logger` backend. Safe to call once at startup;
/// respects `RUST_LOG`.
pub fn init() {
    env_logger::init();
}

pub fn log_error(message: &str) {
    if log::log_enabled!(Level::Error) {
        log::error!("{message}");
    }
}

pub fn log_info(message: &str) {
    if log::log_enabled!(Level::Info) {
        log::info!("{message}");
    }
}

use crate::{
    app::constant::{PKG_NAME, PKG_VERSION},
    common::utils::parse_from_env,
};
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

/// Control debug mode switch, read from environment variable "DEBUG", default to false
pub static DEBUG: LazyLock<bool> = LazyLock::new(|| parse_from_env("DEBUG", false));

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; without it the level is `debug` when `DEBUG` is on and
/// `warn` otherwise. Output goes to stderr so stdout stays free for the text
/// stream. Calling it again is a no-op.
pub fn init() {
    let default_level = if *DEBUG { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(name = PKG_NAME, version = PKG_VERSION, "logging initialized");
    }
}

/// Debug log macro
///
/// Only records when `DEBUG` is on; forwards to `tracing::debug!`.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if *$crate::app::lazy::log::DEBUG {
            ::tracing::debug!($($arg)*);
        }
    };
}

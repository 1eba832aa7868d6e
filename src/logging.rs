//! Tracing setup for the interactive binary
//!
//! The terminal runs in raw mode, so log lines go to
//! `~/.config/keychain/logs/keychain.log` instead of the console.
//! Filter with `RUST_LOG`, e.g. `RUST_LOG=keychain=debug` to see every
//! registered binding and keychain decision.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::logs_dir;

/// Initialize the tracing subscriber with a file layer
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = logs_dir()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .map(|dir| {
            let file_appender = tracing_appender::rolling::never(dir, "keychain.log");
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter)
        });

    tracing_subscriber::registry().with(file_layer).init();
}

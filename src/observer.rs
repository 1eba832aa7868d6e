//! Diagnostics hooks for the interpreter
//!
//! The matcher never logs on its own. It reports through a [`KeyObserver`],
//! which the host picks: [`TracingObserver`] for normal runs, [`NullObserver`]
//! to silence everything, or a recording implementation in tests.

/// Receives debug and warning messages from the binding table and parser
pub trait KeyObserver {
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards messages to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl KeyObserver for TracingObserver {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "keychain", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "keychain", "{}", message);
    }
}

/// Discards all messages
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl KeyObserver for NullObserver {
    fn debug(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

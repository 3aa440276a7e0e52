//! Store middleware: hooks around every dispatch

use crate::Action;

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, persistence, or other
/// cross-cutting concerns to your store.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Middleware that logs actions through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %action.name(),
                state_changed = state_changed,
                "Action processed"
            );
        }
    }
}

/// Middleware that records action names, in dispatch order
///
/// Handy in tests that need to check which actions reached the store.
#[derive(Debug, Clone, Default)]
pub struct RecordingMiddleware {
    names: Vec<&'static str>,
}

impl RecordingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every action seen so far
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.names.clear();
    }
}

impl<A: Action> Middleware<A> for RecordingMiddleware {
    fn before(&mut self, action: &A) {
        self.names.push(action.name());
    }

    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

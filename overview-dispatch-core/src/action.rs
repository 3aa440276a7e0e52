//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: Query results travel back from spawned tasks
///
/// Use `#[derive(Action)]` from `overview-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Actions grouped by a category derived from their name.
///
/// `#[derive(Action)]` with `#[action(infer_categories)]` implements this:
/// `OverviewHostFetch` and `OverviewHostDidLoad` both land in `"overview_host"`.
pub trait ActionCategory: Action {
    /// Category name, or `None` for uncategorized actions
    fn category(&self) -> Option<&'static str>;

    /// Whether this action carries the result of async work (`*Did*` naming)
    fn is_async_result(&self) -> bool {
        self.name().contains("Did")
    }
}

//! overview-dispatch: async data binding and render testing for ratatui widgets
//!
//! Widgets render purely from state; queries run as effects through an
//! injected [`Transport`], and tests swap in a [`MockTransport`] answering
//! from registered responses.
//!
//! # Example
//! ```ignore
//! use overview_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum Action {
//!     OverviewHostFetch { range: TimeRange },
//!     OverviewHostDidLoad { data: OverviewHostData },
//! }
//!
//! let instance = create_store(&baseline, reducer, NoopMiddleware, deps);
//! let mut runtime = EffectRuntime::from_instance(instance, handle_effect);
//! runtime.dispatch(Action::OverviewHostFetch { range });
//! runtime.settle().await;
//! ```

// Re-export everything from core
pub use overview_dispatch_core::*;

// Re-export derive macros
pub use overview_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use overview_dispatch_core::{Action, ActionCategory, Component, Storage, Transport};

    // Store
    pub use overview_dispatch_core::{
        create_store, DispatchResult, EffectContext, EffectRuntime, EffectStoreWithMiddleware,
        EventKind, EventOutcome, LoggingMiddleware, Middleware, NoopMiddleware, StoreDeps,
        UiSettings,
    };

    // Queries
    pub use overview_dispatch_core::{
        fetch, FetchPolicy, QueryDocument, QueryRequest, QueryState, TaskKey, TimeRange,
    };

    pub use overview_dispatch_core::test_subj;

    // Derive macros
    pub use overview_dispatch_macros::Action;

    // Ratatui re-exports
    pub use overview_dispatch_core::{Color, Frame, Line, Modifier, Rect, Span, Style, Text};
}

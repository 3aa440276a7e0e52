//! Core traits and types for overview-dispatch
//!
//! This crate provides the building blocks for data-bound terminal widgets
//! with centralized state management, following a Redux/Elm-inspired
//! architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Events that describe state changes
//! - **EffectStore**: State container whose reducer returns effects
//! - **Store factory**: Isolated stores built from a cloned baseline plus
//!   injected collaborators
//! - **Transport**: The seam a query client plugs into; [`MockTransport`]
//!   answers from registered responses
//! - **Component**: Pure UI elements that render based on props and tag
//!   their regions with [`test_subj`]
//!
//! # Async Query Pattern
//!
//! Queries use a two-phase action pattern:
//!
//! 1. **Intent actions** put the widget in a pending state and return an
//!    effect (e.g., `OverviewHostFetch`)
//! 2. **Result actions** carry the outcome back (e.g., `OverviewHostDidLoad`,
//!    `OverviewHostDidError`)
//!
//! ```ignore
//! fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
//!     match action {
//!         Action::OverviewHostFetch { range } => {
//!             state.overview_host = QueryState::Pending;
//!             DispatchResult::changed_with(Effect::QueryOverviewHost(range))
//!         }
//!         Action::OverviewHostDidLoad { data, .. } => {
//!             state.overview_host = QueryState::Loaded(data);
//!             DispatchResult::changed()
//!         }
//!         _ => DispatchResult::unchanged(),
//!     }
//! }
//!
//! fn handle_effect(effect: Effect, ctx: &mut EffectContext<'_, Action>) {
//!     match effect {
//!         Effect::QueryOverviewHost(range) => {
//!             let Some(transport) = ctx.transport() else { return };
//!             ctx.tasks().spawn("overviewHostQuery", async move {
//!                 match fetch(transport.as_ref(), request).await {
//!                     Ok(data) => Action::OverviewHostDidLoad { data },
//!                     Err(e) => Action::OverviewHostDidError { message: e.to_string() },
//!                 }
//!             });
//!         }
//!     }
//! }
//! ```
//!
//! The `Did*` naming convention clearly identifies result actions. With
//! `#[action(infer_categories)]`, these are automatically grouped (e.g.,
//! `OverviewHostFetch` and `OverviewHostDidLoad` both get category
//! `"overview_host"`).

pub mod action;
pub mod component;
pub mod effect;
pub mod event;
pub mod factory;
pub mod mock;
pub mod query;
pub mod runtime;
pub mod storage;
pub mod store;
pub mod subject;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory};
pub use component::Component;

// Event exports
pub use event::{spawn_event_poller, EventKind, PollerConfig};

// Store exports
pub use store::{LoggingMiddleware, Middleware, NoopMiddleware, RecordingMiddleware};

// Effect exports
pub use effect::{DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware};

// Factory exports
pub use factory::{
    create_store, create_store_from_json, Observable, StoreDeps, StoreError, StoreInstance,
    UiSettings,
};

// Query exports
pub use mock::{MockOutcome, MockTransport, MockedResponse};
pub use query::{
    fetch, FetchPolicy, QueryDocument, QueryError, QueryRequest, QueryResponse, QueryState,
    TimeRange, TimeRangeError, Transport,
};

// Runtime exports
pub use runtime::{EffectContext, EffectHandler, EffectRuntime, EventOutcome};
pub use storage::{MemoryStorage, Storage, StorageCall};
pub use subject::{capture_subjects, test_subj, Subject};
pub use tasks::{TaskKey, TaskManager};

// Re-export ratatui types for convenience
pub use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    Frame,
};

// Testing exports
pub use testing::{
    buffer_rect_to_string_plain, char_key, key_event, Element, RenderHarness, RenderedView,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory};
    pub use crate::component::Component;
    pub use crate::effect::{
        DispatchResult, EffectReducer, EffectStore, EffectStoreWithMiddleware,
    };
    pub use crate::event::EventKind;
    pub use crate::factory::{create_store, StoreDeps, UiSettings};
    pub use crate::query::{fetch, FetchPolicy, QueryRequest, QueryState, TimeRange, Transport};
    pub use crate::runtime::{EffectContext, EffectRuntime, EventOutcome};
    pub use crate::storage::Storage;
    pub use crate::store::{LoggingMiddleware, Middleware, NoopMiddleware};
    pub use crate::subject::test_subj;
    pub use crate::tasks::{TaskKey, TaskManager};

    // Re-export ratatui types
    pub use ratatui::{
        layout::Rect,
        style::{Color, Modifier, Style},
        text::{Line, Span, Text},
        Frame,
    };
}

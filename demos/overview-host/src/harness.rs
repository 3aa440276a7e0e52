//! Test providers for the Host events widget
//!
//! Composes a fresh store (cloned from the baseline), an optional mock
//! transport and the widget, and renders into a test buffer.
//!
//! ```ignore
//! let mut harness = OverviewHostHarness::with_mocks(overview_host_mocks(&range)?);
//! let first = harness.mount(range);
//! assert_eq!(first.text(SUBTITLE_SUBJ), "");
//!
//! let settled = harness.settle().await;
//! assert_eq!(settled.text(SUBTITLE_SUBJ), "Showing: 16 events");
//! ```

use std::sync::Arc;
use std::time::Duration;

use overview_dispatch::testing::{RenderHarness, RenderedView};
use overview_dispatch::{
    create_store, EffectRuntime, MemoryStorage, MockTransport, MockedResponse,
    RecordingMiddleware, StoreDeps, TimeRange,
};

use crate::action::Action;
use crate::app::OverviewUi;
use crate::effect::{handle_effect, Effect};
use crate::mock::{create_storage_mock, mock_global_state, mock_ui_settings};
use crate::reducer::reducer;
use crate::state::AppState;

pub const HARNESS_WIDTH: u16 = 48;
pub const HARNESS_HEIGHT: u16 = 28;

pub struct OverviewHostHarness {
    runtime: EffectRuntime<AppState, Action, Effect, RecordingMiddleware>,
    renderer: RenderHarness,
    ui: OverviewUi,
    transport: Option<MockTransport>,
    storage: Arc<MemoryStorage>,
}

impl OverviewHostHarness {
    /// Store only: no query client is installed, so queries stay pending.
    pub fn new() -> Self {
        Self::build(&mock_global_state(), None)
    }

    /// Store plus a mock transport answering from `mocks`.
    pub fn with_mocks(mocks: Vec<MockedResponse>) -> Self {
        Self::build(&mock_global_state(), Some(MockTransport::new(mocks)))
    }

    /// Store built from `baseline` instead of the default fixture state.
    pub fn from_baseline(baseline: &AppState, transport: Option<MockTransport>) -> Self {
        Self::build(baseline, transport)
    }

    fn build(baseline: &AppState, transport: Option<MockTransport>) -> Self {
        let storage = create_storage_mock();
        let mut deps = StoreDeps::new(storage.clone()).with_settings(mock_ui_settings());
        if let Some(transport) = &transport {
            deps = deps.with_client(Arc::new(transport.clone()));
        }

        let instance = create_store(baseline, reducer, RecordingMiddleware::new(), deps);
        Self {
            runtime: EffectRuntime::from_instance(instance, handle_effect)
                .with_settle_timeout(Duration::from_secs(1)),
            renderer: RenderHarness::new(HARNESS_WIDTH, HARNESS_HEIGHT),
            ui: OverviewUi::new(),
            transport,
            storage,
        }
    }

    /// Bind the widget to `range` and render the first frame synchronously.
    ///
    /// Actions the effects emitted on the spot (the registry update) are
    /// applied first; query results can only arrive after a yield.
    pub fn mount(&mut self, range: TimeRange) -> RenderedView {
        self.runtime.dispatch(Action::OverviewHostFetch { range });
        self.runtime.flush();
        self.render()
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        let changed = self.runtime.dispatch(action);
        self.runtime.flush();
        changed
    }

    /// Let pending queries resolve, then render.
    pub async fn settle(&mut self) -> RenderedView {
        self.runtime.settle().await;
        self.render()
    }

    /// Process updates until `check` passes or `timeout` elapses, then render.
    pub async fn wait_for(
        &mut self,
        timeout: Duration,
        check: impl FnMut(&AppState) -> bool,
    ) -> (bool, RenderedView) {
        let passed = self.runtime.wait_for(timeout, check).await;
        (passed, self.render())
    }

    pub fn render(&mut self) -> RenderedView {
        let ui = &mut self.ui;
        let state = self.runtime.state();
        self.renderer.render(|frame| ui.render(frame, frame.area(), state))
    }

    pub fn state(&self) -> &AppState {
        self.runtime.state()
    }

    pub fn transport(&self) -> Option<&MockTransport> {
        self.transport.as_ref()
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Names of every action dispatched so far.
    pub fn action_names(&self) -> &[&'static str] {
        self.runtime.middleware().names()
    }
}

impl Default for OverviewHostHarness {
    fn default() -> Self {
        Self::new()
    }
}

//! Effect runtime: store + effects + tasks + action channel
//!
//! The runtime owns a store built by [`create_store`](crate::factory::create_store),
//! turns reducer effects into tasks through an [`EffectHandler`], and feeds
//! task results back into the store. It runs in two modes:
//!
//! - [`EffectRuntime::run`] drives a real terminal until a quit action.
//! - [`EffectRuntime::settle`] flushes pending work cooperatively, which is
//!   what tests use between "mount" and "assert".

use std::io;
use std::time::Duration;

use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::event::{spawn_event_poller, EventKind, PollerConfig};
use crate::factory::{StoreDeps, StoreInstance};
use crate::query::Transport;
use crate::store::Middleware;
use crate::tasks::TaskManager;
use crate::{Action, EffectStoreWithMiddleware};

/// How long [`EffectRuntime::settle`] waits on a silent task before giving up.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of mapping an event into actions plus an optional render hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome<A> {
    pub actions: Vec<A>,
    pub needs_render: bool,
}

impl<A> EventOutcome<A> {
    /// No actions and no render.
    pub fn ignored() -> Self {
        Self {
            actions: Vec::new(),
            needs_render: false,
        }
    }

    pub fn action(action: A) -> Self {
        Self {
            actions: vec![action],
            needs_render: false,
        }
    }

    /// Mark that a render is needed.
    pub fn with_render(mut self) -> Self {
        self.needs_render = true;
        self
    }
}

impl<A> Default for EventOutcome<A> {
    fn default() -> Self {
        Self::ignored()
    }
}

impl<A> From<Option<A>> for EventOutcome<A> {
    fn from(action: Option<A>) -> Self {
        match action {
            Some(action) => Self::action(action),
            None => Self::ignored(),
        }
    }
}

/// Context passed to effect handlers.
pub struct EffectContext<'a, A: Action> {
    action_tx: &'a mpsc::UnboundedSender<A>,
    tasks: &'a mut TaskManager<A>,
    deps: &'a StoreDeps,
}

impl<'a, A: Action> EffectContext<'a, A> {
    /// Send an action directly.
    pub fn emit(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// A sender a spawned task can keep to report progress before it ends.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    pub fn tasks(&mut self) -> &mut TaskManager<A> {
        self.tasks
    }

    pub fn deps(&self) -> &StoreDeps {
        self.deps
    }

    /// The query client currently installed in the store's collaborators.
    pub fn transport(&self) -> Option<std::sync::Arc<dyn Transport>> {
        self.deps.transport()
    }
}

/// Turns one effect into tasks or direct actions.
pub type EffectHandler<E, A> = fn(E, &mut EffectContext<'_, A>);

/// Runtime for effect-based stores.
pub struct EffectRuntime<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    store: EffectStoreWithMiddleware<S, A, E, M>,
    deps: StoreDeps,
    handle_effect: EffectHandler<E, A>,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    tasks: TaskManager<A>,
    poller_config: PollerConfig,
    settle_timeout: Duration,
    should_render: bool,
}

impl<S, A, E, M> EffectRuntime<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    /// Wrap a store built by the factory.
    pub fn from_instance(instance: StoreInstance<S, A, E, M>, handle_effect: EffectHandler<E, A>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let tasks = TaskManager::new(action_tx.clone());
        Self {
            store: instance.store,
            deps: instance.deps,
            handle_effect,
            action_tx,
            action_rx,
            tasks,
            poller_config: PollerConfig::default(),
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            should_render: true,
        }
    }

    pub fn with_event_poller(mut self, config: PollerConfig) -> Self {
        self.poller_config = config;
        self
    }

    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn deps(&self) -> &StoreDeps {
        &self.deps
    }

    pub fn middleware(&self) -> &M {
        self.store.middleware()
    }

    pub fn tasks(&self) -> &TaskManager<A> {
        &self.tasks
    }

    /// Queue an action for the next flush.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    pub fn action_tx(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    /// Dispatch an action now and run the effects it produces.
    ///
    /// Effects only spawn tasks; nothing they start can resolve before the
    /// caller yields. Returns whether state changed.
    pub fn dispatch(&mut self, action: A) -> bool {
        let result = self.store.dispatch(action);
        if result.has_effects() {
            let handle = self.handle_effect;
            let mut ctx = EffectContext {
                action_tx: &self.action_tx,
                tasks: &mut self.tasks,
                deps: &self.deps,
            };
            for effect in result.effects {
                handle(effect, &mut ctx);
            }
        }
        if result.changed {
            self.should_render = true;
        }
        result.changed
    }

    /// Dispatch every action already queued. Returns how many were handled.
    pub fn flush(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            self.dispatch(action);
            processed += 1;
        }
        processed
    }

    /// Let every pending update complete.
    ///
    /// Yields to the scheduler, dispatches task results as they arrive and
    /// stops once no task is running and no action is queued. A task that
    /// stays silent for longer than the settle timeout ends the wait.
    pub async fn settle(&mut self) -> usize {
        let mut processed = 0;
        loop {
            processed += self.flush();
            self.tasks.prune_finished();

            if self.tasks.is_empty() {
                tokio::task::yield_now().await;
                let late = self.flush();
                processed += late;
                if late == 0 {
                    break;
                }
                continue;
            }

            match tokio::time::timeout(self.settle_timeout, self.action_rx.recv()).await {
                Ok(Some(action)) => {
                    self.dispatch(action);
                    processed += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        running = self.tasks.running_keys().count(),
                        "Settle timed out with tasks still running"
                    );
                    break;
                }
            }
        }
        tracing::trace!(processed, "Runtime settled");
        processed
    }

    /// Process updates until `check` passes or `timeout` elapses.
    ///
    /// Returns whether the check passed.
    pub async fn wait_for(&mut self, timeout: Duration, mut check: impl FnMut(&S) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.flush();
            if check(self.store.state()) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match tokio::time::timeout(deadline - now, self.action_rx.recv()).await {
                Ok(Some(action)) => {
                    self.dispatch(action);
                }
                Ok(None) | Err(_) => return check(self.store.state()),
            }
        }
    }

    /// Whether a dispatch changed state since the last call.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.should_render)
    }

    /// Run the event/action loop until `should_quit` accepts an action.
    pub async fn run<B, FRender, FEvent, FQuit>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut render: FRender,
        mut map_event: FEvent,
        mut should_quit: FQuit,
    ) -> io::Result<()>
    where
        B: Backend,
        FRender: FnMut(&mut Frame, Rect, &S),
        FEvent: FnMut(&EventKind, &S) -> EventOutcome<A>,
        FQuit: FnMut(&A) -> bool,
    {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<EventKind>();
        let cancel_token = CancellationToken::new();
        let _handle = spawn_event_poller(event_tx, self.poller_config, cancel_token.clone());

        loop {
            if self.take_render_request() {
                let state = self.store.state();
                terminal.draw(|frame| render(frame, frame.area(), state))?;
            }

            tokio::select! {
                Some(event) = event_rx.recv() => {
                    let outcome = map_event(&event, self.store.state());
                    if outcome.needs_render {
                        self.should_render = true;
                    }
                    for action in outcome.actions {
                        let _ = self.action_tx.send(action);
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    if should_quit(&action) {
                        break;
                    }
                    self.dispatch(action);
                }

                else => {
                    break;
                }
            }
        }

        cancel_token.cancel();
        self.tasks.cancel_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DispatchResult;
    use crate::factory::create_store;
    use crate::store::RecordingMiddleware;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Fetch(u64),
        DidLoad(u64),
        Bump,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Fetch(_) => "Fetch",
                TestAction::DidLoad(_) => "DidLoad",
                TestAction::Bump => "Bump",
            }
        }
    }

    #[derive(Debug, Clone)]
    enum TestEffect {
        Load(u64),
        LoadSlow(u64),
        LoadWithProgress(u64),
        Emit,
    }

    #[derive(Debug, Clone, Default)]
    struct TestState {
        pending: bool,
        total: Option<u64>,
        bumps: u32,
    }

    fn reducer(state: &mut TestState, action: TestAction) -> DispatchResult<TestEffect> {
        match action {
            TestAction::Fetch(0) => DispatchResult::effect(TestEffect::Emit),
            TestAction::Fetch(1) => DispatchResult::effect(TestEffect::LoadWithProgress(1)),
            TestAction::Fetch(n) if n > 100 => {
                state.pending = true;
                DispatchResult::changed_with(TestEffect::LoadSlow(n))
            }
            TestAction::Fetch(n) => {
                state.pending = true;
                DispatchResult::changed_with(TestEffect::Load(n))
            }
            TestAction::DidLoad(n) => {
                state.pending = false;
                state.total = Some(n);
                DispatchResult::changed()
            }
            TestAction::Bump => {
                state.bumps += 1;
                DispatchResult::changed()
            }
        }
    }

    fn handle_effect(effect: TestEffect, ctx: &mut EffectContext<'_, TestAction>) {
        match effect {
            TestEffect::Load(n) => {
                ctx.tasks().spawn("load", async move {
                    tokio::task::yield_now().await;
                    TestAction::DidLoad(n)
                });
            }
            TestEffect::LoadSlow(n) => {
                ctx.tasks().spawn("load", async move {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    TestAction::DidLoad(n)
                });
            }
            TestEffect::LoadWithProgress(n) => {
                let tx = ctx.sender();
                ctx.tasks().spawn("load", async move {
                    let _ = tx.send(TestAction::Bump);
                    tokio::task::yield_now().await;
                    TestAction::DidLoad(n)
                });
            }
            TestEffect::Emit => ctx.emit(TestAction::Bump),
        }
    }

    fn runtime() -> EffectRuntime<TestState, TestAction, TestEffect, RecordingMiddleware> {
        let instance = create_store(
            &TestState::default(),
            reducer,
            RecordingMiddleware::new(),
            StoreDeps::default(),
        );
        EffectRuntime::from_instance(instance, handle_effect)
    }

    #[tokio::test]
    async fn test_dispatch_does_not_resolve_synchronously() {
        let mut runtime = runtime();

        assert!(runtime.dispatch(TestAction::Fetch(16)));
        assert!(runtime.state().pending);
        assert_eq!(runtime.flush(), 0);
        assert_eq!(runtime.state().total, None);
    }

    #[tokio::test]
    async fn test_settle_resolves_tasks() {
        let mut runtime = runtime();
        runtime.dispatch(TestAction::Fetch(16));

        let processed = runtime.settle().await;

        assert_eq!(processed, 1);
        assert_eq!(runtime.state().total, Some(16));
        assert!(!runtime.state().pending);
        assert!(runtime.tasks().is_empty());
        assert_eq!(runtime.middleware().names(), &["Fetch", "DidLoad"]);
    }

    #[tokio::test]
    async fn test_settle_dispatches_emitted_actions() {
        let mut runtime = runtime();
        runtime.dispatch(TestAction::Fetch(0));

        runtime.settle().await;
        assert_eq!(runtime.state().bumps, 1);
    }

    #[tokio::test]
    async fn test_task_progress_arrives_before_result() {
        let mut runtime = runtime();
        runtime.dispatch(TestAction::Fetch(1));

        runtime.settle().await;

        assert_eq!(runtime.state().bumps, 1);
        assert_eq!(runtime.state().total, Some(1));
        assert_eq!(runtime.middleware().names(), &["Fetch", "Bump", "DidLoad"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_gives_up_on_silent_tasks() {
        let mut runtime = runtime().with_settle_timeout(Duration::from_millis(50));
        runtime.dispatch(TestAction::Fetch(500));

        runtime.settle().await;
        assert!(runtime.state().pending);
    }

    #[tokio::test]
    async fn test_wait_for() {
        let mut runtime = runtime();
        runtime.dispatch(TestAction::Fetch(3));

        let loaded = runtime
            .wait_for(Duration::from_millis(500), |s| s.total == Some(3))
            .await;
        assert!(loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out() {
        let mut runtime = runtime();
        runtime.dispatch(TestAction::Fetch(500));

        let loaded = runtime
            .wait_for(Duration::from_millis(100), |s| s.total.is_some())
            .await;
        assert!(!loaded);
    }

    #[tokio::test]
    async fn test_render_request_tracking() {
        let mut runtime = runtime();
        assert!(runtime.take_render_request(), "first render is always requested");
        assert!(!runtime.take_render_request());

        runtime.enqueue(TestAction::Bump);
        runtime.flush();
        assert!(runtime.take_render_request());
    }
}

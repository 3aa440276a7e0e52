//! Reducer - (state, action) -> (changed, effects)
//!
//! Results are accepted only for the range the widget is currently bound
//! to; anything else is a stale answer and is dropped.

use overview_dispatch::{DispatchResult, QueryState, TimeRange};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::OverviewHostFetch { range } => {
            let rebound = state.timerange() != Some(&range);
            state.inputs.global.timerange = Some(range.clone());
            let result = issue_query(state, range.clone());
            if rebound {
                result.with(Effect::PersistTimerange { range })
            } else {
                result
            }
        }

        Action::OverviewHostRefetch => match state.timerange().cloned() {
            Some(range) => issue_query(state, range),
            None => DispatchResult::unchanged(),
        },

        Action::OverviewHostDidLoad { range, data } => {
            if state.timerange() != Some(&range) {
                tracing::debug!(%range, "Dropping stale overview host result");
                return DispatchResult::unchanged();
            }
            state.overview_host.data = QueryState::Loaded(data);
            DispatchResult::changed()
        }

        Action::OverviewHostDidError { range, message } => {
            if state.timerange() != Some(&range) {
                tracing::debug!(%range, "Dropping stale overview host error");
                return DispatchResult::unchanged();
            }
            state.overview_host.data = QueryState::Failed(message);
            DispatchResult::changed()
        }

        Action::InputsSetQuery { id, loading } => {
            if state.inputs.global.query(&id).is_some_and(|q| q.loading == loading) {
                return DispatchResult::unchanged();
            }
            state.inputs.global.set_query(&id, loading);
            DispatchResult::changed()
        }

        // Quit is handled in the main loop, not here
        Action::Quit => DispatchResult::unchanged(),
    }
}

fn issue_query(state: &mut AppState, range: TimeRange) -> DispatchResult<Effect> {
    state.overview_host.data = QueryState::Pending;
    DispatchResult::changed_with(Effect::QueryOverviewHost { range })
}

//! Application state - single source of truth
//!
//! Serializable so a baseline snapshot can be kept as JSON and cloned into
//! every store.

use overview_dispatch::{QueryState, TimeRange};
use serde::{Deserialize, Serialize};

use crate::query::OverviewHostData;

/// A query reported upward by a widget (the inputs query registry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalQuery {
    pub id: String,
    pub loading: bool,
}

/// Global inputs shared by every overview widget.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInput {
    /// Range the widgets are bound to (None = nothing mounted yet)
    pub timerange: Option<TimeRange>,
    pub queries: Vec<GlobalQuery>,
}

impl GlobalInput {
    /// Insert or update a registry entry.
    pub fn set_query(&mut self, id: &str, loading: bool) {
        match self.queries.iter_mut().find(|query| query.id == id) {
            Some(query) => query.loading = loading,
            None => self.queries.push(GlobalQuery {
                id: id.to_string(),
                loading,
            }),
        }
    }

    pub fn query(&self, id: &str) -> Option<&GlobalQuery> {
        self.queries.iter().find(|query| query.id == id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputsState {
    pub global: GlobalInput,
}

/// Everything the Host events widget renders from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewHostState {
    pub data: QueryState<OverviewHostData>,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub inputs: InputsState,
    pub overview_host: OverviewHostState,
}

impl AppState {
    /// Range the widget is currently bound to.
    pub fn timerange(&self) -> Option<&TimeRange> {
        self.inputs.global.timerange.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_query_upserts() {
        let mut input = GlobalInput::default();
        input.set_query("overviewHostQuery", true);
        input.set_query("overviewHostQuery", false);

        assert_eq!(input.queries.len(), 1);
        assert_eq!(
            input.query("overviewHostQuery"),
            Some(&GlobalQuery {
                id: "overviewHostQuery".into(),
                loading: false,
            })
        );
    }

    #[test]
    fn test_state_snapshot_round_trips() {
        let mut state = AppState::default();
        state.inputs.global.timerange = Some(
            TimeRange::parse("2020-01-20T20:49:57.080Z", "2020-01-21T20:49:57.080Z")
                .expect("valid range"),
        );
        state.overview_host.data = QueryState::Pending;

        let json = serde_json::to_string(&state).expect("serialize");
        let back: AppState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, state);
    }
}

//! Effects - side effects declared by the reducer
//!
//! The reducer stays pure; [`handle_effect`] turns effects into query tasks
//! and storage writes.

use overview_dispatch::{fetch, EffectContext, TimeRange};

use crate::action::Action;
use crate::query::{
    OverviewHostResponse, OverviewHostVariables, DEFAULT_INDEX_KEY, DEFAULT_INDEX_PATTERN,
    OVERVIEW_HOST_QUERY_ID,
};

/// Storage key of the last bound time range.
pub const TIMERANGE_STORAGE_KEY: &str = "securitySolution.timerange";

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue `GetOverviewHostQuery` for `range`
    QueryOverviewHost { range: TimeRange },
    /// Remember the bound range in storage
    PersistTimerange { range: TimeRange },
}

/// Handle effects by spawning tasks
///
/// The query reports its loading status to the inputs registry through
/// `InputsSetQuery`: loading when issued, idle once the transport answers.
pub fn handle_effect(effect: Effect, ctx: &mut EffectContext<'_, Action>) {
    match effect {
        Effect::QueryOverviewHost { range } => {
            ctx.emit(set_query(true));

            let Some(transport) = ctx.transport() else {
                tracing::debug!(%range, "No query client installed, overview host stays pending");
                return;
            };

            let default_index = ctx
                .deps()
                .settings
                .get()
                .get::<Vec<String>>(DEFAULT_INDEX_KEY)
                .unwrap_or_else(|| DEFAULT_INDEX_PATTERN.iter().map(|s| s.to_string()).collect());

            let request = match OverviewHostVariables::new(&range, default_index).request() {
                Ok(request) => request,
                Err(e) => {
                    ctx.emit(set_query(false));
                    ctx.emit(Action::OverviewHostDidError {
                        range,
                        message: e.to_string(),
                    });
                    return;
                }
            };

            let tx = ctx.sender();
            ctx.tasks().spawn(OVERVIEW_HOST_QUERY_ID, async move {
                let result = fetch::<OverviewHostResponse>(transport.as_ref(), request).await;
                let _ = tx.send(set_query(false));
                match result {
                    Ok(response) => Action::OverviewHostDidLoad {
                        range,
                        data: response.source.overview_host,
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Overview host query failed");
                        Action::OverviewHostDidError {
                            range,
                            message: e.to_string(),
                        }
                    }
                }
            });
        }
        Effect::PersistTimerange { range } => match serde_json::to_value(&range) {
            Ok(value) => ctx.deps().storage.set(TIMERANGE_STORAGE_KEY, value),
            Err(e) => tracing::warn!(error = %e, "Could not persist time range"),
        },
    }
}

fn set_query(loading: bool) -> Action {
    Action::InputsSetQuery {
        id: OVERVIEW_HOST_QUERY_ID.to_string(),
        loading,
    }
}

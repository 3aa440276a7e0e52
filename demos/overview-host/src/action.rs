//! Actions for the Host events overview
//!
//! - Prefix determines category: OverviewHostFetch, OverviewHostDidLoad -> "overview_host"
//! - "Did" marks the result of a query task

use overview_dispatch::TimeRange;

use crate::query::OverviewHostData;

#[derive(overview_dispatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum Action {
    /// Intent: bind the widget to a range and issue its query
    OverviewHostFetch { range: TimeRange },

    /// Intent: re-issue the query for the bound range
    OverviewHostRefetch,

    /// Result: query resolved for `range`
    OverviewHostDidLoad {
        range: TimeRange,
        data: OverviewHostData,
    },

    /// Result: query failed for `range`
    OverviewHostDidError { range: TimeRange, message: String },

    /// Report a query's loading status to the inputs registry
    InputsSetQuery { id: String, loading: bool },

    /// Exit the application
    Quit,
}

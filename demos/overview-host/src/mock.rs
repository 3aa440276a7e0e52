//! Fixture data: dates, the canned response and the mocked response table
//!
//! The request in [`overview_host_mocks`] must stay byte-for-byte what the
//! widget issues for [`START_DATE`]..[`END_DATE`]; otherwise it never matches.

use std::sync::Arc;

use overview_dispatch::{
    MemoryStorage, MockedResponse, QueryError, TimeRange, TimeRangeError, UiSettings,
};
use serde_json::{json, Value};

use crate::query::{OverviewHostVariables, DEFAULT_INDEX_KEY, DEFAULT_INDEX_PATTERN};
use crate::state::AppState;

pub const START_DATE: &str = "2020-01-20T20:49:57.080Z";
pub const END_DATE: &str = "2020-01-21T20:49:57.080Z";

/// The default index list as owned strings.
pub fn default_index() -> Vec<String> {
    DEFAULT_INDEX_PATTERN.iter().map(|s| s.to_string()).collect()
}

/// [`START_DATE`]..[`END_DATE`].
pub fn fixture_range() -> Result<TimeRange, TimeRangeError> {
    TimeRange::parse(START_DATE, END_DATE)
}

/// Response data with every one of the 16 categories set to 1.
pub fn overview_host_fixture_data() -> Value {
    json!({
        "source": {
            "id": "default",
            "OverviewHost": {
                "auditbeatAuditd": 1,
                "auditbeatFIM": 1,
                "auditbeatLogin": 1,
                "auditbeatPackage": 1,
                "auditbeatProcess": 1,
                "auditbeatUser": 1,
                "endgameDns": 1,
                "endgameFile": 1,
                "endgameImageLoad": 1,
                "endgameNetwork": 1,
                "endgameProcess": 1,
                "endgameRegistry": 1,
                "endgameSecurity": 1,
                "filebeatSystemModule": 1,
                "winlogbeatSecurity": 1,
                "winlogbeatMWSysmonOperational": 1,
            }
        }
    })
}

/// Variables the widget sends for `range` with the default index.
pub fn overview_host_variables(range: &TimeRange) -> OverviewHostVariables {
    OverviewHostVariables::new(range, default_index())
}

/// One registration answering the widget's query for `range`.
pub fn overview_host_mocks(range: &TimeRange) -> Result<Vec<MockedResponse>, QueryError> {
    let request = overview_host_variables(range).request()?;
    Ok(vec![MockedResponse::data(
        request,
        overview_host_fixture_data(),
    )])
}

/// Baseline global state every test store is cloned from.
pub fn mock_global_state() -> AppState {
    AppState::default()
}

/// UI settings carrying the default index list.
pub fn mock_ui_settings() -> UiSettings {
    UiSettings::new().with(DEFAULT_INDEX_KEY, json!(DEFAULT_INDEX_PATTERN))
}

/// Fresh storage mock recording every call.
pub fn create_storage_mock() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::OverviewHostResponse;
    use overview_dispatch::{FetchPolicy, MockOutcome};

    #[test]
    fn test_fixture_request_shape() {
        let range = fixture_range().expect("valid range");
        let mocks = overview_host_mocks(&range).expect("mocks");

        assert_eq!(mocks.len(), 1);
        let request = &mocks[0].request;
        assert_eq!(request.operation(), "GetOverviewHostQuery");
        assert_eq!(request.fetch_policy, FetchPolicy::CacheAndNetwork);
        assert_eq!(
            request.variables["timerange"],
            json!({ "interval": "12h", "from": START_DATE, "to": END_DATE })
        );
        assert!(request.variables.get("filterQuery").is_none());
    }

    #[test]
    fn test_fixture_data_sums_to_sixteen() {
        let range = fixture_range().expect("valid range");
        let mocks = overview_host_mocks(&range).expect("mocks");
        let MockOutcome::Data(data) = &mocks[0].outcome else {
            panic!("fixture resolves with data");
        };

        let response: OverviewHostResponse =
            serde_json::from_value(data.clone()).expect("decode");
        assert_eq!(response.source.overview_host.total(), 16);
    }

    #[test]
    fn test_mock_ui_settings_default_index() {
        let index: Option<Vec<String>> = mock_ui_settings().get(DEFAULT_INDEX_KEY);
        assert_eq!(index, Some(default_index()));
    }
}

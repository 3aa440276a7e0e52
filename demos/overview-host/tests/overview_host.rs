//! Host events widget mounted inside store + transport providers
//!
//! Every test builds its own store from a clone of the baseline state and
//! its own mock table; nothing is shared between tests.

use std::time::Duration;

use overview_dispatch::{
    FetchPolicy, MockTransport, MockedResponse, QueryDocument, QueryRequest, QueryState,
    StorageCall, TimeRange,
};
use overview_host::action::Action;
use overview_host::components::{STATS_SUBJ, SUBTITLE_SUBJ, TITLE_SUBJ};
use overview_host::effect::TIMERANGE_STORAGE_KEY;
use overview_host::harness::OverviewHostHarness;
use overview_host::mock::{
    fixture_range, mock_global_state, overview_host_fixture_data, overview_host_mocks,
    overview_host_variables, END_DATE, START_DATE,
};
use overview_host::query::{OVERVIEW_HOST_QUERY, OVERVIEW_HOST_QUERY_ID};
use serde_json::json;

fn range() -> TimeRange {
    fixture_range().expect("fixture range is valid")
}

fn mocks() -> Vec<MockedResponse> {
    overview_host_mocks(&range()).expect("fixture mocks")
}

fn mock_for(request: QueryRequest) -> MockedResponse {
    MockedResponse::data(request, overview_host_fixture_data())
}

// ===== Scenarios =====

#[tokio::test]
async fn it_renders_the_expected_widget_title() {
    let mut harness = OverviewHostHarness::new();

    let view = harness.mount(range());

    assert_eq!(view.text(TITLE_SUBJ), "Host events");
}

#[tokio::test]
async fn it_renders_an_empty_subtitle_while_loading() {
    let mut harness = OverviewHostHarness::new();

    let view = harness.mount(range());
    assert_eq!(view.text(SUBTITLE_SUBJ), "");

    // Without a query client the query never resolves
    let view = harness.settle().await;
    assert_eq!(view.text(SUBTITLE_SUBJ), "");
    assert!(harness.state().overview_host.data.is_pending());
}

#[tokio::test]
async fn it_renders_the_expected_event_count_after_loading_events() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());

    let view = harness.settle().await;

    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 16 events");
    assert_eq!(view.text(TITLE_SUBJ), "Host events");
}

// ===== Lifecycle =====

#[tokio::test]
async fn title_renders_synchronously_with_a_transport_present() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());

    let view = harness.mount(range());

    assert_eq!(view.text(TITLE_SUBJ), "Host events");
    assert_eq!(view.text(SUBTITLE_SUBJ), "");
}

#[tokio::test]
async fn resolution_is_never_synchronous() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());

    // Re-rendering without yielding still shows the pending frame
    let view = harness.render();
    assert_eq!(view.text(SUBTITLE_SUBJ), "");
    assert!(view.find(STATS_SUBJ).is_none());
}

#[tokio::test]
async fn wait_for_sees_the_loaded_subtitle() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());

    let (loaded, view) = harness
        .wait_for(Duration::from_secs(1), |state| {
            state.overview_host.data.is_loaded()
        })
        .await;

    assert!(loaded);
    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 16 events");
}

#[tokio::test]
async fn loaded_widget_lists_stats_per_beat() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());

    let view = harness.settle().await;
    let stats = view.text(STATS_SUBJ);

    assert!(stats.contains("Auditbeat       6"), "got: {stats}");
    assert!(stats.contains("Endgame         7"), "got: {stats}");
    assert!(stats.contains("Filebeat        1"), "got: {stats}");
    assert!(stats.contains("Winlogbeat      2"), "got: {stats}");
}

#[tokio::test]
async fn action_sequence_is_fetch_then_load() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());
    harness.settle().await;

    assert_eq!(
        harness.action_names(),
        &[
            "OverviewHostFetch",
            "InputsSetQuery",
            "InputsSetQuery",
            "OverviewHostDidLoad"
        ]
    );
}

#[tokio::test]
async fn query_status_is_reported_to_the_registry() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());

    let query = harness.state().inputs.global.query(OVERVIEW_HOST_QUERY_ID);
    assert!(query.is_some_and(|q| q.loading));

    harness.settle().await;
    let query = harness.state().inputs.global.query(OVERVIEW_HOST_QUERY_ID);
    assert!(query.is_some_and(|q| !q.loading));
}

#[tokio::test]
async fn query_without_a_client_stays_loading_in_the_registry() {
    let mut harness = OverviewHostHarness::new();
    harness.mount(range());
    harness.settle().await;

    let query = harness.state().inputs.global.query(OVERVIEW_HOST_QUERY_ID);
    assert!(query.is_some_and(|q| q.loading));
    assert_eq!(
        harness.action_names(),
        &["OverviewHostFetch", "InputsSetQuery"]
    );
}

#[tokio::test]
async fn caller_timestamps_reach_the_query_unchanged() {
    let from = "2020-01-20T20:49:57Z";
    let to = "2020-01-21T20:49:57.080123Z";
    let fixture = json!([{
        "request": {
            "query": "GetOverviewHostQuery",
            "fetchPolicy": "cache-and-network",
            "variables": {
                "sourceId": "default",
                "timerange": { "interval": "12h", "from": from, "to": to },
                "defaultIndex": [
                    "apm-*-transaction*",
                    "auditbeat-*",
                    "endgame-*",
                    "filebeat-*",
                    "logs-*",
                    "packetbeat-*",
                    "winlogbeat-*"
                ],
                "inspect": false
            }
        },
        "result": {
            "data": { "source": { "id": "default", "OverviewHost": { "auditbeatAuditd": 1 } } }
        }
    }]);
    let transport = MockTransport::from_fixture_json(&fixture.to_string(), &[OVERVIEW_HOST_QUERY])
        .expect("fixture parses");

    let mut harness = OverviewHostHarness::from_baseline(&mock_global_state(), Some(transport));
    harness.mount(TimeRange::parse(from, to).expect("valid range"));

    let view = harness.settle().await;
    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 1 events");
    assert!(harness.transport().expect("mock transport").unmatched().is_empty());
}

#[tokio::test]
async fn bound_range_is_persisted_to_storage() {
    let mut harness = OverviewHostHarness::new();
    harness.mount(range());

    assert_eq!(
        harness.storage().calls(),
        vec![StorageCall::Set(
            TIMERANGE_STORAGE_KEY.to_string(),
            json!({ "from": START_DATE, "to": END_DATE }),
        )]
    );
}

// ===== Match specificity =====

async fn assert_never_resolves(mock: MockedResponse) {
    let mut harness = OverviewHostHarness::with_mocks(vec![mock]);
    harness.mount(range());

    let view = harness.settle().await;

    assert_eq!(view.text(SUBTITLE_SUBJ), "");
    assert!(matches!(
        harness.state().overview_host.data,
        QueryState::Failed(_)
    ));
    let transport = harness.transport().expect("mock transport");
    assert_eq!(transport.unmatched().len(), 1);
    assert_eq!(transport.remaining().len(), 1);
}

#[tokio::test]
async fn reordered_default_index_never_matches() {
    let mut variables = overview_host_variables(&range());
    variables.default_index.reverse();
    assert_never_resolves(mock_for(variables.request().expect("request"))).await;
}

#[tokio::test]
async fn different_filter_query_never_matches() {
    let variables = overview_host_variables(&range()).with_filter_query("host.name: \"a\"");
    assert_never_resolves(mock_for(variables.request().expect("request"))).await;
}

#[tokio::test]
async fn different_interval_never_matches() {
    let mut variables = overview_host_variables(&range());
    variables.timerange.interval = "1h".to_string();
    assert_never_resolves(mock_for(variables.request().expect("request"))).await;
}

#[tokio::test]
async fn different_inspect_flag_never_matches() {
    let mut variables = overview_host_variables(&range());
    variables.inspect = true;
    assert_never_resolves(mock_for(variables.request().expect("request"))).await;
}

#[tokio::test]
async fn different_source_id_never_matches() {
    let mut variables = overview_host_variables(&range());
    variables.source_id = "other".to_string();
    assert_never_resolves(mock_for(variables.request().expect("request"))).await;
}

#[tokio::test]
async fn different_query_document_never_matches() {
    let document = QueryDocument::new(
        OVERVIEW_HOST_QUERY.operation,
        "query GetOverviewHostQuery($sourceId: ID!) { source(id: $sourceId) { id } }",
    );
    let request = QueryRequest::new(
        document,
        FetchPolicy::CacheAndNetwork,
        &overview_host_variables(&range()),
    )
    .expect("request");
    assert_never_resolves(mock_for(request)).await;
}

#[tokio::test]
async fn different_fetch_policy_never_matches() {
    let variables = overview_host_variables(&range());
    let request = QueryRequest::new(OVERVIEW_HOST_QUERY, FetchPolicy::NetworkOnly, &variables)
        .expect("request");
    assert_never_resolves(mock_for(request)).await;
}

#[tokio::test]
async fn different_range_never_matches() {
    let other = TimeRange::parse(START_DATE, "2020-01-22T20:49:57.080Z").expect("valid range");
    assert_never_resolves(mock_for(
        overview_host_variables(&other).request().expect("request"),
    ))
    .await;
}

// ===== Registration table =====

#[tokio::test]
async fn first_matching_registration_wins() {
    let request = overview_host_variables(&range()).request().expect("request");
    let second = MockedResponse::data(
        request.clone(),
        json!({ "source": { "id": "default", "OverviewHost": { "auditbeatAuditd": 5 } } }),
    );

    let mut harness = OverviewHostHarness::with_mocks(vec![mock_for(request), second.clone()]);
    harness.mount(range());

    let view = harness.settle().await;

    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 16 events");
    let transport = harness.transport().expect("mock transport");
    assert_eq!(transport.remaining(), vec![second]);
}

#[tokio::test]
async fn registrations_are_consumed_once() {
    let mut harness = OverviewHostHarness::with_mocks(mocks());
    harness.mount(range());
    assert_eq!(
        harness.settle().await.text(SUBTITLE_SUBJ),
        "Showing: 16 events"
    );

    harness.dispatch(Action::OverviewHostRefetch);
    let view = harness.settle().await;
    assert_eq!(view.text(SUBTITLE_SUBJ), "");
    assert_eq!(harness.transport().expect("mock transport").unmatched().len(), 1);

    harness
        .transport()
        .expect("mock transport")
        .register_all(mocks());
    harness.dispatch(Action::OverviewHostRefetch);
    let view = harness.settle().await;
    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 16 events");
}

#[tokio::test]
async fn error_outcome_renders_like_pending() {
    let request = overview_host_variables(&range()).request().expect("request");
    let mut harness =
        OverviewHostHarness::with_mocks(vec![MockedResponse::error(request, "backend unavailable")]);
    let pending = harness.mount(range()).to_string_plain();

    let view = harness.settle().await;

    assert_eq!(view.text(SUBTITLE_SUBJ), "");
    assert!(view.find(STATS_SUBJ).is_none());
    assert_eq!(view.to_string_plain(), pending);
    assert_eq!(
        harness.state().overview_host.data.error(),
        Some("query failed: backend unavailable")
    );
}

#[tokio::test(start_paused = true)]
async fn delayed_mock_stays_pending_until_it_fires() {
    let mocks = mocks()
        .into_iter()
        .map(|mock| mock.with_delay(Duration::from_secs(5)))
        .collect();
    let mut harness = OverviewHostHarness::with_mocks(mocks);
    harness.mount(range());

    // Settling gives up after its one second timeout
    let view = harness.settle().await;
    assert_eq!(view.text(SUBTITLE_SUBJ), "");

    let (loaded, view) = harness
        .wait_for(Duration::from_secs(10), |state| {
            state.overview_host.data.is_loaded()
        })
        .await;
    assert!(loaded);
    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 16 events");
}

#[tokio::test(start_paused = true)]
async fn rebinding_the_range_drops_the_stale_query() {
    let other = TimeRange::parse("2020-01-21T20:49:57.080Z", "2020-01-22T20:49:57.080Z")
        .expect("valid range");
    let stale = mocks()
        .into_iter()
        .map(|mock| mock.with_delay(Duration::from_millis(200)));
    let fresh = MockedResponse::data(
        overview_host_variables(&other).request().expect("request"),
        json!({ "source": { "id": "default", "OverviewHost": { "endgameDns": 3 } } }),
    );

    let mut harness = OverviewHostHarness::with_mocks(stale.chain([fresh]).collect());
    harness.mount(range());
    harness.mount(other.clone());

    let view = harness.settle().await;

    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 3 events");
    assert_eq!(harness.state().timerange(), Some(&other));
    assert!(!harness.action_names().contains(&"OverviewHostDidError"));
}

#[tokio::test(start_paused = true)]
async fn fixture_file_drives_the_widget() {
    let transport = MockTransport::from_fixture_json(
        include_str!("../fixtures/overview_host.json"),
        &[OVERVIEW_HOST_QUERY],
    )
    .expect("fixture file parses");

    let mut harness = OverviewHostHarness::from_baseline(&mock_global_state(), Some(transport));
    harness.mount(range());

    let view = harness.settle().await;
    assert_eq!(view.text(SUBTITLE_SUBJ), "Showing: 1753 events");
}

// ===== Isolation =====

#[tokio::test]
async fn stores_never_share_state_with_the_baseline() {
    let baseline = mock_global_state();

    let mut first = OverviewHostHarness::from_baseline(&baseline, Some(MockTransport::new(mocks())));
    first.mount(range());
    first.settle().await;
    assert!(first.state().overview_host.data.is_loaded());

    assert_eq!(baseline, mock_global_state());
    let second = OverviewHostHarness::from_baseline(&baseline, None);
    assert_eq!(second.state(), &baseline);
    assert!(second.state().timerange().is_none());
}

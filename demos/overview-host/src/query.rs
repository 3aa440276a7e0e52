//! The `GetOverviewHostQuery` contract: document, variables and response
//!
//! The variables serialize to exactly the shape the backend (and the mock
//! table) expects; any change here changes which mocks match.

use overview_dispatch::{FetchPolicy, QueryDocument, QueryError, QueryRequest, TimeRange};
use serde::{Deserialize, Serialize};

/// Registry id the widget reports its query status under.
pub const OVERVIEW_HOST_QUERY_ID: &str = "overviewHostQuery";

pub const DEFAULT_SOURCE_ID: &str = "default";

/// Bucket interval sent with every time range.
pub const DEFAULT_INTERVAL: &str = "12h";

/// UI setting holding the index patterns to search.
pub const DEFAULT_INDEX_KEY: &str = "securitySolution:defaultIndex";

/// Index patterns used when the UI setting is missing.
pub const DEFAULT_INDEX_PATTERN: &[&str] = &[
    "apm-*-transaction*",
    "auditbeat-*",
    "endgame-*",
    "filebeat-*",
    "logs-*",
    "packetbeat-*",
    "winlogbeat-*",
];

pub const OVERVIEW_HOST_QUERY: QueryDocument = QueryDocument::new(
    "GetOverviewHostQuery",
    r#"query GetOverviewHostQuery(
  $sourceId: ID!
  $timerange: TimerangeInput!
  $filterQuery: String
  $defaultIndex: [String!]!
  $inspect: Boolean!
) {
  source(id: $sourceId) {
    id
    OverviewHost(timerange: $timerange, filterQuery: $filterQuery, defaultIndex: $defaultIndex) {
      auditbeatAuditd
      auditbeatFIM
      auditbeatLogin
      auditbeatPackage
      auditbeatProcess
      auditbeatUser
      endgameDns
      endgameFile
      endgameImageLoad
      endgameNetwork
      endgameProcess
      endgameRegistry
      endgameSecurity
      filebeatSystemModule
      winlogbeatSecurity
      winlogbeatMWSysmonOperational
      inspect @include(if: $inspect) {
        dsl
        response
      }
    }
  }
}"#,
);

/// `timerange` argument of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerangeInput {
    pub interval: String,
    pub from: String,
    pub to: String,
}

impl TimerangeInput {
    pub fn new(range: &TimeRange) -> Self {
        Self {
            interval: DEFAULT_INTERVAL.to_string(),
            from: range.from_iso().to_string(),
            to: range.to_iso().to_string(),
        }
    }
}

/// Variables of `GetOverviewHostQuery`.
///
/// `filter_query: None` is left out of the serialized object entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewHostVariables {
    pub source_id: String,
    pub timerange: TimerangeInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_query: Option<String>,
    pub default_index: Vec<String>,
    pub inspect: bool,
}

impl OverviewHostVariables {
    pub fn new(range: &TimeRange, default_index: Vec<String>) -> Self {
        Self {
            source_id: DEFAULT_SOURCE_ID.to_string(),
            timerange: TimerangeInput::new(range),
            filter_query: None,
            default_index,
            inspect: false,
        }
    }

    pub fn with_filter_query(mut self, filter_query: impl Into<String>) -> Self {
        self.filter_query = Some(filter_query.into());
        self
    }

    /// The request the widget issues for these variables.
    pub fn request(&self) -> Result<QueryRequest, QueryError> {
        QueryRequest::new(OVERVIEW_HOST_QUERY, FetchPolicy::CacheAndNetwork, self)
    }
}

/// `data` of a `GetOverviewHostQuery` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewHostResponse {
    pub source: OverviewHostSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewHostSource {
    pub id: String,
    #[serde(rename = "OverviewHost")]
    pub overview_host: OverviewHostData,
}

/// Per-category event counters. A missing or null counter counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewHostData {
    pub auditbeat_auditd: Option<u64>,
    #[serde(rename = "auditbeatFIM")]
    pub auditbeat_fim: Option<u64>,
    pub auditbeat_login: Option<u64>,
    pub auditbeat_package: Option<u64>,
    pub auditbeat_process: Option<u64>,
    pub auditbeat_user: Option<u64>,
    pub endgame_dns: Option<u64>,
    pub endgame_file: Option<u64>,
    pub endgame_image_load: Option<u64>,
    pub endgame_network: Option<u64>,
    pub endgame_process: Option<u64>,
    pub endgame_registry: Option<u64>,
    pub endgame_security: Option<u64>,
    pub filebeat_system_module: Option<u64>,
    pub winlogbeat_security: Option<u64>,
    #[serde(rename = "winlogbeatMWSysmonOperational")]
    pub winlogbeat_mw_sysmon_operational: Option<u64>,
}

/// Counters of one beat, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatGroup {
    pub name: &'static str,
    pub stats: Vec<(&'static str, u64)>,
}

impl StatGroup {
    pub fn total(&self) -> u64 {
        self.stats.iter().fold(0, |sum, (_, count)| sum.saturating_add(*count))
    }
}

impl OverviewHostData {
    /// Sum of every counter.
    pub fn total(&self) -> u64 {
        self.groups()
            .iter()
            .fold(0, |sum, group| sum.saturating_add(group.total()))
    }

    /// Counters grouped by beat.
    pub fn groups(&self) -> Vec<StatGroup> {
        let n = |count: Option<u64>| count.unwrap_or(0);
        vec![
            StatGroup {
                name: "Auditbeat",
                stats: vec![
                    ("Audit", n(self.auditbeat_auditd)),
                    ("File integrity", n(self.auditbeat_fim)),
                    ("Login", n(self.auditbeat_login)),
                    ("Package", n(self.auditbeat_package)),
                    ("Process", n(self.auditbeat_process)),
                    ("User", n(self.auditbeat_user)),
                ],
            },
            StatGroup {
                name: "Endgame",
                stats: vec![
                    ("DNS", n(self.endgame_dns)),
                    ("File", n(self.endgame_file)),
                    ("Image load", n(self.endgame_image_load)),
                    ("Network", n(self.endgame_network)),
                    ("Process", n(self.endgame_process)),
                    ("Registry", n(self.endgame_registry)),
                    ("Security", n(self.endgame_security)),
                ],
            },
            StatGroup {
                name: "Filebeat",
                stats: vec![("System module", n(self.filebeat_system_module))],
            },
            StatGroup {
                name: "Winlogbeat",
                stats: vec![
                    ("Security", n(self.winlogbeat_security)),
                    ("Sysmon", n(self.winlogbeat_mw_sysmon_operational)),
                ],
            },
        ]
    }
}

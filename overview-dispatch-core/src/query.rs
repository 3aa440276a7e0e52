//! Query contract between widgets and the backend
//!
//! A widget never talks to the network. Its reducer emits an effect carrying
//! a [`QueryRequest`]; the runtime hands the request to whatever
//! [`Transport`] the store's client observable currently holds and feeds
//! the outcome back as an action. In tests the transport is a
//! [`MockTransport`](crate::mock::MockTransport).

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors produced while issuing or resolving a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No registered response matches the request shape.
    #[error("no mocked response for query `{operation}` ({fetch_policy}) with variables {variables}")]
    Unmatched {
        operation: String,
        fetch_policy: FetchPolicy,
        variables: Value,
    },

    /// The transport failed to produce a response.
    #[error("query failed: {0}")]
    Network(String),

    /// Variables could not be serialized.
    #[error("failed to encode query variables: {0}")]
    Encode(#[source] serde_json::Error),

    /// Response data did not have the expected shape.
    #[error("failed to decode response for `{operation}`: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A fixture referenced a query document nobody registered.
    #[error("unknown query document `{0}`")]
    UnknownDocument(String),

    /// A fixture file could not be parsed.
    #[error("invalid fixture: {0}")]
    Fixture(#[source] serde_json::Error),

    /// A fixture entry parsed but does not describe exactly one outcome.
    #[error("invalid fixture entry for `{operation}`: {reason}")]
    FixtureEntry {
        operation: String,
        reason: &'static str,
    },
}

/// Errors produced while building a [`TimeRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeRangeError {
    #[error("invalid timestamp `{value}`: {reason}")]
    Parse { value: String, reason: String },

    #[error("time range start {from} is not before end {to}")]
    Inverted { from: String, to: String },
}

/// A bounded time range; `from` is always strictly before `to`.
///
/// Keeps the timestamps exactly as the caller wrote them: they go onto the
/// wire unchanged, so a fixture written with the same strings matches.
/// Two ranges are equal only when their text is equal.
/// Serialized as that pair of strings; deserialization re-checks the order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange", into = "RawTimeRange")]
pub struct TimeRange {
    from: String,
    to: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range from two instants, written as `2020-01-20T20:49:57.080Z`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, TimeRangeError> {
        Self::checked(iso(from), iso(to), from, to)
    }

    /// Build a range from two ISO-8601 / RFC 3339 timestamps.
    pub fn parse(from: &str, to: &str) -> Result<Self, TimeRangeError> {
        let start = parse_instant(from)?;
        let end = parse_instant(to)?;
        Self::checked(from.to_string(), to.to_string(), start, end)
    }

    fn checked(
        from: String,
        to: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError::Inverted { from, to });
        }
        Ok(Self {
            from,
            to,
            start,
            end,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Start timestamp as given.
    pub fn from_iso(&self) -> &str {
        &self.from
    }

    /// End timestamp as given.
    pub fn to_iso(&self) -> &str {
        &self.to
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

#[derive(Serialize, Deserialize)]
struct RawTimeRange {
    from: String,
    to: String,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = TimeRangeError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::parse(&raw.from, &raw.to)
    }
}

impl From<TimeRange> for RawTimeRange {
    fn from(range: TimeRange) -> Self {
        RawTimeRange {
            from: range.from,
            to: range.to,
        }
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, TimeRangeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| TimeRangeError::Parse {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A named query document. Identity is the operation name plus its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryDocument {
    pub operation: &'static str,
    pub source: &'static str,
}

impl QueryDocument {
    pub const fn new(operation: &'static str, source: &'static str) -> Self {
        Self { operation, source }
    }
}

/// Cache-vs-network behavior requested for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    #[default]
    CacheFirst,
    CacheAndNetwork,
    NetworkOnly,
    CacheOnly,
    NoCache,
}

impl FetchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchPolicy::CacheFirst => "cache-first",
            FetchPolicy::CacheAndNetwork => "cache-and-network",
            FetchPolicy::NetworkOnly => "network-only",
            FetchPolicy::CacheOnly => "cache-only",
            FetchPolicy::NoCache => "no-cache",
        }
    }
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing query: document, fetch policy and serialized variables.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub query: QueryDocument,
    pub fetch_policy: FetchPolicy,
    pub variables: Value,
}

impl QueryRequest {
    /// Serialize typed variables into a request.
    pub fn new<V: Serialize>(
        query: QueryDocument,
        fetch_policy: FetchPolicy,
        variables: &V,
    ) -> Result<Self, QueryError> {
        let variables = serde_json::to_value(variables).map_err(QueryError::Encode)?;
        Ok(Self {
            query,
            fetch_policy,
            variables,
        })
    }

    pub fn operation(&self) -> &'static str {
        self.query.operation
    }

    /// Exact structural match: same document, same policy, deep-equal variables.
    pub fn matches(&self, other: &QueryRequest) -> bool {
        self.query == other.query
            && self.fetch_policy == other.fetch_policy
            && self.variables == other.variables
    }

    pub(crate) fn unmatched(&self) -> QueryError {
        QueryError::Unmatched {
            operation: self.query.operation.to_string(),
            fetch_policy: self.fetch_policy,
            variables: self.variables.clone(),
        }
    }
}

/// Raw response data for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub operation: &'static str,
    pub data: Value,
}

impl QueryResponse {
    /// Decode the data into the shape the widget expects.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, QueryError> {
        let operation = self.operation;
        serde_json::from_value(self.data).map_err(|source| QueryError::Decode { operation, source })
    }
}

/// Something that can resolve queries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: QueryRequest) -> Result<QueryResponse, QueryError>;
}

/// Issue `request` on `transport` and decode the response data.
pub async fn fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: QueryRequest,
) -> Result<T, QueryError> {
    transport.execute(request).await?.decode()
}

/// Lifecycle of a widget's query data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryState<T> {
    /// Nothing requested yet
    #[default]
    Uninitialized,
    /// Request issued, no response yet
    Pending,
    /// Response received
    Loaded(T),
    /// Request failed; carries the error message
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, QueryState::Loaded(_))
    }

    /// Loaded data, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

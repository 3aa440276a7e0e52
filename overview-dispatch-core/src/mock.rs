//! Mock query transport for tests and demos
//!
//! [`MockTransport`] holds an ordered table of [`MockedResponse`]s. Every
//! request is matched exactly against that table: same
//! [`QueryDocument`], same [`FetchPolicy`], deep-equal variables.
//!
//! - The first matching registration wins, in registration order.
//! - A registration is consumed by the request it answers; an identical
//!   second request needs a fresh registration.
//! - Resolution never happens synchronously: the transport yields to the
//!   scheduler at least once, so the pending render is always observable.
//! - Requests without a match fail with [`QueryError::Unmatched`] and are
//!   recorded in [`MockTransport::unmatched`].
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new(vec![MockedResponse::data(
//!     QueryRequest::new(QUERY, FetchPolicy::CacheAndNetwork, &variables)?,
//!     json!({ "source": { "id": "default", "OverviewHost": { "auditbeatAuditd": 1 } } }),
//! )]);
//!
//! let response = transport.execute(request).await?;
//! assert!(transport.is_exhausted());
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;

use crate::query::{FetchPolicy, QueryDocument, QueryError, QueryRequest, QueryResponse, Transport};

/// What a registration resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Resolve with this response data
    Data(Value),
    /// Reject with a network error carrying this message
    Error(String),
}

/// One registration: an exact request and what it resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct MockedResponse {
    pub request: QueryRequest,
    pub outcome: MockOutcome,
    /// Extra time to wait before resolving, on top of the scheduler yield
    pub delay: Option<Duration>,
}

impl MockedResponse {
    /// Resolve `request` with `data`.
    pub fn data(request: QueryRequest, data: Value) -> Self {
        Self {
            request,
            outcome: MockOutcome::Data(data),
            delay: None,
        }
    }

    /// Reject `request` with a network error.
    pub fn error(request: QueryRequest, message: impl Into<String>) -> Self {
        Self {
            request,
            outcome: MockOutcome::Error(message.into()),
            delay: None,
        }
    }

    /// Delay resolution by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Default)]
struct MockTable {
    registrations: Vec<MockedResponse>,
    requests: Vec<QueryRequest>,
    unmatched: Vec<QueryRequest>,
}

impl MockTable {
    fn take_match(&mut self, request: &QueryRequest) -> Option<MockedResponse> {
        let index = self
            .registrations
            .iter()
            .position(|mock| mock.request.matches(request))?;
        Some(self.registrations.remove(index))
    }
}

/// A [`Transport`] that answers from registered fixtures only.
///
/// Cloning shares the same table, so a test can keep a handle for
/// assertions after handing the transport to a store.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    table: Arc<Mutex<MockTable>>,
}

impl MockTransport {
    pub fn new(mocks: impl IntoIterator<Item = MockedResponse>) -> Self {
        let transport = Self::default();
        transport.register_all(mocks);
        transport
    }

    /// Append a registration after the existing ones.
    pub fn register(&self, mock: MockedResponse) {
        tracing::debug!(
            operation = mock.request.operation(),
            fetch_policy = %mock.request.fetch_policy,
            "Registered mocked response"
        );
        self.table.lock().registrations.push(mock);
    }

    pub fn register_all(&self, mocks: impl IntoIterator<Item = MockedResponse>) {
        for mock in mocks {
            self.register(mock);
        }
    }

    /// Registrations not yet consumed, in order.
    pub fn remaining(&self) -> Vec<MockedResponse> {
        self.table.lock().registrations.clone()
    }

    /// Whether every registration has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.table.lock().registrations.is_empty()
    }

    /// Every request seen so far, matched or not.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.table.lock().requests.clone()
    }

    /// Requests that found no registration.
    pub fn unmatched(&self) -> Vec<QueryRequest> {
        self.table.lock().unmatched.clone()
    }

    /// Load registrations from a JSON fixture array.
    ///
    /// Each entry looks like
    /// `{"request": {"query": "<operation>", "fetchPolicy": "...", "variables": {...}}, "result": {"data": {...}}}`;
    /// `"error": "<message>"` replaces `result` for failing mocks and an
    /// optional `"delay"` is in milliseconds. Operation names are resolved
    /// against `documents`.
    pub fn from_fixture_json(json: &str, documents: &[QueryDocument]) -> Result<Self, QueryError> {
        let fixtures: Vec<FixtureEntry> = serde_json::from_str(json).map_err(QueryError::Fixture)?;
        let mut mocks = Vec::with_capacity(fixtures.len());
        for entry in fixtures {
            mocks.push(entry.into_mock(documents)?);
        }
        Ok(Self::new(mocks))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        let matched = {
            let mut table = self.table.lock();
            table.requests.push(request.clone());
            let matched = table.take_match(&request);
            if matched.is_none() {
                table.unmatched.push(request.clone());
            }
            matched
        };

        // Never resolve in the same turn the request was issued.
        tokio::task::yield_now().await;

        let Some(mock) = matched else {
            tracing::warn!(
                operation = request.operation(),
                variables = %request.variables,
                "No mocked response matches request"
            );
            return Err(request.unmatched());
        };

        if let Some(delay) = mock.delay {
            tokio::time::sleep(delay).await;
        }

        tracing::debug!(operation = request.operation(), "Resolving mocked response");
        match mock.outcome {
            MockOutcome::Data(data) => Ok(QueryResponse {
                operation: request.operation(),
                data,
            }),
            MockOutcome::Error(message) => Err(QueryError::Network(message)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    request: FixtureRequest,
    #[serde(default)]
    result: Option<FixtureResult>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    delay: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureRequest {
    query: String,
    #[serde(default)]
    fetch_policy: FetchPolicy,
    #[serde(default)]
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct FixtureResult {
    data: Value,
}

impl FixtureEntry {
    fn into_mock(self, documents: &[QueryDocument]) -> Result<MockedResponse, QueryError> {
        let query = documents
            .iter()
            .find(|doc| doc.operation == self.request.query)
            .copied()
            .ok_or_else(|| QueryError::UnknownDocument(self.request.query.clone()))?;

        let request = QueryRequest {
            query,
            fetch_policy: self.request.fetch_policy,
            variables: self.request.variables,
        };

        let outcome = match (self.result, self.error) {
            (Some(result), None) => MockOutcome::Data(result.data),
            (None, Some(message)) => MockOutcome::Error(message),
            (Some(_), Some(_)) => {
                return Err(QueryError::FixtureEntry {
                    operation: self.request.query,
                    reason: "sets both `result` and `error`",
                })
            }
            (None, None) => {
                return Err(QueryError::FixtureEntry {
                    operation: self.request.query,
                    reason: "needs a `result` or an `error`",
                })
            }
        };

        Ok(MockedResponse {
            request,
            outcome,
            delay: self.delay.map(Duration::from_millis),
        })
    }
}

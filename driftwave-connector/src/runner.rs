//! Batch execution: per-item orchestration and error isolation.
//!
//! One sequential pass over the host's item list. Every item resolves its
//! operation, validates options, builds a request, calls the transport,
//! and validates the response; any failure is caught at the item boundary
//! and either recorded in the item's output slot (continuation on) or
//! surfaced as the batch error (continuation off). No item's outcome ever
//! depends on another's.

use crate::contents::{self, ContentsResult, InvalidInput};
use crate::schema::Violations;
use crate::search::{self, SearchResponse};
use crate::transport::Transport;
use driftwave_http::HttpError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// The two operations this connector exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    Contents,
}

impl Operation {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "search" => Some(Self::Search),
            "contents" => Some(Self::Contents),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Contents => "contents",
        }
    }
}

/// One input unit from the host's batch. Its position in the list is the
/// correlation index carried on every output record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionItem {
    pub operation: String,
    #[serde(default)]
    pub params: Value,
}

/// Per-item failure taxonomy. Kinds `Options` and `Response` carry the
/// complete violation list; the others carry a plain message.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("unknown operation \"{0}\"")]
    UnknownOperation(String),
    #[error("invalid options:\n{0}")]
    Options(Violations),
    #[error("{0}")]
    Input(#[from] InvalidInput),
    #[error("request failed: {0}")]
    Transport(#[from] HttpError),
    #[error("invalid response:\n{0}")]
    Response(Violations),
}

impl ItemError {
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::UnknownOperation(_) => "operation",
            ItemError::Options(_) => "options",
            ItemError::Input(_) => "input",
            ItemError::Transport(_) => "transport",
            ItemError::Response(_) => "response",
        }
    }

    /// Structured violation list for validation failures, `None` for the
    /// other kinds.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            ItemError::Options(v) | ItemError::Response(v) => Some(v),
            _ => None,
        }
    }
}

/// Validated output of one successful item.
#[derive(Debug, Clone)]
pub enum Payload {
    /// One combined result object per search item.
    Search(SearchResponse),
    /// Ordered extraction results, one per requested URL.
    Contents(Vec<ContentsResult>),
}

/// One output slot, correlated to the originating item by index.
#[derive(Debug)]
pub enum ItemRecord {
    Ok { index: usize, payload: Payload },
    Error { index: usize, error: ItemError },
}

impl ItemRecord {
    pub fn index(&self) -> usize {
        match self {
            ItemRecord::Ok { index, .. } | ItemRecord::Error { index, .. } => *index,
        }
    }

    /// Flatten into host-facing JSON rows, one per emitted entry, each
    /// tagged with the originating item index. A contents item fans out
    /// to one row per extraction result; everything else stays 1:1.
    pub fn to_rows(&self) -> serde_json::Result<Vec<Value>> {
        match self {
            ItemRecord::Ok { index, payload } => match payload {
                Payload::Search(response) => Ok(vec![json!({
                    "index": index,
                    "data": serde_json::to_value(response)?,
                })]),
                Payload::Contents(results) => results
                    .iter()
                    .map(|r| {
                        Ok(json!({
                            "index": index,
                            "data": serde_json::to_value(r)?,
                        }))
                    })
                    .collect(),
            },
            ItemRecord::Error { index, error } => {
                let mut record = json!({
                    "message": error.to_string(),
                    "kind": error.kind(),
                });
                if let Some(violations) = error.violations() {
                    record["violations"] = Value::Array(violations.to_json());
                }
                Ok(vec![json!({ "index": index, "error": record })])
            }
        }
    }
}

/// First-failure abort in halt mode, carrying the failing item's index.
#[derive(Debug, Error)]
#[error("item {index} failed: {source}")]
pub struct BatchError {
    pub index: usize,
    #[source]
    pub source: ItemError,
}

/// Run the batch in input order.
///
/// With `continue_on_failure` set, a failing item occupies its output slot
/// as an error record and the pass moves on; without it, the first failure
/// aborts the whole batch.
pub async fn run_batch<T: Transport + ?Sized>(
    transport: &T,
    items: &[ExecutionItem],
    continue_on_failure: bool,
) -> Result<Vec<ItemRecord>, BatchError> {
    let mut records = Vec::with_capacity(items.len());
    let mut failed = 0usize;

    for (index, item) in items.iter().enumerate() {
        tracing::debug!(
            target: "connector.batch",
            index,
            operation = %item.operation,
            "batch.item.start"
        );
        match run_item(transport, item).await {
            Ok(payload) => {
                tracing::debug!(target: "connector.batch", index, "batch.item.ok");
                records.push(ItemRecord::Ok { index, payload });
            }
            Err(error) => {
                tracing::warn!(
                    target: "connector.batch",
                    index,
                    kind = error.kind(),
                    %error,
                    "batch.item.error"
                );
                if !continue_on_failure {
                    return Err(BatchError {
                        index,
                        source: error,
                    });
                }
                failed += 1;
                records.push(ItemRecord::Error { index, error });
            }
        }
    }

    tracing::info!(
        target: "connector.batch",
        items = items.len(),
        failed,
        "batch.done"
    );
    Ok(records)
}

async fn run_item<T: Transport + ?Sized>(
    transport: &T,
    item: &ExecutionItem,
) -> Result<Payload, ItemError> {
    let operation = Operation::parse(&item.operation)
        .ok_or_else(|| ItemError::UnknownOperation(item.operation.clone()))?;

    match operation {
        Operation::Search => {
            let input = search::SearchInput::from_value(&item.params).map_err(ItemError::Options)?;
            let request = search::build_request(&input);
            let raw = transport.execute(&request).await?;
            let response = SearchResponse::from_value(raw).map_err(ItemError::Response)?;
            Ok(Payload::Search(response))
        }
        Operation::Contents => {
            let input =
                contents::ContentsInput::from_value(&item.params).map_err(ItemError::Options)?;
            let request = contents::build_request(&input)?;
            let raw = transport.execute(&request).await?;
            let results = contents::results_from_value(raw).map_err(ItemError::Response)?;
            Ok(Payload::Contents(results))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::OutboundRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Canned transport: hands out queued responses in order and records
    /// every request it saw.
    struct StubTransport {
        responses: Mutex<VecDeque<Result<Value, HttpError>>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl StubTransport {
        fn with(responses: Vec<Result<Value, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen_count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(&self, request: &OutboundRequest) -> Result<Value, HttpError> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::Network("stub exhausted".into())))
        }
    }

    fn search_item(params: Value) -> ExecutionItem {
        ExecutionItem {
            operation: "search".into(),
            params,
        }
    }

    fn web_hit_response() -> Value {
        json!({
            "results": {
                "web": [{
                    "url": "https://example.com",
                    "title": "Example",
                    "description": "hit",
                }],
            },
        })
    }

    #[tokio::test]
    async fn failing_item_is_isolated_when_continuation_is_on() {
        let items = vec![
            search_item(json!({"query": "one"})),
            search_item(json!({"query": "two", "count": 0})),
            search_item(json!({"query": "three"})),
        ];
        let transport = StubTransport::with(vec![
            Ok(web_hit_response()),
            Ok(web_hit_response()),
        ]);

        let records = run_batch(&transport, &items, true).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0], ItemRecord::Ok { index: 0, .. }));
        assert!(matches!(records[2], ItemRecord::Ok { index: 2, .. }));

        let ItemRecord::Error { index, error } = &records[1] else {
            panic!("expected item 2 to fail");
        };
        assert_eq!(*index, 1);
        assert!(error.violations().is_some_and(|v| v.len() > 0));

        // Item 2 never reached the transport.
        assert_eq!(transport.seen_count(), 2);
    }

    #[tokio::test]
    async fn halt_mode_stops_before_later_items_run() {
        let items = vec![
            search_item(json!({"query": "one"})),
            search_item(json!({"query": "two", "count": 0})),
            search_item(json!({"query": "three"})),
        ];
        let transport = StubTransport::with(vec![Ok(web_hit_response())]);

        let err = run_batch(&transport, &items, false).await.unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, ItemError::Options(_)));
        // Only item 1 produced a request; item 3 never ran.
        assert_eq!(transport.seen_count(), 1);
    }

    #[tokio::test]
    async fn contents_fan_out_keeps_the_item_index_on_every_row() {
        let items = vec![ExecutionItem {
            operation: "contents".into(),
            params: json!({"urls": "https://a.com, https://b.com"}),
        }];
        let transport = StubTransport::with(vec![Ok(json!([
            {"url": "https://a.com", "markdown": "# A"},
            {"url": "https://b.com", "markdown": "# B"},
        ]))]);

        let records = run_batch(&transport, &items, true).await.unwrap();
        let ItemRecord::Ok { payload: Payload::Contents(results), .. } = &records[0] else {
            panic!("expected contents payload");
        };
        assert_eq!(results.len(), 2);

        let rows = records[0].to_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["index"] == json!(0)));
        assert_eq!(rows[1]["data"]["url"], json!("https://b.com"));
    }

    #[tokio::test]
    async fn transport_and_response_failures_stay_per_item() {
        let items = vec![
            search_item(json!({"query": "net down"})),
            search_item(json!({"query": "bad payload"})),
        ];
        let transport = StubTransport::with(vec![
            Err(HttpError::Network("connection reset".into())),
            Ok(json!({"results": {"web": [{"title": "no url or description"}]}})),
        ]);

        let records = run_batch(&transport, &items, true).await.unwrap();

        let ItemRecord::Error { error, .. } = &records[0] else {
            panic!("expected transport failure");
        };
        assert_eq!(error.kind(), "transport");
        assert!(error.to_string().contains("connection reset"));

        let ItemRecord::Error { error, .. } = &records[1] else {
            panic!("expected response failure");
        };
        assert_eq!(error.kind(), "response");
        let violations = error.violations().unwrap();
        assert_eq!(violations.len(), 2);
        let rows = records[1].to_rows().unwrap();
        assert_eq!(
            rows[0]["error"]["violations"][0]["path"],
            json!("results.web.0.url")
        );
    }

    #[tokio::test]
    async fn unknown_operation_is_fatal_for_that_item_only() {
        let items = vec![
            ExecutionItem {
                operation: "summarize".into(),
                params: Value::Null,
            },
            search_item(json!({"query": "still runs"})),
        ];
        let transport = StubTransport::with(vec![Ok(web_hit_response())]);

        let records = run_batch(&transport, &items, true).await.unwrap();
        let ItemRecord::Error { error, .. } = &records[0] else {
            panic!("expected configuration error");
        };
        assert_eq!(error.to_string(), "unknown operation \"summarize\"");
        assert!(matches!(records[1], ItemRecord::Ok { index: 1, .. }));
    }

    #[tokio::test]
    async fn error_rows_render_numbered_violation_lines() {
        let items = vec![search_item(json!({"query": "q", "count": 0, "freshness": "century"}))];
        let transport = StubTransport::with(vec![]);

        let records = run_batch(&transport, &items, true).await.unwrap();
        let rows = records[0].to_rows().unwrap();
        let message = rows[0]["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("invalid options:\n1. count:"));
        assert!(message.contains("\n2. freshness: must be one of day, week, month, year"));
        assert_eq!(rows[0]["error"]["kind"], json!("options"));
    }
}

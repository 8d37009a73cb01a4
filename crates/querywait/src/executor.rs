//! HTTP query executor
//!
//! POSTs `{"query": ..., "limit": ...}` to the configured endpoint and
//! reads the records out of the JSON response. The response may be a bare
//! array or an object carrying the array under one of [`RECORD_KEYS`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use querywait_core::{CoreError, QueryExecutor};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

/// Object keys searched, in order, for the record array
pub const RECORD_KEYS: &[&str] = &["records", "results", "data", "rows"];

/// Longest response body quoted in an error message
const MAX_ERROR_BODY: usize = 200;

/// Pass-through execution options
#[derive(Debug, Clone, Default)]
pub struct HttpQueryOptions {
    pub limit: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("response from {endpoint} has no record array (expected a JSON array or one of: {})", RECORD_KEYS.join(", "))]
    UnrecognisedBody { endpoint: String },
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

/// Runs queries against a JSON-over-HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpQueryExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpQueryExecutor {
    pub fn new(
        endpoint: &str,
        headers: &BTreeMap<String, String>,
        request_timeout: Duration,
    ) -> Result<Self, CoreError> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CoreError::InvalidArgument(format!("invalid header name '{}': {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                CoreError::InvalidArgument(format!("invalid value for header '{}': {}", name, e))
            })?;
            header_map.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .timeout(request_timeout)
            .build()
            .map_err(|e| CoreError::InvalidArgument(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    type Record = Value;
    type Options = HttpQueryOptions;
    type Error = ExecutorError;

    async fn execute(
        &self,
        query: &str,
        options: &HttpQueryOptions,
    ) -> Result<Vec<Value>, ExecutorError> {
        let request_error = |source| ExecutorError::Request {
            endpoint: self.endpoint.clone(),
            source,
        };

        debug!("POST {}", self.endpoint);
        trace!("Query: {}", query);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&QueryRequest {
                query,
                limit: options.limit,
            })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutorError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY),
            });
        }

        let body: Value = response.json().await.map_err(request_error)?;
        extract_records(body).ok_or_else(|| ExecutorError::UnrecognisedBody {
            endpoint: self.endpoint.clone(),
        })
    }
}

/// Pull the record array out of a response body
pub fn extract_records(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(records) => Some(records),
        Value::Object(mut obj) => RECORD_KEYS.iter().find_map(|key| match obj.remove(*key) {
            Some(Value::Array(records)) => Some(records),
            _ => None,
        }),
        _ => None,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

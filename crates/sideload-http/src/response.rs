//! # Query Responses
//!
//! The JSON body returned by `/query`:
//!
//! ```json
//! {"results": [{"statement_id": 0, "series": [{"name": "...", "columns": [...], "values": [[...]]}]}]}
//! ```
//!
//! Empty results, a missing or `null` `series` and `null` `values` are all
//! valid and mean "no rows". A body that is not JSON, lacks `results`, or
//! carries an `error` (top-level or per statement) is an error.

use crate::error::{HttpError, HttpResult};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<StatementResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: Option<u64>,
    #[serde(default)]
    pub series: Option<Vec<Series>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatementResult {
    pub fn series(&self) -> &[Series] {
        self.series.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Option<Vec<Vec<Value>>>,
}

impl Series {
    pub fn values(&self) -> &[Vec<Value>] {
        self.values.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    results: Option<Vec<StatementResult>>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse and check a `/query` response body
pub fn parse_response(body: &str) -> HttpResult<QueryResponse> {
    let raw: RawResponse = serde_json::from_str(body)
        .map_err(|e| HttpError::malformed(format!("not a query response: {}", e)))?;

    if let Some(error) = raw.error {
        return Err(HttpError::query_failed(error));
    }

    let results = raw
        .results
        .ok_or_else(|| HttpError::malformed("missing `results` array"))?;

    if let Some(error) = results.iter().find_map(|r| r.error.as_deref()) {
        return Err(HttpError::query_failed(error));
    }

    Ok(QueryResponse { results })
}

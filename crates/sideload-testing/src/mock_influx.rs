//! # Mock InfluxDB Query API
//!
//! A `wiremock` server that answers `SHOW CONTINUOUS QUERIES` for one
//! database and accepts writes, so continuous-query copies can be checked
//! end to end.

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A running mock `/query` endpoint
pub struct MockInflux {
    server: MockServer,
}

impl MockInflux {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the server, without `/query`
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Answer `SHOW CONTINUOUS QUERIES` for `database` with the given
    /// `(name, definition)` rows
    pub async fn with_continuous_queries(self, database: &str, queries: &[(&str, &str)]) -> Self {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("db", database))
            .and(query_param("q", "SHOW CONTINUOUS QUERIES"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(continuous_query_listing(database, queries)),
            )
            .mount(&self.server)
            .await;
        self
    }

    /// Accept every `POST /query` with an empty successful result
    pub async fn accepting_writes(self) -> Self {
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": [{"statement_id": 0}]})),
            )
            .mount(&self.server)
            .await;
        self
    }

    /// `(db, q)` of every `POST /query` received, in order
    pub async fn written_queries(&self) -> Vec<(String, String)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == "POST")
            .map(|request| {
                let param = |key: &str| {
                    request
                        .url
                        .query_pairs()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| v.into_owned())
                        .unwrap_or_default()
                };
                (param("db"), param("q"))
            })
            .collect()
    }
}

/// `SHOW CONTINUOUS QUERIES` body as the server lists it: one series per
/// database, `_internal` first with no rows
pub fn continuous_query_listing(database: &str, queries: &[(&str, &str)]) -> Value {
    let values: Vec<Value> = queries
        .iter()
        .map(|(name, query)| json!([name, query]))
        .collect();

    json!({
        "results": [{
            "statement_id": 0,
            "series": [
                {"name": "_internal", "columns": ["name", "query"]},
                {"name": database, "columns": ["name", "query"], "values": values}
            ]
        }]
    })
}

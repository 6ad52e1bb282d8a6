//! # Continuous Query Copy
//!
//! Reads the continuous-query definitions of one database from the source
//! server and replays each definition, verbatim, against the destination.

use crate::client::QueryClient;
use crate::error::{HttpError, HttpResult};
use crate::response::{QueryResponse, StatementResult};
use serde_json::Value;
use sideload_core::{Identifier, Statement};
use tracing::info;

/// Column holding the query name in `SHOW CONTINUOUS QUERIES` rows
pub const NAME_COLUMN: usize = 0;

/// Column holding the full `CREATE CONTINUOUS QUERY` text
pub const QUERY_COLUMN: usize = 1;

/// One continuous-query definition read from the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuousQueryRecord {
    pub database: String,
    pub name: Option<String>,
    pub query: String,
}

/// Pull the definitions belonging to `database` out of a
/// `SHOW CONTINUOUS QUERIES` response.
///
/// The server lists every database as its own series; series for other
/// databases are skipped. A row of the matching series without a string in
/// the query column is malformed.
pub fn extract_continuous_queries(
    response: &QueryResponse,
    database: &str,
) -> HttpResult<Vec<ContinuousQueryRecord>> {
    let mut records = Vec::new();

    for series in response
        .results
        .iter()
        .flat_map(StatementResult::series)
        .filter(|series| series.name == database)
    {
        for (row, values) in series.values().iter().enumerate() {
            let query = values
                .get(QUERY_COLUMN)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    HttpError::malformed(format!(
                        "row {} of series '{}' has no query text in column {}",
                        row, series.name, QUERY_COLUMN
                    ))
                })?;

            records.push(ContinuousQueryRecord {
                database: series.name.clone(),
                name: values
                    .get(NAME_COLUMN)
                    .and_then(Value::as_str)
                    .map(str::to_string),
                query: query.to_string(),
            });
        }
    }

    Ok(records)
}

/// Copies continuous queries from a source server to a destination server
#[derive(Debug, Clone)]
pub struct ContinuousQueryCopier {
    source: QueryClient,
    destination: QueryClient,
}

impl ContinuousQueryCopier {
    pub fn new(source: QueryClient, destination: QueryClient) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Copy every continuous query of `database`, in the order the source
    /// lists them. Stops at the first definition the destination rejects.
    pub async fn copy(&self, database: &Identifier) -> HttpResult<Vec<ContinuousQueryRecord>> {
        let listing = Statement::ShowContinuousQueries.render();
        let response = self.source.query(database.as_str(), &listing).await?;
        let records = extract_continuous_queries(&response, database.as_str())?;

        if records.is_empty() {
            info!(database = %database, "No continuous queries to copy");
            return Ok(records);
        }

        for record in &records {
            info!(
                database = %database,
                name = record.name.as_deref().unwrap_or("<unnamed>"),
                "Copying continuous query"
            );
            self.destination
                .execute(database.as_str(), &record.query)
                .await?;
        }

        info!(
            database = %database,
            copied = records.len(),
            destination = %self.destination.endpoint(),
            "Continuous queries copied"
        );
        Ok(records)
    }
}

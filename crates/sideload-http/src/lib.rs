//! # Sideload HTTP
//!
//! HTTP side of the sideload tools: a client for the InfluxDB 1.x `/query`
//! endpoint and the copier that moves continuous-query definitions from one
//! server to another.

pub mod client;
pub mod continuous_queries;
pub mod error;
pub mod response;

pub use client::{DEFAULT_TIMEOUT, QueryClient, TIMEOUT_ENV, query_endpoint, timeout_from_env};
pub use continuous_queries::{
    ContinuousQueryCopier, ContinuousQueryRecord, extract_continuous_queries,
};
pub use error::{HttpError, HttpResult};
pub use response::{QueryResponse, Series, StatementResult, parse_response};

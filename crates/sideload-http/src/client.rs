//! # InfluxDB Query Client
//!
//! A thin wrapper over `reqwest` for the InfluxDB 1.x `/query` endpoint.
//! Both the database and the statement travel as URL query parameters
//! (`db`, `q`), for reads (`GET`) and writes (`POST`) alike.
//!
//! ## Timeouts
//!
//! Every request is bounded by a single client-wide timeout, 20 seconds
//! unless [`QueryClient::with_timeout`] says otherwise. The
//! `SIDELOAD_HTTP_TIMEOUT_SECS` variable overrides the default through
//! [`timeout_from_env`].
//!
//! The client does not retry.

use crate::error::{HttpError, HttpResult};
use crate::response::{QueryResponse, parse_response};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use std::env;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Environment variable overriding [`DEFAULT_TIMEOUT`], in whole seconds
pub const TIMEOUT_ENV: &str = "SIDELOAD_HTTP_TIMEOUT_SECS";

const QUERY_PATH: &str = "query";

/// Read the request timeout from `SIDELOAD_HTTP_TIMEOUT_SECS`, falling back to
/// [`DEFAULT_TIMEOUT`] when unset
pub fn timeout_from_env() -> HttpResult<Duration> {
    match env::var(TIMEOUT_ENV) {
        Ok(value) => {
            let secs = value.trim().parse::<u64>().map_err(|e| {
                HttpError::config(TIMEOUT_ENV, format!("'{}' is not a number of seconds: {}", value, e))
            })?;
            if secs == 0 {
                return Err(HttpError::config(TIMEOUT_ENV, "timeout must be at least one second"));
            }
            Ok(Duration::from_secs(secs))
        }
        Err(env::VarError::NotPresent) => Ok(DEFAULT_TIMEOUT),
        Err(env::VarError::NotUnicode(_)) => {
            Err(HttpError::config(TIMEOUT_ENV, "value is not valid UTF-8"))
        }
    }
}

/// Resolve the `/query` endpoint for a server address.
///
/// `http://host:8086` and `http://host:8086/` become `http://host:8086/query`;
/// an address whose path already ends in `/query` keeps it, minus any trailing
/// slash.
pub fn query_endpoint(address: &str) -> HttpResult<Url> {
    let mut url = Url::parse(address)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HttpError::config(
            "endpoint",
            format!("'{}' is not an http(s) URL", address),
        ));
    }

    let path = url.path().trim_end_matches('/').to_string();
    let already_query = path
        .rsplit('/')
        .next()
        .is_some_and(|segment| segment == QUERY_PATH);
    if already_query {
        url.set_path(&path);
    } else {
        url.set_path(&format!("{}/{}", path, QUERY_PATH));
    }

    Ok(url)
}

/// Client for one InfluxDB server's `/query` endpoint
#[derive(Clone)]
pub struct QueryClient {
    endpoint: Url,
    http: Client,
    timeout: Duration,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl QueryClient {
    /// Create a client with the default timeout
    pub fn new(address: impl AsRef<str>) -> HttpResult<Self> {
        Self::with_timeout(address, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(address: impl AsRef<str>, timeout: Duration) -> HttpResult<Self> {
        let endpoint = query_endpoint(address.as_ref())?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("influx-sideload/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http,
            timeout,
        })
    }

    /// The resolved `/query` URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a read statement (`GET`)
    pub async fn query(&self, database: &str, statement: &str) -> HttpResult<QueryResponse> {
        self.send(Method::GET, database, statement).await
    }

    /// Run a statement that changes server state (`POST`)
    pub async fn execute(&self, database: &str, statement: &str) -> HttpResult<QueryResponse> {
        self.send(Method::POST, database, statement).await
    }

    async fn send(
        &self,
        method: Method,
        database: &str,
        statement: &str,
    ) -> HttpResult<QueryResponse> {
        info!(
            method = %method,
            url = %self.endpoint,
            database,
            statement,
            "Sending query"
        );

        let response = self
            .http
            .request(method, self.endpoint.clone())
            .query(&[("db", database), ("q", statement)])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!(status = status.as_u16(), body = %body, "Query response");

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        parse_response(&body)
    }

    fn transport_error(&self, error: reqwest::Error) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            HttpError::connection(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_path_is_appended() {
        assert_eq!(
            query_endpoint("http://influxdb-source:8086").unwrap().as_str(),
            "http://influxdb-source:8086/query"
        );
        assert_eq!(
            query_endpoint("http://influxdb-source:8086/").unwrap().as_str(),
            "http://influxdb-source:8086/query"
        );
        assert_eq!(
            query_endpoint("https://proxy.local/influx/").unwrap().as_str(),
            "https://proxy.local/influx/query"
        );
    }

    #[test]
    fn test_existing_query_path_is_kept() {
        assert_eq!(
            query_endpoint("http://influxdb-source:8086/query").unwrap().as_str(),
            "http://influxdb-source:8086/query"
        );
    }

    #[test]
    fn test_trailing_slash_after_query_is_dropped() {
        assert_eq!(
            query_endpoint("http://influxdb-source:8086/query/").unwrap().as_str(),
            "http://influxdb-source:8086/query"
        );
        assert_eq!(
            query_endpoint("https://proxy.local/influx/query//?db=x").unwrap().as_str(),
            "https://proxy.local/influx/query?db=x"
        );
    }

    #[test]
    fn test_non_http_address_is_rejected() {
        assert!(matches!(
            query_endpoint("influxdb-source:8086"),
            Err(HttpError::Config { .. })
        ));
        assert!(matches!(
            query_endpoint("not a url"),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_client_keeps_timeout() {
        let client =
            QueryClient::with_timeout("http://localhost:8086", Duration::from_secs(5)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
        assert_eq!(client.endpoint().path(), "/query");
        assert_eq!(
            QueryClient::new("http://localhost:8086").unwrap().timeout(),
            DEFAULT_TIMEOUT
        );
    }
}

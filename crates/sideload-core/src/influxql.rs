//! # InfluxQL Statements
//!
//! The handful of statements the side-load needs, built from validated
//! identifiers and timestamps instead of string concatenation.

use crate::identifiers::Identifier;
use crate::time::{TimeWindow, Timestamp};
use std::fmt;

/// Regex source selecting every measurement
pub const ALL_MEASUREMENTS: &str = "/.*/";

/// Backreference that keeps each source measurement's name on write
pub const MEASUREMENT_BACKREFERENCE: &str = ":MEASUREMENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Copy every point of every measurement into `target`'s default retention
    /// policy, keeping tags as tags. With a window, only points strictly
    /// inside it are copied.
    MergeInto {
        target: Identifier,
        window: Option<TimeWindow>,
    },
    DropDatabase(Identifier),
    ShowContinuousQueries,
}

impl Statement {
    pub fn merge_into(target: &Identifier, window: Option<&TimeWindow>) -> Self {
        Self::MergeInto {
            target: target.clone(),
            window: window.cloned(),
        }
    }

    pub fn drop_database(database: &Identifier) -> Self {
        Self::DropDatabase(database.clone())
    }

    pub fn render(&self) -> String {
        match self {
            Statement::MergeInto { target, window } => {
                let mut query = format!(
                    "SELECT * INTO {}..{} FROM {}",
                    target.to_influxql(),
                    MEASUREMENT_BACKREFERENCE,
                    ALL_MEASUREMENTS
                );
                if let Some(window) = window {
                    query.push_str(&format!(
                        " WHERE time > {} and time < {}",
                        time_literal(window.start()),
                        time_literal(window.end())
                    ));
                }
                query.push_str(" GROUP BY *");
                query
            }
            Statement::DropDatabase(database) => {
                format!("DROP DATABASE {}", database.to_influxql())
            }
            Statement::ShowContinuousQueries => "SHOW CONTINUOUS QUERIES".to_string(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Single-quoted string literal for a time comparison
fn time_literal(timestamp: &Timestamp) -> String {
    let mut literal = String::with_capacity(timestamp.as_str().len() + 2);
    literal.push('\'');
    for c in timestamp.as_str().chars() {
        if c == '\'' || c == '\\' {
            literal.push('\\');
        }
        literal.push(c);
    }
    literal.push('\'');
    literal
}

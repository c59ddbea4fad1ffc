// Backend and construct identifiers
//
// The explorer talks to one server that fronts two database paradigms. Every
// later choice (endpoint path, construct list, renderer input) hangs off the
// backend picked at the start of a session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::error::AppError;

/// Database paradigm behind the explorer API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Tabular database queried with SQL text
    #[serde(rename = "mysql")]
    Relational,
    /// Document database queried with JSON filters or pipelines
    #[serde(rename = "mongodb")]
    Document,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Relational, BackendKind::Document];

    /// Wire tag sent as `db_type` and used in endpoint paths
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Relational => "mysql",
            BackendKind::Document => "mongodb",
        }
    }

    /// Parse backend from string
    pub fn from_str(s: &str) -> Result<Self, AppError> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "relational" | "sql" => Ok(BackendKind::Relational),
            "mongodb" | "mongo" | "document" => Ok(BackendKind::Document),
            _ => Err(AppError::Validation(format!("Unsupported database type: {}", s))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named query capability used to request representative sample queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QueryConstruct {
    #[serde(rename = "GROUP BY")]
    Grouping,
    #[serde(rename = "WHERE")]
    Filtering,
    #[serde(rename = "ORDER BY")]
    Ordering,
    #[serde(rename = "DISTINCT")]
    Uniqueness,
}

impl QueryConstruct {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryConstruct::Grouping => "GROUP BY",
            QueryConstruct::Filtering => "WHERE",
            QueryConstruct::Ordering => "ORDER BY",
            QueryConstruct::Uniqueness => "DISTINCT",
        }
    }

    /// Accepts the wire label ("GROUP BY") as well as the descriptive name ("grouping")
    pub fn from_str(s: &str) -> Result<Self, AppError> {
        let normalized = s.trim().to_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "GROUP BY" | "GROUP" | "GROUPING" => Ok(QueryConstruct::Grouping),
            "WHERE" | "FILTER" | "FILTERING" => Ok(QueryConstruct::Filtering),
            "ORDER BY" | "ORDER" | "ORDERING" => Ok(QueryConstruct::Ordering),
            "DISTINCT" | "UNIQUE" | "UNIQUENESS" => Ok(QueryConstruct::Uniqueness),
            _ => Err(AppError::Validation(format!("Unknown construct: {}", s))),
        }
    }
}

impl fmt::Display for QueryConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

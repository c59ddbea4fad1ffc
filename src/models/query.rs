use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::backend::{BackendKind, QueryConstruct};
use super::schema::SchemaDescriptor;

/// Wire-level operation a query represents. Always derived, never chosen by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QueryOperation {
    /// Relational statement text, executed as-is
    #[serde(rename = "execute")]
    ExecuteStatement,
    /// Document filter object
    #[serde(rename = "find")]
    Retrieval,
    /// Ordered sequence of document pipeline stages
    #[serde(rename = "aggregate")]
    AggregationPipeline,
}

impl QueryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperation::ExecuteStatement => "execute",
            QueryOperation::Retrieval => "find",
            QueryOperation::AggregationPipeline => "aggregate",
        }
    }
}

/// Backend-correct, operation-tagged request ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub id: String,
    pub backend: BackendKind,
    pub target_object: String,
    pub operation: QueryOperation,
    /// SQL text as a JSON string for relational backends, parsed JSON otherwise
    pub payload: Value,
}

impl NormalizedRequest {
    pub fn new(
        backend: BackendKind,
        target_object: String,
        operation: QueryOperation,
        payload: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            backend,
            target_object,
            operation,
            payload,
        }
    }

    /// Body for the execute-query call
    pub fn to_wire(&self) -> ExecuteQueryRequest {
        ExecuteQueryRequest {
            db_type: self.backend,
            query: self.payload.clone(),
            table_name: self.target_object.clone(),
            operation: self.operation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteQueryRequest {
    pub db_type: BackendKind,
    pub query: Value,
    pub table_name: String,
    pub operation: QueryOperation,
}

/// Body for schema and preview calls. The server reads either key depending on backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectRequest {
    pub table_name: String,
    pub collection_name: String,
}

impl ObjectRequest {
    pub fn new(object: &str) -> Self {
        Self {
            table_name: object.to_string(),
            collection_name: object.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructQueriesRequest<'a> {
    pub table_name: &'a str,
    pub schema: &'a SchemaDescriptor,
    pub construct: QueryConstruct,
    pub db_type: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NaturalLanguageQueryRequest {
    pub db_type: BackendKind,
    pub nl_query: String,
    pub table_name: String,
}

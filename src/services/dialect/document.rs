use serde_json::Value;

use crate::api::error::AppError;
use crate::api::routes;
use crate::models::{BackendKind, QueryConstruct, QueryOperation, ResultShape};
use crate::validation::InputValidator;

use super::profile::BackendProfile;

const CONSTRUCTS: [QueryConstruct; 4] = [
    QueryConstruct::Grouping,
    QueryConstruct::Filtering,
    QueryConstruct::Ordering,
    QueryConstruct::Uniqueness,
];

/// Document backend: query text must be JSON, and its shape picks the operation.
///
/// An array is an aggregation pipeline, an object is a retrieval filter.
pub struct DocumentProfile;

impl BackendProfile for DocumentProfile {
    fn backend(&self) -> BackendKind {
        BackendKind::Document
    }

    fn constructs(&self) -> &'static [QueryConstruct] {
        &CONSTRUCTS
    }

    fn list_endpoint(&self) -> &'static str {
        routes::list_objects(BackendKind::Document)
    }

    fn list_key(&self) -> &'static str {
        "collections"
    }

    fn normalize_payload(&self, text: &str) -> Result<(QueryOperation, Value), AppError> {
        match InputValidator::parse_json_query(text)? {
            stages @ Value::Array(_) => Ok((QueryOperation::AggregationPipeline, stages)),
            filter @ Value::Object(_) => Ok((QueryOperation::Retrieval, filter)),
            other => Err(AppError::Validation(format!(
                "Invalid JSON query format: expected a filter object or an array of pipeline stages, found {}",
                json_kind(&other)
            ))),
        }
    }

    fn result_shape(&self) -> ResultShape {
        ResultShape::Documents
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_object_is_retrieval() {
        let (operation, payload) = DocumentProfile
            .normalize_payload(r#"{"age": {"$gt": 30}}"#)
            .unwrap();
        assert_eq!(operation, QueryOperation::Retrieval);
        assert_eq!(payload, json!({"age": {"$gt": 30}}));
    }

    #[test]
    fn test_array_is_pipeline() {
        let (operation, payload) = DocumentProfile
            .normalize_payload(
                r#"[{"$match": {"city": "Oslo"}}, {"$group": {"_id": "$age", "n": {"$sum": 1}}}]"#,
            )
            .unwrap();
        assert_eq!(operation, QueryOperation::AggregationPipeline);
        assert_eq!(payload.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_empty_array_is_still_pipeline() {
        let (operation, _) = DocumentProfile.normalize_payload("[]").unwrap();
        assert_eq!(operation, QueryOperation::AggregationPipeline);
    }

    #[test]
    fn test_stage_object_is_retrieval() {
        // Shape alone decides; a lone stage object is sent as a filter
        let (operation, _) = DocumentProfile
            .normalize_payload(r#"{"$match": {"age": 40}}"#)
            .unwrap();
        assert_eq!(operation, QueryOperation::Retrieval);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            DocumentProfile.normalize_payload("{not valid json"),
            Err(AppError::Validation(_))
        ));
        assert!(DocumentProfile.normalize_payload("").is_err());
    }

    #[test]
    fn test_scalar_rejected() {
        let err = DocumentProfile.normalize_payload("42").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }
}

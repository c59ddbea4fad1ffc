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

/// SQL backend: statement text goes over the wire untouched
pub struct RelationalProfile;

impl BackendProfile for RelationalProfile {
    fn backend(&self) -> BackendKind {
        BackendKind::Relational
    }

    fn constructs(&self) -> &'static [QueryConstruct] {
        &CONSTRUCTS
    }

    fn list_endpoint(&self) -> &'static str {
        routes::list_objects(BackendKind::Relational)
    }

    fn list_key(&self) -> &'static str {
        "tables"
    }

    fn normalize_payload(&self, text: &str) -> Result<(QueryOperation, Value), AppError> {
        let text = InputValidator::require_query_text(text)?;
        Ok((QueryOperation::ExecuteStatement, Value::String(text.to_string())))
    }

    fn result_shape(&self) -> ResultShape {
        ResultShape::Tabular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_is_constant() {
        let profile = RelationalProfile;
        for text in [
            "SELECT * FROM people",
            "[1, 2, 3]",
            "{\"age\": 1}",
            "DELETE FROM people WHERE id = 3",
            "not even sql",
        ] {
            let (operation, payload) = profile.normalize_payload(text).unwrap();
            assert_eq!(operation, QueryOperation::ExecuteStatement);
            assert_eq!(payload, Value::String(text.to_string()));
        }
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(
            RelationalProfile.normalize_payload("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_listing() {
        assert_eq!(RelationalProfile.list_endpoint(), "/mysql/tables");
        assert_eq!(RelationalProfile.list_key(), "tables");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::backend::BackendKind;

/// Example or translated query produced remotely.
///
/// Exactly one of `sql` / `mongodb` is expected, depending on the backend that
/// was asked for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedQuery {
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "nl_query")]
    pub natural_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongodb: Option<Value>,
}

impl GeneratedQuery {
    /// Build from a translation result whose `query` is SQL text or a JSON document
    pub fn from_translation(
        backend: BackendKind,
        natural_language: &str,
        description: &str,
        query: Value,
    ) -> Self {
        let (sql, mongodb) = match backend {
            BackendKind::Relational => match query {
                Value::String(text) => (Some(text), None),
                other => (Some(other.to_string()), None),
            },
            BackendKind::Document => (None, Some(query)),
        };

        Self {
            description: description.to_string(),
            natural_language: natural_language.to_string(),
            sql,
            mongodb,
        }
    }

    /// Text that, written into the query input, reproduces this query.
    ///
    /// SQL is returned unchanged; document bodies are pretty-printed JSON.
    pub fn dialect_body(&self, backend: BackendKind) -> Option<String> {
        match backend {
            BackendKind::Relational => self.sql.clone(),
            BackendKind::Document => self
                .mongodb
                .as_ref()
                .map(|body| serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_sample_query() {
        let query: GeneratedQuery = serde_json::from_value(json!({
            "description": "Equals condition",
            "nl_query": "find records where city equals sample_text_value",
            "sql": "SELECT * FROM people WHERE city = 'sample_text_value';"
        }))
        .unwrap();

        assert_eq!(query.description, "Equals condition");
        assert_eq!(
            query.dialect_body(BackendKind::Relational).as_deref(),
            Some("SELECT * FROM people WHERE city = 'sample_text_value';")
        );
        assert!(query.dialect_body(BackendKind::Document).is_none());
    }

    #[test]
    fn test_document_body_is_json_text() {
        let query = GeneratedQuery::from_translation(
            BackendKind::Document,
            "people older than 30",
            "ok",
            json!([{"$match": {"age": {"$gt": 30}}}]),
        );

        let body = query.dialect_body(BackendKind::Document).unwrap();
        let reparsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(reparsed, json!([{"$match": {"age": {"$gt": 30}}}]));
    }

    #[test]
    fn test_relational_translation_keeps_text() {
        let query = GeneratedQuery::from_translation(
            BackendKind::Relational,
            "show all",
            "ok",
            json!("SELECT * FROM people;"),
        );
        assert_eq!(query.sql.as_deref(), Some("SELECT * FROM people;"));
        assert!(query.mongodb.is_none());
    }
}

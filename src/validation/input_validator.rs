use serde_json::Value;
use std::path::Path;

use crate::api::error::AppError;

/// Local checks run before anything is sent to the server
pub struct InputValidator;

impl InputValidator {
    /// Reject a missing table/collection selection
    pub fn require_object(object: Option<&str>) -> Result<String, AppError> {
        match object.map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(AppError::Validation(
                "Please select a table/collection.".to_string(),
            )),
        }
    }

    /// Reject empty query text
    pub fn require_query_text(text: &str) -> Result<&str, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a query and select a table/collection.".to_string(),
            ));
        }
        Ok(text)
    }

    /// Reject empty natural-language text
    pub fn require_natural_language(text: &str) -> Result<String, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Please enter a natural language query and select a table/collection.".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Parse document query text as JSON
    pub fn parse_json_query(text: &str) -> Result<Value, AppError> {
        serde_json::from_str(text)
            .map_err(|e| AppError::Validation(format!("Invalid JSON query format: {}", e)))
    }

    /// Dataset files must be CSV or JSON and need a target name
    pub fn validate_upload(file_name: &str, table_name: &str) -> Result<(), AppError> {
        if table_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Please select a file and enter a table name.".to_string(),
            ));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("csv") | Some("json") => Ok(()),
            _ => Err(AppError::Validation(
                "Unsupported file type. Please upload a CSV or JSON file.".to_string(),
            )),
        }
    }
}

// Explorer API endpoint table
//
// Paths are relative to the configured base URL. Backend-specific paths embed
// the backend's wire tag.

use crate::models::BackendKind;

pub const CONSTRUCT_QUERIES: &str = "/construct-queries";
pub const EXECUTE_QUERY: &str = "/execute-query";
pub const NL_QUERY: &str = "/nl-query";
pub const UPLOAD_DATASET: &str = "/upload-dataset";

/// Listing path for tables or collections
pub fn list_objects(backend: BackendKind) -> &'static str {
    match backend {
        BackendKind::Relational => "/mysql/tables",
        BackendKind::Document => "/mongodb/collections",
    }
}

pub fn table_schema(backend: BackendKind) -> String {
    format!("/{}/table/schema", backend.as_str())
}

pub fn table_preview(backend: BackendKind) -> String {
    format!("/{}/table/preview", backend.as_str())
}

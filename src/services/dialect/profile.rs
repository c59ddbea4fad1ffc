// Backend profile trait
//
// One implementation per backend. Everything that differs between a tabular
// and a document database on the client side goes through this trait, so call
// sites never branch on the backend themselves.

use serde_json::Value;

use crate::api::error::AppError;
use crate::models::{BackendKind, QueryConstruct, QueryOperation, ResultShape};

pub trait BackendProfile: Send + Sync {
    fn backend(&self) -> BackendKind;

    /// Constructs offered for sample-query generation, in display order
    fn constructs(&self) -> &'static [QueryConstruct];

    /// Path listing this backend's tables or collections
    fn list_endpoint(&self) -> &'static str;

    /// Key holding the object names in the listing response
    fn list_key(&self) -> &'static str;

    /// Derive the operation and wire payload from raw query text
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the text cannot express a query for
    /// this backend. Nothing is sent in that case.
    fn normalize_payload(&self, text: &str) -> Result<(QueryOperation, Value), AppError>;

    /// Shape a successful result from this backend is rendered as
    fn result_shape(&self) -> ResultShape;
}

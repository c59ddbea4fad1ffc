use crate::api::error::AppError;
use crate::models::{BackendKind, NormalizedRequest};
use crate::services::dialect::profile_for;
use crate::validation::InputValidator;

/// Turns raw query input into an operation-tagged request.
///
/// The operation is a pure function of the backend and the parsed shape of the
/// input; callers cannot supply one.
pub struct QueryNormalizer;

impl QueryNormalizer {
    /// Normalize raw query text for the given backend and target object
    ///
    /// # Errors
    /// `AppError::Validation` for a missing target, empty text, or (document
    /// backends) text that is not a JSON object or array.
    pub fn normalize(
        backend: BackendKind,
        raw_query: &str,
        target_object: Option<&str>,
    ) -> Result<NormalizedRequest, AppError> {
        let target = InputValidator::require_object(target_object)?;
        let (operation, payload) = profile_for(backend).normalize_payload(raw_query)?;

        let request = NormalizedRequest::new(backend, target, operation, payload);
        tracing::debug!(
            "Normalized {} query on {} as {}",
            backend,
            request.target_object,
            operation.as_str()
        );

        Ok(request)
    }
}

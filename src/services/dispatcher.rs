// Query dispatcher
//
// Sends requests to the explorer API and turns whatever comes back into a
// value the caller can show. Query execution and previews never fail from the
// caller's point of view: transport faults, remote failures and malformed
// bodies all become a message-only envelope. The other calls return
// `Result` and the workflow controller turns errors into status messages, so
// the same absorption holds for them one layer up.
//
// Exactly one network call per invocation. No retries, no caching.

use serde_json::Value;
use std::sync::Arc;

use crate::api::error::AppError;
use crate::api::routes;
use crate::api::transport::{Transport, TransportResponse, UploadForm};
use crate::models::{
    BackendKind, ConstructQueriesRequest, GeneratedQuery, NaturalLanguageQueryRequest,
    NormalizedRequest, ObjectRequest, QueryConstruct, ResultEnvelope, ResultShape,
    SchemaDescriptor,
};
use crate::services::dialect::profile_for;
use crate::validation::InputValidator;

const EXECUTED_MESSAGE: &str = "Query executed successfully.";
const PREVIEW_MESSAGE: &str = "Preview loaded.";

pub struct QueryDispatcher {
    transport: Arc<dyn Transport>,
}

impl QueryDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute a normalized query and return a shape-tagged envelope
    pub async fn execute(&self, request: &NormalizedRequest) -> ResultEnvelope {
        tracing::info!(
            "Executing {} {} query on {} (request {})",
            request.backend,
            request.operation.as_str(),
            request.target_object,
            request.id
        );

        let body = match serde_json::to_value(request.to_wire()) {
            Ok(body) => body,
            Err(e) => return ResultEnvelope::failure(format!("Failed to encode query: {}", e)),
        };

        match self.transport.post_json(routes::EXECUTE_QUERY, &body).await {
            Ok(response) => {
                let expected = profile_for(request.backend).result_shape();
                Self::envelope_from_response(expected, "results", EXECUTED_MESSAGE, response)
            }
            Err(e) => {
                tracing::warn!("Query execution failed in transport: {}", e);
                ResultEnvelope::failure(e.user_message())
            }
        }
    }

    /// List table or collection names for a backend
    pub async fn list_objects(&self, backend: BackendKind) -> Result<Vec<String>, AppError> {
        let profile = profile_for(backend);
        let response = self.transport.get(profile.list_endpoint()).await?;

        // Either key is accepted regardless of backend
        let names = response
            .body
            .get(profile.list_key())
            .or_else(|| response.body.get("tables"))
            .or_else(|| response.body.get("collections"));

        match names {
            Some(Value::Array(items)) => Ok(items
                .iter()
                .map(|item| match item {
                    Value::String(name) => name.clone(),
                    other => other.to_string(),
                })
                .collect()),
            Some(_) => Err(AppError::MalformedResponse(format!(
                "'{}' is not a list",
                profile.list_key()
            ))),
            None => Err(AppError::Remote(
                remote_message(&response.body)
                    .unwrap_or_else(|| "No tables or collections found.".to_string()),
            )),
        }
    }

    /// Load the schema of one table or collection
    pub async fn load_schema(
        &self,
        backend: BackendKind,
        object: &str,
    ) -> Result<SchemaDescriptor, AppError> {
        let body = to_body(&ObjectRequest::new(object))?;
        let response = self
            .transport
            .post_json(&routes::table_schema(backend), &body)
            .await?;

        if !response.is_success() {
            return Err(AppError::Remote(
                remote_message(&response.body).unwrap_or_else(|| "Error loading schema.".to_string()),
            ));
        }

        Ok(SchemaDescriptor::from_response(response.body))
    }

    /// Load sample rows or documents, shaped like a query result
    pub async fn load_preview(&self, backend: BackendKind, object: &str) -> ResultEnvelope {
        let body = match to_body(&ObjectRequest::new(object)) {
            Ok(body) => body,
            Err(e) => return ResultEnvelope::failure(e.user_message()),
        };

        match self
            .transport
            .post_json(&routes::table_preview(backend), &body)
            .await
        {
            Ok(response) => {
                let expected = profile_for(backend).result_shape();
                Self::envelope_from_response(expected, "sample_data", PREVIEW_MESSAGE, response)
            }
            Err(e) => {
                tracing::warn!("Preview of {} failed in transport: {}", object, e);
                ResultEnvelope::failure(e.user_message())
            }
        }
    }

    /// Ask the server for sample queries exercising one construct
    pub async fn generate_queries(
        &self,
        backend: BackendKind,
        object: &str,
        schema: &SchemaDescriptor,
        construct: QueryConstruct,
    ) -> Result<Vec<GeneratedQuery>, AppError> {
        let body = to_body(&ConstructQueriesRequest {
            table_name: object,
            schema,
            construct,
            db_type: backend,
        })?;

        let response = self
            .transport
            .post_json(routes::CONSTRUCT_QUERIES, &body)
            .await?;

        if !response.is_success() {
            return Err(AppError::Remote(
                remote_message(&response.body)
                    .unwrap_or_else(|| "Error generating queries".to_string()),
            ));
        }

        let queries = match response.body.get("queries") {
            Some(queries) => queries.clone(),
            None => return Err(AppError::Remote("No queries generated".to_string())),
        };

        let queries: Vec<GeneratedQuery> = serde_json::from_value(queries)
            .map_err(|e| AppError::MalformedResponse(format!("queries could not be read: {}", e)))?;

        if queries.is_empty() {
            return Err(AppError::Remote("No queries generated".to_string()));
        }

        tracing::info!("Received {} sample {} queries for {}", queries.len(), construct, object);
        Ok(queries)
    }

    /// Translate natural-language text into a backend query
    pub async fn translate(
        &self,
        backend: BackendKind,
        natural_language: &str,
        object: &str,
    ) -> Result<GeneratedQuery, AppError> {
        let body = to_body(&NaturalLanguageQueryRequest {
            db_type: backend,
            nl_query: natural_language.to_string(),
            table_name: object.to_string(),
        })?;

        let response = self.transport.post_json(routes::NL_QUERY, &body).await?;
        let success = response_success(&response);
        let message = remote_message(&response.body);

        if !success {
            return Err(AppError::Remote(
                message.unwrap_or_else(|| "Error processing natural language query".to_string()),
            ));
        }

        let query = match response.body.get("query") {
            Some(query) if !query.is_null() => query.clone(),
            _ => return Err(AppError::MalformedResponse("translation has no query".to_string())),
        };

        Ok(GeneratedQuery::from_translation(
            backend,
            natural_language,
            message.as_deref().unwrap_or("Query generated successfully."),
            query,
        ))
    }

    /// Upload a CSV or JSON dataset under a table/collection name
    pub async fn upload_dataset(&self, form: UploadForm) -> Result<String, AppError> {
        InputValidator::validate_upload(&form.file_name, &form.table_name)?;

        let response = self
            .transport
            .post_multipart(routes::UPLOAD_DATASET, form)
            .await?;
        let message = remote_message(&response.body);

        if response.is_success() {
            Ok(message.unwrap_or_else(|| "Dataset uploaded.".to_string()))
        } else {
            Err(AppError::Remote(
                message.unwrap_or_else(|| format!("Upload failed with status {}", response.status)),
            ))
        }
    }

    /// Build an envelope from an execute or preview response.
    ///
    /// `documents_key` names the field holding documents for the documents shape.
    /// A success body missing the fields its shape needs degrades to message-only.
    fn envelope_from_response(
        expected: ResultShape,
        documents_key: &str,
        default_message: &str,
        response: TransportResponse,
    ) -> ResultEnvelope {
        let success = response_success(&response);
        let message = remote_message(&response.body);

        if !success {
            let message = message
                .unwrap_or_else(|| format!("Request failed with status {}", response.status));
            return ResultEnvelope::failure(message);
        }

        let message = message.unwrap_or_else(|| default_message.to_string());
        let body = &response.body;

        match expected {
            ResultShape::Tabular => {
                let (columns, rows) = (body.get("columns"), body.get("rows"));
                if columns.is_none() && rows.is_none() {
                    // Statements without a result set
                    return ResultEnvelope::message_only(true, message);
                }

                match (columns.and_then(parse_columns), rows.and_then(parse_rows)) {
                    (Some(columns), Some(rows)) => ResultEnvelope::tabular(message, columns, rows),
                    _ => {
                        tracing::warn!("Tabular response missing readable columns or rows");
                        ResultEnvelope::message_only(
                            true,
                            format!("{} (the result rows could not be read)", message),
                        )
                    }
                }
            }
            ResultShape::Documents => match body.get(documents_key) {
                Some(Value::Array(documents)) => ResultEnvelope::documents(message, documents.clone()),
                None => ResultEnvelope::message_only(true, message),
                Some(_) => {
                    tracing::warn!("Document response '{}' is not a list", documents_key);
                    ResultEnvelope::message_only(
                        true,
                        format!("{} (the result documents could not be read)", message),
                    )
                }
            },
            ResultShape::None => ResultEnvelope::message_only(true, message),
        }
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Validation(format!("Failed to encode request: {}", e)))
}

/// `success` when present, otherwise the HTTP status with no `error` field
fn response_success(response: &TransportResponse) -> bool {
    match response.body.get("success").and_then(Value::as_bool) {
        Some(success) => success,
        None => response.is_success() && response.body.get("error").is_none(),
    }
}

/// Server message, read from `message` or `error`
fn remote_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_columns(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|column| column.as_str().map(str::to_string))
        .collect()
}

fn parse_rows(value: &Value) -> Option<Vec<Vec<Value>>> {
    value
        .as_array()?
        .iter()
        .map(|row| row.as_array().cloned())
        .collect()
}

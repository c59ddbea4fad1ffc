// Workflow controller
//
// Owns the session state and drives one user action at a time:
// select backend -> list objects -> select object -> load schema/preview ->
// generate samples | translate | execute.
//
// The state lock is never held across a remote call. Each action takes a
// generation ticket for the slice of state it will write; a response whose
// ticket has been superseded (a newer action on the same slice, or a backend
// switch) is dropped instead of overwriting newer state.

use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::error::AppError;
use crate::api::transport::{Transport, UploadForm};
use crate::models::{BackendKind, GeneratedQuery, QueryConstruct, SchemaDescriptor};
use crate::services::dialect::constructs_for;
use crate::services::dispatcher::QueryDispatcher;
use crate::services::normalizer::QueryNormalizer;
use crate::services::renderer::{
    QueryCard, QueryCardRenderer, RenderedQueries, RenderedResult, ResultRenderer, StatusMessage,
};
use crate::validation::InputValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    BackendSelected,
    ObjectSelected,
    SchemaLoaded,
    QueriesGenerated,
    QueryExecuted,
    TranslationProduced,
}

/// Independently replaced parts of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slice {
    Objects = 0,
    Schema = 1,
    Preview = 2,
    Queries = 3,
    Execution = 4,
    Translation = 5,
    Upload = 6,
}

const SLICE_COUNT: usize = 7;

/// Everything below the backend choice
const OBJECT_SLICES: [Slice; 5] = [
    Slice::Schema,
    Slice::Preview,
    Slice::Queries,
    Slice::Execution,
    Slice::Translation,
];

#[derive(Debug, Clone, Copy)]
struct Ticket {
    slice: Slice,
    generation: u64,
}

/// Current generation per slice, and whether that generation is still in flight
#[derive(Debug, Clone, Default)]
struct Generations {
    current: [u64; SLICE_COUNT],
    pending: [bool; SLICE_COUNT],
}

impl Generations {
    fn begin(&mut self, slice: Slice) -> Ticket {
        let index = slice as usize;
        self.current[index] += 1;
        self.pending[index] = true;
        Ticket {
            slice,
            generation: self.current[index],
        }
    }

    /// Supersede whatever is in flight for `slices`
    fn invalidate(&mut self, slices: &[Slice]) {
        for slice in slices {
            self.current[*slice as usize] += 1;
            self.pending[*slice as usize] = false;
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.current[ticket.slice as usize] == ticket.generation
    }

    fn finish(&mut self, ticket: Ticket) {
        if self.is_current(ticket) {
            self.pending[ticket.slice as usize] = false;
        }
    }

    fn any_pending(&self) -> bool {
        self.pending.iter().any(|pending| *pending)
    }
}

/// Session-local state, replaced slice by slice as actions resolve
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub state: WorkflowState,
    pub backend: Option<BackendKind>,
    pub objects: Vec<String>,
    pub selected_object: Option<String>,
    pub schema: Option<SchemaDescriptor>,
    pub preview: Option<RenderedResult>,
    pub generated_queries: Vec<GeneratedQuery>,
    pub sample_queries: Option<RenderedQueries>,
    pub translation: Option<GeneratedQuery>,
    pub translation_card: Option<QueryCard>,
    pub query_input: String,
    pub result: Option<RenderedResult>,
    pub status: Option<StatusMessage>,
    generations: Generations,
}

impl SessionState {
    /// True while any current action is waiting on the server
    pub fn is_loading(&self) -> bool {
        self.generations.any_pending()
    }

    fn reset_for_backend(&mut self, backend: BackendKind) {
        let mut generations = std::mem::take(&mut self.generations);
        generations.invalidate(&[Slice::Objects, Slice::Upload]);
        generations.invalidate(&OBJECT_SLICES);

        *self = SessionState {
            state: WorkflowState::BackendSelected,
            backend: Some(backend),
            generations,
            ..SessionState::default()
        };
    }

    fn reset_for_object(&mut self, object: String) {
        self.generations.invalidate(&OBJECT_SLICES);
        self.selected_object = Some(object);
        self.schema = None;
        self.preview = None;
        self.generated_queries.clear();
        self.sample_queries = None;
        self.translation = None;
        self.translation_card = None;
        self.result = None;
        self.state = WorkflowState::ObjectSelected;
    }

    fn require_backend(&self) -> Result<BackendKind, AppError> {
        self.backend
            .ok_or_else(|| AppError::Validation("Please select a database type.".to_string()))
    }
}

pub struct WorkflowController {
    session_id: String,
    dispatcher: QueryDispatcher,
    session: Mutex<SessionState>,
}

impl WorkflowController {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            dispatcher: QueryDispatcher::new(transport),
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Copy of the current session state
    pub async fn snapshot(&self) -> SessionState {
        self.session.lock().await.clone()
    }

    /// Constructs available for the selected backend
    pub async fn constructs(&self) -> Vec<QueryConstruct> {
        match self.session.lock().await.backend {
            Some(backend) => constructs_for(backend).to_vec(),
            None => Vec::new(),
        }
    }

    /// Switch backend, discard everything loaded for the previous one, and list objects
    pub async fn select_backend(&self, backend: BackendKind) -> StatusMessage {
        let ticket = {
            let mut session = self.session.lock().await;
            session.reset_for_backend(backend);
            session.status = Some(StatusMessage::info("Loading tables/collections..."));
            session.generations.begin(Slice::Objects)
        };
        tracing::info!("Session {} selected backend {}", self.session_id, backend);

        let outcome = self.dispatcher.list_objects(backend).await;

        self.apply(ticket, |session| match outcome {
            Ok(objects) if !objects.is_empty() => {
                session.objects = objects;
                StatusMessage::success("Tables/collections loaded successfully.")
            }
            Ok(_) => StatusMessage::failure("No tables or collections found."),
            Err(e) => StatusMessage::failure(e.user_message()),
        })
        .await
    }

    /// Choose the table or collection later actions operate on
    pub async fn select_object(&self, object: &str) -> StatusMessage {
        let mut session = self.session.lock().await;

        let selected = session
            .require_backend()
            .and_then(|_| InputValidator::require_object(Some(object)));

        let status = match selected {
            Ok(name) => {
                if !session.objects.is_empty() && !session.objects.contains(&name) {
                    tracing::warn!("{} is not in the listed tables/collections", name);
                }
                let status = StatusMessage::info(format!("Selected {}.", name));
                session.reset_for_object(name);
                status
            }
            Err(e) => StatusMessage::failure(e.user_message()),
        };

        session.status = Some(status.clone());
        status
    }

    pub async fn load_schema(&self) -> StatusMessage {
        let (backend, object, ticket) = match self.begin_object_action(Slice::Schema).await {
            Ok(started) => started,
            Err(status) => return status,
        };

        let outcome = self.dispatcher.load_schema(backend, &object).await;

        self.apply(ticket, |session| match outcome {
            Ok(schema) => {
                session.schema = Some(schema);
                session.state = WorkflowState::SchemaLoaded;
                StatusMessage::success(format!("Schema loaded for {}.", object))
            }
            Err(e) => StatusMessage::failure(e.user_message()),
        })
        .await
    }

    pub async fn load_preview(&self) -> StatusMessage {
        let (backend, object, ticket) = match self.begin_object_action(Slice::Preview).await {
            Ok(started) => started,
            Err(status) => return status,
        };

        let envelope = self.dispatcher.load_preview(backend, &object).await;
        let rendered = ResultRenderer::render(&envelope);

        self.apply(ticket, |session| {
            let status = rendered.status.clone();
            session.preview = Some(rendered);
            status
        })
        .await
    }

    /// Request sample queries for a construct. Needs a loaded schema.
    pub async fn generate_queries(&self, construct: QueryConstruct) -> StatusMessage {
        let started = {
            let mut session = self.session.lock().await;
            let checked = Self::object_selection(&session).and_then(|(backend, object)| {
                if !constructs_for(backend).contains(&construct) {
                    return Err(AppError::Validation(format!(
                        "{} is not available for {}",
                        construct, backend
                    )));
                }
                match &session.schema {
                    Some(schema) if !schema.is_empty() => Ok((backend, object, schema.clone())),
                    _ => Err(AppError::Validation(
                        "Please select a table and load its schema first.".to_string(),
                    )),
                }
            });

            match checked {
                Ok((backend, object, schema)) => {
                    session.sample_queries = None;
                    session.generated_queries.clear();
                    Ok((backend, object, schema, session.generations.begin(Slice::Queries)))
                }
                Err(e) => Err(Self::record_failure(&mut session, e)),
            }
        };

        let (backend, object, schema, ticket) = match started {
            Ok(started) => started,
            Err(status) => return status,
        };

        let outcome = self
            .dispatcher
            .generate_queries(backend, &object, &schema, construct)
            .await;

        self.apply(ticket, |session| match outcome {
            Ok(queries) => {
                let rendered = QueryCardRenderer::render_samples(backend, construct, &queries);
                let status = StatusMessage::success(format!(
                    "Generated {} sample queries using {}.",
                    queries.len(),
                    construct
                ));
                session.generated_queries = queries;
                session.sample_queries = Some(rendered);
                session.state = WorkflowState::QueriesGenerated;
                status
            }
            Err(e) => StatusMessage::failure(e.user_message()),
        })
        .await
    }

    /// Replace the raw query input
    pub async fn set_query_input(&self, text: &str) {
        self.session.lock().await.query_input = text.to_string();
    }

    /// Copy a generated sample query's body into the query input
    pub async fn use_sample_query(&self, index: usize) -> Result<String, StatusMessage> {
        let mut session = self.session.lock().await;
        let body = session.backend.and_then(|backend| {
            session
                .generated_queries
                .get(index)
                .and_then(|query| query.dialect_body(backend))
        });

        match body {
            Some(body) => {
                session.query_input = body.clone();
                Ok(body)
            }
            None => Err(Self::record_failure(
                &mut session,
                AppError::Validation(format!("No sample query #{}", index + 1)),
            )),
        }
    }

    /// Normalize the query input and execute it
    pub async fn execute_query(&self) -> StatusMessage {
        let started = {
            let mut session = self.session.lock().await;
            let normalized = session.require_backend().and_then(|backend| {
                QueryNormalizer::normalize(
                    backend,
                    &session.query_input,
                    session.selected_object.as_deref(),
                )
            });

            match normalized {
                Ok(request) => {
                    Ok((request, session.generations.begin(Slice::Execution)))
                }
                Err(e) => Err(Self::record_failure(&mut session, e)),
            }
        };

        let (request, ticket) = match started {
            Ok(started) => started,
            Err(status) => return status,
        };

        let envelope = self.dispatcher.execute(&request).await;
        tracing::info!(
            "Request {} finished: success={} shape={} records={}",
            request.id,
            envelope.success,
            envelope.shape.as_str(),
            envelope.record_count()
        );
        let rendered = ResultRenderer::render(&envelope);

        self.apply(ticket, |session| {
            let status = rendered.status.clone();
            session.result = Some(rendered);
            session.state = WorkflowState::QueryExecuted;
            status
        })
        .await
    }

    /// Translate natural-language text into a query for the selected object
    pub async fn translate(&self, natural_language: &str) -> StatusMessage {
        let started = {
            let mut session = self.session.lock().await;
            let checked = InputValidator::require_natural_language(natural_language)
                .and_then(|text| Self::object_selection(&session).map(|(b, o)| (b, o, text)));

            match checked {
                Ok((backend, object, text)) => {
                    Ok((backend, object, text, session.generations.begin(Slice::Translation)))
                }
                Err(e) => Err(Self::record_failure(&mut session, e)),
            }
        };

        let (backend, object, text, ticket) = match started {
            Ok(started) => started,
            Err(status) => return status,
        };

        let outcome = self.dispatcher.translate(backend, &text, &object).await;

        self.apply(ticket, |session| match outcome {
            Ok(generated) => {
                let status = StatusMessage::success(generated.description.clone());
                session.translation_card = Some(QueryCardRenderer::render_translation(backend, &generated));
                session.translation = Some(generated);
                session.state = WorkflowState::TranslationProduced;
                status
            }
            Err(e) => StatusMessage::failure(e.user_message()),
        })
        .await
    }

    /// Write the translated query into the query input and execute it
    pub async fn promote_translation(&self) -> StatusMessage {
        {
            let mut session = self.session.lock().await;
            let body = match (session.backend, &session.translation) {
                (Some(backend), Some(translation)) => translation.dialect_body(backend),
                _ => None,
            };

            match body {
                Some(body) => session.query_input = body,
                None => {
                    return Self::record_failure(
                        &mut session,
                        AppError::Validation("There is no translated query to execute.".to_string()),
                    );
                }
            }
        }

        self.execute_query().await
    }

    /// Upload a dataset file. Independent of the selected backend and object.
    pub async fn upload_dataset(&self, form: UploadForm) -> StatusMessage {
        let ticket = {
            let mut session = self.session.lock().await;
            session.generations.begin(Slice::Upload)
        };

        let outcome = self.dispatcher.upload_dataset(form).await;

        self.apply(ticket, |_| match outcome {
            Ok(message) => StatusMessage::success(message),
            Err(e) => StatusMessage::failure(e.user_message()),
        })
        .await
    }

    fn object_selection(session: &SessionState) -> Result<(BackendKind, String), AppError> {
        let backend = session.require_backend()?;
        let object = InputValidator::require_object(session.selected_object.as_deref())?;
        Ok((backend, object))
    }

    /// Validate the selection and take a ticket for `slice`
    async fn begin_object_action(
        &self,
        slice: Slice,
    ) -> Result<(BackendKind, String, Ticket), StatusMessage> {
        let mut session = self.session.lock().await;
        match Self::object_selection(&session) {
            Ok((backend, object)) => Ok((backend, object, session.generations.begin(slice))),
            Err(e) => Err(Self::record_failure(&mut session, e)),
        }
    }

    fn record_failure(session: &mut SessionState, error: AppError) -> StatusMessage {
        tracing::debug!("Action rejected ({:?}): {}", error.kind(), error);
        let status = StatusMessage::failure(error.user_message());
        session.status = Some(status.clone());
        status
    }

    /// Apply a resolved action if its ticket is still current.
    ///
    /// Stale outcomes leave the state untouched; their status is still returned
    /// to the caller that started them.
    async fn apply<F>(&self, ticket: Ticket, update: F) -> StatusMessage
    where
        F: FnOnce(&mut SessionState) -> StatusMessage,
    {
        let mut session = self.session.lock().await;
        if !session.generations.is_current(ticket) {
            tracing::debug!(
                "Discarding stale {:?} response (generation {})",
                ticket.slice,
                ticket.generation
            );
            let mut scratch = SessionState::default();
            return update(&mut scratch);
        }

        let status = update(&mut session);
        session.generations.finish(ticket);
        session.status = Some(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes;
    use crate::api::transport::testing::MockTransport;
    use crate::services::renderer::{RenderedBody, StatusTone};
    use serde_json::json;

    fn controller(transport: &Arc<MockTransport>) -> WorkflowController {
        WorkflowController::new(transport.clone())
    }

    fn explorer_fixture() -> Arc<MockTransport> {
        let transport = Arc::new(MockTransport::new());
        transport.respond("/mysql/tables", 200, json!({"tables": ["people", "orders"]}));
        transport.respond(
            "/mysql/table/schema",
            200,
            json!({"schema": [{"Field": "id", "Type": "int"}, {"Field": "name", "Type": "varchar(20)"}]}),
        );
        transport.respond("/mongodb/collections", 200, json!({"collections": ["events"]}));
        transport
    }

    #[tokio::test]
    async fn test_backend_selection_lists_objects() {
        let transport = explorer_fixture();
        let controller = controller(&transport);

        let status = controller.select_backend(BackendKind::Relational).await;
        assert_eq!(status.tone, StatusTone::Success);

        let session = controller.snapshot().await;
        assert_eq!(session.state, WorkflowState::BackendSelected);
        assert_eq!(session.objects, vec!["people".to_string(), "orders".to_string()]);
        assert!(!session.is_loading());
        assert_eq!(controller.constructs().await.len(), 4);
    }

    #[tokio::test]
    async fn test_backend_switch_resets_downstream_state() {
        let transport = explorer_fixture();
        let controller = controller(&transport);

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        controller.load_schema().await;
        let session = controller.snapshot().await;
        assert_eq!(session.state, WorkflowState::SchemaLoaded);
        assert!(session.schema.is_some());

        controller.select_backend(BackendKind::Document).await;
        let session = controller.snapshot().await;
        assert_eq!(session.backend, Some(BackendKind::Document));
        assert!(session.selected_object.is_none());
        assert!(session.schema.is_none());
        assert_eq!(session.objects, vec!["events".to_string()]);
    }

    #[tokio::test]
    async fn test_generation_requires_schema() {
        let transport = explorer_fixture();
        let controller = controller(&transport);

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        let before = transport.request_count();

        let status = controller.generate_queries(QueryConstruct::Filtering).await;
        assert!(status.is_failure());
        assert_eq!(status.text, "Please select a table and load its schema first.");
        assert_eq!(transport.request_count(), before);
    }

    #[tokio::test]
    async fn test_generate_queries_after_schema() {
        let transport = explorer_fixture();
        transport.respond(
            routes::CONSTRUCT_QUERIES,
            200,
            json!({"queries": [{
                "description": "Equals condition",
                "nl_query": "find records where name equals sample_text_value",
                "sql": "SELECT * FROM people WHERE name = 'sample_text_value';"
            }]}),
        );
        let controller = controller(&transport);

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        controller.load_schema().await;
        let status = controller.generate_queries(QueryConstruct::Filtering).await;
        assert_eq!(status.tone, StatusTone::Success);

        let session = controller.snapshot().await;
        assert_eq!(session.state, WorkflowState::QueriesGenerated);
        let rendered = session.sample_queries.unwrap();
        assert_eq!(rendered.heading, "Sample Queries using WHERE");

        let body = controller.use_sample_query(0).await.unwrap();
        assert_eq!(body, "SELECT * FROM people WHERE name = 'sample_text_value';");
        assert_eq!(controller.snapshot().await.query_input, body);
    }

    #[tokio::test]
    async fn test_invalid_document_query_not_dispatched() {
        let transport = explorer_fixture();
        let controller = controller(&transport);

        controller.select_backend(BackendKind::Document).await;
        controller.select_object("events").await;
        controller.set_query_input("{not valid json").await;
        let before = transport.request_count();

        let status = controller.execute_query().await;
        assert!(status.is_failure());
        assert!(status.text.starts_with("Invalid JSON query format"));
        assert_eq!(transport.request_count(), before);
    }

    #[tokio::test]
    async fn test_execute_without_selection_is_local_failure() {
        let transport = explorer_fixture();
        let controller = controller(&transport);

        let status = controller.execute_query().await;
        assert_eq!(status.text, "Please select a database type.");

        controller.select_backend(BackendKind::Relational).await;
        controller.set_query_input("SELECT 1").await;
        let before = transport.request_count();
        let status = controller.execute_query().await;
        assert!(status.is_failure());
        assert_eq!(transport.request_count(), before);
    }

    #[tokio::test]
    async fn test_execute_renders_table() {
        let transport = explorer_fixture();
        transport.respond(
            routes::EXECUTE_QUERY,
            200,
            json!({
                "success": true,
                "message": "Query executed successfully.",
                "columns": ["id", "name"],
                "rows": [[1, "a"], [2, null]],
            }),
        );
        let controller = controller(&transport);

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        controller.set_query_input("SELECT id, name FROM people").await;
        controller.execute_query().await;

        let session = controller.snapshot().await;
        assert_eq!(session.state, WorkflowState::QueryExecuted);
        match session.result.unwrap().body {
            RenderedBody::Table { rows, .. } => {
                assert_eq!(rows[0], vec!["1".to_string(), "a".to_string()]);
                assert_eq!(rows[1], vec!["2".to_string(), "NULL".to_string()]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translation_promoted_to_execution() {
        let transport = explorer_fixture();
        transport.respond(
            routes::NL_QUERY,
            200,
            json!({
                "success": true,
                "message": "Query generated successfully",
                "query": [{"$match": {"kind": "click"}}, {"$count": "total"}],
            }),
        );
        transport.respond(
            routes::EXECUTE_QUERY,
            200,
            json!({"success": true, "message": "Query executed successfully.", "results": [{"total": 7}]}),
        );
        let controller = controller(&transport);

        controller.select_backend(BackendKind::Document).await;
        controller.select_object("events").await;
        let status = controller.translate("how many clicks").await;
        assert_eq!(status.tone, StatusTone::Success);
        assert_eq!(controller.snapshot().await.state, WorkflowState::TranslationProduced);

        controller.promote_translation().await;

        let execute = transport
            .requests()
            .into_iter()
            .find(|r| r.path == routes::EXECUTE_QUERY)
            .unwrap();
        let body = execute.body.unwrap();
        assert_eq!(body["operation"], "aggregate");
        assert_eq!(body["query"], json!([{"$match": {"kind": "click"}}, {"$count": "total"}]));

        let session = controller.snapshot().await;
        assert_eq!(session.state, WorkflowState::QueryExecuted);
        assert!(matches!(session.result.unwrap().body, RenderedBody::Documents(_)));
    }

    #[tokio::test]
    async fn test_empty_natural_language_rejected() {
        let transport = explorer_fixture();
        let controller = controller(&transport);
        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;

        let status = controller.translate("   ").await;
        assert!(status.is_failure());
        assert!(controller.promote_translation().await.is_failure());
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_workflow_usable() {
        let transport = Arc::new(MockTransport::new());
        transport.fail("/mysql/tables", "connection refused");
        let controller = controller(&transport);

        let status = controller.select_backend(BackendKind::Relational).await;
        assert!(status.is_failure());
        assert!(!controller.snapshot().await.is_loading());

        transport.respond(
            routes::EXECUTE_QUERY,
            200,
            json!({"success": true, "message": "Query executed successfully."}),
        );
        controller.select_object("people").await;
        controller.set_query_input("DELETE FROM people").await;
        let status = controller.execute_query().await;
        assert_eq!(status.tone, StatusTone::Success);
    }

    #[tokio::test]
    async fn test_stale_response_discarded_after_backend_switch() {
        let transport = explorer_fixture();
        let controller = Arc::new(controller(&transport));

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        let gate = transport.gate("/mysql/table/schema");

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.load_schema().await })
        };

        // Wait until the schema request is in flight
        while transport.requests().iter().all(|r| r.path != "/mysql/table/schema") {
            tokio::task::yield_now().await;
        }

        controller.select_backend(BackendKind::Document).await;
        gate.notify_one();
        pending.await.unwrap();

        let session = controller.snapshot().await;
        assert_eq!(session.backend, Some(BackendKind::Document));
        assert!(session.schema.is_none());
        assert_eq!(session.state, WorkflowState::BackendSelected);
    }

    #[tokio::test]
    async fn test_loading_clears_when_superseded_by_object_change() {
        let transport = explorer_fixture();
        let controller = Arc::new(controller(&transport));

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        let gate = transport.gate("/mysql/table/schema");

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.load_schema().await })
        };
        while transport.requests().iter().all(|r| r.path != "/mysql/table/schema") {
            tokio::task::yield_now().await;
        }
        assert!(controller.snapshot().await.is_loading());

        // Changing object supersedes the schema request
        controller.select_object("orders").await;
        assert!(!controller.snapshot().await.is_loading());

        gate.notify_one();
        pending.await.unwrap();

        let session = controller.snapshot().await;
        assert!(!session.is_loading());
        assert!(session.schema.is_none());
        assert_eq!(session.selected_object.as_deref(), Some("orders"));
        assert_eq!(session.state, WorkflowState::ObjectSelected);
    }

    #[tokio::test]
    async fn test_loading_held_while_other_slice_in_flight() {
        let transport = explorer_fixture();
        transport.respond(
            routes::EXECUTE_QUERY,
            200,
            json!({"success": true, "message": "Query executed successfully.", "columns": ["n"], "rows": [[1]]}),
        );
        let controller = Arc::new(controller(&transport));

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        controller.set_query_input("SELECT 1 AS n").await;
        let gate = transport.gate(routes::EXECUTE_QUERY);

        let execution = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.execute_query().await })
        };
        while transport.requests().iter().all(|r| r.path != routes::EXECUTE_QUERY) {
            tokio::task::yield_now().await;
        }

        let status = controller.load_schema().await;
        assert_eq!(status.tone, StatusTone::Success);
        assert!(controller.snapshot().await.is_loading());

        gate.notify_one();
        execution.await.unwrap();
        let session = controller.snapshot().await;
        assert!(!session.is_loading());
        assert!(session.result.is_some());
    }

    #[tokio::test]
    async fn test_newer_execution_wins() {
        let transport = explorer_fixture();
        transport.respond(
            routes::EXECUTE_QUERY,
            200,
            json!({"success": true, "message": "served first", "columns": ["n"], "rows": [[1]]}),
        );
        transport.respond(
            routes::EXECUTE_QUERY,
            200,
            json!({"success": true, "message": "served second", "columns": ["n"], "rows": [[2]]}),
        );
        let controller = Arc::new(controller(&transport));

        controller.select_backend(BackendKind::Relational).await;
        controller.select_object("people").await;
        controller.set_query_input("SELECT 1 AS n").await;
        let gate = transport.gate(routes::EXECUTE_QUERY);

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.execute_query().await })
        };
        while transport.requests().iter().all(|r| r.path != routes::EXECUTE_QUERY) {
            tokio::task::yield_now().await;
        }

        // The second execution starts after the first and resolves before it
        let second = controller.execute_query().await;
        assert_eq!(second.text, "served first");
        gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first.text, "served second");

        // The older execution resolved last but must not overwrite the newer result
        let session = controller.snapshot().await;
        assert_eq!(session.result.unwrap().status.text, "served first");
    }

    #[tokio::test]
    async fn test_upload_status() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(routes::UPLOAD_DATASET, 200, json!({"message": "Dataset uploaded."}));
        let controller = controller(&transport);

        let status = controller
            .upload_dataset(UploadForm {
                file_name: "events.json".to_string(),
                bytes: b"[]".to_vec(),
                table_name: "events".to_string(),
            })
            .await;
        assert_eq!(status, StatusMessage::success("Dataset uploaded."));
    }
}

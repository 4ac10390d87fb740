//! In-process implementation of [`MdpClient`].
//!
//! Holds the whole backend in a mutex-guarded state. Used by tests (every
//! call is recorded, failures can be injected per operation) and by the
//! console's offline mode via [`InMemoryClient::seeded`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use mdp_types::{
    ActionType, CreateFunctionRequest, ExecutionLog, FacetBucket, FunctionDefinition, LinkType,
    ObjectType, OutputType, ParamType, Parameter, SearchHit, SearchRequest, SearchResponse,
    UpdateFunctionRequest,
};

use crate::{ClientError, MdpClient, Result};

/// Operation kinds, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListFunctions,
    CreateFunction,
    UpdateFunction,
    DeleteFunction,
    ListObjectTypes,
    DeleteObjectType,
    ListLinkTypes,
    DeleteLinkType,
    ListActionTypes,
    DeleteActionType,
    Search,
    ListExecutionLogs,
}

/// A call as observed by the in-memory backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListFunctions,
    CreateFunction(CreateFunctionRequest),
    UpdateFunction {
        id: String,
        req: UpdateFunctionRequest,
    },
    DeleteFunction(String),
    ListObjectTypes,
    DeleteObjectType(String),
    ListLinkTypes,
    DeleteLinkType(String),
    ListActionTypes,
    DeleteActionType(String),
    Search(SearchRequest),
    ListExecutionLogs,
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::ListFunctions => Operation::ListFunctions,
            RecordedCall::CreateFunction(_) => Operation::CreateFunction,
            RecordedCall::UpdateFunction { .. } => Operation::UpdateFunction,
            RecordedCall::DeleteFunction(_) => Operation::DeleteFunction,
            RecordedCall::ListObjectTypes => Operation::ListObjectTypes,
            RecordedCall::DeleteObjectType(_) => Operation::DeleteObjectType,
            RecordedCall::ListLinkTypes => Operation::ListLinkTypes,
            RecordedCall::DeleteLinkType(_) => Operation::DeleteLinkType,
            RecordedCall::ListActionTypes => Operation::ListActionTypes,
            RecordedCall::DeleteActionType(_) => Operation::DeleteActionType,
            RecordedCall::Search(_) => Operation::Search,
            RecordedCall::ListExecutionLogs => Operation::ListExecutionLogs,
        }
    }
}

/// A searchable document: hit payload plus the facet values it carries.
#[derive(Debug, Clone)]
struct SearchDocument {
    hit: SearchHit,
    facets: BTreeMap<String, String>,
}

#[derive(Default)]
struct MemoryState {
    functions: Vec<FunctionDefinition>,
    object_types: Vec<ObjectType>,
    link_types: Vec<LinkType>,
    action_types: Vec<ActionType>,
    logs: Vec<ExecutionLog>,
    documents: Vec<SearchDocument>,
    next_id: u64,
    calls: Vec<RecordedCall>,
    failures: HashMap<Operation, (u16, Option<String>)>,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn record(&mut self, call: RecordedCall) -> Result<()> {
        let op = call.operation();
        self.calls.push(call);
        match self.failures.get(&op) {
            Some((status, detail)) => Err(ClientError::Api {
                status: *status,
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryClient {
    state: Mutex<MemoryState>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with a small ontology, functions, logs and
    /// searchable documents.
    pub fn seeded() -> Self {
        let client = Self::new();
        {
            let mut state = client.lock();
            state.object_types = vec![
                object_type("ot-customer", "customer", "Customer"),
                object_type("ot-order", "order", "Order"),
                object_type("ot-product", "product", "Product"),
            ];
            state.link_types = vec![LinkType {
                id: "lt-placed".into(),
                api_name: "customer_orders".into(),
                display_name: "Customer Orders".into(),
                source_object_type_id: "ot-customer".into(),
                target_object_type_id: "ot-order".into(),
                cardinality: Some("ONE_TO_MANY".into()),
            }];
            state.functions = vec![FunctionDefinition {
                id: "fn-seed-1".into(),
                api_name: "order_total".into(),
                display_name: "Order Total".into(),
                description: Some("Sum of line amounts for an order".into()),
                code_content: Some(
                    "def order_total(order_id):\n    return 0\n".into(),
                ),
                bound_object_type_id: Some("ot-order".into()),
                input_params_schema: Some(vec![Parameter {
                    name: "order_id".into(),
                    param_type: ParamType::String,
                    required: true,
                }]),
                output_type: OutputType::Number,
                project_id: None,
                created_at: Some(Utc::now()),
                updated_at: None,
            }];
            state.action_types = vec![ActionType {
                id: "at-recalc".into(),
                api_name: "recalculate_order".into(),
                display_name: "Recalculate Order".into(),
                description: None,
                backing_function_id: Some("fn-seed-1".into()),
            }];
            state.logs = vec![ExecutionLog {
                id: "log-1".into(),
                function_id: Some("fn-seed-1".into()),
                action_id: None,
                status: "SUCCESS".into(),
                duration_ms: Some(42),
                error_message: None,
                executed_at: Some(Utc::now()),
            }];
            state.documents = vec![
                document("obj-1", "Alice", "ot-customer", "active"),
                document("obj-2", "Bob", "ot-customer", "inactive"),
                document("obj-3", "Order 1001", "ot-order", "active"),
                document("obj-4", "Order 1002", "ot-order", "active"),
            ];
        }
        client
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test must not poison the backend for the remaining assertions
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every subsequent call of `op` fail with `status` and `detail`.
    pub fn fail(&self, op: Operation, status: u16, detail: Option<&str>) {
        self.lock()
            .failures
            .insert(op, (status, detail.map(str::to_string)));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn calls_of(&self, op: Operation) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .cloned()
            .collect()
    }

    pub fn insert_function(&self, def: FunctionDefinition) {
        self.lock().functions.push(def);
    }
}

fn object_type(id: &str, api_name: &str, display_name: &str) -> ObjectType {
    ObjectType {
        id: id.into(),
        api_name: api_name.into(),
        display_name: display_name.into(),
        description: None,
    }
}

fn document(id: &str, title: &str, object_type_id: &str, status: &str) -> SearchDocument {
    let mut facets = BTreeMap::new();
    facets.insert("object_type_id".to_string(), object_type_id.to_string());
    facets.insert("status".to_string(), status.to_string());
    SearchDocument {
        hit: SearchHit {
            id: id.into(),
            object_type_id: Some(object_type_id.into()),
            title: Some(title.into()),
            score: None,
            properties: serde_json::json!({ "status": status }),
        },
        facets,
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, kind: &str, key: impl Fn(&T) -> &str) -> Result<()> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        return Err(ClientError::api(404, format!("{} {} not found", kind, id)));
    }
    Ok(())
}

fn run_search(documents: &[SearchDocument], req: &SearchRequest) -> SearchResponse {
    let text = req
        .query_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let text_matches: Vec<&SearchDocument> = documents
        .iter()
        .filter(|doc| match &text {
            Some(t) => doc
                .hit
                .title
                .as_deref()
                .map(|title| title.to_lowercase().contains(t))
                .unwrap_or(false),
            None => true,
        })
        .collect();

    let filtered: Vec<&SearchDocument> = text_matches
        .into_iter()
        .filter(|doc| {
            req.filters.iter().flatten().all(|(field, keys)| {
                keys.is_empty()
                    || doc
                        .facets
                        .get(field)
                        .map(|value| keys.contains(value))
                        .unwrap_or(false)
            })
        })
        .collect();

    let mut facets: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for doc in &filtered {
        for (field, value) in &doc.facets {
            *facets
                .entry(field.clone())
                .or_default()
                .entry(value.clone())
                .or_default() += 1;
        }
    }

    let page_size = req.page_size.max(1) as usize;
    let skip = (req.page.max(1) as usize - 1) * page_size;

    SearchResponse {
        total: filtered.len() as u64,
        hits: filtered
            .iter()
            .skip(skip)
            .take(page_size)
            .map(|doc| doc.hit.clone())
            .collect(),
        facets: facets
            .into_iter()
            .map(|(field, buckets)| {
                let buckets = buckets
                    .into_iter()
                    .map(|(key, doc_count)| FacetBucket { key, doc_count })
                    .collect();
                (field, buckets)
            })
            .collect(),
        query: serde_json::to_value(req).unwrap_or_default(),
    }
}

#[async_trait]
impl MdpClient for InMemoryClient {
    async fn list_functions(&self) -> Result<Vec<FunctionDefinition>> {
        let mut state = self.lock();
        state.record(RecordedCall::ListFunctions)?;
        Ok(state.functions.clone())
    }

    async fn create_function(&self, req: CreateFunctionRequest) -> Result<FunctionDefinition> {
        let mut state = self.lock();
        state.record(RecordedCall::CreateFunction(req.clone()))?;

        if state.functions.iter().any(|f| f.api_name == req.api_name) {
            return Err(ClientError::api(
                409,
                format!("Function with api_name '{}' already exists", req.api_name),
            ));
        }

        let def = FunctionDefinition {
            id: state.next_id("fn"),
            api_name: req.api_name,
            display_name: req.display_name,
            description: req.description,
            code_content: Some(req.code_content),
            bound_object_type_id: req.bound_object_type_id,
            input_params_schema: req.input_params_schema,
            output_type: req.output_type,
            project_id: req.project_id,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        state.functions.push(def.clone());
        Ok(def)
    }

    async fn update_function(
        &self,
        id: &str,
        req: UpdateFunctionRequest,
    ) -> Result<FunctionDefinition> {
        let mut state = self.lock();
        state.record(RecordedCall::UpdateFunction {
            id: id.to_string(),
            req: req.clone(),
        })?;

        let def = state
            .functions
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| ClientError::api(404, format!("Function {} not found", id)))?;
        def.display_name = req.display_name;
        def.description = req.description;
        def.code_content = Some(req.code_content);
        def.input_params_schema = req.input_params_schema;
        def.output_type = req.output_type;
        def.bound_object_type_id = req.bound_object_type_id;
        def.updated_at = Some(Utc::now());
        Ok(def.clone())
    }

    async fn delete_function(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(RecordedCall::DeleteFunction(id.to_string()))?;
        remove_by_id(&mut state.functions, id, "Function", |f| f.id.as_str())
    }

    async fn list_object_types(&self) -> Result<Vec<ObjectType>> {
        let mut state = self.lock();
        state.record(RecordedCall::ListObjectTypes)?;
        Ok(state.object_types.clone())
    }

    async fn delete_object_type(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(RecordedCall::DeleteObjectType(id.to_string()))?;
        if state
            .link_types
            .iter()
            .any(|l| l.source_object_type_id == id || l.target_object_type_id == id)
        {
            return Err(ClientError::api(
                409,
                "Object type is referenced by a link type",
            ));
        }
        remove_by_id(&mut state.object_types, id, "Object type", |o| o.id.as_str())
    }

    async fn list_link_types(&self) -> Result<Vec<LinkType>> {
        let mut state = self.lock();
        state.record(RecordedCall::ListLinkTypes)?;
        Ok(state.link_types.clone())
    }

    async fn delete_link_type(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(RecordedCall::DeleteLinkType(id.to_string()))?;
        remove_by_id(&mut state.link_types, id, "Link type", |l| l.id.as_str())
    }

    async fn list_action_types(&self) -> Result<Vec<ActionType>> {
        let mut state = self.lock();
        state.record(RecordedCall::ListActionTypes)?;
        Ok(state.action_types.clone())
    }

    async fn delete_action_type(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(RecordedCall::DeleteActionType(id.to_string()))?;
        remove_by_id(&mut state.action_types, id, "Action type", |a| a.id.as_str())
    }

    async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
        let mut state = self.lock();
        state.record(RecordedCall::Search(req.clone()))?;
        Ok(run_search(&state.documents, &req))
    }

    async fn list_execution_logs(&self) -> Result<Vec<ExecutionLog>> {
        let mut state = self.lock();
        state.record(RecordedCall::ListExecutionLogs)?;
        Ok(state.logs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_req(text: Option<&str>, filters: &[(&str, &[&str])]) -> SearchRequest {
        let filters: BTreeMap<String, Vec<String>> = filters
            .iter()
            .map(|(f, keys)| (f.to_string(), keys.iter().map(|k| k.to_string()).collect()))
            .collect();
        SearchRequest {
            query_text: text.map(str::to_string),
            query_vector: None,
            filters: if filters.is_empty() { None } else { Some(filters) },
            page: 1,
            page_size: 20,
        }
    }

    #[tokio::test]
    async fn injected_failure_is_recorded_and_returned() {
        let client = InMemoryClient::new();
        client.fail(Operation::ListFunctions, 503, Some("maintenance"));

        let err = client.list_functions().await.unwrap_err();
        assert_eq!(err.detail(), Some("maintenance"));
        assert_eq!(client.calls(), vec![RecordedCall::ListFunctions]);

        client.clear_failures();
        assert!(client.list_functions().await.is_ok());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_api_name() {
        let client = InMemoryClient::seeded();
        let req = CreateFunctionRequest {
            api_name: "order_total".into(),
            display_name: "Dup".into(),
            description: None,
            code_content: String::new(),
            input_params_schema: None,
            output_type: OutputType::Void,
            bound_object_type_id: None,
            project_id: None,
        };
        let err = client.create_function(req).await.unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn delete_unknown_function_is_404() {
        let client = InMemoryClient::new();
        let err = client.delete_function("fn-missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail(), Some("Function fn-missing not found"));
    }

    #[tokio::test]
    async fn object_type_in_use_cannot_be_deleted() {
        let client = InMemoryClient::seeded();
        let err = client.delete_object_type("ot-order").await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert!(client.delete_object_type("ot-product").await.is_ok());
    }

    #[tokio::test]
    async fn search_ands_facet_fields() {
        let client = InMemoryClient::seeded();
        let resp = client
            .search(search_req(
                None,
                &[("object_type_id", &["ot-customer"]), ("status", &["active"])],
            ))
            .await
            .unwrap();
        assert_eq!(resp.total, 1);
        assert_eq!(resp.hits[0].id, "obj-1");
    }

    #[tokio::test]
    async fn search_ors_keys_within_a_field() {
        let client = InMemoryClient::seeded();
        let resp = client
            .search(search_req(None, &[("status", &["active", "inactive"])]))
            .await
            .unwrap();
        assert_eq!(resp.total, 4);
    }

    #[tokio::test]
    async fn search_text_and_facet_counts() {
        let client = InMemoryClient::seeded();
        let resp = client.search(search_req(Some("order"), &[])).await.unwrap();
        assert_eq!(resp.total, 2);
        let statuses = &resp.facets["status"];
        assert_eq!(
            statuses,
            &vec![FacetBucket {
                key: "active".into(),
                doc_count: 2
            }]
        );
    }

    #[tokio::test]
    async fn search_pages_hits() {
        let client = InMemoryClient::seeded();
        let mut req = search_req(None, &[]);
        req.page = 2;
        req.page_size = 3;
        let resp = client.search(req).await.unwrap();
        assert_eq!(resp.total, 4);
        assert_eq!(resp.hits.len(), 1);
        assert_eq!(resp.hits[0].id, "obj-4");
    }
}

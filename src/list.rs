//! List pages and the confirm-delete flow
//!
//! One [`ListState`] backs every list page. Server data is never modified
//! locally: a delete only changes the list after the backend confirmed it
//! and the list was fetched again.

use async_trait::async_trait;
use mdp_client::{ClientError, MdpClient};
use mdp_types::{
    ActionType, ExecutionLog, FunctionDefinition, LinkType, ObjectType, OutputType, ParamType,
    Parameter,
};

use crate::error::ConsoleError;
use crate::notify::Notice;

// =============================================================================
// RESOURCE KINDS
// =============================================================================

#[async_trait]
pub trait Resource: Clone + Send + Sync + 'static {
    /// Lowercase singular noun used in messages ("function", "link type").
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    async fn fetch_all(client: &dyn MdpClient) -> Result<Vec<Self>, ClientError>;

    /// Rows shown when the list cannot be fetched.
    fn fallback() -> Vec<Self> {
        Vec::new()
    }
}

#[async_trait]
pub trait DeletableResource: Resource {
    async fn delete(client: &dyn MdpClient, id: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl Resource for FunctionDefinition {
    const KIND: &'static str = "function";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn fetch_all(client: &dyn MdpClient) -> Result<Vec<Self>, ClientError> {
        client.list_functions().await
    }

    fn fallback() -> Vec<Self> {
        sample_functions()
    }
}

#[async_trait]
impl DeletableResource for FunctionDefinition {
    async fn delete(client: &dyn MdpClient, id: &str) -> Result<(), ClientError> {
        client.delete_function(id).await
    }
}

#[async_trait]
impl Resource for ObjectType {
    const KIND: &'static str = "object type";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn fetch_all(client: &dyn MdpClient) -> Result<Vec<Self>, ClientError> {
        client.list_object_types().await
    }
}

#[async_trait]
impl DeletableResource for ObjectType {
    async fn delete(client: &dyn MdpClient, id: &str) -> Result<(), ClientError> {
        client.delete_object_type(id).await
    }
}

#[async_trait]
impl Resource for LinkType {
    const KIND: &'static str = "link type";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn fetch_all(client: &dyn MdpClient) -> Result<Vec<Self>, ClientError> {
        client.list_link_types().await
    }
}

#[async_trait]
impl DeletableResource for LinkType {
    async fn delete(client: &dyn MdpClient, id: &str) -> Result<(), ClientError> {
        client.delete_link_type(id).await
    }
}

#[async_trait]
impl Resource for ActionType {
    const KIND: &'static str = "action type";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn fetch_all(client: &dyn MdpClient) -> Result<Vec<Self>, ClientError> {
        client.list_action_types().await
    }
}

#[async_trait]
impl DeletableResource for ActionType {
    async fn delete(client: &dyn MdpClient, id: &str) -> Result<(), ClientError> {
        client.delete_action_type(id).await
    }
}

#[async_trait]
impl Resource for ExecutionLog {
    const KIND: &'static str = "execution log";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.id
    }

    async fn fetch_all(client: &dyn MdpClient) -> Result<Vec<Self>, ClientError> {
        client.list_execution_logs().await
    }
}

/// Fixed local sample set shown when the function list cannot be fetched.
pub fn sample_functions() -> Vec<FunctionDefinition> {
    let sample = |id: &str, api_name: &str, display_name: &str, description: &str| {
        FunctionDefinition {
            id: id.into(),
            api_name: api_name.into(),
            display_name: display_name.into(),
            description: Some(description.into()),
            code_content: None,
            bound_object_type_id: None,
            input_params_schema: None,
            output_type: OutputType::String,
            project_id: None,
            created_at: None,
            updated_at: None,
        }
    };

    let mut risk = sample(
        "sample-1",
        "calculate_risk_score",
        "Calculate Risk Score",
        "Weighted risk score for a customer",
    );
    risk.input_params_schema = Some(vec![Parameter {
        name: "customer_id".into(),
        param_type: ParamType::String,
        required: true,
    }]);
    risk.output_type = OutputType::Number;

    let mut format = sample(
        "sample-2",
        "format_address",
        "Format Address",
        "Single-line postal address",
    );
    format.input_params_schema = Some(vec![Parameter {
        name: "address".into(),
        param_type: ParamType::Object,
        required: true,
    }]);

    let mut check = sample(
        "sample-3",
        "is_active_account",
        "Is Active Account",
        "Whether an account is currently active",
    );
    check.output_type = OutputType::Boolean;

    vec![risk, format, check]
}

/// Display name of an object type, for tables that only hold its id.
///
/// `-` when unset; the raw id when the type is not in `types`.
pub fn object_type_label(id: Option<&str>, types: &[ObjectType]) -> String {
    match id.filter(|id| !id.is_empty()) {
        None => "-".to_string(),
        Some(id) => types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.display_name.clone())
            .unwrap_or_else(|| id.to_string()),
    }
}

// =============================================================================
// LIST STATE
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    /// Last fetch failed; rows are the fallback set
    Fallback,
}

/// Pending delete confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteConfirm {
    pub id: String,
    pub name: String,
}

impl DeleteConfirm {
    pub fn message(&self) -> String {
        format!("Are you sure you want to delete \"{}\"?", self.name)
    }
}

#[derive(Debug)]
pub struct ListState<R> {
    items: Vec<R>,
    load: LoadState,
    confirm: Option<DeleteConfirm>,
    deleting: Option<String>,
}

impl<R> Default for ListState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            load: LoadState::NotLoaded,
            confirm: None,
            deleting: None,
        }
    }
}

impl<R: Resource> ListState<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    // =========================================================================
    // LOAD
    // =========================================================================

    pub fn begin_load(&mut self) {
        self.load = LoadState::Loading;
    }

    /// Apply a fetch result. A failure swaps in the fallback rows and returns
    /// a warning for the caller to show.
    pub fn finish_load(&mut self, result: Result<Vec<R>, ClientError>) -> Option<Notice> {
        match result {
            Ok(items) => {
                tracing::debug!(kind = R::KIND, count = items.len(), "list loaded");
                self.items = items;
                self.load = LoadState::Loaded;
                None
            }
            Err(e) => {
                tracing::warn!(kind = R::KIND, error = %e, "list fetch failed, using fallback");
                self.items = R::fallback();
                self.load = LoadState::Fallback;
                let message = match e.detail() {
                    Some(detail) => format!("Failed to load {} list: {}", R::KIND, detail),
                    None => format!("Failed to load {} list", R::KIND),
                };
                Some(Notice::warning(message))
            }
        }
    }

    pub async fn load(&mut self, client: &dyn MdpClient) -> Option<Notice> {
        self.begin_load();
        let result = R::fetch_all(client).await;
        self.finish_load(result)
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Ask for confirmation before deleting `id`. Unknown ids are ignored.
    pub fn request_delete(&mut self, id: &str) -> Option<&DeleteConfirm> {
        let item = self.find(id)?;
        let confirm = DeleteConfirm {
            id: item.id().to_string(),
            name: item.display_name().to_string(),
        };
        Some(self.confirm.insert(confirm))
    }

    pub fn pending_confirm(&self) -> Option<&DeleteConfirm> {
        self.confirm.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.confirm = None;
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_some()
    }

    /// Accept the pending confirmation; returns the id to delete.
    pub fn confirm_delete(&mut self) -> Result<DeleteConfirm, ConsoleError> {
        if self.deleting.is_some() {
            return Err(ConsoleError::AlreadyPending);
        }
        let confirm = self
            .confirm
            .take()
            .ok_or_else(|| crate::error::ValidationError::Form("Nothing to delete".into()))?;
        self.deleting = Some(confirm.id.clone());
        Ok(confirm)
    }

    /// Apply the delete outcome. The rows are untouched either way; on
    /// success the caller refetches.
    pub fn finish_delete(&mut self, result: Result<(), ClientError>) -> Result<(), ConsoleError> {
        let id = self.deleting.take().unwrap_or_default();
        match result {
            Ok(()) => {
                tracing::info!(kind = R::KIND, %id, "deleted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = R::KIND, %id, error = %e, "delete failed");
                Err(e.into())
            }
        }
    }

    pub fn delete_notice(result: &Result<(), ConsoleError>) -> Notice {
        match result {
            Ok(()) => Notice::success(format!("{} deleted", capitalize(R::KIND))),
            Err(e) => Notice::error(e.user_message(&format!("Failed to delete {}", R::KIND))),
        }
    }
}

impl<R: DeletableResource> ListState<R> {
    /// Delete the confirmed row, then refetch on success.
    pub async fn delete_confirmed(&mut self, client: &dyn MdpClient) -> Vec<Notice> {
        let confirm = match self.confirm_delete() {
            Ok(confirm) => confirm,
            Err(e) => return vec![Notice::error(e.user_message("Nothing to delete"))],
        };
        let result = R::delete(client, &confirm.id).await;
        let outcome = self.finish_delete(result);
        let mut notices = vec![Self::delete_notice(&outcome)];
        if outcome.is_ok() {
            notices.extend(self.load(client).await);
        }
        notices
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdp_client::{InMemoryClient, Operation};

    #[tokio::test]
    async fn function_list_falls_back_to_samples() {
        let client = InMemoryClient::new();
        client.fail(Operation::ListFunctions, 503, None);
        let mut list: ListState<FunctionDefinition> = ListState::new();

        let notice = list.load(&client).await.unwrap();
        assert_eq!(notice, Notice::warning("Failed to load function list"));
        assert_eq!(list.load_state(), LoadState::Fallback);
        assert_eq!(list.items(), sample_functions().as_slice());
    }

    #[tokio::test]
    async fn other_lists_fall_back_to_empty() {
        let client = InMemoryClient::seeded();
        client.fail(Operation::ListLinkTypes, 500, Some("db down"));
        let mut list: ListState<LinkType> = ListState::new();

        let notice = list.load(&client).await.unwrap();
        assert_eq!(notice.message, "Failed to load link type list: db down");
        assert!(list.items().is_empty());
    }

    #[tokio::test]
    async fn confirmation_interpolates_name_and_cancel_is_noop() {
        let client = InMemoryClient::seeded();
        let mut list: ListState<FunctionDefinition> = ListState::new();
        list.load(&client).await;

        let confirm = list.request_delete("fn-seed-1").unwrap();
        assert_eq!(
            confirm.message(),
            "Are you sure you want to delete \"Order Total\"?"
        );

        list.cancel_delete();
        assert!(list.pending_confirm().is_none());
        assert_eq!(list.items().len(), 1);
        assert!(client.calls_of(Operation::DeleteFunction).is_empty());
    }

    #[tokio::test]
    async fn successful_delete_refetches() {
        let client = InMemoryClient::seeded();
        let mut list: ListState<FunctionDefinition> = ListState::new();
        list.load(&client).await;
        list.request_delete("fn-seed-1");

        let notices = list.delete_confirmed(&client).await;
        assert_eq!(notices, vec![Notice::success("Function deleted")]);
        assert!(list.items().is_empty());
        assert_eq!(client.calls_of(Operation::ListFunctions).len(), 2);
    }

    #[tokio::test]
    async fn failed_delete_leaves_rows_untouched() {
        let client = InMemoryClient::seeded();
        let mut list: ListState<ObjectType> = ListState::new();
        list.load(&client).await;
        let before = list.items().to_vec();

        list.request_delete("ot-order");
        let notices = list.delete_confirmed(&client).await;

        assert_eq!(
            notices,
            vec![Notice::error("Object type is referenced by a link type")]
        );
        assert_eq!(list.items(), before.as_slice());
        assert!(!list.is_deleting());
        assert_eq!(client.calls_of(Operation::ListObjectTypes).len(), 1);
    }

    #[test]
    fn one_delete_in_flight() {
        let mut list: ListState<ObjectType> = ListState::new();
        list.finish_load(Ok(vec![
            ObjectType {
                id: "a".into(),
                api_name: "a".into(),
                display_name: "A".into(),
                description: None,
            },
            ObjectType {
                id: "b".into(),
                api_name: "b".into(),
                display_name: "B".into(),
                description: None,
            },
        ]));
        list.request_delete("a");
        assert!(list.confirm_delete().is_ok());
        list.request_delete("b");
        assert!(matches!(
            list.confirm_delete(),
            Err(ConsoleError::AlreadyPending)
        ));
    }

    #[test]
    fn unknown_id_opens_no_confirmation() {
        let mut list: ListState<FunctionDefinition> = ListState::new();
        assert!(list.request_delete("nope").is_none());
        assert!(list.confirm_delete().is_err());
    }

    #[test]
    fn object_type_label_lookup() {
        let types = vec![ObjectType {
            id: "ot-1".into(),
            api_name: "customer".into(),
            display_name: "Customer".into(),
            description: None,
        }];
        assert_eq!(object_type_label(Some("ot-1"), &types), "Customer");
        assert_eq!(object_type_label(Some("ot-9"), &types), "ot-9");
        assert_eq!(object_type_label(None, &types), "-");
        assert_eq!(object_type_label(Some(""), &types), "-");
    }
}

//! MdpClient trait: the sole API boundary between the console and the
//! metadata backend. Pages and state machines depend on this trait, never on
//! a concrete transport.

pub mod error;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use mdp_types::{
    ActionType, CreateFunctionRequest, ExecutionLog, FunctionDefinition, LinkType, ObjectType,
    SearchRequest, SearchResponse, UpdateFunctionRequest,
};

pub use error::ClientError;
pub use http::HttpClient;
pub use memory::{InMemoryClient, Operation, RecordedCall};

pub type Result<T> = std::result::Result<T, ClientError>;

#[async_trait]
pub trait MdpClient: Send + Sync {
    // ── Functions ──────────────────────────────────────────────

    async fn list_functions(&self) -> Result<Vec<FunctionDefinition>>;

    async fn create_function(&self, req: CreateFunctionRequest) -> Result<FunctionDefinition>;

    async fn update_function(
        &self,
        id: &str,
        req: UpdateFunctionRequest,
    ) -> Result<FunctionDefinition>;

    async fn delete_function(&self, id: &str) -> Result<()>;

    // ── Ontology metadata ──────────────────────────────────────

    async fn list_object_types(&self) -> Result<Vec<ObjectType>>;

    async fn delete_object_type(&self, id: &str) -> Result<()>;

    async fn list_link_types(&self) -> Result<Vec<LinkType>>;

    async fn delete_link_type(&self, id: &str) -> Result<()>;

    async fn list_action_types(&self) -> Result<Vec<ActionType>>;

    async fn delete_action_type(&self, id: &str) -> Result<()>;

    // ── Search / execution ─────────────────────────────────────

    async fn search(&self, req: SearchRequest) -> Result<SearchResponse>;

    /// Read-only history of function/action executions.
    async fn list_execution_logs(&self) -> Result<Vec<ExecutionLog>>;
}

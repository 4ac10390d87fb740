//! Execution log read model (`GET /execute/logs`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: String,
    #[serde(default)]
    pub function_id: Option<String>,
    #[serde(default)]
    pub action_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
}

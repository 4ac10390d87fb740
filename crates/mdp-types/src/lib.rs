//! Shared API Types for the MDP console
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing the REST
//! boundary between the console and the metadata backend.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────┐
//! │  MDP backend     │  JSON   │  Console / CLI   │
//! │  (/meta, /search)│ ◄─────► │  (egui, clap)    │
//! └──────────────────┘         └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. All wire types live here - no inline payload structs in the client
//! 2. Ids are opaque strings
//! 3. Optional request fields serialize as `null`, never omitted

pub mod execution;
pub mod function;
pub mod meta;
pub mod search;

use serde::{Deserialize, Serialize};

pub use execution::*;
pub use function::*;
pub use meta::*;
pub use search::*;

// ============================================================================
// ERROR BODY
// ============================================================================

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is a human-readable message; the backend may omit it, and some
/// validation errors return a structured list instead of a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// Best-effort human message from `detail`.
    ///
    /// Strings are returned as-is; a list of `{msg}` objects is joined with
    /// `"; "`; anything else is treated as absent.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let parts: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            _ => None,
        }
    }
}

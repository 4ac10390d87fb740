//! Ontology metadata read models (object types, link types, action types)

use serde::{Deserialize, Serialize};

/// `GET /meta/object-types`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub id: String,
    pub api_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /meta/link-types`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkType {
    pub id: String,
    pub api_name: String,
    pub display_name: String,
    pub source_object_type_id: String,
    pub target_object_type_id: String,
    #[serde(default)]
    pub cardinality: Option<String>,
}

/// `GET /meta/action-types`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionType {
    pub id: String,
    pub api_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub backing_function_id: Option<String>,
}

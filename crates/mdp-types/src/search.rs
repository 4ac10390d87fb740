//! Object search API types (`POST /search/query`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facet field name -> selected bucket keys. Fields are ANDed by the backend.
pub type FilterMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query_text: Option<String>,
    pub query_vector: Option<Vec<f32>>,
    pub filters: Option<FilterMap>,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub object_type_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// One value of a facet histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub key: String,
    pub doc_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<FacetBucket>>,
    /// Backend echo of the executed query (shape is backend-defined)
    #[serde(default)]
    pub query: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_serialize_as_null() {
        let req = SearchRequest {
            query_text: None,
            query_vector: None,
            filters: None,
            page: 1,
            page_size: 20,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["filters"].is_null());
        assert_eq!(json["page"], 1);
    }

    #[test]
    fn response_defaults_missing_sections() {
        let resp: SearchResponse = serde_json::from_str(r#"{"total": 3}"#).unwrap();
        assert_eq!(resp.total, 3);
        assert!(resp.hits.is_empty());
        assert!(resp.facets.is_empty());
    }
}

//! Facet search state
//!
//! Drafts (query text, vector text, page size) are edited freely without
//! touching the backend. Committing a search, toggling a facet bucket,
//! paging, or clearing marks the state dirty; the owner polls
//! [`FacetSearch::take_fetch`] once per frame and gets at most one request
//! reflecting the latest state. Responses are tagged with the sequence
//! number of the request that produced them and stale ones are dropped.

use std::collections::{BTreeMap, BTreeSet};

use mdp_client::{ClientError, MdpClient};
use mdp_types::{FacetBucket, FilterMap, SearchHit, SearchRequest, SearchResponse};

use crate::error::ValidationError;
use crate::notify::Notice;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Parse a comma and/or whitespace separated list of floats.
///
/// Blank input is "no vector".
pub fn parse_vector(input: &str) -> Result<Option<Vec<f32>>, ValidationError> {
    let trimmed = input.trim().trim_start_matches('[').trim_end_matches(']');
    let parts: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Ok(None);
    }
    parts
        .iter()
        .map(|p| {
            p.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ValidationError::Form(format!("Invalid vector component: {p}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[derive(Debug)]
pub struct FacetSearch {
    /// Query text as typed; committed by [`FacetSearch::submit`].
    pub query_input: String,
    /// Vector text as typed; committed by [`FacetSearch::submit`].
    pub vector_input: String,
    query_text: Option<String>,
    query_vector: Option<Vec<f32>>,
    selected: BTreeMap<String, BTreeSet<String>>,
    page: u32,
    page_size: u32,
    dirty: bool,
    seq: u64,
    in_flight: Option<u64>,
    response: Option<SearchResponse>,
    error: Option<String>,
}

impl Default for FacetSearch {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl FacetSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            query_input: String::new(),
            vector_input: String::new(),
            query_text: None,
            query_vector: None,
            selected: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
            dirty: false,
            seq: 0,
            in_flight: None,
            response: None,
            error: None,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn hits(&self) -> &[SearchHit] {
        self.response.as_ref().map(|r| r.hits.as_slice()).unwrap_or(&[])
    }

    pub fn total(&self) -> u64 {
        self.response.as_ref().map(|r| r.total).unwrap_or(0)
    }

    pub fn facets(&self) -> impl Iterator<Item = (&String, &Vec<FacetBucket>)> {
        self.response.iter().flat_map(|r| r.facets.iter())
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_selected(&self, field: &str, key: &str) -> bool {
        self.selected
            .get(field)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn needs_fetch(&self) -> bool {
        self.dirty
    }

    pub fn page_count(&self) -> u32 {
        let pages = self.total().div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Active filters with empty selections removed; `None` when nothing
    /// is selected.
    pub fn filters(&self) -> Option<FilterMap> {
        let filters: FilterMap = self
            .selected
            .iter()
            .filter(|(_, keys)| !keys.is_empty())
            .map(|(field, keys)| (field.clone(), keys.iter().cloned().collect()))
            .collect();
        (!filters.is_empty()).then_some(filters)
    }

    // =========================================================================
    // CHANGES
    // =========================================================================

    /// Commit the drafts and start over from the first page.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        let vector = parse_vector(&self.vector_input)?;
        let text = self.query_input.trim();
        self.query_text = (!text.is_empty()).then(|| text.to_string());
        self.query_vector = vector;
        self.page = 1;
        self.dirty = true;
        Ok(())
    }

    /// Select or deselect one bucket of a facet field.
    pub fn toggle_facet(&mut self, field: &str, key: &str) {
        let keys = self.selected.entry(field.to_string()).or_default();
        if !keys.remove(key) {
            keys.insert(key.to_string());
        }
        if keys.is_empty() {
            self.selected.remove(field);
        }
        self.page = 1;
        self.dirty = true;
    }

    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.dirty = true;
        }
    }

    pub fn next_page(&mut self) {
        if self.page < self.page_count() {
            self.set_page(self.page + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.set_page(self.page - 1);
        }
    }

    /// Applies on the next fetch; does not fetch by itself.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
    }

    /// Reset text, vector, facets and page as a single change.
    pub fn clear_all(&mut self) {
        self.query_input.clear();
        self.vector_input.clear();
        self.query_text = None;
        self.query_vector = None;
        self.selected.clear();
        self.page = 1;
        self.dirty = true;
    }

    // =========================================================================
    // FETCH
    // =========================================================================

    pub fn request(&self) -> SearchRequest {
        SearchRequest {
            query_text: self.query_text.clone(),
            query_vector: self.query_vector.clone(),
            filters: self.filters(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// The request to send if anything changed since the last one, tagged
    /// with its sequence number.
    pub fn take_fetch(&mut self) -> Option<(u64, SearchRequest)> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.seq += 1;
        self.in_flight = Some(self.seq);
        tracing::debug!(seq = self.seq, page = self.page, "search fetch");
        Some((self.seq, self.request()))
    }

    /// Apply a response. Responses for superseded requests are ignored.
    pub fn apply_response(
        &mut self,
        seq: u64,
        result: Result<SearchResponse, ClientError>,
    ) -> Option<Notice> {
        if seq != self.seq {
            tracing::debug!(seq, current = self.seq, "discarding stale search response");
            return None;
        }
        self.in_flight = None;
        match result {
            Ok(response) => {
                self.response = Some(response);
                self.error = None;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                let message = e.detail().unwrap_or("Search failed").to_string();
                self.error = Some(message.clone());
                Some(Notice::error(message))
            }
        }
    }

    /// Fetch now if the state is dirty.
    pub async fn refresh(&mut self, client: &dyn MdpClient) -> Option<Notice> {
        let (seq, request) = self.take_fetch()?;
        let result = client.search(request).await;
        self.apply_response(seq, result)
    }
}

//! Facet search page
//!
//! Follows the panel rules used across the console:
//! - Panel returns Option<SearchAction>, no callbacks
//! - Draft text lives in the FacetSearch and is edited in place
//! - Server data (hits, facets) is only read

use egui::{Color32, RichText, ScrollArea, TextEdit, Ui};
use mdp_client::ClientError;
use mdp_console::{FacetSearch, Notice, Notices, PendingSlot};
use mdp_types::SearchResponse;

use crate::backend::Backend;

#[derive(Clone, Debug, PartialEq)]
pub enum SearchAction {
    /// Commit the drafts and search from page 1
    Submit,
    ToggleFacet { field: String, key: String },
    SetPage(u32),
    ClearAll,
}

pub struct SearchPage {
    pub search: FacetSearch,
    pending: Option<(u64, PendingSlot<Result<SearchResponse, ClientError>>)>,
}

impl SearchPage {
    pub fn new(page_size: u32) -> Self {
        let mut search = FacetSearch::with_page_size(page_size);
        // initial unfiltered listing
        search.clear_all();
        Self {
            search,
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn apply(&mut self, action: SearchAction, notices: &mut Notices) {
        match action {
            SearchAction::Submit => {
                if let Err(e) = self.search.submit() {
                    notices.push(Notice::warning(e.to_string()));
                }
            }
            SearchAction::ToggleFacet { field, key } => self.search.toggle_facet(&field, &key),
            SearchAction::SetPage(page) => self.search.set_page(page),
            SearchAction::ClearAll => self.search.clear_all(),
        }
    }

    /// Issue at most one request for everything that changed since the last
    /// poll, then apply a response if one arrived.
    pub fn poll(&mut self, backend: &Backend, notices: &mut Notices) {
        if let Some((seq, request)) = self.search.take_fetch() {
            // replacing the slot drops any superseded response
            let slot = backend.spawn(move |client| async move { client.search(request).await });
            self.pending = Some((seq, slot));
        }

        let arrived = self
            .pending
            .as_ref()
            .and_then(|(seq, slot)| slot.take().map(|result| (*seq, result)));
        if let Some((seq, result)) = arrived {
            self.pending = None;
            if let Some(notice) = self.search.apply_response(seq, result) {
                notices.push(notice);
            }
        }
    }
}

pub fn search_panel(ui: &mut Ui, page: &mut SearchPage) -> Option<SearchAction> {
    let mut action = None;
    let busy = page.is_busy();
    let search = &mut page.search;

    ui.heading("Search");
    ui.horizontal(|ui| {
        ui.label("Query:");
        let response = TextEdit::singleline(&mut search.query_input)
            .desired_width(260.0)
            .hint_text("Search objects...")
            .show(ui);
        if response.response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            action = Some(SearchAction::Submit);
        }

        ui.label("Vector:");
        TextEdit::singleline(&mut search.vector_input)
            .desired_width(160.0)
            .hint_text("0.1, 0.2, ...")
            .show(ui);

        if ui.button("Search").clicked() {
            action = Some(SearchAction::Submit);
        }
        if ui.button("Clear All").clicked() {
            action = Some(SearchAction::ClearAll);
        }
        if busy {
            ui.spinner();
        }
    });
    ui.separator();

    ui.columns(2, |cols| {
        // Facets
        let left = &mut cols[0];
        ScrollArea::vertical().id_salt("facets").show(left, |ui| {
            for (field, buckets) in search.facets() {
                ui.label(RichText::new(field).strong());
                for bucket in buckets {
                    let mut checked = search.is_selected(field, &bucket.key);
                    let label = format!("{} ({})", bucket.key, bucket.doc_count);
                    if ui.checkbox(&mut checked, label).changed() {
                        action = Some(SearchAction::ToggleFacet {
                            field: field.clone(),
                            key: bucket.key.clone(),
                        });
                    }
                }
                ui.add_space(6.0);
            }
        });

        // Hits
        let right = &mut cols[1];
        if let Some(error) = search.error() {
            right.colored_label(Color32::RED, error);
        }
        right.label(
            RichText::new(format!("{} result(s)", search.total()))
                .size(11.0)
                .color(Color32::GRAY),
        );
        ScrollArea::vertical()
            .id_salt("hits")
            .max_height(right.available_height() - 40.0)
            .show(right, |ui| {
                for hit in search.hits() {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(hit.title.as_deref().unwrap_or(&hit.id)).strong());
                        if let Some(ot) = &hit.object_type_id {
                            ui.label(RichText::new(ot).size(11.0).color(Color32::GRAY));
                        }
                        if let Some(score) = hit.score {
                            ui.label(RichText::new(format!("{score:.3}")).size(11.0));
                        }
                    });
                }
            });

        right.horizontal(|ui| {
            let page_no = search.page();
            let pages = search.page_count();
            if ui.add_enabled(page_no > 1, egui::Button::new("< Prev")).clicked() {
                action = Some(SearchAction::SetPage(page_no - 1));
            }
            ui.label(format!("Page {page_no} / {pages}"));
            if ui.add_enabled(page_no < pages, egui::Button::new("Next >")).clicked() {
                action = Some(SearchAction::SetPage(page_no + 1));
            }
            ui.separator();
            ui.label("Page size:");
            let mut size = search.page_size();
            if ui
                .add(egui::DragValue::new(&mut size).range(1..=200))
                .changed()
            {
                search.set_page_size(size);
            }
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use mdp_client::{InMemoryClient, Operation};

    fn settle(page: &mut SearchPage, backend: &Backend, notices: &mut Notices) {
        for _ in 0..400 {
            page.poll(backend, notices);
            if !page.is_busy() && !page.search.needs_fetch() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("search never settled");
    }

    #[test]
    fn actions_in_one_frame_issue_one_request() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let client = Arc::new(InMemoryClient::seeded());
        let backend = Backend::new(rt.handle().clone(), client.clone());
        let mut notices = Notices::new();
        let mut page = SearchPage::new(20);

        settle(&mut page, &backend, &mut notices);
        assert_eq!(page.search.total(), 4);

        page.apply(
            SearchAction::ToggleFacet {
                field: "status".into(),
                key: "active".into(),
            },
            &mut notices,
        );
        page.apply(
            SearchAction::ToggleFacet {
                field: "object_type_id".into(),
                key: "ot-order".into(),
            },
            &mut notices,
        );
        settle(&mut page, &backend, &mut notices);

        assert_eq!(client.calls_of(Operation::Search).len(), 2);
        assert_eq!(page.search.total(), 2);
    }

    #[test]
    fn invalid_vector_warns_without_fetching() {
        let mut notices = Notices::new();
        let mut page = SearchPage::new(20);
        page.search.take_fetch();
        page.search.vector_input = "1, x".into();

        page.apply(SearchAction::Submit, &mut notices);
        assert!(!page.search.needs_fetch());
        assert_eq!(notices.len(), 1);
    }
}

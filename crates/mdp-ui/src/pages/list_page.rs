//! Generic list page plumbing
//!
//! Wraps a [`ListState`] with the pending slots for its load and delete
//! calls. Tables themselves are rendered by the per-resource functions in
//! this module and only ever return a [`ListAction`].

use egui::{Color32, RichText, ScrollArea, Ui};
use mdp_client::ClientError;
use mdp_console::list::object_type_label;
use mdp_console::{DeletableResource, ListState, LoadState, Notices, PendingSlot, Resource};
use mdp_types::{ActionType, ExecutionLog, FunctionDefinition, LinkType, ObjectType};

use crate::backend::Backend;

/// Actions returned by list tables
#[derive(Clone, Debug, PartialEq)]
pub enum ListAction {
    Refresh,
    Create,
    Edit(String),
    Delete(String),
}

pub struct ListPage<R: Resource> {
    pub state: ListState<R>,
    needs_load: bool,
    pending_load: Option<PendingSlot<Result<Vec<R>, ClientError>>>,
    pending_delete: Option<PendingSlot<Result<(), ClientError>>>,
}

impl<R: Resource> Default for ListPage<R> {
    fn default() -> Self {
        Self {
            state: ListState::new(),
            needs_load: true,
            pending_load: None,
            pending_delete: None,
        }
    }
}

impl<R: Resource> ListPage<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_refresh(&mut self) {
        self.needs_load = true;
    }

    pub fn is_busy(&self) -> bool {
        self.pending_load.is_some() || self.pending_delete.is_some()
    }

    /// Start a queued load and apply any load result that arrived.
    pub fn poll_load(&mut self, backend: &Backend, notices: &mut Notices) {
        if self.needs_load && self.pending_load.is_none() {
            self.needs_load = false;
            self.state.begin_load();
            self.pending_load =
                Some(backend.spawn(|client| async move { R::fetch_all(client.as_ref()).await }));
        }

        if let Some(result) = self.pending_load.as_ref().and_then(PendingSlot::take) {
            self.pending_load = None;
            if let Some(notice) = self.state.finish_load(result) {
                notices.push(notice);
            }
        }
    }
}

impl<R: DeletableResource> ListPage<R> {
    pub fn poll(&mut self, backend: &Backend, notices: &mut Notices) {
        self.poll_load(backend, notices);

        if let Some(result) = self.pending_delete.as_ref().and_then(PendingSlot::take) {
            self.pending_delete = None;
            let outcome = self.state.finish_delete(result);
            notices.push(ListState::<R>::delete_notice(&outcome));
            if outcome.is_ok() {
                self.request_refresh();
            }
        }
    }

    /// The user accepted the confirmation dialog.
    pub fn confirm_delete(&mut self, backend: &Backend, notices: &mut Notices) {
        match self.state.confirm_delete() {
            Ok(confirm) => {
                let id = confirm.id;
                self.pending_delete = Some(
                    backend.spawn(move |client| async move { R::delete(client.as_ref(), &id).await }),
                );
            }
            Err(e) => notices.push(mdp_console::Notice::error(
                e.user_message(&format!("Failed to delete {}", R::KIND)),
            )),
        }
    }
}

// =============================================================================
// TABLES
// =============================================================================

fn header(
    ui: &mut Ui,
    title: &str,
    load: LoadState,
    busy: bool,
    can_create: bool,
) -> Option<ListAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        ui.heading(title);
        if busy {
            ui.spinner();
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if can_create && ui.button("+ New").clicked() {
                action = Some(ListAction::Create);
            }
            if ui.add_enabled(!busy, egui::Button::new("Refresh")).clicked() {
                action = Some(ListAction::Refresh);
            }
        });
    });
    if load == LoadState::Fallback {
        ui.label(
            RichText::new("Backend unavailable, showing fallback data")
                .size(11.0)
                .color(Color32::from_rgb(230, 180, 60)),
        );
    }
    ui.separator();
    action
}

fn empty_row(ui: &mut Ui, loading: bool) {
    if !loading {
        ui.label(RichText::new("No entries").color(Color32::GRAY));
    }
}

pub fn functions_table(
    ui: &mut Ui,
    page: &ListPage<FunctionDefinition>,
    object_types: &[ObjectType],
) -> Option<ListAction> {
    let mut action = header(ui, "Functions", page.state.load_state(), page.is_busy(), true);
    let deleting = page.state.is_deleting();

    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        egui::Grid::new("functions_table")
            .striped(true)
            .num_columns(6)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                for col in ["API Name", "Display Name", "Bound Object", "Output", "Params", ""] {
                    ui.label(RichText::new(col).strong());
                }
                ui.end_row();

                for f in page.state.items() {
                    ui.monospace(&f.api_name);
                    ui.label(&f.display_name);
                    ui.label(object_type_label(f.bound_object_type_id.as_deref(), object_types));
                    ui.label(f.output_type.as_str());
                    ui.label(f.params().len().to_string());
                    ui.horizontal(|ui| {
                        if ui.small_button("Edit").clicked() {
                            action = Some(ListAction::Edit(f.id.clone()));
                        }
                        if ui.add_enabled(!deleting, egui::Button::new("Delete").small()).clicked() {
                            action = Some(ListAction::Delete(f.id.clone()));
                        }
                    });
                    ui.end_row();
                }
            });
        if page.state.items().is_empty() {
            empty_row(ui, page.state.is_loading());
        }
    });
    action
}

pub fn object_types_table(ui: &mut Ui, page: &ListPage<ObjectType>) -> Option<ListAction> {
    let mut action = header(ui, "Object Types", page.state.load_state(), page.is_busy(), false);
    let deleting = page.state.is_deleting();

    egui::Grid::new("object_types_table")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui| {
            for col in ["API Name", "Display Name", "Description", ""] {
                ui.label(RichText::new(col).strong());
            }
            ui.end_row();
            for t in page.state.items() {
                ui.monospace(&t.api_name);
                ui.label(&t.display_name);
                ui.label(t.description.as_deref().unwrap_or("-"));
                if ui.add_enabled(!deleting, egui::Button::new("Delete").small()).clicked() {
                    action = Some(ListAction::Delete(t.id.clone()));
                }
                ui.end_row();
            }
        });
    if page.state.items().is_empty() {
        empty_row(ui, page.state.is_loading());
    }
    action
}

pub fn link_types_table(
    ui: &mut Ui,
    page: &ListPage<LinkType>,
    object_types: &[ObjectType],
) -> Option<ListAction> {
    let mut action = header(ui, "Link Types", page.state.load_state(), page.is_busy(), false);
    let deleting = page.state.is_deleting();

    egui::Grid::new("link_types_table")
        .striped(true)
        .num_columns(5)
        .show(ui, |ui| {
            for col in ["API Name", "Display Name", "Source", "Target", ""] {
                ui.label(RichText::new(col).strong());
            }
            ui.end_row();
            for l in page.state.items() {
                ui.monospace(&l.api_name);
                ui.label(&l.display_name);
                ui.label(object_type_label(Some(l.source_object_type_id.as_str()), object_types));
                ui.label(object_type_label(Some(l.target_object_type_id.as_str()), object_types));
                if ui.add_enabled(!deleting, egui::Button::new("Delete").small()).clicked() {
                    action = Some(ListAction::Delete(l.id.clone()));
                }
                ui.end_row();
            }
        });
    if page.state.items().is_empty() {
        empty_row(ui, page.state.is_loading());
    }
    action
}

pub fn action_types_table(ui: &mut Ui, page: &ListPage<ActionType>) -> Option<ListAction> {
    let mut action = header(ui, "Action Types", page.state.load_state(), page.is_busy(), false);
    let deleting = page.state.is_deleting();

    egui::Grid::new("action_types_table")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui| {
            for col in ["API Name", "Display Name", "Backing Function", ""] {
                ui.label(RichText::new(col).strong());
            }
            ui.end_row();
            for a in page.state.items() {
                ui.monospace(&a.api_name);
                ui.label(&a.display_name);
                ui.label(a.backing_function_id.as_deref().unwrap_or("-"));
                if ui.add_enabled(!deleting, egui::Button::new("Delete").small()).clicked() {
                    action = Some(ListAction::Delete(a.id.clone()));
                }
                ui.end_row();
            }
        });
    if page.state.items().is_empty() {
        empty_row(ui, page.state.is_loading());
    }
    action
}

/// Backends report status in either case ("success" / "SUCCESS").
fn log_status_color(status: &str) -> Color32 {
    if status.eq_ignore_ascii_case("success") {
        Color32::from_rgb(80, 200, 120)
    } else {
        Color32::from_rgb(230, 80, 80)
    }
}

pub fn logs_table(ui: &mut Ui, page: &ListPage<ExecutionLog>) -> Option<ListAction> {
    let action = header(ui, "Execution Logs", page.state.load_state(), page.is_busy(), false);

    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        egui::Grid::new("logs_table")
            .striped(true)
            .num_columns(5)
            .show(ui, |ui| {
                for col in ["Executed", "Status", "Function", "Duration", "Error"] {
                    ui.label(RichText::new(col).strong());
                }
                ui.end_row();
                for log in page.state.items() {
                    ui.label(
                        log.executed_at
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|| "-".into()),
                    );
                    ui.colored_label(log_status_color(&log.status), &log.status);
                    ui.label(log.function_id.as_deref().unwrap_or("-"));
                    ui.label(
                        log.duration_ms
                            .map(|d| format!("{d} ms"))
                            .unwrap_or_else(|| "-".into()),
                    );
                    ui.label(log.error_message.as_deref().unwrap_or(""));
                    ui.end_row();
                }
            });
        if page.state.items().is_empty() {
            empty_row(ui, page.state.is_loading());
        }
    });
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use mdp_client::{InMemoryClient, MdpClient, Operation};
    use mdp_console::Severity;

    fn settle<R: DeletableResource>(page: &mut ListPage<R>, backend: &Backend, notices: &mut Notices) {
        for _ in 0..400 {
            page.poll(backend, notices);
            if !page.is_busy() && !page.needs_load {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("page never settled");
    }

    #[test]
    fn delete_goes_through_confirmation_then_refetches() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let client = Arc::new(InMemoryClient::seeded());
        let backend = Backend::new(rt.handle().clone(), client.clone());
        let mut notices = Notices::new();
        let mut page: ListPage<FunctionDefinition> = ListPage::new();

        settle(&mut page, &backend, &mut notices);
        assert_eq!(page.state.items().len(), 1);

        page.state.request_delete("fn-seed-1");
        page.confirm_delete(&backend, &mut notices);
        settle(&mut page, &backend, &mut notices);

        assert!(page.state.items().is_empty());
        assert_eq!(client.calls_of(Operation::ListFunctions).len(), 2);
        assert_eq!(notices.last().map(|n| n.severity), Some(Severity::Success));
    }

    #[test]
    fn seeded_log_statuses_color_by_outcome() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let client = InMemoryClient::seeded();
        let logs = rt.block_on(client.list_execution_logs()).unwrap();

        let ok = logs.iter().find(|l| l.status == "SUCCESS").expect("seeded success log");
        assert_eq!(log_status_color(&ok.status), Color32::from_rgb(80, 200, 120));
        assert_eq!(log_status_color("success"), Color32::from_rgb(80, 200, 120));
        assert_eq!(log_status_color("FAILED"), Color32::from_rgb(230, 80, 80));
    }

    #[test]
    fn failed_load_shows_fallback_and_warns() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let client = Arc::new(InMemoryClient::seeded());
        client.fail(Operation::ListFunctions, 500, None);
        let backend = Backend::new(rt.handle().clone(), client);
        let mut notices = Notices::new();
        let mut page: ListPage<FunctionDefinition> = ListPage::new();

        settle(&mut page, &backend, &mut notices);
        assert_eq!(page.state.load_state(), LoadState::Fallback);
        assert!(!page.state.items().is_empty());
        assert_eq!(notices.last().map(|n| n.severity), Some(Severity::Warning));
    }
}

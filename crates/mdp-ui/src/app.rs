//! Main application
//!
//! One frame: poll pending results, render modals, render the page, then
//! flush notices into toasts. All backend calls run on the tokio runtime
//! and report back through pending slots checked here every frame.

use std::sync::Arc;

use mdp_client::MdpClient;
use mdp_console::{ConsoleConfig, DeletableResource, Notices};
use mdp_types::{ActionType, ExecutionLog, FunctionDefinition, LinkType, ObjectType};

use crate::backend::Backend;
use crate::modals::{
    confirm_delete_modal, ConfirmAction, EditorDialog, EditorOutcome, WizardDialog, WizardOutcome,
};
use crate::pages::{list_page, search, ListAction, ListPage, SearchPage};
use crate::toasts::Toasts;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Functions,
    ObjectTypes,
    LinkTypes,
    ActionTypes,
    Search,
    Logs,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Functions,
        Page::ObjectTypes,
        Page::LinkTypes,
        Page::ActionTypes,
        Page::Search,
        Page::Logs,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Functions => "Functions",
            Page::ObjectTypes => "Object Types",
            Page::LinkTypes => "Link Types",
            Page::ActionTypes => "Action Types",
            Page::Search => "Search",
            Page::Logs => "Execution Logs",
        }
    }
}

pub struct MdpConsoleApp {
    backend: Backend,
    config: ConsoleConfig,
    page: Page,

    functions: ListPage<FunctionDefinition>,
    object_types: ListPage<ObjectType>,
    link_types: ListPage<LinkType>,
    action_types: ListPage<ActionType>,
    logs: ListPage<ExecutionLog>,
    search: SearchPage,

    wizard: WizardDialog,
    editor: EditorDialog,

    notices: Notices,
    toasts: Toasts,

    // Keeps the runtime alive for the app's lifetime
    _runtime: Arc<tokio::runtime::Runtime>,
}

impl MdpConsoleApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ConsoleConfig,
        client: Arc<dyn MdpClient>,
        runtime: Arc<tokio::runtime::Runtime>,
    ) -> Self {
        tracing::info!(base_url = %config.api_base_url, "starting MDP console");
        Self {
            backend: Backend::new(runtime.handle().clone(), client),
            search: SearchPage::new(config.page_size),
            config,
            page: Page::Functions,
            functions: ListPage::new(),
            object_types: ListPage::new(),
            link_types: ListPage::new(),
            action_types: ListPage::new(),
            logs: ListPage::new(),
            wizard: WizardDialog::new(),
            editor: EditorDialog::new(),
            notices: Notices::new(),
            toasts: Toasts::new(),
            _runtime: runtime,
        }
    }

    // =========================================================================
    // POLLING
    // =========================================================================

    fn poll(&mut self) {
        let backend = &self.backend;
        let notices = &mut self.notices;

        self.functions.poll(backend, notices);
        self.object_types.poll(backend, notices);
        self.link_types.poll(backend, notices);
        self.action_types.poll(backend, notices);
        self.logs.poll_load(backend, notices);
        self.search.poll(backend, notices);

        if let Some(WizardOutcome::Created(def)) = self.wizard.poll(notices) {
            tracing::debug!(id = %def.id, "refreshing functions after create");
            self.functions.request_refresh();
        }
        if let Some(EditorOutcome::Saved(def)) = self.editor.poll(notices) {
            tracing::debug!(id = %def.id, "refreshing functions after update");
            self.functions.request_refresh();
        }
    }

    fn is_busy(&self) -> bool {
        self.functions.is_busy()
            || self.object_types.is_busy()
            || self.link_types.is_busy()
            || self.action_types.is_busy()
            || self.logs.is_busy()
            || self.search.is_busy()
            || self.wizard.is_busy()
            || self.editor.is_busy()
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    fn handle_function_action(&mut self, action: ListAction) {
        match action {
            ListAction::Create => self.wizard.open(),
            ListAction::Edit(id) => {
                if let Some(def) = self.functions.state.find(&id) {
                    self.editor.open(def.clone());
                }
            }
            other => handle_list_action(&mut self.functions, other),
        }
    }

    fn show_modals(&mut self, ctx: &egui::Context) {
        let object_types = self.object_types.state.items();

        if let Some(action) = self.wizard.ui(ctx, object_types) {
            let project = self.config.project_id.as_deref();
            self.wizard
                .apply(action, &self.backend, project, &mut self.notices);
        }

        if let Some(action) = self.editor.ui(ctx, object_types) {
            self.editor.apply(action, &self.backend, &mut self.notices);
        }

        match self.page {
            Page::Functions => confirm_for(ctx, &mut self.functions, &self.backend, &mut self.notices),
            Page::ObjectTypes => {
                confirm_for(ctx, &mut self.object_types, &self.backend, &mut self.notices)
            }
            Page::LinkTypes => confirm_for(ctx, &mut self.link_types, &self.backend, &mut self.notices),
            Page::ActionTypes => {
                confirm_for(ctx, &mut self.action_types, &self.backend, &mut self.notices)
            }
            Page::Search | Page::Logs => {}
        }
    }
}

fn handle_list_action<R: DeletableResource>(page: &mut ListPage<R>, action: ListAction) {
    match action {
        ListAction::Refresh => page.request_refresh(),
        ListAction::Delete(id) => {
            page.state.request_delete(&id);
        }
        ListAction::Create | ListAction::Edit(_) => {}
    }
}

fn confirm_for<R: DeletableResource>(
    ctx: &egui::Context,
    page: &mut ListPage<R>,
    backend: &Backend,
    notices: &mut Notices,
) {
    let Some(confirm) = page.state.pending_confirm().cloned() else {
        return;
    };
    match confirm_delete_modal(ctx, &confirm) {
        Some(ConfirmAction::Confirm) => page.confirm_delete(backend, notices),
        Some(ConfirmAction::Cancel) => page.state.cancel_delete(),
        None => {}
    }
}

impl eframe::App for MdpConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll();

        // Request repaint while async operations are pending
        if self.is_busy() {
            ctx.request_repaint();
        }

        // Render modals (before main UI so they appear on top)
        self.show_modals(ctx);

        egui::SidePanel::left("nav")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| {
                ui.heading("MDP Platform");
                ui.separator();
                for page in Page::ALL {
                    ui.selectable_value(&mut self.page, page, page.title());
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Functions => {
                let action =
                    list_page::functions_table(ui, &self.functions, self.object_types.state.items());
                if let Some(action) = action {
                    self.handle_function_action(action);
                }
            }
            Page::ObjectTypes => {
                if let Some(action) = list_page::object_types_table(ui, &self.object_types) {
                    handle_list_action(&mut self.object_types, action);
                }
            }
            Page::LinkTypes => {
                let action =
                    list_page::link_types_table(ui, &self.link_types, self.object_types.state.items());
                if let Some(action) = action {
                    handle_list_action(&mut self.link_types, action);
                }
            }
            Page::ActionTypes => {
                if let Some(action) = list_page::action_types_table(ui, &self.action_types) {
                    handle_list_action(&mut self.action_types, action);
                }
            }
            Page::Search => {
                if let Some(action) = search::search_panel(ui, &mut self.search) {
                    self.search.apply(action, &mut self.notices);
                }
            }
            Page::Logs => {
                if let Some(ListAction::Refresh) = list_page::logs_table(ui, &self.logs) {
                    self.logs.request_refresh();
                }
            }
        });

        let now = ctx.input(|i| i.time);
        self.toasts.absorb(&mut self.notices, now);
        self.toasts.show(ctx);
    }
}

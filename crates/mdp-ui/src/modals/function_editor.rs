//! Function editor dialog
//!
//! The host decides which function is being edited (`target`); the dialog
//! syncs its editor against that every frame so local edits survive list
//! refreshes and are only replaced when a different function is opened.

use egui::{Align2, Color32, Key, RichText, TextEdit, Vec2};
use mdp_client::ClientError;
use mdp_console::function::{EditorTab, FunctionEditor, MSG_UPDATE_FAILED};
use mdp_console::{Notice, Notices, PendingSlot};
use mdp_types::{FunctionDefinition, ObjectType};

use super::function_form::{self, FormAction};
use crate::backend::Backend;

#[derive(Clone, Debug, PartialEq)]
pub enum EditorAction {
    Save,
    Close,
    Form(FormAction),
}

#[derive(Debug, PartialEq)]
pub enum EditorOutcome {
    Saved(FunctionDefinition),
    Closed,
}

#[derive(Default)]
pub struct EditorDialog {
    target: Option<FunctionDefinition>,
    pub editor: FunctionEditor,
    pending: Option<PendingSlot<Result<FunctionDefinition, ClientError>>>,
}

impl EditorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, def: FunctionDefinition) {
        if self.target.as_ref().map(|t| &t.id) != Some(&def.id) {
            self.pending = None;
        }
        self.target = Some(def);
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    fn close(&mut self) {
        self.target = None;
        self.pending = None;
        self.editor.sync(None);
    }

    pub fn apply(
        &mut self,
        action: EditorAction,
        backend: &Backend,
        notices: &mut Notices,
    ) -> Option<EditorOutcome> {
        match action {
            EditorAction::Close => {
                self.close();
                return Some(EditorOutcome::Closed);
            }
            EditorAction::Save => match self.editor.begin_save() {
                Ok((id, request)) => {
                    self.pending = Some(backend.spawn(move |client| async move {
                        client.update_function(&id, request).await
                    }));
                }
                Err(e) => notices.push(Notice::warning(e.user_message(MSG_UPDATE_FAILED))),
            },
            EditorAction::Form(form) => apply_form(&mut self.editor, form),
        }
        None
    }

    pub fn poll(&mut self, notices: &mut Notices) -> Option<EditorOutcome> {
        self.editor.sync(self.target.as_ref());

        let result = self.pending.as_ref().and_then(PendingSlot::take)?;
        self.pending = None;
        let outcome = self.editor.finish_save(result);
        notices.push(FunctionEditor::save_notice(&outcome));
        match outcome {
            Ok(def) => {
                self.close();
                Some(EditorOutcome::Saved(def))
            }
            Err(_) => None,
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, object_types: &[ObjectType]) -> Option<EditorAction> {
        if !self.is_open() || !self.editor.is_open() {
            return None;
        }
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            return Some(EditorAction::Close);
        }

        let mut action = None;
        let busy = self.is_busy();
        let editor = &mut self.editor;

        egui::Window::new(format!("Edit Function: {}", editor.api_name()))
            .id(egui::Id::new("function_editor"))
            .collapsible(false)
            .resizable(true)
            .default_size(Vec2::new(640.0, 540.0))
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for tab in EditorTab::ALL {
                        ui.selectable_value(&mut editor.tab, tab, tab.title());
                    }
                });
                ui.separator();

                match editor.tab {
                    EditorTab::Basic => basic_tab(ui, editor, object_types),
                    EditorTab::Signature => {
                        if let Some(form) = function_form::params_editor(ui, "editor", editor.params()) {
                            action = Some(EditorAction::Form(form));
                        }
                        ui.add_space(8.0);
                        function_form::output_type_picker(ui, "editor", &mut editor.output_type);
                    }
                    EditorTab::Implementation => {
                        let offer_stub = editor.code_content.trim().is_empty();
                        if let Some(form) =
                            function_form::code_editor(ui, &mut editor.code_content, offer_stub)
                        {
                            action = Some(EditorAction::Form(form));
                        }
                    }
                    EditorTab::Test => {
                        if let Some(form) = function_form::test_panel(
                            ui,
                            editor.params(),
                            editor.test_inputs(),
                            editor.test_result(),
                        ) {
                            action = Some(EditorAction::Form(form));
                        }
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Close").clicked() {
                        action = Some(EditorAction::Close);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(!busy, egui::Button::new("Save")).clicked() {
                            action = Some(EditorAction::Save);
                        }
                        if busy {
                            ui.spinner();
                        }
                    });
                });
            });

        action
    }
}

fn apply_form(editor: &mut FunctionEditor, form: FormAction) {
    match form {
        FormAction::AddParam => {
            editor.add_param();
        }
        FormAction::RemoveParam(idx) => editor.remove_param(idx),
        FormAction::SetParamName(idx, name) => editor.set_param_name(idx, name),
        FormAction::SetParamType(idx, t) => editor.set_param_type(idx, t),
        FormAction::SetParamRequired(idx, required) => editor.set_param_required(idx, required),
        FormAction::SetTestInput(name, value) => editor.set_test_input(&name, value),
        FormAction::RunTest => {
            editor.run_dry_run();
        }
        FormAction::GenerateStub => {
            editor.generate_stub();
        }
    }
}

fn basic_tab(ui: &mut egui::Ui, editor: &mut FunctionEditor, object_types: &[ObjectType]) {
    let display_error = editor.display_name_error().map(str::to_string);

    egui::Grid::new("editor_basic")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("API name");
            ui.label(RichText::new(editor.api_name()).monospace().color(Color32::GRAY));
            ui.end_row();

            ui.label("Display name *");
            ui.vertical(|ui| {
                ui.add(TextEdit::singleline(&mut editor.display_name).desired_width(300.0));
                if let Some(err) = &display_error {
                    ui.colored_label(Color32::RED, err);
                }
            });
            ui.end_row();

            ui.label("Description");
            ui.add(
                TextEdit::multiline(&mut editor.description)
                    .desired_rows(3)
                    .desired_width(300.0),
            );
            ui.end_row();

            ui.label("Bound object type");
            function_form::object_type_picker(
                ui,
                "editor",
                &mut editor.bound_object_type_id,
                object_types,
            );
            ui.end_row();
        });
}

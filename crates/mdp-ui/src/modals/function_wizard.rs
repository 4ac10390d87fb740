//! Function creation wizard dialog
//!
//! Step indicator, one form per step and a footer with Back / Next /
//! Create. The dialog owns the pending slot of its submission; closing the
//! dialog drops the slot so a late response is ignored.
//!
//! Follows the console's modal rules:
//! - Returns Option<WizardAction>, no callbacks
//! - Text fields are edited in place, structural edits come back as actions

use egui::{Align2, Color32, Key, RichText, TextEdit, Vec2};
use mdp_client::ClientError;
use mdp_console::function::{FunctionWizard, WizardStep};
use mdp_console::{Notice, Notices, PendingSlot, ValidationError};
use mdp_types::{FunctionDefinition, ObjectType};

use super::function_form::{self, FormAction};
use crate::backend::Backend;

#[derive(Clone, Debug, PartialEq)]
pub enum WizardAction {
    Next,
    Back,
    Submit,
    Cancel,
    Form(FormAction),
}

/// What the host should do after a wizard frame
#[derive(Debug, PartialEq)]
pub enum WizardOutcome {
    /// Function created; refresh the list
    Created(FunctionDefinition),
    Closed,
}

#[derive(Default)]
pub struct WizardDialog {
    open: bool,
    pub wizard: FunctionWizard,
    pending: Option<PendingSlot<Result<FunctionDefinition, ClientError>>>,
}

/// Field errors are also shown inline under their inputs; form-level
/// errors only exist as a toast.
fn step_notice(err: &ValidationError) -> Notice {
    match err {
        ValidationError::Form(msg) => Notice::error(msg.clone()),
        ValidationError::Fields(_) => Notice::warning(err.to_string()),
    }
}

impl WizardDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.wizard.reset();
        self.pending = None;
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    fn close(&mut self) {
        self.open = false;
        self.pending = None;
    }

    pub fn apply(
        &mut self,
        action: WizardAction,
        backend: &Backend,
        project_id: Option<&str>,
        notices: &mut Notices,
    ) -> Option<WizardOutcome> {
        match action {
            WizardAction::Next => {
                if let Err(e) = self.wizard.next() {
                    notices.push(step_notice(&e));
                }
            }
            WizardAction::Back => {
                self.wizard.previous();
            }
            WizardAction::Cancel => {
                self.wizard.cancel();
                self.close();
                return Some(WizardOutcome::Closed);
            }
            WizardAction::Submit => match self.wizard.begin_submit(project_id) {
                Ok(request) => {
                    self.pending = Some(backend.spawn(move |client| async move {
                        client.create_function(request).await
                    }));
                }
                Err(e) => notices.push(Notice::warning(
                    e.user_message(mdp_console::function::MSG_CREATE_FAILED),
                )),
            },
            WizardAction::Form(form) => apply_form(&mut self.wizard, form),
        }
        None
    }

    /// Apply a submission result if it arrived.
    pub fn poll(&mut self, notices: &mut Notices) -> Option<WizardOutcome> {
        let result = self.pending.as_ref().and_then(PendingSlot::take)?;
        self.pending = None;
        let outcome = self.wizard.finish_submit(result);
        notices.push(FunctionWizard::submit_notice(&outcome));
        match outcome {
            Ok(def) => {
                self.close();
                Some(WizardOutcome::Created(def))
            }
            Err(_) => None,
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, object_types: &[ObjectType]) -> Option<WizardAction> {
        if !self.open {
            return None;
        }
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            return Some(WizardAction::Cancel);
        }

        let mut action = None;
        let busy = self.is_busy();
        let wizard = &mut self.wizard;

        egui::Window::new("New Function")
            .collapsible(false)
            .resizable(true)
            .default_size(Vec2::new(620.0, 520.0))
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                step_indicator(ui, wizard.step());
                ui.separator();

                match wizard.step() {
                    WizardStep::BasicInfo => basic_info(ui, wizard, object_types),
                    WizardStep::Signature => {
                        if let Some(form) = function_form::params_editor(ui, "wizard", wizard.params()) {
                            action = Some(WizardAction::Form(form));
                        }
                        ui.add_space(8.0);
                        function_form::output_type_picker(ui, "wizard", &mut wizard.output_type);
                    }
                    WizardStep::Implementation => {
                        ui.label(RichText::new("Implementation").strong());
                        function_form::code_editor(ui, &mut wizard.code_content, false);
                        ui.add_space(8.0);
                        ui.label(RichText::new("Test").strong());
                        if let Some(form) = function_form::test_panel(
                            ui,
                            wizard.params(),
                            wizard.test_inputs(),
                            wizard.test_result(),
                        ) {
                            action = Some(WizardAction::Form(form));
                        }
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        action = Some(WizardAction::Cancel);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if wizard.step() == WizardStep::Implementation {
                            if ui.add_enabled(!busy, egui::Button::new("Create")).clicked() {
                                action = Some(WizardAction::Submit);
                            }
                        } else if ui.button("Next").clicked() {
                            action = Some(WizardAction::Next);
                        }
                        if wizard.step() != WizardStep::BasicInfo && ui.button("Back").clicked() {
                            action = Some(WizardAction::Back);
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

fn apply_form(wizard: &mut FunctionWizard, form: FormAction) {
    match form {
        FormAction::AddParam => {
            wizard.add_param();
        }
        FormAction::RemoveParam(idx) => wizard.remove_param(idx),
        FormAction::SetParamName(idx, name) => wizard.set_param_name(idx, name),
        FormAction::SetParamType(idx, t) => wizard.set_param_type(idx, t),
        FormAction::SetParamRequired(idx, required) => wizard.set_param_required(idx, required),
        FormAction::SetTestInput(name, value) => wizard.set_test_input(&name, value),
        FormAction::RunTest => {
            wizard.run_dry_run();
        }
        // the wizard generates its stub when entering the last step
        FormAction::GenerateStub => {}
    }
}

fn step_indicator(ui: &mut egui::Ui, current: WizardStep) {
    ui.horizontal(|ui| {
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            let text = format!("{}. {}", i + 1, step.title());
            let label = if *step == current {
                RichText::new(text).strong().color(Color32::LIGHT_BLUE)
            } else if step.index() < current.index() {
                RichText::new(text).color(Color32::from_rgb(80, 200, 120))
            } else {
                RichText::new(text).color(Color32::GRAY)
            };
            ui.label(label);
            if i + 1 < WizardStep::ALL.len() {
                ui.label(RichText::new(">").color(Color32::GRAY));
            }
        }
    });
}

fn basic_info(ui: &mut egui::Ui, wizard: &mut FunctionWizard, object_types: &[ObjectType]) {
    let api_error = wizard.field_error("api_name").map(str::to_string);
    let display_error = wizard.field_error("display_name").map(str::to_string);

    egui::Grid::new("wizard_basic")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("API name *");
            ui.vertical(|ui| {
                ui.add(
                    TextEdit::singleline(&mut wizard.basic.api_name)
                        .hint_text("calculate_risk_score")
                        .desired_width(300.0),
                );
                if let Some(err) = &api_error {
                    ui.colored_label(Color32::RED, err);
                }
            });
            ui.end_row();

            ui.label("Display name *");
            ui.vertical(|ui| {
                ui.add(TextEdit::singleline(&mut wizard.basic.display_name).desired_width(300.0));
                if let Some(err) = &display_error {
                    ui.colored_label(Color32::RED, err);
                }
            });
            ui.end_row();

            ui.label("Description");
            ui.add(
                TextEdit::multiline(&mut wizard.basic.description)
                    .desired_rows(3)
                    .desired_width(300.0),
            );
            ui.end_row();

            ui.label("Bound object type");
            function_form::object_type_picker(
                ui,
                "wizard",
                &mut wizard.basic.bound_object_type_id,
                object_types,
            );
            ui.end_row();
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mdp_client::InMemoryClient;
    use mdp_console::Severity;

    #[test]
    fn blocked_signature_step_raises_error_toast() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let backend = Backend::new(rt.handle().clone(), Arc::new(InMemoryClient::new()));
        let mut notices = Notices::new();
        let mut dialog = WizardDialog::new();
        dialog.open();
        dialog.wizard.basic.api_name = "order_count".into();
        dialog.wizard.basic.display_name = "Order Count".into();
        dialog.apply(WizardAction::Next, &backend, None, &mut notices);
        assert_eq!(dialog.wizard.step(), WizardStep::Signature);

        let idx = dialog.wizard.add_param();
        dialog.wizard.set_param_name(idx, "  ");
        dialog.apply(WizardAction::Next, &backend, None, &mut notices);

        assert_eq!(dialog.wizard.step(), WizardStep::Signature);
        assert_eq!(
            notices.last(),
            Some(&Notice::error("Please complete all parameter definitions"))
        );
    }

    #[test]
    fn missing_basic_fields_warn_alongside_inline_errors() {
        let notice = step_notice(&ValidationError::field("api_name", "Please enter API name"));
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.message, "Please enter API name");
    }
}

//! Widgets shared by the function wizard and editor
//!
//! Parameter rows, the output type picker, the code editor and the dry-run
//! panel. Row and input edits come back as actions; the caller applies them
//! so derived state (test inputs) stays in sync.

use egui::{Color32, RichText, ScrollArea, TextEdit, Ui};
use mdp_console::function::{DryRunResult, ParameterList, TestInputs};
use mdp_types::{ObjectType, OutputType, ParamType};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum FormAction {
    AddParam,
    RemoveParam(usize),
    SetParamName(usize, String),
    SetParamType(usize, Option<ParamType>),
    SetParamRequired(usize, bool),
    SetTestInput(String, Value),
    RunTest,
    GenerateStub,
}

pub fn params_editor(ui: &mut Ui, id_salt: &str, params: &ParameterList) -> Option<FormAction> {
    let mut action = None;

    egui::Grid::new(format!("{id_salt}_params"))
        .num_columns(4)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Name").strong());
            ui.label(RichText::new("Type").strong());
            ui.label(RichText::new("Required").strong());
            ui.label("");
            ui.end_row();

            for (idx, row) in params.rows().iter().enumerate() {
                let mut name = row.name.clone();
                if ui
                    .add(TextEdit::singleline(&mut name).desired_width(160.0))
                    .changed()
                {
                    action = Some(FormAction::SetParamName(idx, name));
                }

                let selected = row.param_type.map(|t| t.as_str()).unwrap_or("(select)");
                egui::ComboBox::from_id_salt(format!("{id_salt}_ptype_{idx}"))
                    .selected_text(selected)
                    .width(100.0)
                    .show_ui(ui, |ui| {
                        for t in ParamType::ALL {
                            if ui
                                .selectable_label(row.param_type == Some(t), t.as_str())
                                .clicked()
                            {
                                action = Some(FormAction::SetParamType(idx, Some(t)));
                            }
                        }
                    });

                let mut required = row.required;
                if ui.checkbox(&mut required, "").changed() {
                    action = Some(FormAction::SetParamRequired(idx, required));
                }

                if ui.small_button("Remove").clicked() {
                    action = Some(FormAction::RemoveParam(idx));
                }
                ui.end_row();
            }
        });

    if ui.button("+ Add parameter").clicked() {
        action = Some(FormAction::AddParam);
    }

    let duplicates = params.duplicate_names();
    if !duplicates.is_empty() {
        ui.label(
            RichText::new(format!("Duplicate parameter names: {}", duplicates.join(", ")))
                .size(11.0)
                .color(Color32::from_rgb(230, 180, 60)),
        );
    }
    action
}

pub fn output_type_picker(ui: &mut Ui, id_salt: &str, output_type: &mut OutputType) {
    ui.horizontal(|ui| {
        ui.label("Output type:");
        egui::ComboBox::from_id_salt(format!("{id_salt}_output"))
            .selected_text(output_type.as_str())
            .show_ui(ui, |ui| {
                for t in OutputType::ALL {
                    ui.selectable_value(output_type, t, t.as_str());
                }
            });
    });
}

pub fn object_type_picker(
    ui: &mut Ui,
    id_salt: &str,
    bound: &mut Option<String>,
    object_types: &[ObjectType],
) {
    let selected = bound
        .as_deref()
        .and_then(|id| object_types.iter().find(|t| t.id == id))
        .map(|t| t.display_name.as_str())
        .or(bound.as_deref())
        .unwrap_or("(none)")
        .to_string();

    egui::ComboBox::from_id_salt(format!("{id_salt}_bound"))
        .selected_text(selected)
        .width(200.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(bound, None, "(none)");
            for t in object_types {
                ui.selectable_value(bound, Some(t.id.clone()), &t.display_name);
            }
        });
}

/// Code editor; returns `GenerateStub` when the stub button is pressed.
pub fn code_editor(ui: &mut Ui, code: &mut String, offer_stub: bool) -> Option<FormAction> {
    let mut action = None;
    if offer_stub && ui.button("Generate stub").clicked() {
        action = Some(FormAction::GenerateStub);
    }
    ScrollArea::vertical()
        .max_height(260.0)
        .show(ui, |ui| {
            ui.add(
                TextEdit::multiline(code)
                    .code_editor()
                    .desired_rows(14)
                    .desired_width(f32::INFINITY),
            );
        });
    action
}

/// Test inputs plus the last dry-run result.
pub fn test_panel(
    ui: &mut Ui,
    params: &ParameterList,
    inputs: &TestInputs,
    result: Option<&DryRunResult>,
) -> Option<FormAction> {
    let mut action = None;

    if inputs.is_empty() {
        ui.label(RichText::new("No parameters to fill in").color(Color32::GRAY));
    }
    egui::Grid::new("test_inputs").num_columns(2).show(ui, |ui| {
        for (name, value) in inputs {
            let param_type = params
                .rows()
                .iter()
                .find(|row| row.name.trim() == name)
                .and_then(|row| row.param_type);
            ui.label(name);
            let mut text = input_text(value);
            if ui
                .add(TextEdit::singleline(&mut text).desired_width(220.0))
                .changed()
            {
                action = Some(FormAction::SetTestInput(
                    name.clone(),
                    parse_input(&text, param_type),
                ));
            }
            ui.end_row();
        }
    });

    if ui.button("Run").clicked() {
        action = Some(FormAction::RunTest);
    }

    if let Some(result) = result {
        ui.separator();
        let pretty = serde_json::to_string_pretty(result).unwrap_or_default();
        ui.add(
            TextEdit::multiline(&mut pretty.as_str())
                .code_editor()
                .desired_width(f32::INFINITY),
        );
    }
    action
}

fn input_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// String parameters keep the raw text; everything else is parsed as JSON
/// and falls back to a string while the text is not valid yet.
pub fn parse_input(text: &str, param_type: Option<ParamType>) -> Value {
    match param_type {
        Some(ParamType::String) | Some(ParamType::Date) | None => Value::String(text.to_string()),
        Some(_) => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_inputs_are_not_parsed() {
        assert_eq!(parse_input("42", Some(ParamType::String)), json!("42"));
    }

    #[test]
    fn typed_inputs_parse_as_json() {
        assert_eq!(parse_input("42", Some(ParamType::Integer)), json!(42));
        assert_eq!(parse_input("[1, 2]", Some(ParamType::Array)), json!([1, 2]));
        assert_eq!(parse_input("tru", Some(ParamType::Boolean)), json!("tru"));
    }

    #[test]
    fn input_text_shows_strings_raw() {
        assert_eq!(input_text(&json!("abc")), "abc");
        assert_eq!(input_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}

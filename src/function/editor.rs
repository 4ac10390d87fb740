//! Function Editor
//!
//! Tabbed editing of an existing function. Every tab is always reachable;
//! the only gate is `display_name` on save. `api_name` is immutable after
//! creation and never part of the update payload.
//!
//! Hydration is keyed on the identity of the function being edited: the
//! frame loop calls [`FunctionEditor::sync`] every frame, and local state is
//! only (re)loaded when the editor opens or switches to a different id.

use mdp_client::{ClientError, MdpClient};
use mdp_types::{FunctionDefinition, OutputType, ParamType, UpdateFunctionRequest};

use super::dry_run::{dry_run, DryRunResult};
use super::params::{ParameterList, TestInputs};
use super::stub::stub_if_empty;
use super::{MSG_ENTER_DISPLAY_NAME, MSG_UPDATED, MSG_UPDATE_FAILED};
use crate::error::{ConsoleError, ValidationError};
use crate::notify::Notice;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditorTab {
    #[default]
    Basic,
    Signature,
    Implementation,
    Test,
}

impl EditorTab {
    pub const ALL: [EditorTab; 4] = [
        EditorTab::Basic,
        EditorTab::Signature,
        EditorTab::Implementation,
        EditorTab::Test,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            EditorTab::Basic => "Basic",
            EditorTab::Signature => "Signature",
            EditorTab::Implementation => "Implementation",
            EditorTab::Test => "Test",
        }
    }
}

#[derive(Debug, Default)]
pub struct FunctionEditor {
    /// Id of the function the local state was hydrated from
    hydrated_for: Option<String>,
    api_name: String,
    pub tab: EditorTab,
    pub display_name: String,
    pub description: String,
    pub bound_object_type_id: Option<String>,
    params: ParameterList,
    pub output_type: OutputType,
    pub code_content: String,
    test_inputs: TestInputs,
    test_result: Option<DryRunResult>,
    display_name_error: Option<String>,
    saving: bool,
}

impl FunctionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.hydrated_for.is_some()
    }

    pub fn function_id(&self) -> Option<&str> {
        self.hydrated_for.as_deref()
    }

    /// Read-only in the editor.
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn params(&self) -> &ParameterList {
        &self.params
    }

    pub fn test_inputs(&self) -> &TestInputs {
        &self.test_inputs
    }

    pub fn test_result(&self) -> Option<&DryRunResult> {
        self.test_result.as_ref()
    }

    pub fn display_name_error(&self) -> Option<&str> {
        self.display_name_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Align local state with the function the host wants edited.
    ///
    /// `None` closes the editor. Returns `true` only when local state was
    /// (re)hydrated by this call.
    pub fn sync(&mut self, target: Option<&FunctionDefinition>) -> bool {
        match target {
            None => {
                if self.is_open() {
                    self.close();
                }
                false
            }
            Some(def) if self.hydrated_for.as_deref() == Some(def.id.as_str()) => false,
            Some(def) => {
                self.hydrate(def);
                true
            }
        }
    }

    fn hydrate(&mut self, def: &FunctionDefinition) {
        tracing::debug!(id = %def.id, "hydrating function editor");
        let params = ParameterList::from_params(def.params());
        *self = Self {
            hydrated_for: Some(def.id.clone()),
            api_name: def.api_name.clone(),
            tab: EditorTab::Basic,
            display_name: def.display_name.clone(),
            description: def.description.clone().unwrap_or_default(),
            bound_object_type_id: def.bound_object_type_id.clone(),
            test_inputs: params.test_inputs(&TestInputs::new()),
            params,
            output_type: def.output_type,
            code_content: def.code_content.clone().unwrap_or_default(),
            test_result: None,
            display_name_error: None,
            saving: false,
        };
    }

    /// Drop all local state. A save still in flight is forgotten.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    pub fn add_param(&mut self) -> usize {
        let index = self.params.add();
        self.refresh_test_inputs();
        index
    }

    pub fn remove_param(&mut self, index: usize) {
        if self.params.remove(index).is_some() {
            self.refresh_test_inputs();
        }
    }

    pub fn set_param_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(row) = self.params.get_mut(index) {
            row.name = name.into();
            self.refresh_test_inputs();
        }
    }

    pub fn set_param_type(&mut self, index: usize, param_type: Option<ParamType>) {
        if let Some(row) = self.params.get_mut(index) {
            row.param_type = param_type;
            self.refresh_test_inputs();
        }
    }

    pub fn set_param_required(&mut self, index: usize, required: bool) {
        if let Some(row) = self.params.get_mut(index) {
            row.required = required;
        }
    }

    fn refresh_test_inputs(&mut self) {
        self.test_inputs = self.params.test_inputs(&self.test_inputs);
    }

    // =========================================================================
    // IMPLEMENTATION / TEST
    // =========================================================================

    /// Fill an empty body with a stub. Returns `false` if the body already
    /// has content or there are no parameters.
    pub fn generate_stub(&mut self) -> bool {
        match stub_if_empty(
            &self.code_content,
            &self.api_name,
            &self.params.names(),
            self.output_type,
        ) {
            Some(stub) => {
                self.code_content = stub;
                true
            }
            None => false,
        }
    }

    pub fn set_test_input(&mut self, name: &str, value: serde_json::Value) {
        if let Some(slot) = self.test_inputs.get_mut(name) {
            *slot = value;
        }
    }

    pub fn run_dry_run(&mut self) -> &DryRunResult {
        self.test_result
            .insert(dry_run(&self.test_inputs, self.output_type))
    }

    // =========================================================================
    // SAVE
    // =========================================================================

    /// Assemble the update payload.
    ///
    /// Parameter rows that are still incomplete (blank name or no type) are
    /// left out of the payload; they are not a save error.
    pub fn build_request(&self) -> Result<UpdateFunctionRequest, ValidationError> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err(ValidationError::field(
                "display_name",
                MSG_ENTER_DISPLAY_NAME,
            ));
        }

        let skipped = self.params.len() - self.params.complete_params().len();
        if skipped > 0 {
            tracing::warn!(skipped, "incomplete parameter rows left out of update");
        }

        let description = self.description.trim();
        Ok(UpdateFunctionRequest {
            display_name: display_name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            code_content: self.code_content.clone(),
            input_params_schema: ParameterList::to_schema(self.params.complete_params()),
            output_type: self.output_type,
            bound_object_type_id: self
                .bound_object_type_id
                .clone()
                .filter(|id| !id.is_empty()),
        })
    }

    /// Start a save: returns the target id and payload.
    pub fn begin_save(&mut self) -> Result<(String, UpdateFunctionRequest), ConsoleError> {
        let id = self
            .hydrated_for
            .clone()
            .ok_or_else(|| ValidationError::Form("No function selected".into()))?;
        if self.saving {
            return Err(ConsoleError::AlreadyPending);
        }
        match self.build_request() {
            Ok(req) => {
                self.display_name_error = None;
                self.saving = true;
                Ok((id, req))
            }
            Err(e) => {
                self.display_name_error = e.field_message("display_name").map(str::to_string);
                Err(e.into())
            }
        }
    }

    /// Apply the backend's answer. Success closes the editor; failure keeps
    /// it open with all edits intact.
    pub fn finish_save(
        &mut self,
        result: Result<FunctionDefinition, ClientError>,
    ) -> Result<FunctionDefinition, ConsoleError> {
        self.saving = false;
        match result {
            Ok(def) => {
                tracing::info!(id = %def.id, "function updated");
                self.close();
                Ok(def)
            }
            Err(e) => {
                tracing::warn!(error = %e, "function update failed");
                Err(e.into())
            }
        }
    }

    pub async fn save(&mut self, client: &dyn MdpClient) -> Result<FunctionDefinition, ConsoleError> {
        let (id, req) = self.begin_save()?;
        let result = client.update_function(&id, req).await;
        self.finish_save(result)
    }

    pub fn save_notice(result: &Result<FunctionDefinition, ConsoleError>) -> Notice {
        match result {
            Ok(_) => Notice::success(MSG_UPDATED),
            Err(e) => Notice::error(e.user_message(MSG_UPDATE_FAILED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdp_client::{InMemoryClient, Operation, RecordedCall};
    use mdp_types::Parameter;

    fn definition(id: &str) -> FunctionDefinition {
        FunctionDefinition {
            id: id.into(),
            api_name: "calc".into(),
            display_name: "Calc".into(),
            description: Some("adds".into()),
            code_content: Some("def calc(a, b):\n    return a + b\n".into()),
            bound_object_type_id: Some("ot-order".into()),
            input_params_schema: Some(vec![
                Parameter {
                    name: "a".into(),
                    param_type: ParamType::Integer,
                    required: true,
                },
                Parameter {
                    name: "b".into(),
                    param_type: ParamType::Integer,
                    required: false,
                },
            ]),
            output_type: OutputType::Integer,
            project_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn sync_hydrates_once_per_identity() {
        let def = definition("fn-1");
        let mut editor = FunctionEditor::new();

        assert!(editor.sync(Some(&def)));
        assert_eq!(editor.api_name(), "calc");
        assert_eq!(editor.params().len(), 2);
        assert_eq!(
            serde_json::Value::Object(editor.test_inputs().clone()),
            serde_json::json!({"a": 0, "b": 0})
        );

        editor.display_name = "Calc (edited)".into();
        editor.tab = EditorTab::Test;
        // Subsequent frames must not clobber in-progress edits
        assert!(!editor.sync(Some(&def)));
        assert_eq!(editor.display_name, "Calc (edited)");
        assert_eq!(editor.tab, EditorTab::Test);
    }

    #[test]
    fn sync_rehydrates_for_other_function_and_closes_on_none() {
        let mut editor = FunctionEditor::new();
        editor.sync(Some(&definition("fn-1")));
        editor.display_name = "changed".into();

        let mut other = definition("fn-2");
        other.display_name = "Other".into();
        assert!(editor.sync(Some(&other)));
        assert_eq!(editor.display_name, "Other");

        assert!(!editor.sync(None));
        assert!(!editor.is_open());

        // Re-opening the same function after close hydrates again
        assert!(editor.sync(Some(&other)));
    }

    #[test]
    fn tabs_are_ungated() {
        let mut editor = FunctionEditor::new();
        editor.sync(Some(&definition("fn-1")));
        editor.display_name.clear();
        for tab in EditorTab::ALL {
            editor.tab = tab;
            assert_eq!(editor.tab, tab);
        }
    }

    #[test]
    fn blank_display_name_blocks_save() {
        let mut editor = FunctionEditor::new();
        editor.sync(Some(&definition("fn-1")));
        editor.display_name = "   ".into();

        let err = editor.begin_save().unwrap_err();
        assert_eq!(err.user_message(MSG_UPDATE_FAILED), MSG_ENTER_DISPLAY_NAME);
        assert_eq!(editor.display_name_error(), Some(MSG_ENTER_DISPLAY_NAME));
        assert!(!editor.is_saving());
    }

    #[test]
    fn payload_excludes_api_name_and_incomplete_rows() {
        let mut editor = FunctionEditor::new();
        editor.sync(Some(&definition("fn-1")));
        editor.add_param();

        let (id, req) = editor.begin_save().unwrap();
        assert_eq!(id, "fn-1");
        assert_eq!(req.input_params_schema.as_ref().map(Vec::len), Some(2));
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("api_name").is_none());
    }

    #[test]
    fn generate_stub_respects_existing_body() {
        let mut editor = FunctionEditor::new();
        editor.sync(Some(&definition("fn-1")));
        assert!(!editor.generate_stub());

        editor.code_content.clear();
        assert!(editor.generate_stub());
        assert!(editor.code_content.starts_with("def calc(a, b):"));
    }

    #[tokio::test]
    async fn save_updates_by_id_and_closes() {
        let client = InMemoryClient::new();
        let def = definition("fn-1");
        client.insert_function(def.clone());

        let mut editor = FunctionEditor::new();
        editor.sync(Some(&def));
        editor.description = "multiplies".into();

        let result = editor.save(&client).await;
        assert_eq!(FunctionEditor::save_notice(&result), Notice::success(MSG_UPDATED));
        assert!(!editor.is_open());

        let calls = client.calls_of(Operation::UpdateFunction);
        let RecordedCall::UpdateFunction { id, req } = &calls[0] else {
            panic!("expected update call");
        };
        assert_eq!(id, "fn-1");
        assert_eq!(req.description.as_deref(), Some("multiplies"));
    }

    #[tokio::test]
    async fn failed_save_keeps_editor_open() {
        let client = InMemoryClient::new();
        client.fail(Operation::UpdateFunction, 422, Some("code_content is invalid"));
        let mut editor = FunctionEditor::new();
        editor.sync(Some(&definition("fn-1")));
        editor.display_name = "Edited".into();

        let result = editor.save(&client).await;
        assert_eq!(
            FunctionEditor::save_notice(&result),
            Notice::error("code_content is invalid")
        );
        assert!(editor.is_open());
        assert_eq!(editor.display_name, "Edited");
        assert!(!editor.is_saving());
    }
}

//! Function Creation Wizard
//!
//! Linear three-step flow: basic info → signature → implementation.
//!
//! - Forward moves are gated by validation; a failed gate leaves the step
//!   unchanged and returns the error for display.
//! - Backward moves are unconditional and keep everything entered.
//! - Cancel resets every tracked field, including a pending submission.
//! - Submission goes through `begin_submit` / `finish_submit` so the frame
//!   loop can run the request in the background; `submit` chains both for
//!   callers that can await directly.

use mdp_client::{ClientError, MdpClient};
use mdp_types::{CreateFunctionRequest, FunctionDefinition, OutputType, ParamType};

use super::dry_run::{dry_run, DryRunResult};
use super::params::{ParameterList, TestInputs};
use super::stub::stub_if_empty;
use super::{MSG_CREATED, MSG_CREATE_FAILED, MSG_ENTER_API_NAME, MSG_ENTER_DISPLAY_NAME};
use crate::error::{ConsoleError, ValidationError};
use crate::notify::Notice;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    BasicInfo,
    Signature,
    Implementation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::BasicInfo,
        WizardStep::Signature,
        WizardStep::Implementation,
    ];

    pub fn index(&self) -> usize {
        match self {
            WizardStep::BasicInfo => 0,
            WizardStep::Signature => 1,
            WizardStep::Implementation => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Info",
            WizardStep::Signature => "Signature",
            WizardStep::Implementation => "Implementation",
        }
    }

    fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::BasicInfo => Some(WizardStep::Signature),
            WizardStep::Signature => Some(WizardStep::Implementation),
            WizardStep::Implementation => None,
        }
    }

    fn prev(&self) -> Option<WizardStep> {
        match self {
            WizardStep::BasicInfo => None,
            WizardStep::Signature => Some(WizardStep::BasicInfo),
            WizardStep::Implementation => Some(WizardStep::Signature),
        }
    }
}

/// Identity fields collected on the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicInfo {
    pub api_name: String,
    pub display_name: String,
    pub description: String,
    pub bound_object_type_id: Option<String>,
}

impl BasicInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();
        if self.api_name.trim().is_empty() {
            fields.push(("api_name", MSG_ENTER_API_NAME.to_string()));
        }
        if self.display_name.trim().is_empty() {
            fields.push(("display_name", MSG_ENTER_DISPLAY_NAME.to_string()));
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(fields))
        }
    }
}

/// Function creation wizard state.
#[derive(Debug, Default)]
pub struct FunctionWizard {
    step: WizardStep,
    pub basic: BasicInfo,
    params: ParameterList,
    pub output_type: OutputType,
    pub code_content: String,
    test_inputs: TestInputs,
    test_result: Option<DryRunResult>,
    field_errors: Option<ValidationError>,
    submitting: bool,
}

impl FunctionWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
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

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Field-level error for `field` from the last failed basic-info gate.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.as_ref()?.field_message(field)
    }

    /// Return every tracked field to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Advance one step if the current step's gate passes.
    pub fn next(&mut self) -> Result<WizardStep, ValidationError> {
        match self.step {
            WizardStep::BasicInfo => {
                if let Err(e) = self.basic.validate() {
                    self.field_errors = Some(e.clone());
                    return Err(e);
                }
                self.field_errors = None;
            }
            WizardStep::Signature => {
                self.params.validate()?;
            }
            WizardStep::Implementation => return Ok(self.step),
        }

        if let Some(next) = self.step.next() {
            self.step = next;
        }
        if self.step == WizardStep::Implementation {
            self.on_enter_implementation();
        }
        Ok(self.step)
    }

    pub fn previous(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Reset everything; the caller closes the dialog afterwards.
    pub fn cancel(&mut self) {
        tracing::debug!(step = self.step.index(), "function wizard cancelled");
        self.reset();
    }

    fn on_enter_implementation(&mut self) {
        if let Some(stub) = stub_if_empty(
            &self.code_content,
            &self.basic.api_name,
            &self.params.names(),
            self.output_type,
        ) {
            self.code_content = stub;
        }
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
    // DRY RUN
    // =========================================================================

    /// Set a test input value; names not in the signature are ignored.
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
    // SUBMISSION
    // =========================================================================

    /// Assemble the creation payload from the current state. The step gates
    /// already validated it; incomplete rows added afterwards are left out.
    pub fn build_request(&self, project_id: Option<&str>) -> CreateFunctionRequest {
        let params = self.params.complete_params();
        let description = self.basic.description.trim();

        CreateFunctionRequest {
            api_name: self.basic.api_name.trim().to_string(),
            display_name: self.basic.display_name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            code_content: self.code_content.clone(),
            input_params_schema: ParameterList::to_schema(params),
            output_type: self.output_type,
            bound_object_type_id: self
                .basic
                .bound_object_type_id
                .clone()
                .filter(|id| !id.is_empty()),
            project_id: project_id.map(str::to_string),
        }
    }

    /// Start a submission. Only allowed on the last step with nothing in flight.
    pub fn begin_submit(
        &mut self,
        project_id: Option<&str>,
    ) -> Result<CreateFunctionRequest, ConsoleError> {
        if self.step != WizardStep::Implementation {
            return Err(ConsoleError::WrongStep(self.step.index()));
        }
        if self.submitting {
            return Err(ConsoleError::AlreadyPending);
        }
        let req = self.build_request(project_id);
        self.submitting = true;
        Ok(req)
    }

    /// Apply the backend's answer. Success resets the wizard; failure keeps
    /// every field so the user can correct and resubmit.
    pub fn finish_submit(
        &mut self,
        result: Result<FunctionDefinition, ClientError>,
    ) -> Result<FunctionDefinition, ConsoleError> {
        self.submitting = false;
        match result {
            Ok(def) => {
                tracing::info!(id = %def.id, api_name = %def.api_name, "function created");
                self.reset();
                Ok(def)
            }
            Err(e) => {
                tracing::warn!(error = %e, "function creation failed");
                Err(e.into())
            }
        }
    }

    pub async fn submit(
        &mut self,
        client: &dyn MdpClient,
        project_id: Option<&str>,
    ) -> Result<FunctionDefinition, ConsoleError> {
        let req = self.begin_submit(project_id)?;
        let result = client.create_function(req).await;
        self.finish_submit(result)
    }

    /// Notice for the outcome of `finish_submit` / `submit`.
    pub fn submit_notice(result: &Result<FunctionDefinition, ConsoleError>) -> Notice {
        match result {
            Ok(_) => Notice::success(MSG_CREATED),
            Err(e) => Notice::error(e.user_message(MSG_CREATE_FAILED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdp_client::{InMemoryClient, Operation, RecordedCall};
    use serde_json::json;

    fn filled_basic(wizard: &mut FunctionWizard) {
        wizard.basic.api_name = "test_function".into();
        wizard.basic.display_name = "Test Function".into();
    }

    fn wizard_at_implementation() -> FunctionWizard {
        let mut wizard = FunctionWizard::new();
        filled_basic(&mut wizard);
        let i = wizard.add_param();
        wizard.set_param_name(i, "x");
        wizard.set_param_required(i, true);
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard
    }

    // ── Step gates ────────────────────────────────────────────

    #[test]
    fn starts_at_basic_info() {
        assert_eq!(FunctionWizard::new().step(), WizardStep::BasicInfo);
    }

    #[test]
    fn empty_display_name_blocks_first_step() {
        let mut wizard = FunctionWizard::new();
        wizard.basic.api_name = "f".into();

        let err = wizard.next().unwrap_err();
        assert_eq!(wizard.step(), WizardStep::BasicInfo);
        assert_eq!(err.field_message("display_name"), Some(MSG_ENTER_DISPLAY_NAME));
        assert_eq!(wizard.field_error("display_name"), Some(MSG_ENTER_DISPLAY_NAME));
        assert!(wizard.field_error("api_name").is_none());
    }

    #[test]
    fn field_errors_clear_once_gate_passes() {
        let mut wizard = FunctionWizard::new();
        assert!(wizard.next().is_err());
        filled_basic(&mut wizard);
        assert_eq!(wizard.next(), Ok(WizardStep::Signature));
        assert!(wizard.field_error("display_name").is_none());
    }

    #[test]
    fn incomplete_parameter_blocks_signature_step() {
        let mut wizard = FunctionWizard::new();
        filled_basic(&mut wizard);
        wizard.next().unwrap();
        wizard.add_param();

        let err = wizard.next().unwrap_err();
        assert_eq!(
            err,
            ValidationError::Form("Please complete all parameter definitions".into())
        );
        assert_eq!(wizard.step(), WizardStep::Signature);

        wizard.set_param_name(0, "x");
        wizard.set_param_type(0, None);
        assert!(wizard.next().is_err());
    }

    #[test]
    fn empty_signature_advances() {
        let mut wizard = FunctionWizard::new();
        filled_basic(&mut wizard);
        wizard.next().unwrap();
        assert_eq!(wizard.next(), Ok(WizardStep::Implementation));
        // No parameters: no stub
        assert_eq!(wizard.code_content, "");
    }

    #[test]
    fn previous_keeps_later_data() {
        let mut wizard = wizard_at_implementation();
        wizard.code_content = "def f(x):\n    return x\n".into();
        assert_eq!(wizard.previous(), WizardStep::Signature);
        assert_eq!(wizard.previous(), WizardStep::BasicInfo);
        assert_eq!(wizard.previous(), WizardStep::BasicInfo);
        assert_eq!(wizard.params().len(), 1);
        assert_eq!(wizard.code_content, "def f(x):\n    return x\n");
    }

    // ── Stub generation ───────────────────────────────────────

    #[test]
    fn entering_implementation_generates_stub() {
        let wizard = wizard_at_implementation();
        assert!(wizard.code_content.starts_with("def test_function(x):"));
    }

    #[test]
    fn stub_never_overwrites_user_code() {
        let mut wizard = wizard_at_implementation();
        wizard.code_content = "return 1".into();
        wizard.previous();
        wizard.add_param();
        wizard.set_param_name(1, "y");
        wizard.next().unwrap();
        assert_eq!(wizard.code_content, "return 1");
    }

    // ── Cancel ────────────────────────────────────────────────

    #[test]
    fn cancel_from_any_step_resets_everything() {
        for steps_forward in 0..3 {
            let mut wizard = FunctionWizard::new();
            filled_basic(&mut wizard);
            wizard.basic.description = "desc".into();
            wizard.basic.bound_object_type_id = Some("ot-1".into());
            wizard.output_type = OutputType::Boolean;
            let i = wizard.add_param();
            wizard.set_param_name(i, "x");
            for _ in 0..steps_forward {
                wizard.next().unwrap();
            }
            wizard.run_dry_run();

            wizard.cancel();

            assert_eq!(wizard.step(), WizardStep::BasicInfo);
            assert_eq!(wizard.basic, BasicInfo::default());
            assert!(wizard.params().is_empty());
            assert_eq!(wizard.output_type, OutputType::String);
            assert_eq!(wizard.code_content, "");
            assert!(wizard.test_inputs().is_empty());
            assert!(wizard.test_result().is_none());
            assert!(!wizard.is_submitting());
        }
    }

    // ── Dry run ───────────────────────────────────────────────

    #[test]
    fn dry_run_echoes_current_inputs() {
        let mut wizard = wizard_at_implementation();
        wizard.set_test_input("x", json!("hello"));
        wizard.set_test_input("unknown", json!(1));
        let inputs = wizard.test_inputs().clone();
        let result = wizard.run_dry_run().clone();
        assert_eq!(result.inputs, inputs);
        assert_eq!(serde_json::Value::Object(result.inputs), json!({"x": "hello"}));
    }

    // ── Submission ────────────────────────────────────────────

    #[test]
    fn submit_only_from_last_step() {
        let mut wizard = FunctionWizard::new();
        filled_basic(&mut wizard);
        assert!(matches!(
            wizard.begin_submit(None),
            Err(ConsoleError::WrongStep(0))
        ));
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut wizard = wizard_at_implementation();
        assert!(wizard.begin_submit(None).is_ok());
        assert!(matches!(
            wizard.begin_submit(None),
            Err(ConsoleError::AlreadyPending)
        ));
        assert!(wizard.is_submitting());
    }

    #[test]
    fn request_uses_nulls_for_unset_fields() {
        let mut wizard = FunctionWizard::new();
        filled_basic(&mut wizard);
        wizard.basic.bound_object_type_id = Some(String::new());
        wizard.next().unwrap();
        wizard.next().unwrap();

        let req = wizard.build_request(None);
        assert_eq!(req.input_params_schema, None);
        assert_eq!(req.bound_object_type_id, None);
        assert_eq!(req.project_id, None);
        assert_eq!(req.description, None);
    }

    #[test]
    fn submit_does_not_revalidate_on_last_step() {
        let mut wizard = wizard_at_implementation();
        wizard.basic.display_name = "  ".into();
        let extra = wizard.add_param();
        wizard.set_param_name(extra, "");

        let req = wizard.begin_submit(None).unwrap();
        assert_eq!(req.display_name, "");
        let params = req.input_params_schema.unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "x");
    }

    #[tokio::test]
    async fn scenario_untouched_code_sends_stub() {
        let client = InMemoryClient::new();
        let mut wizard = wizard_at_implementation();

        let created = wizard.submit(&client, Some("proj-1")).await.unwrap();
        assert_eq!(created.api_name, "test_function");

        let calls = client.calls_of(Operation::CreateFunction);
        assert_eq!(calls.len(), 1);
        let RecordedCall::CreateFunction(req) = &calls[0] else {
            panic!("expected create call");
        };
        assert_eq!(req.display_name, "Test Function");
        assert_eq!(req.project_id.as_deref(), Some("proj-1"));
        assert_eq!(req.output_type, OutputType::String);
        let params = req.input_params_schema.as_ref().unwrap();
        assert_eq!(params[0].name, "x");
        assert!(params[0].required);
        assert!(req.code_content.contains("def test_function(x):"));

        // success resets
        assert_eq!(wizard.step(), WizardStep::BasicInfo);
        assert_eq!(wizard.basic, BasicInfo::default());
    }

    #[tokio::test]
    async fn failed_submit_keeps_state_and_surfaces_detail() {
        let client = InMemoryClient::new();
        client.fail(Operation::CreateFunction, 409, Some("api_name already exists"));
        let mut wizard = wizard_at_implementation();
        let code_before = wizard.code_content.clone();

        let result = wizard.submit(&client, None).await;
        let notice = FunctionWizard::submit_notice(&result);

        assert!(result.is_err());
        assert_eq!(notice, Notice::error("api_name already exists"));
        assert_eq!(wizard.step(), WizardStep::Implementation);
        assert_eq!(wizard.basic.display_name, "Test Function");
        assert_eq!(wizard.code_content, code_before);
        assert!(!wizard.is_submitting());
    }

    #[tokio::test]
    async fn failure_without_detail_uses_fallback() {
        let client = InMemoryClient::new();
        client.fail(Operation::CreateFunction, 500, None);
        let mut wizard = wizard_at_implementation();

        let result = wizard.submit(&client, None).await;
        assert_eq!(
            FunctionWizard::submit_notice(&result),
            Notice::error(MSG_CREATE_FAILED)
        );
    }
}

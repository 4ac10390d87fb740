//! Editable parameter rows
//!
//! Rows may be incomplete while the user edits them (blank name, no type
//! selected). They only become wire [`Parameter`]s once complete. Name
//! uniqueness is not enforced here; duplicates are reported, not rejected.

use std::collections::BTreeSet;

use mdp_types::{ParamType, Parameter};
use serde_json::Value;

use super::MSG_INCOMPLETE_PARAMS;
use crate::error::ValidationError;

/// Parameter name -> value used for the dry run.
pub type TestInputs = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDraft {
    pub name: String,
    pub param_type: Option<ParamType>,
    pub required: bool,
}

impl Default for ParameterDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            param_type: Some(ParamType::String),
            required: false,
        }
    }
}

impl ParameterDraft {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.param_type.is_some()
    }

    fn to_parameter(&self) -> Option<Parameter> {
        let param_type = self.param_type?;
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Parameter {
            name: name.to_string(),
            param_type,
            required: self.required,
        })
    }
}

impl From<&Parameter> for ParameterDraft {
    fn from(p: &Parameter) -> Self {
        Self {
            name: p.name.clone(),
            param_type: Some(p.param_type),
            required: p.required,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList {
    rows: Vec<ParameterDraft>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: &[Parameter]) -> Self {
        Self {
            rows: params.iter().map(ParameterDraft::from).collect(),
        }
    }

    pub fn rows(&self) -> &[ParameterDraft] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a blank row and return its index.
    pub fn add(&mut self) -> usize {
        self.rows.push(ParameterDraft::default());
        self.rows.len() - 1
    }

    pub fn push(&mut self, draft: ParameterDraft) {
        self.rows.push(draft);
    }

    pub fn remove(&mut self, index: usize) -> Option<ParameterDraft> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ParameterDraft> {
        self.rows.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Every row must have a name and a type. An empty list is valid.
    pub fn validate(&self) -> Result<Vec<Parameter>, ValidationError> {
        self.rows
            .iter()
            .map(|row| {
                row.to_parameter()
                    .ok_or_else(|| ValidationError::Form(MSG_INCOMPLETE_PARAMS.to_string()))
            })
            .collect()
    }

    /// Complete rows only; incomplete rows are left out.
    pub fn complete_params(&self) -> Vec<Parameter> {
        self.rows.iter().filter_map(ParameterDraft::to_parameter).collect()
    }

    /// Wire form: `None` for an empty signature.
    pub fn to_schema(params: Vec<Parameter>) -> Option<Vec<Parameter>> {
        if params.is_empty() {
            None
        } else {
            Some(params)
        }
    }

    /// Trimmed non-blank names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Names declared more than once.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut dups = BTreeSet::new();
        for name in self.names() {
            if !seen.insert(name.clone()) {
                dups.insert(name);
            }
        }
        dups.into_iter().collect()
    }

    /// Default-typed test inputs for the current rows.
    ///
    /// A value from `previous` is kept when its parameter still exists and
    /// the value has the same JSON kind as the new default.
    pub fn test_inputs(&self, previous: &TestInputs) -> TestInputs {
        let mut inputs = TestInputs::new();
        for row in &self.rows {
            let name = row.name.trim();
            if name.is_empty() {
                continue;
            }
            let default = row
                .param_type
                .map(|t| t.default_value())
                .unwrap_or_else(|| Value::String(String::new()));
            let value = match previous.get(name) {
                Some(prev) if same_kind(prev, &default) => prev.clone(),
                _ => default,
            };
            inputs.insert(name.to_string(), value);
        }
        inputs
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

//! Function definition API types
//!
//! `GET/POST /meta/functions`, `PUT/DELETE /meta/functions/{id}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PARAMETER & OUTPUT TYPES
// ============================================================================

/// Declared type of a function input parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Array,
    Object,
}

impl ParamType {
    pub const ALL: [ParamType; 7] = [
        ParamType::String,
        ParamType::Integer,
        ParamType::Number,
        ParamType::Boolean,
        ParamType::Date,
        ParamType::Array,
        ParamType::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Date => "date",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Zero value used to seed test inputs for a parameter of this type.
    pub fn default_value(&self) -> serde_json::Value {
        match self {
            ParamType::String | ParamType::Date => serde_json::Value::String(String::new()),
            ParamType::Integer | ParamType::Number => serde_json::Value::from(0),
            ParamType::Boolean => serde_json::Value::Bool(false),
            ParamType::Array => serde_json::Value::Array(Vec::new()),
            ParamType::Object => serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown parameter type '{}'", s))
    }
}

/// Declared return type of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Array,
    Object,
    Void,
}

impl OutputType {
    pub const ALL: [OutputType; 8] = [
        OutputType::String,
        OutputType::Integer,
        OutputType::Number,
        OutputType::Boolean,
        OutputType::Date,
        OutputType::Array,
        OutputType::Object,
        OutputType::Void,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::String => "STRING",
            OutputType::Integer => "INTEGER",
            OutputType::Number => "NUMBER",
            OutputType::Boolean => "BOOLEAN",
            OutputType::Date => "DATE",
            OutputType::Array => "ARRAY",
            OutputType::Object => "OBJECT",
            OutputType::Void => "VOID",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output type '{}'", s))
    }
}

/// One entry of a function's input signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
}

// ============================================================================
// FUNCTION DEFINITION
// ============================================================================

/// Function definition as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub id: String,
    pub api_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code_content: Option<String>,
    #[serde(default)]
    pub bound_object_type_id: Option<String>,
    #[serde(default)]
    pub input_params_schema: Option<Vec<Parameter>>,
    #[serde(default)]
    pub output_type: OutputType,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FunctionDefinition {
    pub fn params(&self) -> &[Parameter] {
        self.input_params_schema.as_deref().unwrap_or(&[])
    }
}

/// `POST /meta/functions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFunctionRequest {
    pub api_name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub code_content: String,
    /// `null` when the function takes no arguments
    pub input_params_schema: Option<Vec<Parameter>>,
    pub output_type: OutputType,
    pub bound_object_type_id: Option<String>,
    pub project_id: Option<String>,
}

/// `PUT /meta/functions/{id}` - creation shape minus the immutable `api_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFunctionRequest {
    pub display_name: String,
    pub description: Option<String>,
    pub code_content: String,
    pub input_params_schema: Option<Vec<Parameter>>,
    pub output_type: OutputType,
    pub bound_object_type_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_uses_type_key() {
        let p = Parameter {
            name: "x".into(),
            param_type: ParamType::String,
            required: true,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "x", "type": "string", "required": true})
        );
    }

    #[test]
    fn output_type_is_uppercase_on_wire() {
        assert_eq!(
            serde_json::to_value(OutputType::Void).unwrap(),
            serde_json::json!("VOID")
        );
        let parsed: OutputType = serde_json::from_str("\"BOOLEAN\"").unwrap();
        assert_eq!(parsed, OutputType::Boolean);
    }

    #[test]
    fn create_request_sends_nulls() {
        let req = CreateFunctionRequest {
            api_name: "f".into(),
            display_name: "F".into(),
            description: None,
            code_content: String::new(),
            input_params_schema: None,
            output_type: OutputType::String,
            bound_object_type_id: None,
            project_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["input_params_schema"].is_null());
        assert!(json["bound_object_type_id"].is_null());
        assert!(json["project_id"].is_null());
    }

    #[test]
    fn definition_tolerates_sparse_server_payload() {
        let def: FunctionDefinition = serde_json::from_str(
            r#"{"id": "fn-1", "api_name": "calc", "display_name": "Calc"}"#,
        )
        .unwrap();
        assert_eq!(def.output_type, OutputType::String);
        assert!(def.params().is_empty());
    }

    #[test]
    fn param_type_parses_case_insensitively() {
        assert_eq!("Boolean".parse::<ParamType>(), Ok(ParamType::Boolean));
        assert!("float".parse::<ParamType>().is_err());
        assert_eq!("void".parse::<OutputType>(), Ok(OutputType::Void));
    }
}

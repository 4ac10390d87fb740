//! Implementation stub generation

use mdp_types::OutputType;

/// Signature skeleton for a function with a placeholder body.
pub fn generate_stub(api_name: &str, param_names: &[String], output_type: OutputType) -> String {
    let name = match api_name.trim() {
        "" => "function",
        name => name,
    };
    format!(
        "def {}({}):\n    \"\"\"Returns {}.\"\"\"\n    # Implement function logic here\n    return {}\n",
        name,
        param_names.join(", "),
        output_type,
        placeholder(output_type)
    )
}

/// A stub only when `code` is blank and the signature has parameters;
/// otherwise `None`, leaving the existing body untouched.
pub fn stub_if_empty(
    code: &str,
    api_name: &str,
    param_names: &[String],
    output_type: OutputType,
) -> Option<String> {
    if !code.trim().is_empty() || param_names.is_empty() {
        return None;
    }
    Some(generate_stub(api_name, param_names, output_type))
}

fn placeholder(output_type: OutputType) -> &'static str {
    match output_type {
        OutputType::String | OutputType::Date => "\"\"",
        OutputType::Integer | OutputType::Number => "0",
        OutputType::Boolean => "False",
        OutputType::Array => "[]",
        OutputType::Object => "{}",
        OutputType::Void => "None",
    }
}

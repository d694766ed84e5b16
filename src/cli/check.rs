//! Parse and evaluate an expression against JSON bindings

use super::CliError;
use crate::{evaluate, parse_expression, parse_template, Scope};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Expression source, or template body when `template` is set
    pub expression: String,
    /// JSON object whose entries become variables
    pub input: Option<String>,
    /// Parse `expression` as a template string
    pub template: bool,
    /// Print the AST instead of evaluating
    pub ast: bool,
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Serialized AST
    Ast(serde_json::Value),
    /// Expression evaluated successfully, converted to JSON
    Success(serde_json::Value),
}

fn parse_bindings(input: Option<&str>) -> Result<Scope, CliError> {
    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Scope::new());
    };

    match serde_json::from_str::<serde_json::Value>(input)? {
        serde_json::Value::Object(map) => Ok(Scope::from_json(map)),
        serde_json::Value::Null => Err(CliError::InputNotObject("null")),
        serde_json::Value::Bool(_) => Err(CliError::InputNotObject("a boolean")),
        serde_json::Value::Number(_) => Err(CliError::InputNotObject("a number")),
        serde_json::Value::String(_) => Err(CliError::InputNotObject("a string")),
        serde_json::Value::Array(_) => Err(CliError::InputNotObject("an array")),
    }
}

/// Execute a brace check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let ast = if options.template {
        parse_template(&options.expression)?
    } else {
        parse_expression(&options.expression)?
    };

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }
    if options.ast {
        return Ok(CheckResult::Ast(serde_json::to_value(&ast)?));
    }

    let mut scope = parse_bindings(options.input.as_deref())?;
    let result = evaluate(&ast, &mut scope)?;
    Ok(CheckResult::Success(result.to_json()))
}

//! The variable namespace an evaluation runs against.
//!
//! Hosts either use [`Scope`] directly or implement [`Environment`] on their
//! own state (a UI store, a form model) so that identifiers and assignments
//! read and write it.

use std::collections::HashMap;

use crate::{evaluator::EvalError, value::Value};

/// Capabilities the evaluator needs from its host.
pub trait Environment {
    /// Value bound to `name`, or `Value::Null` when unbound.
    fn get(&self, name: &str) -> Value;

    /// Creates or overwrites the binding for `name` and returns the value
    /// that was stored.
    fn set(&mut self, name: &str, value: Value) -> Value;

    /// Interprets a nested component description. The engine has no notion
    /// of components, so the default refuses.
    fn evaluate_components(
        &mut self,
        _components: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Value, EvalError> {
        Err(EvalError::ComponentsUnsupported)
    }
}

/// Flat variable store; one `Scope` is the whole namespace of an
/// evaluation session.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a scope from the entries of a JSON object.
    pub fn from_json(bindings: serde_json::Map<String, serde_json::Value>) -> Self {
        Scope {
            vars: bindings
                .into_iter()
                .map(|(name, value)| (name, Value::from(value)))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Environment for Scope {
    fn get(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or(Value::Null)
    }

    fn set(&mut self, name: &str, value: Value) -> Value {
        self.vars.insert(name.to_string(), value.clone());
        value
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Scope {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

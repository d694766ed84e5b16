use std::cmp::Ordering;

use thiserror::Error;

use crate::{
    ast::{BinOp, Node, Property, UnaryOp},
    environment::Environment,
    value::{RegExp, Value},
};

/// Errors that can occur during evaluation.
///
/// Unbound identifiers and member access on `null` are not errors; both
/// evaluate to `null`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The callee of a call expression did not evaluate to a function
    #[error("Wrong call expression, callee has to be a function: `{callee}`")]
    NotCallable { callee: String },

    /// A regular expression failed to compile
    #[error("Invalid regular expression /{pattern}/: {message}")]
    InvalidRegex { pattern: String, message: String },

    /// Assignment to something other than an identifier. The parser never
    /// produces this; it can only come from a hand-built tree.
    #[error("You can only assign to an identifier, not `{target}`")]
    InvalidAssignmentTarget { target: String },

    /// The environment does not know how to evaluate component nodes
    #[error("Environment does not support evaluating components")]
    ComponentsUnsupported,

    /// Failure reported by a host function
    #[error("{0}")]
    Host(String),
}

impl EvalError {
    pub fn host(message: impl Into<String>) -> Self {
        EvalError::Host(message.into())
    }
}

/// Tree-walking evaluator over a borrowed environment.
///
/// The evaluator only reads the tree. The environment is the sole piece of
/// state it changes, through assignments and whatever the host functions
/// it calls do.
pub struct Evaluator<'env, E: Environment + ?Sized> {
    env: &'env mut E,
}

impl<'env, E: Environment + ?Sized> Evaluator<'env, E> {
    pub fn new(env: &'env mut E) -> Self {
        Evaluator { env }
    }

    pub fn eval(&mut self, node: &Node) -> Result<Value, EvalError> {
        tracing::trace!(kind = node.kind(), "evaluating");

        match node {
            Node::Numeric { value } => Ok(Value::Number(*value)),
            Node::String { value } => Ok(Value::String(value.clone())),
            Node::Boolean { value } => Ok(Value::Boolean(*value)),
            Node::Null => Ok(Value::Null),
            Node::Raw { value } => Ok(Value::from(value.clone())),
            Node::RegExp { pattern, flags } => Ok(Value::RegExp(compile_regexp(pattern, flags)?)),
            Node::Identifier { name } => Ok(self.env.get(name)),
            Node::UnaryExpression { operator, argument } => {
                let value = self.eval(argument)?;
                Ok(apply_unary(*operator, &value))
            }
            Node::BinaryExpression {
                operator,
                left,
                right,
            } => self.eval_binary(*operator, left, right),
            Node::AssignExpression { left, right } => {
                let Node::Identifier { name } = left.as_ref() else {
                    return Err(EvalError::InvalidAssignmentTarget {
                        target: left.to_string(),
                    });
                };
                let value = self.eval(right)?;
                Ok(self.env.set(name, value))
            }
            Node::CallExpression { callee, arguments } => self.eval_call(callee, arguments),
            Node::MemberExpression { object, property } => {
                let object = self.eval(object)?;
                let property = self.eval(property)?;
                if object.is_null() {
                    return Ok(Value::Null);
                }
                Ok(object.get_member(&property))
            }
            Node::ObjectExpression { properties } => self.eval_object(properties),
            Node::ArrayExpression { elements } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element)?);
                }
                Ok(Value::Array(items))
            }
            Node::TemplateLiteral {
                quasis,
                expressions,
            } => {
                let mut result = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    result.push_str(&quasi.value);
                    if let Some(expr) = expressions.get(i) {
                        result.push_str(&self.eval(expr)?.to_template_string());
                    }
                }
                Ok(Value::String(result))
            }
            Node::Program { body } | Node::BlockStatement { body } => self.eval_body(body),
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                let branch = if self.eval(test)?.is_truthy() {
                    consequent
                } else {
                    alternate
                };
                match branch {
                    Some(branch) => self.eval(branch),
                    None => Ok(Value::Null),
                }
            }
            Node::Components(components) => self.env.evaluate_components(components),
        }
    }

    /// `and`/`or` evaluate their right operand only when the left one does
    /// not decide the result, and yield the deciding operand itself.
    fn eval_binary(&mut self, op: BinOp, left: &Node, right: &Node) -> Result<Value, EvalError> {
        match op {
            BinOp::And => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            }
            BinOp::Or => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            _ => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                apply_binop(op, &left, &right)
            }
        }
    }

    fn eval_call(&mut self, callee: &Node, arguments: &[Node]) -> Result<Value, EvalError> {
        let Value::Function(function) = self.eval(callee)? else {
            return Err(EvalError::NotCallable {
                callee: callee.to_string(),
            });
        };

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval(argument)?);
        }

        function.call(&args)
    }

    /// Keys are evaluated like any other expression and then converted to
    /// strings, so an identifier key uses the value bound to it.
    fn eval_object(&mut self, properties: &[Property]) -> Result<Value, EvalError> {
        let mut map = std::collections::HashMap::with_capacity(properties.len());
        for Property { key, value } in properties {
            let key = self.eval(key)?.to_display_string();
            let value = self.eval(value)?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    /// Runs statements in order; the last one's value is the result.
    fn eval_body(&mut self, body: &[Node]) -> Result<Value, EvalError> {
        let mut result = Value::Null;
        for statement in body {
            result = self.eval(statement)?;
        }
        Ok(result)
    }
}

/// Evaluates `node` against `env`.
///
/// # Examples
///
/// ```
/// use brace_lang::{evaluate, parse_expression, Environment, Scope, Value};
///
/// let mut scope = Scope::new();
/// let ast = parse_expression("a = 1 + 2 * 3").unwrap();
///
/// assert_eq!(evaluate(&ast, &mut scope).unwrap(), Value::Number(7.0));
/// assert_eq!(scope.get("a"), Value::Number(7.0));
/// ```
#[tracing::instrument(level = "debug", skip_all, fields(kind = node.kind()))]
pub fn evaluate<E: Environment + ?Sized>(node: &Node, env: &mut E) -> Result<Value, EvalError> {
    Evaluator::new(env).eval(node)
}

fn compile_regexp(pattern: &str, flags: &str) -> Result<RegExp, EvalError> {
    RegExp::new(pattern, flags).map_err(|err| EvalError::InvalidRegex {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

fn apply_unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Boolean(!value.is_truthy()),
        UnaryOp::Plus => Value::Number(value.to_number()),
        UnaryOp::Minus => Value::Number(-value.to_number()),
    }
}

/// Strings compare lexically with each other; everything else compares as
/// numbers, where `NaN` is unordered.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

/// Tests `subject` against `pattern`. A pattern that is not already a
/// regexp is compiled from its string form; a `null` subject is tested as
/// the empty string.
fn test_regexp(subject: &Value, pattern: &Value) -> Result<bool, EvalError> {
    let compiled;
    let regexp = match pattern {
        Value::RegExp(re) => re,
        other => {
            compiled = compile_regexp(&other.to_display_string(), "")?;
            &compiled
        }
    };

    let subject = match subject {
        Value::Null => String::new(),
        other => other.to_display_string(),
    };
    Ok(regexp.test(&subject))
}

/// Combines two already evaluated operands.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let value = match op {
        BinOp::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => Value::String(format!(
                "{}{}",
                left.to_display_string(),
                right.to_display_string()
            )),
            _ => Value::Number(left.to_number() + right.to_number()),
        },
        BinOp::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinOp::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinOp::Divide => Value::Number(left.to_number() / right.to_number()),
        BinOp::Remainder => Value::Number(left.to_number() % right.to_number()),

        BinOp::LessThan => Value::Boolean(compare(left, right) == Some(Ordering::Less)),
        BinOp::LessEqual => Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::GreaterThan => Value::Boolean(compare(left, right) == Some(Ordering::Greater)),
        BinOp::GreaterEqual => Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinOp::Equal => Value::Boolean(left == right),
        BinOp::NotEqual => Value::Boolean(left != right),
        BinOp::Match => Value::Boolean(test_regexp(left, right)?),

        // Both operands are already evaluated here, so there is nothing
        // left to short-circuit.
        BinOp::And => {
            if left.is_truthy() {
                right.clone()
            } else {
                left.clone()
            }
        }
        BinOp::Or => {
            if left.is_truthy() {
                left.clone()
            } else {
                right.clone()
            }
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_concatenates_strings() {
        let result = apply_binop(BinOp::Add, &Value::from("a"), &Value::Number(1.0)).unwrap();
        assert_eq!(result, Value::from("a1"));
        let result = apply_binop(BinOp::Add, &Value::Boolean(true), &Value::Number(1.0)).unwrap();
        assert_eq!(result, Value::Number(2.0));
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let result = apply_binop(BinOp::Divide, &Value::Number(1.0), &Value::Number(0.0)).unwrap();
        assert_eq!(result, Value::Number(f64::INFINITY));
        let Value::Number(n) =
            apply_binop(BinOp::Remainder, &Value::Number(1.0), &Value::Number(0.0)).unwrap()
        else {
            panic!("expected number");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn test_comparisons() {
        let lt = |a: Value, b: Value| apply_binop(BinOp::LessThan, &a, &b).unwrap();
        assert_eq!(lt(Value::from("a"), Value::from("b")), Value::Boolean(true));
        assert_eq!(lt(Value::from("10"), Value::Number(9.0)), Value::Boolean(false));
        assert_eq!(lt(Value::Number(f64::NAN), Value::Number(1.0)), Value::Boolean(false));
    }

    #[test]
    fn test_match_with_string_pattern() {
        let result = apply_binop(BinOp::Match, &Value::from("abc"), &Value::from("^a")).unwrap();
        assert_eq!(result, Value::Boolean(true));
        let err = apply_binop(BinOp::Match, &Value::from("abc"), &Value::from("(")).unwrap_err();
        assert!(matches!(err, EvalError::InvalidRegex { .. }));
    }
}

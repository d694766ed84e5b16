// tests/integration_tests.rs

use brace_lang::ast::Node;
use brace_lang::{evaluate, parse_expression, parse_template, Environment, EvalError, Scope, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

fn eval_with(input: &str, scope: &mut Scope) -> Result<Value, EvalError> {
    let ast = parse_expression(input).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e));
    evaluate(&ast, scope)
}

fn eval(input: &str) -> Value {
    eval_with(input, &mut Scope::new()).unwrap()
}

fn scope_from(json: serde_json::Value) -> Scope {
    match json {
        serde_json::Value::Object(map) => Scope::from_json(map),
        other => panic!("bindings must be an object, got {}", other),
    }
}

fn json_object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_basic_arithmetic() {
    assert_eq!(eval("2 + 3"), Value::Number(5.0));
    assert_eq!(eval("10 - 4"), Value::Number(6.0));
    assert_eq!(eval("6 * 7"), Value::Number(42.0));
    assert_eq!(eval("7 / 2"), Value::Number(3.5));
    assert_eq!(eval("10 % 3"), Value::Number(1.0));
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval("-5"), Value::Number(-5.0));
    assert_eq!(eval("+'12'"), Value::Number(12.0));
    assert_eq!(eval("- -3"), Value::Number(3.0));
    assert_eq!(eval("not 0"), Value::Boolean(true));
    assert_eq!(eval("not 'x'"), Value::Boolean(false));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("1 / 0"), Value::Number(f64::INFINITY));
    assert_eq!(eval("-1 / 0"), Value::Number(f64::NEG_INFINITY));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'a' + 'b'"), Value::from("ab"));
    assert_eq!(eval("'n' + 1"), Value::from("n1"));
    assert_eq!(eval("1 + 2 + 'x'"), Value::from("3x"));
    assert_eq!(eval("'x' + null"), Value::from("xnull"));
}

#[test]
fn test_numeric_coercion() {
    assert_eq!(eval("true + 1"), Value::Number(2.0));
    assert_eq!(eval("null + 1"), Value::Number(1.0));
    assert_eq!(eval("'3' * '4'"), Value::Number(12.0));
}

// ============================================================================
// Comparison and Equality
// ============================================================================

#[test]
fn test_numeric_comparisons() {
    assert_eq!(eval("3 > 2"), Value::Boolean(true));
    assert_eq!(eval("3 >= 3"), Value::Boolean(true));
    assert_eq!(eval("2 < 1"), Value::Boolean(false));
    assert_eq!(eval("2 <= 2"), Value::Boolean(true));
}

#[test]
fn test_string_comparisons_are_lexical() {
    assert_eq!(eval("'apple' < 'banana'"), Value::Boolean(true));
    assert_eq!(eval("'10' < '9'"), Value::Boolean(true));
    assert_eq!(eval("'10' < 9"), Value::Boolean(false));
}

#[test]
fn test_strict_equality() {
    assert_eq!(eval("1 is 1"), Value::Boolean(true));
    assert_eq!(eval("'1' is 1"), Value::Boolean(false));
    assert_eq!(eval("null is null"), Value::Boolean(true));
    assert_eq!(eval("[1, 'a'] is [1, 'a']"), Value::Boolean(true));
    assert_eq!(eval(r#"{"a": 1} isnt {"a": 2}"#), Value::Boolean(true));
}

#[test]
fn test_function_equality_is_identity() {
    let f = Value::function(|_| Ok(Value::Null));
    let mut scope: Scope = [("f", f.clone()), ("g", f), ("h", Value::function(|_| Ok(Value::Null)))]
        .into_iter()
        .collect();
    assert_eq!(eval_with("f is g", &mut scope), Ok(Value::Boolean(true)));
    assert_eq!(eval_with("f is h", &mut scope), Ok(Value::Boolean(false)));
}

// ============================================================================
// Logical Operators
// ============================================================================

#[test]
fn test_logical_operators_yield_operands() {
    assert_eq!(eval("0 or 'x'"), Value::from("x"));
    assert_eq!(eval("'a' and 'b'"), Value::from("b"));
    assert_eq!(eval("'' and 'b'"), Value::from(""));
    assert_eq!(eval("null or null"), Value::Null);
}

// ============================================================================
// Regular Expressions
// ============================================================================

#[test]
fn test_match_with_string_pattern() {
    assert_eq!(eval("'abc' match 'b'"), Value::Boolean(true));
    assert_eq!(eval("'abc' match '^b'"), Value::Boolean(false));
}

#[test]
fn test_match_number_subject() {
    assert_eq!(eval("12345 match /^\\d+$/"), Value::Boolean(true));
}

#[test]
fn test_regexp_multiline_flag() {
    let mut scope: Scope = [("text", Value::from("one\ntwo"))].into_iter().collect();
    assert_eq!(eval_with("text match /^two$/", &mut scope), Ok(Value::Boolean(false)));
    assert_eq!(eval_with("text match /^two$/m", &mut scope), Ok(Value::Boolean(true)));
}

#[test]
fn test_regexp_value() {
    let Value::RegExp(re) = eval("/a+/g") else {
        panic!("expected a regexp");
    };
    assert_eq!(re.pattern, "a+");
    assert_eq!(re.flags, "g");
    assert!(re.test("caat"));
}

#[test]
fn test_invalid_regexp_fails_at_evaluation() {
    let ast = parse_expression("'a' match /(/").unwrap();
    let err = evaluate(&ast, &mut Scope::new()).unwrap_err();
    assert!(matches!(err, EvalError::InvalidRegex { ref pattern, .. } if pattern == "("));
}

// ============================================================================
// Variables and Member Access
// ============================================================================

#[test]
fn test_variables_from_json() {
    let mut scope = scope_from(serde_json::json!({
        "price": 10,
        "quantity": 3,
        "user": {"name": "Alice", "tags": ["admin", "dev"]},
    }));
    assert_eq!(eval_with("price * quantity", &mut scope), Ok(Value::Number(30.0)));
    assert_eq!(eval_with("user['name']", &mut scope), Ok(Value::from("Alice")));
    assert_eq!(eval_with("user['tags'][1]", &mut scope), Ok(Value::from("dev")));
    assert_eq!(eval_with("user['tags']['length']", &mut scope), Ok(Value::Number(2.0)));
}

#[test]
fn test_unbound_identifier_is_null() {
    assert_eq!(eval("missing"), Value::Null);
}

#[test]
fn test_member_access_on_missing_values() {
    assert_eq!(eval("missing['a']['b']"), Value::Null);
    assert_eq!(eval("[1, 2][5]"), Value::Null);
    assert_eq!(eval("{a: 1}['b']"), Value::Null);
    assert_eq!(eval("true['x']"), Value::Null);
}

#[test]
fn test_string_indexing() {
    assert_eq!(eval("'hey'[1]"), Value::from("e"));
    assert_eq!(eval("'hey'['length']"), Value::Number(3.0));
}

#[test]
fn test_computed_member_key() {
    let mut scope = scope_from(serde_json::json!({
        "field": "name",
        "user": {"name": "Bob"},
    }));
    assert_eq!(eval_with("user[field]", &mut scope), Ok(Value::from("Bob")));
}

// ============================================================================
// Object and Array Literals
// ============================================================================

#[test]
fn test_array_literal() {
    assert_eq!(
        eval("[1, 'two', [3]]"),
        Value::Array(vec![
            Value::Number(1.0),
            Value::from("two"),
            Value::Array(vec![Value::Number(3.0)]),
        ])
    );
}

#[test]
fn test_object_literal_with_literal_keys() {
    assert_eq!(
        eval(r#"{"a": 1, 2: "x"}"#),
        json_object(vec![("a", Value::Number(1.0)), ("2", Value::from("x"))])
    );
}

#[test]
fn test_object_literal_identifier_keys_are_evaluated() {
    let mut scope: Scope = [("c", Value::from("d"))].into_iter().collect();
    assert_eq!(
        eval_with("{c: 1 + 2}", &mut scope),
        Ok(json_object(vec![("d", Value::Number(3.0))]))
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_call_host_function() {
    let add = Value::function(|args| {
        Ok(Value::Number(args.iter().map(Value::to_number).sum()))
    });
    let mut scope: Scope = [("add", add)].into_iter().collect();
    assert_eq!(eval_with("add(1, 2, 3)", &mut scope), Ok(Value::Number(6.0)));
}

#[test]
fn test_arguments_evaluated_left_to_right() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let record = {
        let log = Rc::clone(&log);
        Value::function(move |args| {
            log.borrow_mut().push(args[0].clone());
            Ok(args[0].clone())
        })
    };
    let list = Value::function(|args| Ok(Value::Array(args.to_vec())));
    let mut scope: Scope = [("r", record), ("list", list)].into_iter().collect();

    let result = eval_with("list(r(1), r(2), r(3))", &mut scope).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]
    );
    assert_eq!(
        result,
        Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
    );
}

#[test]
fn test_curried_call() {
    let adder = Value::function(|args| {
        let n = args.first().map(Value::to_number).unwrap_or(0.0);
        Ok(Value::function(move |inner| {
            Ok(Value::Number(n + inner.first().map(Value::to_number).unwrap_or(0.0)))
        }))
    });
    let mut scope: Scope = [("adder", adder)].into_iter().collect();
    assert_eq!(eval_with("adder(1)(2)", &mut scope), Ok(Value::Number(3.0)));
}

#[test]
fn test_calling_non_function() {
    let mut scope: Scope = [("x", Value::Number(1.0))].into_iter().collect();
    let err = eval_with("x(1)", &mut scope).unwrap_err();
    assert_eq!(
        err,
        EvalError::NotCallable {
            callee: "x".into()
        }
    );
    assert_eq!(
        err.to_string(),
        "Wrong call expression, callee has to be a function: `x`"
    );
}

#[test]
fn test_calling_unbound_member() {
    let err = eval_with("obj['run']()", &mut Scope::new()).unwrap_err();
    assert_eq!(
        err,
        EvalError::NotCallable {
            callee: "obj[\"run\"]".into()
        }
    );
}

#[test]
fn test_host_error_propagates() {
    let fail = Value::function(|_| Err(EvalError::host("boom")));
    let mut scope: Scope = [("fail", fail)].into_iter().collect();
    assert_eq!(
        eval_with("1 + fail()", &mut scope),
        Err(EvalError::Host("boom".into()))
    );
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_evaluation() {
    let mut scope: Scope = [("name", Value::from("Ada"))].into_iter().collect();
    let ast = parse_template("Hi {name}, {1 + 2} new").unwrap();
    assert_eq!(evaluate(&ast, &mut scope), Ok(Value::from("Hi Ada, 3 new")));
}

#[test]
fn test_template_coercion_of_non_text_values() {
    assert_eq!(eval("`[{true}][{null}][{[1]}][{1.5}][{1 / 0}]`"), Value::from("[][][][1.5][]"));
}

#[test]
fn test_template_with_statements() {
    let mut scope = Scope::new();
    assert_eq!(
        eval_with("`{a = 2; a * a}`", &mut scope),
        Ok(Value::from("4"))
    );
    assert_eq!(scope.get("a"), Value::Number(2.0));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_program_returns_last_value() {
    assert_eq!(eval("1; 2; 3"), Value::Number(3.0));
    assert_eq!(eval(""), Value::Null);
}

#[test]
fn test_assignment_is_visible_to_later_statements() {
    let mut scope = Scope::new();
    assert_eq!(eval_with("a = 2; b = a * 5; a + b", &mut scope), Ok(Value::Number(12.0)));
    assert_eq!(scope.get("b"), Value::Number(10.0));
    assert_eq!(scope.len(), 2);
}

#[test]
fn test_assignment_overwrites() {
    let mut scope: Scope = [("a", Value::from("old"))].into_iter().collect();
    eval_with("a = 'new'", &mut scope).unwrap();
    assert_eq!(scope.get("a"), Value::from("new"));
}

#[test]
fn test_if_values() {
    assert_eq!(eval("if 1 then 'yes' else 'no'"), Value::from("yes"));
    assert_eq!(eval("if 0 then 'yes' else 'no'"), Value::from("no"));
    assert_eq!(eval("if 0 then 'yes'"), Value::Null);
    assert_eq!(eval("if 1 else 'no'"), Value::Null);
}

#[test]
fn test_if_block_value() {
    let noop = Value::function(|_| Ok(Value::Null));
    let mut scope: Scope = [
        ("test", Value::function(|_| Ok(Value::Boolean(true)))),
        ("call1", noop.clone()),
        ("call2", noop),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        eval_with("if test() then {call1(); call2();\n 123+110}", &mut scope),
        Ok(Value::Number(233.0))
    );
}

#[test]
fn test_empty_block_is_null() {
    assert_eq!(eval("if true then {}"), Value::Null);
}

// ============================================================================
// Host Extensions
// ============================================================================

#[test]
fn test_raw_node_passes_value_through() {
    let ast = Node::Raw {
        value: serde_json::json!({"a": [1, "b"]}),
    };
    assert_eq!(
        evaluate(&ast, &mut Scope::new()),
        Ok(json_object(vec![(
            "a",
            Value::Array(vec![Value::Number(1.0), Value::from("b")])
        )]))
    );
}

#[test]
fn test_stored_template_tree_evaluates() {
    let ast: Node = serde_json::from_value(serde_json::json!({
        "type": "TemplateLiteral",
        "quasis": [
            {"type": "String", "value": "Hi "},
            {"type": "String", "value": "!"},
        ],
        "expressions": [{"type": "Identifier", "name": "name"}],
    }))
    .unwrap();
    let mut scope: Scope = [("name", Value::from("Ann"))].into_iter().collect();
    assert_eq!(evaluate(&ast, &mut scope), Ok(Value::from("Hi Ann!")));
}

#[test]
fn test_components_unsupported_by_default() {
    let ast = Node::Components(serde_json::Map::new());
    assert_eq!(
        evaluate(&ast, &mut Scope::new()),
        Err(EvalError::ComponentsUnsupported)
    );
}

struct Renderer {
    scope: Scope,
    rendered: Vec<String>,
}

impl Environment for Renderer {
    fn get(&self, name: &str) -> Value {
        self.scope.get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Value {
        self.scope.set(name, value)
    }

    fn evaluate_components(
        &mut self,
        components: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Value, EvalError> {
        let names: Vec<String> = components.keys().cloned().collect();
        self.rendered.extend(names.iter().cloned());
        Ok(Value::Number(names.len() as f64))
    }
}

#[test]
fn test_components_delegate_to_environment() {
    let serde_json::Value::Object(map) = serde_json::json!({"header": {}, "footer": {}}) else {
        unreachable!();
    };
    let ast = Node::Program {
        body: vec![
            parse_expression("x = 1").unwrap(),
            Node::Components(map),
        ],
    };

    let mut env = Renderer {
        scope: Scope::new(),
        rendered: vec![],
    };
    assert_eq!(evaluate(&ast, &mut env), Ok(Value::Number(2.0)));
    assert_eq!(env.get("x"), Value::Number(1.0));
    env.rendered.sort();
    assert_eq!(env.rendered, vec!["footer".to_string(), "header".to_string()]);
}

#[test]
fn test_hand_built_assignment_to_literal() {
    let ast = Node::AssignExpression {
        left: Box::new(Node::number(1.0)),
        right: Box::new(Node::number(2.0)),
    };
    assert_eq!(
        evaluate(&ast, &mut Scope::new()),
        Err(EvalError::InvalidAssignmentTarget {
            target: "1".into()
        })
    );
}

#[test]
fn test_environment_as_trait_object() {
    let mut scope: Scope = [("n", Value::Number(4.0))].into_iter().collect();
    let env: &mut dyn Environment = &mut scope;
    let ast = parse_expression("n = n * 2").unwrap();
    assert_eq!(evaluate(&ast, env), Ok(Value::Number(8.0)));
    assert_eq!(scope.get("n"), Value::Number(8.0));
}

#[test]
fn test_result_to_json() {
    let mut scope = scope_from(serde_json::json!({"items": [1, 2]}));
    let value = eval_with(r#"{"total": items[0] + items[1], "ok": true}"#, &mut scope).unwrap();
    assert_eq!(value.to_json(), serde_json::json!({"total": 3.0, "ok": true}));
}

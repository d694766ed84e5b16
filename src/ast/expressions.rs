use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{BinOp, UnaryOp};

/// Abstract Syntax Tree node.
///
/// Nodes are produced once by the parser and only read afterwards. They are
/// plain data: serializing a node yields a JSON object tagged by `"type"`,
/// e.g. `{"type": "Identifier", "name": "foo"}`, which is the form the schema
/// compiler embeds in its component trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    // Literals
    /// Number literal
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Numeric { value: f64 },

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String { value: String },

    /// Boolean literal
    Boolean { value: bool },

    /// Null literal
    Null,

    /// Opaque host value passed through evaluation untouched
    Raw { value: serde_json::Value },

    /// Regular expression literal, compiled only when evaluated
    ///
    /// # Example
    /// ```text
    /// /^\d+$/i
    /// ```
    RegExp { pattern: String, flags: String },

    // References
    /// Variable reference, resolved through the environment
    Identifier { name: String },

    // Operations
    /// Prefix operation
    ///
    /// # Examples
    /// ```text
    /// not done
    /// -price
    /// ```
    UnaryExpression {
        operator: UnaryOp,
        argument: Box<Node>,
    },

    /// Binary operation (arithmetic, comparison, logical, regex match)
    BinaryExpression {
        operator: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Assignment to a variable
    ///
    /// `left` is always an [`Node::Identifier`]; the parser rejects anything
    /// else.
    ///
    /// # Example
    /// ```text
    /// count = count + 1
    /// ```
    AssignExpression { left: Box<Node>, right: Box<Node> },

    /// Function call
    ///
    /// # Examples
    /// ```text
    /// submit()
    /// format(name, "upper")
    /// ```
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },

    /// Computed member access
    ///
    /// # Examples
    /// ```text
    /// items[0]
    /// user["name"]
    /// ```
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
    },

    // Object and Array Literals
    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {name: user, "total": 1 + 2}
    /// ```
    ObjectExpression { properties: Vec<Property> },

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [first, "second", 3]
    /// ```
    ArrayExpression { elements: Vec<Node> },

    /// Back-quoted template
    ///
    /// There is always exactly one more quasi than there are expressions.
    ///
    /// # Example
    /// ```text
    /// `hello {name}!`
    /// ```
    TemplateLiteral {
        quasis: Vec<Quasi>,
        expressions: Vec<Node>,
    },

    // Statements
    /// Top-level statement sequence
    Program { body: Vec<Node> },

    /// Braced statement sequence used as an `if` branch
    BlockStatement { body: Vec<Node> },

    /// Conditional
    ///
    /// # Examples
    /// ```text
    /// if valid() then submit() else warn()
    /// if a then {x(); y()} else if b then z()
    /// ```
    IfStatement {
        test: Box<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        consequent: Option<Box<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alternate: Option<Box<Node>>,
    },

    /// Nested component description, handed verbatim to the host
    Components(serde_json::Map<String, serde_json::Value>),
}

/// One `key: value` entry of an object literal.
///
/// The key is an [`Node::Identifier`], [`Node::String`] or [`Node::Numeric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: Node,
    pub value: Node,
}

/// Text run of a template literal.
///
/// Serialized the same way as a string literal node,
/// `{"type": "String", "value": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "String")]
pub struct Quasi {
    pub value: String,
}

impl Quasi {
    pub fn new(value: impl Into<String>) -> Self {
        Quasi {
            value: value.into(),
        }
    }
}

impl Node {
    pub fn number(value: f64) -> Node {
        Node::Numeric { value }
    }

    pub fn string(value: impl Into<String>) -> Node {
        Node::String {
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Node {
        Node::Boolean { value }
    }

    pub fn identifier(name: impl Into<String>) -> Node {
        Node::Identifier { name: name.into() }
    }

    pub fn unary(operator: UnaryOp, argument: Node) -> Node {
        Node::UnaryExpression {
            operator,
            argument: Box::new(argument),
        }
    }

    pub fn binary(operator: BinOp, left: Node, right: Node) -> Node {
        Node::BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(callee: Node, arguments: Vec<Node>) -> Node {
        Node::CallExpression {
            callee: Box::new(callee),
            arguments,
        }
    }

    /// Name of the node variant, as used for the serialized `"type"` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Numeric { .. } => "Numeric",
            Node::String { .. } => "String",
            Node::Boolean { .. } => "Boolean",
            Node::Null => "Null",
            Node::Raw { .. } => "Raw",
            Node::RegExp { .. } => "RegExp",
            Node::Identifier { .. } => "Identifier",
            Node::UnaryExpression { .. } => "UnaryExpression",
            Node::BinaryExpression { .. } => "BinaryExpression",
            Node::AssignExpression { .. } => "AssignExpression",
            Node::CallExpression { .. } => "CallExpression",
            Node::MemberExpression { .. } => "MemberExpression",
            Node::ObjectExpression { .. } => "ObjectExpression",
            Node::ArrayExpression { .. } => "ArrayExpression",
            Node::TemplateLiteral { .. } => "TemplateLiteral",
            Node::Program { .. } => "Program",
            Node::BlockStatement { .. } => "BlockStatement",
            Node::IfStatement { .. } => "IfStatement",
            Node::Components(_) => "Components",
        }
    }

    /// Operand position of a call or member suffix needs parentheses for
    /// prefix operators, otherwise the suffix would bind to the operand.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::UnaryExpression { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }

    /// A leading `{` in an `if` branch opens a block, so anything else
    /// rendering with one (an object literal, or a member or call on it) is
    /// grouped.
    fn fmt_branch(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_string();
        if text.starts_with('{') && !matches!(self, Node::BlockStatement { .. }) {
            write!(f, "({})", text)
        } else {
            f.write_str(&text)
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", ch)?;
    }
    f.write_str("\"")
}

fn write_separated(f: &mut fmt::Formatter<'_>, nodes: &[Node], separator: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

/// Renders source text that parses back into an equal node.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Numeric { value } => write!(f, "{}", value),
            Node::String { value } => write_quoted(f, value),
            Node::Boolean { value } => write!(f, "{}", value),
            Node::Null => f.write_str("null"),
            Node::Raw { value } => write!(f, "{}", value),
            Node::RegExp { pattern, flags } => write!(f, "/{}/{}", pattern, flags),
            Node::Identifier { name } => f.write_str(name),
            Node::UnaryExpression { operator, argument } => match operator {
                UnaryOp::Not => write!(f, "not {}", argument),
                op => write!(f, "{}{}", op.as_str(), argument),
            },
            Node::BinaryExpression {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator.as_str(), right),
            Node::AssignExpression { left, right } => write!(f, "({} = {})", left, right),
            Node::CallExpression { callee, arguments } => {
                callee.fmt_operand(f)?;
                f.write_str("(")?;
                write_separated(f, arguments, ", ")?;
                f.write_str(")")
            }
            Node::MemberExpression { object, property } => {
                object.fmt_operand(f)?;
                write!(f, "[{}]", property)
            }
            Node::ObjectExpression { properties } => {
                f.write_str("{")?;
                for (i, Property { key, value }) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Node::ArrayExpression { elements } => {
                f.write_str("[")?;
                write_separated(f, elements, ", ")?;
                f.write_str("]")
            }
            Node::TemplateLiteral { quasis, expressions } => {
                f.write_str("`")?;
                for (i, quasi) in quasis.iter().enumerate() {
                    for ch in quasi.value.chars() {
                        if ch == '{' || ch == '`' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{}", ch)?;
                    }
                    match expressions.get(i) {
                        // An interpolation's braces already delimit a statement sequence.
                        Some(Node::BlockStatement { body }) => {
                            f.write_str("{")?;
                            write_separated(f, body, "; ")?;
                            f.write_str("}")?;
                        }
                        Some(expr) => write!(f, "{{{}}}", expr)?,
                        None => {}
                    }
                }
                f.write_str("`")
            }
            Node::Program { body } => write_separated(f, body, "; "),
            Node::BlockStatement { body } => {
                f.write_str("{")?;
                write_separated(f, body, "; ")?;
                f.write_str("}")
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                write!(f, "(if {}", test)?;
                if let Some(consequent) = consequent {
                    f.write_str(" then ")?;
                    consequent.fmt_branch(f)?;
                }
                if let Some(alternate) = alternate {
                    f.write_str(" else ")?;
                    alternate.fmt_branch(f)?;
                }
                f.write_str(")")
            }
            Node::Components(_) => f.write_str("<components>"),
        }
    }
}

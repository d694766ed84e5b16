pub mod ast;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod stream;
pub mod value;
pub mod version;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Node, Property, Quasi, Token, UnaryOp};
pub use environment::{Environment, Scope};
pub use evaluator::{evaluate, EvalError, Evaluator};
pub use lexer::{LexError, Lexer};
pub use parser::{parse_expression, parse_identifier, parse_template, ParseError, Parser};
pub use stream::{CharStream, Position};
pub use value::{Function, RegExp, Value};
pub use version::{is_compatible, SchemaVersion, VersionError};

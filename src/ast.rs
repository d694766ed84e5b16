//! # Brace Expression Language - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree of the Brace expression
//! language, a small embeddable language for putting dynamic logic inside
//! otherwise static declarative documents.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Token operators, binary/unary operators and precedence
//! - **[expressions]** - Syntax tree nodes consumed by the evaluator
//!
//! ## Quick Start
//!
//! ```text
//! total = price * quantity; `Total: {total}`
//! ```
//!
//! Assigns `total` in the environment, then renders a template with it.
//!
//! ## Core Concepts
//!
//! ### Operators
//!
//! From loosest to tightest binding:
//!
//! | Operators                              | Precedence |
//! |----------------------------------------|------------|
//! | `=`                                    | 1          |
//! | `or`                                   | 2          |
//! | `and`                                  | 3          |
//! | `is` `isnt` `<` `<=` `>` `>=` `match`  | 7          |
//! | `+` `-`                                | 10         |
//! | `*` `/` `%`                            | 20         |
//!
//! Prefix `not`, `+` and `-` apply to a single atom, including its call and
//! index suffixes.
//!
//! ### Templates
//!
//! Back-quoted text interpolates `{...}` spans. Spans may hold any
//! expression, including nested templates:
//!
//! ```text
//! `hello {user["name"]}, you have {`{count}`} messages`
//! ```
//!
//! ### Regular Expressions
//!
//! A `/` starts a regular expression only where a value is expected, so
//! `a / b` divides while `name match /^a/i` tests.
//!
//! ## Examples
//!
//! ### Conditional
//!
//! ```text
//! if count > 10 then "many" else if count > 0 then "some" else "none"
//! ```
//!
//! ### Blocks
//!
//! ```text
//! if valid() then {save(form); close()} else warn("invalid")
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Node, Property, Quasi};
pub use operators::{BinOp, Operator, UnaryOp};
pub use tokens::{Keyword, Punct, Token};

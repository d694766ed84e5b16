//! Character stream with line/column tracking.
//!
//! The stream is the lowest layer of the engine: the lexer pulls characters
//! from it one at a time and asks it to build positioned errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexer::LexError;

/// A location in the source text.
///
/// Lines start at 1. Columns count the characters consumed on the current
/// line, so the column points at the last character read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

pub struct CharStream {
    input: Vec<char>,
    offset: usize,
    position: Position,
}

impl CharStream {
    pub fn new(input: &str) -> Self {
        CharStream {
            input: input.chars().collect(),
            offset: 0,
            position: Position::default(),
        }
    }

    /// Current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.offset).copied()
    }

    /// Consumes the current character.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += 1;
        self.advance_position(ch);
        Some(ch)
    }

    pub fn eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Builds an error carrying `message` and the current position.
    pub fn fail(&self, message: impl Into<String>) -> LexError {
        LexError::new(message, self.position)
    }

    /// Consumes characters while `predicate` holds.
    pub fn read_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            result.push(ch);
            self.next();
        }
        result
    }

    fn advance_position(&mut self, ch: char) {
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
    }
}

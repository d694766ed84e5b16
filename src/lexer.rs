use thiserror::Error;

use crate::{
    ast::{Keyword, Operator, Punct, Token},
    stream::{CharStream, Position},
};

/// A malformed token, reported with the position where reading stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({position})")]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl LexError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        LexError {
            message: message.into(),
            position,
        }
    }
}

const REGEXP_FLAGS: &str = "gimuy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Plain expression text.
    Expression,
    /// Literal text between back-quotes.
    Template,
    /// Expression inside a template's `{...}`; `depth` counts open braces
    /// so object literals do not end the span early.
    Interpolation { depth: usize },
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

pub struct Lexer {
    stream: CharStream,
    modes: Vec<Mode>,
    /// Token already read but not yet handed out (the `{` opening an
    /// interpolation, read together with the text before it).
    pending: Option<Token>,
    /// Last emitted token, used to tell a regexp from a division.
    previous: Option<Token>,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            stream: CharStream::new(input),
            modes: vec![Mode::Expression],
            pending: None,
            previous: None,
            finished: false,
        }
    }

    pub fn position(&self) -> Position {
        self.stream.position()
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.read_token()?;
        if token != Token::Eof {
            self.previous = Some(token.clone());
        }
        Ok(token)
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Expression)
    }

    fn read_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.pending.take() {
            return Ok(token);
        }
        match self.mode() {
            Mode::Template => self.read_template_part(),
            Mode::Expression | Mode::Interpolation { .. } => self.read_expression_token(),
        }
    }

    fn read_expression_token(&mut self) -> Result<Token, LexError> {
        self.stream.read_while(is_whitespace);

        let Some(ch) = self.stream.peek() else {
            return match self.mode() {
                Mode::Interpolation { .. } => Err(self
                    .stream
                    .fail("Unterminated template expression, expected '}'")),
                _ => Ok(Token::Eof),
            };
        };

        match ch {
            '#' => {
                self.skip_comment();
                self.read_expression_token()
            }
            '"' | '\'' => self.read_string(ch),
            c if c.is_ascii_digit() => self.read_number(),
            c if is_identifier_start(c) => Ok(self.read_identifier()),
            '/' if self.can_start_regexp() => self.read_regexp(),
            '>' | '<' => Ok(self.read_comparison(ch)),
            '`' => {
                self.stream.next();
                self.modes.push(Mode::Template);
                Ok(Token::Punctuation(Punct::Backquote))
            }
            '{' => {
                self.stream.next();
                if let Some(Mode::Interpolation { depth }) = self.modes.last_mut() {
                    *depth += 1;
                }
                Ok(Token::Punctuation(Punct::LBrace))
            }
            '}' => {
                self.stream.next();
                if self.mode() == (Mode::Interpolation { depth: 0 }) {
                    self.modes.pop();
                } else if let Some(Mode::Interpolation { depth }) = self.modes.last_mut() {
                    *depth -= 1;
                }
                Ok(Token::Punctuation(Punct::RBrace))
            }
            c => {
                if let Some(punct) = Punct::from_char(c) {
                    self.stream.next();
                    Ok(Token::Punctuation(punct))
                } else if let Some(op) = Operator::from_char(c) {
                    self.stream.next();
                    Ok(Token::Operator(op))
                } else {
                    Err(self.stream.fail(format!("Can't handle character: {}", c)))
                }
            }
        }
    }

    /// Reads literal template text up to the next interpolation or the
    /// closing back-quote. Empty `{}` spans are dropped so the text on both
    /// sides comes out as one run.
    fn read_template_part(&mut self) -> Result<Token, LexError> {
        let mut text = String::new();

        loop {
            match self.stream.peek() {
                None => {
                    return Err(self
                        .stream
                        .fail("Unterminated template literal, expected '`'"));
                }
                Some('`') => {
                    if text.is_empty() {
                        self.stream.next();
                        self.modes.pop();
                        return Ok(Token::Punctuation(Punct::Backquote));
                    }
                    break;
                }
                Some('\\') => {
                    self.stream.next();
                    match self.stream.peek() {
                        Some(ch @ ('{' | '`')) => {
                            self.stream.next();
                            text.push(ch);
                        }
                        Some('\\') => {
                            self.stream.next();
                            text.push_str("\\\\");
                        }
                        _ => text.push('\\'),
                    }
                }
                Some('{') => {
                    self.stream.next();
                    self.stream.read_while(is_whitespace);
                    if self.stream.peek() == Some('}') {
                        self.stream.next();
                        continue;
                    }
                    self.modes.push(Mode::Interpolation { depth: 0 });
                    self.pending = Some(Token::Punctuation(Punct::LBrace));
                    break;
                }
                Some(ch) => {
                    self.stream.next();
                    text.push(ch);
                }
            }
        }

        if text.is_empty() {
            return self.read_token();
        }
        Ok(Token::String(text))
    }

    /// `#` starts a comment running to the end of the line or the next `#`.
    fn skip_comment(&mut self) {
        self.stream.next();
        self.stream.read_while(|ch| ch != '\n' && ch != '#');
        self.stream.next();
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        self.stream.next(); // Consume opening quote

        let mut value = String::new();
        let mut escaped = false;
        while let Some(ch) = self.stream.next() {
            if escaped {
                value.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                return Ok(Token::String(value));
            } else {
                value.push(ch);
            }
        }

        Err(self.stream.fail("Unterminated string, missing closing quote"))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let mut number = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.stream.peek() {
            if ch == '.' {
                if has_dot {
                    self.stream.next();
                    return Err(self
                        .stream
                        .fail("Unexpected token: '.', double dot in a number"));
                }
                has_dot = true;
            } else if !ch.is_ascii_digit() {
                break;
            }
            number.push(ch);
            self.stream.next();
        }

        match number.parse::<f64>() {
            Ok(value) => Ok(Token::Numeric(value)),
            Err(_) => Err(self.stream.fail(format!("Invalid number: {}", number))),
        }
    }

    fn read_identifier(&mut self) -> Token {
        let word = self.stream.read_while(is_identifier_char);

        match word.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            _ => {
                if let Some(op) = Operator::from_word(&word) {
                    Token::Operator(op)
                } else if let Some(keyword) = Keyword::from_word(&word) {
                    Token::Keyword(keyword)
                } else {
                    Token::Identifier(word)
                }
            }
        }
    }

    /// A `/` opens a regexp only where an operand is expected: at the start,
    /// after an operator or keyword, or after an opening bracket or
    /// separator. Anywhere else it divides.
    fn can_start_regexp(&self) -> bool {
        match &self.previous {
            None => true,
            Some(Token::Operator(_)) | Some(Token::Keyword(_)) => true,
            Some(Token::Punctuation(punct)) => matches!(
                punct,
                Punct::LParen
                    | Punct::LBracket
                    | Punct::LBrace
                    | Punct::Comma
                    | Punct::Colon
                    | Punct::Semicolon
            ),
            Some(_) => false,
        }
    }

    fn read_regexp(&mut self) -> Result<Token, LexError> {
        self.stream.next(); // Consume opening slash

        let mut pattern = String::new();
        let mut escaped = false;
        loop {
            let Some(ch) = self.stream.next() else {
                return Err(self
                    .stream
                    .fail("Unterminated regular expression, expected '/'"));
            };
            if ch == '/' && !escaped {
                break;
            }
            pattern.push(ch);
            escaped = ch == '\\' && !escaped;
        }

        let mut flags = String::new();
        while let Some(ch) = self.stream.peek() {
            if REGEXP_FLAGS.contains(ch) && !flags.contains(ch) {
                flags.push(ch);
                self.stream.next();
            } else if is_whitespace(ch) || Punct::from_char(ch).is_some() {
                break;
            } else {
                return Err(self.stream.fail(format!(
                    "Invalid regular expression flags: \"{}{}\"",
                    flags, ch
                )));
            }
        }

        Ok(Token::RegExp { pattern, flags })
    }

    fn read_comparison(&mut self, first: char) -> Token {
        self.stream.next();
        let or_equal = self.stream.peek() == Some('=');
        if or_equal {
            self.stream.next();
        }
        match (first, or_equal) {
            ('>', true) => Token::Operator(Operator::GtEq),
            ('>', false) => Token::Operator(Operator::Gt),
            (_, true) => Token::Operator(Operator::LtEq),
            (_, false) => Token::Operator(Operator::Lt),
        }
    }
}

/// Yields tokens up to, not including, [`Token::Eof`]. Iteration stops after
/// the first error.
impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Token::Eof) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
            token => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_operators_and_literals() {
        let mut lexer = Lexer::new("and or true false null not");
        assert_eq!(lexer.next_token(), Ok(Token::Operator(Operator::And)));
        assert_eq!(lexer.next_token(), Ok(Token::Operator(Operator::Or)));
        assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
        assert_eq!(lexer.next_token(), Ok(Token::Boolean(false)));
        assert_eq!(lexer.next_token(), Ok(Token::Null));
        assert_eq!(lexer.next_token(), Ok(Token::Operator(Operator::Not)));
        assert_eq!(lexer.next_token(), Ok(Token::Eof));
    }

    #[test]
    fn test_interpolation_depth() {
        let tokens: Vec<Token> = Lexer::new("`a{ {b: 1} }c`")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Punctuation(Punct::Backquote),
                Token::String("a".into()),
                Token::Punctuation(Punct::LBrace),
                Token::Punctuation(Punct::LBrace),
                Token::Identifier("b".into()),
                Token::Punctuation(Punct::Colon),
                Token::Numeric(1.0),
                Token::Punctuation(Punct::RBrace),
                Token::Punctuation(Punct::RBrace),
                Token::String("c".into()),
                Token::Punctuation(Punct::Backquote),
            ]
        );
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut lexer = Lexer::new("1 $ 2");
        assert_eq!(lexer.next(), Some(Ok(Token::Numeric(1.0))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert_eq!(lexer.next(), None);
    }
}

use std::fmt;

use crate::ast::Operator;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Number literal (always floating point)
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Numeric(f64),

    /// String literal enclosed in single or double quotes
    ///
    /// A backslash escapes whatever character follows it.
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    ///
    /// Also produced for the literal text runs of a template literal.
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Null value
    Null,

    /// Regular expression literal
    ///
    /// The pattern is kept exactly as written; it is only compiled when
    /// evaluated.
    ///
    /// # Examples
    /// ```text
    /// /[abc]/i
    /// /\s\//g
    /// ```
    RegExp { pattern: String, flags: String },

    /// Variable or function name
    ///
    /// Must start with an ASCII letter or underscore, followed by letters,
    /// digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// user
    /// item_count
    /// _internal
    /// ```
    Identifier(String),

    /// Symbolic or word operator
    ///
    /// # Examples
    /// ```text
    /// + - * / % = > >= < <=
    /// is isnt and or not match
    /// ```
    Operator(Operator),

    /// Punctuation: brackets, separators and the template back-quote
    Punctuation(Punct),

    /// Reserved control word
    ///
    /// # Examples
    /// ```text
    /// if ready() then go() else wait()
    /// ```
    Keyword(Keyword),

    /// End of input
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `` ` ``
    Backquote,
}

impl Punct {
    pub fn from_char(ch: char) -> Option<Punct> {
        let punct = match ch {
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            ',' => Punct::Comma,
            ':' => Punct::Colon,
            ';' => Punct::Semicolon,
            '`' => Punct::Backquote,
            _ => return None,
        };
        Some(punct)
    }

    pub fn as_char(self) -> char {
        match self {
            Punct::LParen => '(',
            Punct::RParen => ')',
            Punct::LBracket => '[',
            Punct::RBracket => ']',
            Punct::LBrace => '{',
            Punct::RBrace => '}',
            Punct::Comma => ',',
            Punct::Colon => ':',
            Punct::Semicolon => ';',
            Punct::Backquote => '`',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Then,
    Else,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        match word {
            "if" => Some(Keyword::If),
            "then" => Some(Keyword::Then),
            "else" => Some(Keyword::Else),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Numeric(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Boolean(b) => write!(f, "boolean {}", b),
            Token::Null => write!(f, "null"),
            Token::RegExp { pattern, flags } => write!(f, "regexp /{}/{}", pattern, flags),
            Token::Identifier(name) => write!(f, "identifier `{}`", name),
            Token::Operator(op) => write!(f, "operator `{}`", op.as_str()),
            Token::Punctuation(p) => write!(f, "punctuation `{}`", p.as_char()),
            Token::Keyword(k) => write!(f, "keyword `{}`", k.as_str()),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Operators as they appear in the token stream.
///
/// A token-level operator becomes a [`BinOp`], a [`UnaryOp`] or an
/// assignment depending on where the parser meets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Assign,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `is`
    Is,
    /// `isnt`
    Isnt,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `match`
    Match,
}

impl Operator {
    /// Word operators recognised by the lexer.
    pub fn from_word(word: &str) -> Option<Operator> {
        match word {
            "is" => Some(Operator::Is),
            "isnt" => Some(Operator::Isnt),
            "and" => Some(Operator::And),
            "or" => Some(Operator::Or),
            "not" => Some(Operator::Not),
            "match" => Some(Operator::Match),
            _ => None,
        }
    }

    /// Single-character operators. `>` and `<` are handled separately since
    /// they may be followed by `=`.
    pub fn from_char(ch: char) -> Option<Operator> {
        match ch {
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Star),
            '/' => Some(Operator::Slash),
            '%' => Some(Operator::Percent),
            '=' => Some(Operator::Assign),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Assign => "=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Is => "is",
            Operator::Isnt => "isnt",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Match => "match",
        }
    }

    /// Binding strength in infix position, `None` for prefix-only operators.
    ///
    /// Assignment binds loosest; multiplicative operators bind tightest.
    pub fn precedence(self) -> Option<u8> {
        match self {
            Operator::Assign => Some(1),
            Operator::Or => Some(2),
            Operator::And => Some(3),
            Operator::Gt
            | Operator::GtEq
            | Operator::Lt
            | Operator::LtEq
            | Operator::Is
            | Operator::Isnt
            | Operator::Match => Some(7),
            Operator::Plus | Operator::Minus => Some(10),
            Operator::Star | Operator::Slash | Operator::Percent => Some(20),
            Operator::Not => None,
        }
    }

    pub fn binary(self) -> Option<BinOp> {
        let op = match self {
            Operator::Plus => BinOp::Add,
            Operator::Minus => BinOp::Subtract,
            Operator::Star => BinOp::Multiply,
            Operator::Slash => BinOp::Divide,
            Operator::Percent => BinOp::Remainder,
            Operator::Gt => BinOp::GreaterThan,
            Operator::GtEq => BinOp::GreaterEqual,
            Operator::Lt => BinOp::LessThan,
            Operator::LtEq => BinOp::LessEqual,
            Operator::Is => BinOp::Equal,
            Operator::Isnt => BinOp::NotEqual,
            Operator::And => BinOp::And,
            Operator::Or => BinOp::Or,
            Operator::Match => BinOp::Match,
            Operator::Assign | Operator::Not => return None,
        };
        Some(op)
    }

    pub fn unary(self) -> Option<UnaryOp> {
        match self {
            Operator::Not => Some(UnaryOp::Not),
            Operator::Plus => Some(UnaryOp::Plus),
            Operator::Minus => Some(UnaryOp::Minus),
            _ => None,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Comparison
    /// Strict equality (`is`)
    #[serde(rename = "is")]
    Equal,
    /// Strict inequality (`isnt`)
    #[serde(rename = "isnt")]
    NotEqual,
    /// Less than (`<`)
    #[serde(rename = "<")]
    LessThan,
    /// Greater than (`>`)
    #[serde(rename = ">")]
    GreaterThan,
    /// Less than or equal (`<=`)
    #[serde(rename = "<=")]
    LessEqual,
    /// Greater than or equal (`>=`)
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Regular expression test (`match`)
    #[serde(rename = "match")]
    Match,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    #[serde(rename = "+")]
    Add,
    /// Subtraction (`-`)
    #[serde(rename = "-")]
    Subtract,
    /// Multiplication (`*`)
    #[serde(rename = "*")]
    Multiply,
    /// Division (`/`)
    #[serde(rename = "/")]
    Divide,
    /// Remainder (`%`)
    #[serde(rename = "%")]
    Remainder,

    // Logical
    /// Logical AND (word, not symbol)
    #[serde(rename = "and")]
    And,
    /// Logical OR (word, not symbol)
    #[serde(rename = "or")]
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Equal => "is",
            BinOp::NotEqual => "isnt",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::Match => "match",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Remainder => "%",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical negation (`not`)
    #[serde(rename = "not")]
    Not,
    /// Numeric identity (`+`)
    #[serde(rename = "+")]
    Plus,
    /// Numeric negation (`-`)
    #[serde(rename = "-")]
    Minus,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

use std::mem;

use thiserror::Error;

use crate::{
    ast::{Keyword, Node, Operator, Property, Punct, Quasi, Token},
    lexer::{LexError, Lexer},
    stream::Position,
};

/// Errors that can occur while turning source text into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed token
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Well-formed tokens in an order the grammar does not allow
    #[error("{message} ({position})")]
    Syntax { message: String, position: Position },

    /// A binding target that is not a bare identifier
    #[error("data binding target has to be an identifier instead of `{found}`")]
    NotAnIdentifier { found: String },
}

impl ParseError {
    /// Where the error was detected, when it comes from the source text.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lex(err) => Some(err.position),
            ParseError::Syntax { position, .. } => Some(*position),
            ParseError::NotAnIdentifier { .. } => None,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser with precedence climbing for binary operators.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> ParseResult<Self> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    /// Moves to the next token, returning the one just passed.
    fn advance(&mut self) -> ParseResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current_token, next))
    }

    fn fail(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            position: self.lexer.position(),
        }
    }

    fn unexpected(&self) -> ParseError {
        self.fail(format!("Unexpected token: {}", self.current_token))
    }

    fn check(&self, punct: Punct) -> bool {
        self.current_token == Token::Punctuation(punct)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_token == Token::Keyword(keyword)
    }

    fn at_eof(&self) -> bool {
        self.current_token == Token::Eof
    }

    fn expect(&mut self, punct: Punct) -> ParseResult<()> {
        if !self.check(punct) {
            return Err(self.fail(format!(
                "Expecting punctuation: \"{}\", got {}",
                punct.as_char(),
                self.current_token
            )));
        }
        self.advance()?;
        Ok(())
    }

    /// Parses `start item (sep item)* sep? stop`. An empty list and a
    /// trailing separator are both accepted.
    fn delimited<T>(
        &mut self,
        start: Punct,
        stop: Punct,
        separator: Punct,
        mut parse_item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = vec![];
        let mut first = true;

        self.expect(start)?;
        while !self.at_eof() {
            if self.check(stop) {
                break;
            }
            if first {
                first = false;
            } else {
                self.expect(separator)?;
            }
            if self.check(stop) {
                break;
            }
            items.push(parse_item(self)?);
        }
        self.expect(stop)?;

        Ok(items)
    }

    /// Parses the whole input as a statement sequence.
    ///
    /// A single statement is returned as is; anything else becomes a
    /// [`Node::Program`].
    pub fn parse(&mut self) -> ParseResult<Node> {
        let mut body = self.parse_statements(None)?;
        if body.len() == 1 {
            return Ok(body.remove(0));
        }
        Ok(Node::Program { body })
    }

    /// Statements separated by `;`, up to `stop` (or end of input when
    /// `stop` is `None`). Empty statements are skipped.
    fn parse_statements(&mut self, stop: Option<Punct>) -> ParseResult<Vec<Node>> {
        let at_stop = |parser: &Self| match stop {
            Some(punct) => parser.check(punct),
            None => parser.at_eof(),
        };

        let mut body = vec![];
        loop {
            while self.check(Punct::Semicolon) {
                self.advance()?;
            }
            if at_stop(self) || self.at_eof() {
                break;
            }
            body.push(self.parse_expression()?);
            if at_stop(self) {
                break;
            }
            self.expect(Punct::Semicolon)?;
        }
        Ok(body)
    }

    fn parse_block(&mut self) -> ParseResult<Node> {
        self.expect(Punct::LBrace)?;
        let body = self.parse_statements(Some(Punct::RBrace))?;
        self.expect(Punct::RBrace)?;
        Ok(Node::BlockStatement { body })
    }

    /// `if` TEST [`then` BRANCH] [`else` BRANCH]
    fn parse_if(&mut self) -> ParseResult<Node> {
        self.advance()?; // consume `if`
        let test = self.parse_expression()?;

        let consequent = if self.check_keyword(Keyword::Then) {
            self.advance()?;
            Some(Box::new(self.parse_branch()?))
        } else {
            None
        };

        let alternate = if self.check_keyword(Keyword::Else) {
            self.advance()?;
            Some(Box::new(self.parse_branch()?))
        } else {
            None
        };

        Ok(Node::IfStatement {
            test: Box::new(test),
            consequent,
            alternate,
        })
    }

    fn parse_branch(&mut self) -> ParseResult<Node> {
        if self.check(Punct::LBrace) {
            self.parse_block()
        } else {
            self.parse_expression()
        }
    }

    pub fn parse_expression(&mut self) -> ParseResult<Node> {
        let left = self.parse_atom()?;
        self.maybe_binary(left, 0)
    }

    /// Precedence climbing: folds operators binding tighter than
    /// `min_precedence` into `left`. Equal precedence folds to the left.
    fn maybe_binary(&mut self, mut left: Node, min_precedence: u8) -> ParseResult<Node> {
        loop {
            let Token::Operator(op) = self.current_token else {
                return Ok(left);
            };
            let Some(precedence) = op.precedence() else {
                return Ok(left);
            };
            if precedence <= min_precedence {
                return Ok(left);
            }

            if op == Operator::Assign && !matches!(left, Node::Identifier { .. }) {
                return Err(self.fail(format!(
                    "You can only assign to an identifier, not `{}`",
                    left
                )));
            }

            self.advance()?;
            let atom = self.parse_atom()?;
            let right = self.maybe_binary(atom, precedence)?;

            left = match op.binary() {
                Some(operator) => Node::binary(operator, left, right),
                None => Node::AssignExpression {
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
    }

    /// Prefix operators, then a primary with its call/index suffixes.
    fn parse_atom(&mut self) -> ParseResult<Node> {
        if let Token::Operator(op) = self.current_token
            && let Some(operator) = op.unary()
        {
            self.advance()?;
            let argument = self.parse_atom()?;
            return Ok(Node::unary(operator, argument));
        }

        let primary = self.parse_primary()?;
        self.maybe_call_or_member(primary)
    }

    /// Wraps `expr` while the next token opens a call `(` or an index `[`,
    /// so chains like `f(1)(2)[0]` nest left to right.
    fn maybe_call_or_member(&mut self, mut expr: Node) -> ParseResult<Node> {
        loop {
            if self.check(Punct::LParen) {
                let arguments = self.delimited(
                    Punct::LParen,
                    Punct::RParen,
                    Punct::Comma,
                    Self::parse_expression,
                )?;
                expr = Node::CallExpression {
                    callee: Box::new(expr),
                    arguments,
                };
            } else if self.check(Punct::LBracket) {
                self.advance()?; // consume '['
                let property = self.parse_expression()?;
                self.expect(Punct::RBracket)?;
                expr = Node::MemberExpression {
                    object: Box::new(expr),
                    property: Box::new(property),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parse primary expressions: literals, identifiers, groups, object and
    /// array literals, templates and `if`.
    fn parse_primary(&mut self) -> ParseResult<Node> {
        match &self.current_token {
            Token::Punctuation(Punct::LParen) => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Punct::RParen)?;
                Ok(expr)
            }
            Token::Punctuation(Punct::LBrace) => self.parse_object_literal(),
            Token::Punctuation(Punct::LBracket) => self.parse_array_literal(),
            Token::Punctuation(Punct::Backquote) => self.parse_template_literal(),
            Token::Keyword(Keyword::If) => self.parse_if(),
            token => match atom_node(token) {
                Some(node) => {
                    self.advance()?;
                    Ok(node)
                }
                None => Err(self.unexpected()),
            },
        }
    }

    fn parse_object_literal(&mut self) -> ParseResult<Node> {
        let properties = self.delimited(
            Punct::LBrace,
            Punct::RBrace,
            Punct::Comma,
            Self::parse_object_property,
        )?;
        Ok(Node::ObjectExpression { properties })
    }

    fn parse_object_property(&mut self) -> ParseResult<Property> {
        let key = self.parse_atom()?;
        if !matches!(
            key,
            Node::Identifier { .. } | Node::String { .. } | Node::Numeric { .. }
        ) {
            return Err(self.fail(format!(
                "Object key should only be identifier, string or number, instead of `{}`",
                key
            )));
        }

        self.expect(Punct::Colon)?;
        let value = self.parse_expression()?;

        Ok(Property { key, value })
    }

    fn parse_array_literal(&mut self) -> ParseResult<Node> {
        let elements = self.delimited(
            Punct::LBracket,
            Punct::RBracket,
            Punct::Comma,
            Self::parse_expression,
        )?;
        Ok(Node::ArrayExpression { elements })
    }

    /// The lexer hands over text runs as string tokens and each
    /// interpolation as `{ ... }`. Quasis are padded with empty text so
    /// every expression sits between two of them.
    fn parse_template_literal(&mut self) -> ParseResult<Node> {
        self.expect(Punct::Backquote)?;

        let mut quasis: Vec<Quasi> = vec![];
        let mut expressions = vec![];

        while !self.check(Punct::Backquote) {
            match &self.current_token {
                Token::String(text) => {
                    let text = text.clone();
                    self.advance()?;
                    if quasis.len() > expressions.len()
                        && let Some(last) = quasis.last_mut()
                    {
                        last.value.push_str(&text);
                    } else {
                        quasis.push(Quasi::new(text));
                    }
                }
                Token::Punctuation(Punct::LBrace) => {
                    self.advance()?;
                    if quasis.len() <= expressions.len() {
                        quasis.push(Quasi::default());
                    }
                    expressions.push(self.parse_interpolation()?);
                    self.expect(Punct::RBrace)?;
                }
                _ => return Err(self.unexpected()),
            }
        }
        if quasis.len() <= expressions.len() {
            quasis.push(Quasi::default());
        }
        self.expect(Punct::Backquote)?;

        Ok(Node::TemplateLiteral {
            quasis,
            expressions,
        })
    }

    fn parse_interpolation(&mut self) -> ParseResult<Node> {
        let mut body = self.parse_statements(Some(Punct::RBrace))?;
        if body.len() == 1 {
            return Ok(body.remove(0));
        }
        Ok(Node::BlockStatement { body })
    }
}

/// Literal and identifier tokens stand for themselves in the tree.
fn atom_node(token: &Token) -> Option<Node> {
    let node = match token {
        Token::Numeric(value) => Node::Numeric { value: *value },
        Token::String(value) => Node::String {
            value: value.clone(),
        },
        Token::Boolean(value) => Node::Boolean { value: *value },
        Token::Null => Node::Null,
        Token::RegExp { pattern, flags } => Node::RegExp {
            pattern: pattern.clone(),
            flags: flags.clone(),
        },
        Token::Identifier(name) => Node::Identifier { name: name.clone() },
        _ => return None,
    };
    Some(node)
}

/// Parses an expression or statement sequence.
///
/// # Examples
///
/// ```
/// use brace_lang::{parse_expression, Node};
///
/// let ast = parse_expression("foo").unwrap();
/// assert_eq!(ast, Node::identifier("foo"));
/// ```
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_expression(text: &str) -> ParseResult<Node> {
    let mut parser = Parser::new(Lexer::new(text))?;
    let node = parser.parse()?;
    tracing::debug!(kind = node.kind(), "parsed expression");
    Ok(node)
}

/// Parses `text` as the body of a back-quoted template.
///
/// # Examples
///
/// ```
/// use brace_lang::{parse_template, Node};
///
/// let ast = parse_template("hello {name}").unwrap();
/// assert!(matches!(ast, Node::TemplateLiteral { .. }));
/// ```
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_template(text: &str) -> ParseResult<Node> {
    parse_expression(&format!("`{}`", text))
}

/// Parses a data-binding target, which has to be a bare identifier.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_identifier(text: &str) -> ParseResult<Node> {
    match parse_expression(text)? {
        node @ Node::Identifier { .. } => Ok(node),
        other => Err(ParseError::NotAnIdentifier {
            found: other.to_string(),
        }),
    }
}

use std::{mem, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::{
    cursor::{Cursor, TreeError},
    expr::Expr,
    lexer::{LexError, Lexer, Token},
    value::Value,
};

static OPCALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\(\(\s*([a-zA-Z][a-zA-Z0-9_-]*)(?:\s+(.*?))?\s*\)\)$")
        .expect("operator call pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, got {found}")]
    UnexpectedToken { expected: &'static str, found: String },

    #[error(transparent)]
    InvalidReference(#[from] TreeError),
}

/// An operator invocation found in the document, e.g.
/// `(( cartesian-product meta.hosts ":" meta.ports ))`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpCall {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Parses `src` if it looks like an operator call.
///
/// Returns `Ok(None)` for ordinary strings.
pub fn parse_call(src: &str) -> Result<Option<OpCall>, ParseError> {
    let Some(caps) = OPCALL.captures(src.trim()) else {
        return Ok(None);
    };

    let name = caps[1].to_string();
    let body = caps.get(2).map_or("", |m| m.as_str());

    let mut parser = Parser::new(Lexer::new(body))?;
    let args = parser.parse_args()?;
    parser.expect_eof()?;

    Ok(Some(OpCall { name, args }))
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            expected,
            found: format!("{:?}", self.current_token),
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.check(&Token::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of operator call"))
        }
    }

    /// Parses arguments up to `)` or the end of input, whichever comes
    /// first. Commas between arguments are optional.
    pub fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        loop {
            while self.check(&Token::Comma) {
                self.advance()?;
            }
            if self.check(&Token::Eof) || self.check(&Token::RParen) {
                return Ok(args);
            }
            args.push(self.parse_expression()?);
        }
    }

    /// `primary ( "||" primary )*`, folded to the right.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_primary()?;

        if self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_expression()?;
            return Ok(Expr::LogicalOr(Box::new(left), Box::new(right)));
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(s) => Expr::Literal(Value::String(s)),
            Token::Integer(n) => Expr::Literal(Value::Integer(n)),
            Token::Float(n) => Expr::Literal(Value::Float(n)),
            Token::Boolean(b) => Expr::Literal(Value::Boolean(b)),
            Token::Null => Expr::Literal(Value::Null),
            Token::EnvVar(name) => Expr::EnvVar(name),
            Token::Word(word) => Expr::Reference(Cursor::parse(&word)?),

            // (name args...)
            Token::LParen => {
                self.advance()?;
                let name = match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::Word(name) => name,
                    other => {
                        self.current_token = other;
                        return Err(self.unexpected("operator name"));
                    }
                };
                self.advance()?;
                let args = self.parse_args()?;
                if !self.check(&Token::RParen) {
                    return Err(self.unexpected("')'"));
                }
                Expr::OperatorCall { name, args }
            }

            other => {
                self.current_token = other;
                return Err(self.unexpected("an argument"));
            }
        };

        self.advance()?;
        Ok(expr)
    }
}

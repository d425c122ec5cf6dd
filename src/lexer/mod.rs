//! # Lexer
//!
//! Turns an expression string into tokens using a [`LexContext`].
//!
//! At each position the lexer tries, in order: `(`, `)`, `,`, a unary
//! operator, a binary operator, a function name, a variable name and finally
//! a number literal. Whitespace between tokens is skipped.
//!
//! Operator disambiguation looks only at the id of the previously emitted
//! token, which is threaded through the scan as explicit state. A unary
//! operator is taken when that id is on its allow list; otherwise matching
//! falls through to the binary operators, and a binary operator whose
//! predecessor is on its disallow list is an error.
//!
//! Function calls are validated eagerly: the name must be followed by `(`,
//! the parentheses must balance and the number of top-level commas must be
//! `arity - 1`.

pub mod context;
pub mod number;

pub use context::LexContext;

use log::{debug, trace};
use nom::{character::complete::multispace0, Parser};

use crate::error::LexError;
use crate::token::{ids, FunctionToken, Token, TokenId, VariableToken};

/// A lexer bound to a context.
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'a> {
    ctx: &'a LexContext,
}

/// Lex `expression` with `ctx`.
pub fn lex(expression: &str, ctx: &LexContext) -> Result<Vec<Token>, LexError> {
    Lexer::new(ctx).lex(expression)
}

impl<'a> Lexer<'a> {
    pub fn new(ctx: &'a LexContext) -> Self {
        Self { ctx }
    }

    /// Lex a complete expression. There is no partial result on error.
    pub fn lex(&self, expression: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut last = ids::NO_TOKEN;
        let mut rest = skip_whitespace(expression);

        while !rest.is_empty() {
            let (token, remaining) = self.next_token(rest, last)?;
            trace!("lexed token id {} at offset {}", token.id(), expression.len() - rest.len());
            last = token.id();
            tokens.push(token);
            rest = skip_whitespace(remaining);
        }

        debug!("lexed {} tokens from '{}'", tokens.len(), expression);
        Ok(tokens)
    }

    fn next_token<'s>(&self, input: &'s str, last: TokenId) -> Result<(Token, &'s str), LexError> {
        if let Some(rest) = input.strip_prefix('(') {
            return Ok((Token::LeftParen, rest));
        }
        if let Some(rest) = input.strip_prefix(')') {
            return Ok((Token::RightParen, rest));
        }
        if let Some(rest) = input.strip_prefix(',') {
            return Ok((Token::Comma, rest));
        }

        if let Some(found) = self.unary_operator(input, last) {
            return Ok(found);
        }
        if let Some(found) = self.binary_operator(input, last)? {
            return Ok(found);
        }
        if let Some(found) = self.function(input)? {
            return Ok(found);
        }
        if let Some(found) = self.variable(input) {
            return Ok(found);
        }
        if let Some(found) = number::lex_number(input) {
            let (constant, rest) = found?;
            return Ok((Token::Constant(constant), rest));
        }

        Err(LexError::NoMatch {
            remaining: input.to_string(),
        })
    }

    fn unary_operator<'s>(&self, input: &'s str, last: TokenId) -> Option<(Token, &'s str)> {
        self.ctx
            .unary_operators()
            .iter()
            .filter(|op| input.starts_with(op.symbol.as_str()))
            .filter(|op| op.token.allowed_left.contains(&last))
            .max_by_key(|op| op.symbol.len())
            .map(|op| {
                (
                    Token::UnaryOperator(op.token.clone()),
                    &input[op.symbol.len()..],
                )
            })
    }

    fn binary_operator<'s>(
        &self,
        input: &'s str,
        last: TokenId,
    ) -> Result<Option<(Token, &'s str)>, LexError> {
        let matched = self
            .ctx
            .binary_operators()
            .iter()
            .filter(|op| input.starts_with(op.symbol.as_str()))
            .max_by_key(|op| op.symbol.len());

        match matched {
            None => Ok(None),
            Some(op) if op.token.disallowed_left.contains(&last) => {
                Err(LexError::DisallowedAdjacency {
                    previous: last,
                    operator: op.token.id,
                })
            }
            Some(op) => Ok(Some((
                Token::BinaryOperator(op.token.clone()),
                &input[op.symbol.len()..],
            ))),
        }
    }

    fn function<'s>(&self, input: &'s str) -> Result<Option<(Token, &'s str)>, LexError> {
        let longest_variable = self.variable_match_len(input);

        // Functions are sorted longest first, so `log10` wins over `log`.
        let matched = self
            .ctx
            .functions()
            .iter()
            .find(|f| input.starts_with(f.name.as_str()) && f.name.len() >= longest_variable);

        let Some(def) = matched else {
            return Ok(None);
        };

        let after = &input[def.name.len()..];
        check_call(&def.name, &def.token, after)?;
        Ok(Some((Token::Function(def.token.clone()), after)))
    }

    fn variable<'s>(&self, input: &'s str) -> Option<(Token, &'s str)> {
        self.ctx
            .variables()
            .iter()
            .find(|name| input.starts_with(name.as_str()))
            .map(|name| {
                (
                    Token::Variable(VariableToken::new(name.clone())),
                    &input[name.len()..],
                )
            })
    }

    fn variable_match_len(&self, input: &str) -> usize {
        self.ctx
            .variables()
            .iter()
            .find(|name| input.starts_with(name.as_str()))
            .map_or(0, |name| name.len())
    }
}

fn skip_whitespace(input: &str) -> &str {
    let mut parser = multispace0::<&str, nom::error::Error<&str>>;
    match parser.parse(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

/// Validate the argument list that follows a function name.
fn check_call(name: &str, token: &FunctionToken, after: &str) -> Result<(), LexError> {
    let Some(args) = after.strip_prefix('(') else {
        return Err(LexError::MissingCallParen {
            name: name.to_string(),
        });
    };

    let mut depth = 1usize;
    let mut commas = 0usize;
    let mut closed = false;
    for c in args.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    closed = true;
                    break;
                }
            }
            ',' if depth == 1 => commas += 1,
            _ => {}
        }
    }

    if !closed {
        return Err(LexError::UnbalancedCall {
            name: name.to_string(),
        });
    }
    if commas != token.arity.saturating_sub(1) {
        return Err(LexError::ArityMismatch {
            name: name.to_string(),
            expected: token.arity,
            found: commas + 1,
        });
    }
    Ok(())
}

//! # Shunting-yard parser
//!
//! Reorders lexed tokens into postfix order using operator precedence and
//! associativity. Commas are dropped here; they only exist so the lexer can
//! check function arity.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::error::ParseError;
use crate::token::Token;

/// Converts infix token sequences to postfix.
#[derive(Debug, Default, Clone)]
pub struct Shunter {
    output: VecDeque<Token>,
    stack: Vec<Token>,
}

/// Shunt `tokens` into postfix order.
pub fn shunt(tokens: Vec<Token>) -> Result<VecDeque<Token>, ParseError> {
    Shunter::new().shunt(tokens)
}

impl Shunter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the shunter and produce the postfix sequence for `tokens`.
    pub fn shunt(mut self, tokens: Vec<Token>) -> Result<VecDeque<Token>, ParseError> {
        for token in tokens {
            match token {
                Token::NoToken => return Err(ParseError::UnexpectedToken { id: token.id() }),
                Token::Constant(_) | Token::Variable(_) => self.output.push_back(token),
                Token::Function(_) | Token::LeftParen => self.stack.push(token),
                Token::UnaryOperator(_) | Token::BinaryOperator(_) => self.handle_operator(token)?,
                Token::RightParen => self.handle_right_paren()?,
                Token::Comma => {}
            }
        }

        while let Some(top) = self.stack.pop() {
            match top {
                Token::LeftParen => return Err(ParseError::MismatchedParentheses),
                Token::UnaryOperator(_) | Token::BinaryOperator(_) => {
                    trace!("draining operator id {}", top.id());
                    self.output.push_back(top);
                }
                other => {
                    // Anything else left behind means the input never reduced.
                    self.stack.push(other);
                    break;
                }
            }
        }

        if !self.stack.is_empty() {
            return Err(ParseError::LeftoverOperators {
                remaining: self.stack.len(),
            });
        }

        debug!("shunted into {} postfix tokens", self.output.len());
        Ok(self.output)
    }

    fn handle_operator(&mut self, token: Token) -> Result<(), ParseError> {
        let (precedence, left_assoc) = token
            .operator_info()
            .ok_or(ParseError::UnexpectedToken { id: token.id() })?;

        while let Some(top) = self.stack.last() {
            match top {
                Token::LeftParen => break,
                Token::UnaryOperator(_) | Token::BinaryOperator(_) => {
                    let (top_precedence, _) = top
                        .operator_info()
                        .ok_or(ParseError::UnexpectedStackToken { id: top.id() })?;
                    let pops = top_precedence > precedence
                        || (top_precedence == precedence && left_assoc);
                    if !pops {
                        break;
                    }
                }
                other => return Err(ParseError::UnexpectedStackToken { id: other.id() }),
            }

            if let Some(popped) = self.stack.pop() {
                self.output.push_back(popped);
            }
        }

        self.stack.push(token);
        Ok(())
    }

    fn handle_right_paren(&mut self) -> Result<(), ParseError> {
        loop {
            match self.stack.pop() {
                None => return Err(ParseError::MismatchedParentheses),
                Some(Token::LeftParen) => break,
                Some(token) => self.output.push_back(token),
            }
        }

        if matches!(self.stack.last(), Some(Token::Function(_))) {
            if let Some(function) = self.stack.pop() {
                self.output.push_back(function);
            }
        }
        Ok(())
    }
}

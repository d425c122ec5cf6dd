//! Number literal recognition.
//!
//! Literals have the form `digits[.digits][(e|E)[+|-]digits][i]`. A trailing
//! `i` marks an imaginary literal.

use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    sequence::pair,
    IResult, Parser,
};

use crate::error::LexError;
use crate::token::{Constant, Number};

/// Recognize the real part of a literal without converting it.
fn mantissa(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize((
        digit1,
        opt(pair(char('.'), digit1)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ));
    parser.parse(input)
}

/// Parse a number literal, returning the digits and whether it is imaginary.
pub fn number_literal(input: &str) -> IResult<&str, (&str, bool)> {
    let (input, digits) = mantissa(input)?;
    let mut imaginary_parser = opt(char::<&str, nom::error::Error<&str>>('i'));
    let (input, imaginary) = imaginary_parser.parse(input)?;
    Ok((input, (digits, imaginary.is_some())))
}

/// Convert recognized digits into a constant.
///
/// Real literals equal to `0` or `1` collapse into the `Zero` and `Unity`
/// sentinels so the algebra tables apply to them directly.
pub fn to_constant(digits: &str, imaginary: bool) -> Result<Constant, LexError> {
    let value: f64 = digits.parse().map_err(|_| LexError::InvalidNumber {
        literal: digits.to_string(),
    })?;

    if imaginary {
        return Ok(Constant::Number(Number::imaginary(value)));
    }
    if value == 0.0 {
        Ok(Constant::zero())
    } else if value == 1.0 {
        Ok(Constant::unity())
    } else {
        Ok(Constant::real(value))
    }
}

/// Lex a number at the start of `input`, returning the constant and the rest.
pub fn lex_number(input: &str) -> Option<Result<(Constant, &str), LexError>> {
    let (rest, (digits, imaginary)) = number_literal(input).ok()?;
    Some(to_constant(digits, imaginary).map(|c| (c, rest)))
}

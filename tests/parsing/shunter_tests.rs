//! Integration tests for operator precedence and the shunting-yard pass.

use approx::assert_relative_eq;
use exprdiff_rs::error::{ExprError, ParseError};
use exprdiff_rs::node::FetcherMap;
use exprdiff_rs::token::{ids, Token};
use exprdiff_rs::{lex, Expression, LexContext, Shunter};

use crate::test_helpers::eval_scalar;

fn postfix_ids(source: &str) -> Vec<i32> {
    let tokens = lex(source, &LexContext::new()).unwrap();
    Shunter::new()
        .shunt(tokens)
        .unwrap()
        .iter()
        .map(Token::id)
        .collect()
}

#[test]
fn test_postfix_order() {
    assert_eq!(
        postfix_ids("2+3*4"),
        vec![ids::NUMBER, ids::NUMBER, ids::NUMBER, ids::MUL, ids::ADD]
    );
    assert_eq!(
        postfix_ids("(2+3)*4"),
        vec![ids::NUMBER, ids::NUMBER, ids::ADD, ids::NUMBER, ids::MUL]
    );
    // Commas are dropped and the function follows its arguments.
    assert_eq!(
        postfix_ids("pow(2,3)"),
        vec![ids::NUMBER, ids::NUMBER, ids::POW_FN]
    );
}

#[test]
fn test_precedence() {
    assert_relative_eq!(eval_scalar("2+3*4"), 14.0);
    assert_relative_eq!(eval_scalar("2*3^2"), 18.0);
    assert_relative_eq!(eval_scalar("(2+3)*4"), 20.0);
    assert_relative_eq!(eval_scalar("2*(3+4)-5/2"), 11.5);
}

#[test]
fn test_associativity() {
    // `^` is right associative, the others left associative.
    assert_relative_eq!(eval_scalar("2^3^2"), 512.0);
    assert_relative_eq!(eval_scalar("8-4-2"), 2.0);
    assert_relative_eq!(eval_scalar("16/4/2"), 2.0);
}

#[test]
fn test_unary_minus_binds_looser_than_power() {
    assert_relative_eq!(eval_scalar("-2^2"), -4.0);
    assert_relative_eq!(eval_scalar("-3"), -3.0);
    assert_relative_eq!(eval_scalar("2-3"), -1.0);
    assert_relative_eq!(eval_scalar("2*(-3)"), -6.0);
}

#[test]
fn test_functions_in_expressions() {
    assert_relative_eq!(eval_scalar("pow(2,3)+atan2(0,1)"), 8.0);
    assert_relative_eq!(eval_scalar("sqrt(16)*log10(100)"), 8.0, epsilon = 1e-12);
}

#[test]
fn test_mismatched_parentheses() {
    let ctx = LexContext::new();
    let fetchers = FetcherMap::new();
    for source in ["(2+3", "2+3)", "((2)"] {
        let err = Expression::compile(source, &ctx, &fetchers).unwrap_err();
        assert!(
            matches!(err, ExprError::Parse(ParseError::MismatchedParentheses)),
            "{}: {:?}",
            source,
            err
        );
    }
}

//! Integration tests for the lexer.

use exprdiff_rs::error::LexError;
use exprdiff_rs::token::{ids, Constant, Token};
use exprdiff_rs::{lex, LexContext};

fn ids_of(source: &str, ctx: &LexContext) -> Vec<i32> {
    lex(source, ctx).unwrap().iter().map(Token::id).collect()
}

#[test]
fn test_unary_minus_at_start() {
    let ctx = LexContext::new();
    assert_eq!(ids_of("-3", &ctx), vec![ids::NEG, ids::NUMBER]);
    assert_eq!(ids_of("(-3)", &ctx), vec![ids::LEFT_PAREN, ids::NEG, ids::NUMBER, ids::RIGHT_PAREN]);
}

#[test]
fn test_binary_minus_after_operand() {
    let ctx = LexContext::new();
    assert_eq!(ids_of("2-3", &ctx), vec![ids::NUMBER, ids::SUB, ids::NUMBER]);
}

#[test]
fn test_double_minus_is_rejected() {
    let ctx = LexContext::new();
    let err = lex("2--3", &ctx).unwrap_err();
    assert_eq!(
        err,
        LexError::DisallowedAdjacency {
            previous: ids::SUB,
            operator: ids::SUB
        }
    );

    assert!(matches!(lex("*2", &ctx), Err(LexError::DisallowedAdjacency { .. })));
}

#[test]
fn test_whitespace_is_skipped() {
    let ctx = LexContext::new().with_variables(["x"]);
    assert_eq!(ids_of("  2 *\tx ", &ctx), ids_of("2*x", &ctx));
}

#[test]
fn test_number_literals() {
    let ctx = LexContext::new();
    let tokens = lex("0.0+1+1.5e3+2i", &ctx).unwrap();

    assert_eq!(tokens[0], Token::Constant(Constant::zero()));
    assert_eq!(tokens[2], Token::Constant(Constant::unity()));
    assert_eq!(tokens[4], Token::Constant(Constant::real(1500.0)));
    match &tokens[6] {
        Token::Constant(c) => {
            assert!(c.is_imaginary());
            assert_eq!(c.value().im, 2.0);
        }
        other => panic!("expected a constant, got {:?}", other),
    }
}

#[test]
fn test_function_arity_is_enforced() {
    let ctx = LexContext::new();
    assert!(lex("pow(2,3)", &ctx).is_ok());

    assert_eq!(
        lex("pow(2)", &ctx).unwrap_err(),
        LexError::ArityMismatch {
            name: "pow".to_string(),
            expected: 2,
            found: 1
        }
    );
    assert!(matches!(
        lex("atan2(1,2,3)", &ctx),
        Err(LexError::ArityMismatch { found: 3, .. })
    ));

    // Commas of nested calls do not count.
    assert!(lex("sin(pow(2,3))", &ctx).is_ok());
}

#[test]
fn test_malformed_calls() {
    let ctx = LexContext::new();
    assert!(matches!(lex("sin 2", &ctx), Err(LexError::MissingCallParen { .. })));
    assert!(matches!(lex("sin(2", &ctx), Err(LexError::UnbalancedCall { .. })));
}

#[test]
fn test_unknown_input() {
    let ctx = LexContext::new().with_variables(["x"]);
    assert!(matches!(lex("x $ 2", &ctx), Err(LexError::NoMatch { .. })));
    assert!(matches!(lex("z", &ctx), Err(LexError::NoMatch { .. })));
}

#[test]
fn test_longest_variable_wins() {
    let ctx = LexContext::new().with_variables(["b", "b0"]);
    let tokens = lex("b0*b", &ctx).unwrap();
    assert_eq!(tokens.len(), 3);
    match (&tokens[0], &tokens[2]) {
        (Token::Variable(first), Token::Variable(second)) => {
            assert_eq!(first.name, "b0");
            assert_eq!(second.name, "b");
        }
        other => panic!("expected two variables, got {:?}", other),
    }
}

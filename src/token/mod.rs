//! # Token taxonomy
//!
//! Tokens are the closed vocabulary shared by the lexer, the shunter and the
//! node builder. Every token has a stable integer id (used for identity
//! comparisons and the lexer's lookback checks) and a [`TokenType`].
//!
//! The four sentinels `Zero`, `Unity`, `NegUnity` and `Nan` together with
//! [`Number`] form the [`Constant`] set that the [`algebra`] tables operate
//! on. Sentinels stand for exactly known values and carry the shape they
//! broadcast to, so derivatives of constant sub-expressions never need a
//! real tensor.

pub mod algebra;

use std::fmt;

use num_complex::Complex64;

use crate::tensor::{scalar_shape, Shape};

/// Stable integer identifier of a token.
pub type TokenId = i32;

/// Ids of the tokens every lexer knows about.
pub mod ids {
    use super::TokenId;

    pub const NO_TOKEN: TokenId = 0;
    pub const LEFT_PAREN: TokenId = 1;
    pub const RIGHT_PAREN: TokenId = 2;
    pub const COMMA: TokenId = 3;
    pub const UNITY: TokenId = 4;
    pub const NEG_UNITY: TokenId = 5;
    pub const ZERO: TokenId = 6;
    pub const NAN: TokenId = 7;
    pub const NUMBER: TokenId = 8;
    pub const VARIABLE: TokenId = 9;

    // Default operators
    pub const NEG: TokenId = 10;
    pub const POW: TokenId = 11;
    pub const MUL: TokenId = 12;
    pub const DIV: TokenId = 13;
    pub const ADD: TokenId = 14;
    pub const SUB: TokenId = 15;

    // Default functions
    pub const SIN: TokenId = 16;
    pub const COS: TokenId = 17;
    pub const TAN: TokenId = 18;
    pub const ASIN: TokenId = 19;
    pub const ACOS: TokenId = 20;
    pub const ATAN: TokenId = 21;
    pub const ATAN2: TokenId = 22;
    pub const SINH: TokenId = 23;
    pub const COSH: TokenId = 24;
    pub const TANH: TokenId = 25;
    pub const ASINH: TokenId = 26;
    pub const ACOSH: TokenId = 27;
    pub const ATANH: TokenId = 28;
    pub const EXP: TokenId = 29;
    pub const LOG: TokenId = 30;
    pub const LOG10: TokenId = 31;
    pub const SQRT: TokenId = 32;
    pub const SQUARE: TokenId = 33;
    pub const ABS: TokenId = 34;
    pub const POW_FN: TokenId = 35;

    /// First id free for user registered operators and functions.
    pub const FIRST_CUSTOM: TokenId = 64;
}

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    NoToken,
    UnaryOperator,
    BinaryOperator,
    Function,
    Variable,
    Number,
    Zero,
    Unity,
    NegUnity,
    Nan,
    LeftParen,
    RightParen,
    Comma,
}

/// A complex-aware number with a broadcast shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: Complex64,
    pub is_imaginary: bool,
    pub shape: Shape,
}

impl Number {
    /// A number with an explicit value, flag and shape.
    pub fn new(value: Complex64, is_imaginary: bool, shape: Shape) -> Self {
        Self {
            value,
            is_imaginary,
            shape,
        }
    }

    /// A real number of scalar shape.
    pub fn real(value: f64) -> Self {
        Self::new(Complex64::new(value, 0.0), false, scalar_shape())
    }

    /// A purely imaginary number `value * i` of scalar shape.
    pub fn imaginary(value: f64) -> Self {
        Self::new(Complex64::new(0.0, value), true, scalar_shape())
    }

    /// The real part if the number has no imaginary component.
    pub fn as_real(&self) -> Option<f64> {
        if self.value.im == 0.0 {
            Some(self.value.re)
        } else {
            None
        }
    }
}

/// A constant with an exactly known value: either a symbolic sentinel or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Zero(Shape),
    Unity(Shape),
    NegUnity(Shape),
    Nan(Shape),
    Number(Number),
}

impl Constant {
    pub fn zero() -> Self {
        Constant::Zero(scalar_shape())
    }

    pub fn unity() -> Self {
        Constant::Unity(scalar_shape())
    }

    pub fn neg_unity() -> Self {
        Constant::NegUnity(scalar_shape())
    }

    pub fn nan() -> Self {
        Constant::Nan(scalar_shape())
    }

    pub fn real(value: f64) -> Self {
        Constant::Number(Number::real(value))
    }

    /// Wrap a computed number. Exact real `0`, `1`, `-1` and NaN collapse into
    /// their sentinels, the same way the lexer collapses literals.
    pub fn from_number(num: Number) -> Self {
        if num.is_imaginary || num.value.im != 0.0 {
            return Constant::Number(num);
        }
        let re = num.value.re;
        if re == 0.0 {
            Constant::Zero(num.shape)
        } else if re == 1.0 {
            Constant::Unity(num.shape)
        } else if re == -1.0 {
            Constant::NegUnity(num.shape)
        } else if re.is_nan() {
            Constant::Nan(num.shape)
        } else {
            Constant::Number(num)
        }
    }

    pub fn id(&self) -> TokenId {
        match self {
            Constant::Zero(_) => ids::ZERO,
            Constant::Unity(_) => ids::UNITY,
            Constant::NegUnity(_) => ids::NEG_UNITY,
            Constant::Nan(_) => ids::NAN,
            Constant::Number(_) => ids::NUMBER,
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            Constant::Zero(_) => TokenType::Zero,
            Constant::Unity(_) => TokenType::Unity,
            Constant::NegUnity(_) => TokenType::NegUnity,
            Constant::Nan(_) => TokenType::Nan,
            Constant::Number(_) => TokenType::Number,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Constant::Zero(shape)
            | Constant::Unity(shape)
            | Constant::NegUnity(shape)
            | Constant::Nan(shape) => shape,
            Constant::Number(num) => &num.shape,
        }
    }

    /// The same constant kind with a different shape.
    pub fn with_shape(&self, shape: Shape) -> Self {
        match self {
            Constant::Zero(_) => Constant::Zero(shape),
            Constant::Unity(_) => Constant::Unity(shape),
            Constant::NegUnity(_) => Constant::NegUnity(shape),
            Constant::Nan(_) => Constant::Nan(shape),
            Constant::Number(num) => Constant::Number(Number::new(num.value, num.is_imaginary, shape)),
        }
    }

    /// The value this constant stands for.
    pub fn value(&self) -> Complex64 {
        match self {
            Constant::Zero(_) => Complex64::new(0.0, 0.0),
            Constant::Unity(_) => Complex64::new(1.0, 0.0),
            Constant::NegUnity(_) => Complex64::new(-1.0, 0.0),
            Constant::Nan(_) => Complex64::new(f64::NAN, 0.0),
            Constant::Number(num) => num.value,
        }
    }

    /// Whether the value may carry an imaginary component.
    pub fn is_imaginary(&self) -> bool {
        matches!(self, Constant::Number(num) if num.is_imaginary)
    }

    /// Convert any constant into an explicit number of the same shape.
    pub fn to_number(&self) -> Number {
        match self {
            Constant::Number(num) => num.clone(),
            other => Number::new(other.value(), false, other.shape().to_vec()),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Constant::Zero(_))
    }

    pub fn is_unity(&self) -> bool {
        matches!(self, Constant::Unity(_))
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Zero(_) => write!(f, "0"),
            Constant::Unity(_) => write!(f, "1"),
            Constant::NegUnity(_) => write!(f, "(-1)"),
            Constant::Nan(_) => write!(f, "(0/0)"),
            Constant::Number(num) => {
                let Complex64 { re, im } = num.value;
                match (re, im) {
                    (re, im) if im == 0.0 && re < 0.0 => write!(f, "(-{})", -re),
                    (re, im) if im == 0.0 => write!(f, "{}", re),
                    (re, im) if re == 0.0 && im < 0.0 => write!(f, "(-{}i)", -im),
                    (re, im) if re == 0.0 => write!(f, "{}i", im),
                    (re, im) if im < 0.0 => write!(f, "({}-{}i)", re, -im),
                    (re, im) => write!(f, "({}+{}i)", re, im),
                }
            }
        }
    }
}

/// A reference to a declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableToken {
    pub name: String,
}

impl VariableToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A prefix operator such as unary minus.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperatorToken {
    pub id: TokenId,
    pub precedence: i32,
    pub is_left_associative: bool,
    /// Ids of tokens that may appear directly to the left of this operator.
    pub allowed_left: Vec<TokenId>,
}

/// An infix operator.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorToken {
    pub id: TokenId,
    pub precedence: i32,
    pub is_left_associative: bool,
    pub commutative: bool,
    pub anti_commutative: bool,
    /// Ids of tokens that must not appear directly to the left of this operator.
    pub disallowed_left: Vec<TokenId>,
}

/// A named function with a fixed number of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionToken {
    pub id: TokenId,
    pub arity: usize,
    pub commutative: bool,
    /// Groups of argument positions that may be permuted freely.
    pub commutative_inputs: Vec<Vec<usize>>,
    /// Argument pairs whose exchange negates the result.
    pub anti_commutative_inputs: Vec<(usize, usize)>,
}

impl FunctionToken {
    pub fn new(id: TokenId, arity: usize) -> Self {
        Self {
            id,
            arity,
            commutative: false,
            commutative_inputs: Vec::new(),
            anti_commutative_inputs: Vec::new(),
        }
    }
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Marks the start of an expression; never emitted by the lexer.
    NoToken,
    LeftParen,
    RightParen,
    Comma,
    Constant(Constant),
    Variable(VariableToken),
    UnaryOperator(UnaryOperatorToken),
    BinaryOperator(BinaryOperatorToken),
    Function(FunctionToken),
}

impl Token {
    pub fn id(&self) -> TokenId {
        match self {
            Token::NoToken => ids::NO_TOKEN,
            Token::LeftParen => ids::LEFT_PAREN,
            Token::RightParen => ids::RIGHT_PAREN,
            Token::Comma => ids::COMMA,
            Token::Constant(c) => c.id(),
            Token::Variable(_) => ids::VARIABLE,
            Token::UnaryOperator(op) => op.id,
            Token::BinaryOperator(op) => op.id,
            Token::Function(func) => func.id,
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            Token::NoToken => TokenType::NoToken,
            Token::LeftParen => TokenType::LeftParen,
            Token::RightParen => TokenType::RightParen,
            Token::Comma => TokenType::Comma,
            Token::Constant(c) => c.token_type(),
            Token::Variable(_) => TokenType::Variable,
            Token::UnaryOperator(_) => TokenType::UnaryOperator,
            Token::BinaryOperator(_) => TokenType::BinaryOperator,
            Token::Function(_) => TokenType::Function,
        }
    }

    /// Precedence and associativity, for operator tokens.
    pub fn operator_info(&self) -> Option<(i32, bool)> {
        match self {
            Token::UnaryOperator(op) => Some((op.precedence, op.is_left_associative)),
            Token::BinaryOperator(op) => Some((op.precedence, op.is_left_associative)),
            _ => None,
        }
    }

    /// Number of operands consumed when the token is reduced.
    pub fn arity(&self) -> usize {
        match self {
            Token::UnaryOperator(_) => 1,
            Token::BinaryOperator(_) => 2,
            Token::Function(func) => func.arity,
            _ => 0,
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Constant(_) | Token::Variable(_))
    }
}

impl From<Constant> for Token {
    fn from(c: Constant) -> Self {
        Token::Constant(c)
    }
}

//! Lexing context: the operator, function and variable registry.

use crate::token::{ids, BinaryOperatorToken, FunctionToken, TokenId, UnaryOperatorToken};

/// Precedence of the default operators.
pub mod precedence {
    pub const NEG: i32 = 10;
    pub const POW: i32 = 10;
    pub const MUL: i32 = 5;
    pub const DIV: i32 = 5;
    pub const ADD: i32 = 3;
    pub const SUB: i32 = 3;
}

/// Token ids after which a default unary operator may appear.
pub const DEFAULT_UNARY_ALLOWED: [TokenId; 3] = [ids::NO_TOKEN, ids::LEFT_PAREN, ids::COMMA];

/// Token ids that may not precede a default binary operator.
pub const DEFAULT_BINARY_DISALLOWED: [TokenId; 9] = [
    ids::NO_TOKEN,
    ids::LEFT_PAREN,
    ids::COMMA,
    ids::NEG,
    ids::POW,
    ids::MUL,
    ids::DIV,
    ids::ADD,
    ids::SUB,
];

/// A unary operator together with the string it is matched by.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperatorDef {
    pub symbol: String,
    pub token: UnaryOperatorToken,
}

/// A binary operator together with the string it is matched by.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorDef {
    pub symbol: String,
    pub token: BinaryOperatorToken,
}

/// A function together with its name.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub token: FunctionToken,
}

/// Registry consulted by the lexer.
///
/// Built once with the consuming `with_*` methods and read-only afterwards.
/// [`LexContext::new`] registers the default operators (`-` unary, `^ * / + -`
/// binary) and functions; [`LexContext::empty`] starts with nothing.
///
/// # Examples
///
/// ```
/// use exprdiff_rs::lexer::LexContext;
///
/// let ctx = LexContext::new().with_variables(["S0", "ADC", "b"]);
/// assert!(ctx.variables().iter().any(|v| v == "ADC"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LexContext {
    unary_operators: Vec<UnaryOperatorDef>,
    binary_operators: Vec<BinaryOperatorDef>,
    functions: Vec<FunctionDef>,
    variables: Vec<String>,
}

impl Default for LexContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LexContext {
    /// A context with the default operators and functions and no variables.
    pub fn new() -> Self {
        let mut ctx = Self::empty().with_unary_operator(
            "-",
            UnaryOperatorToken {
                id: ids::NEG,
                precedence: precedence::NEG,
                is_left_associative: false,
                allowed_left: DEFAULT_UNARY_ALLOWED.to_vec(),
            },
        );

        let binary = [
            ("^", ids::POW, precedence::POW, false, false, false),
            ("*", ids::MUL, precedence::MUL, true, true, false),
            ("/", ids::DIV, precedence::DIV, true, false, false),
            ("+", ids::ADD, precedence::ADD, true, true, false),
            ("-", ids::SUB, precedence::SUB, true, false, true),
        ];
        for (symbol, id, prec, left, commutative, anti_commutative) in binary {
            ctx = ctx.with_binary_operator(
                symbol,
                BinaryOperatorToken {
                    id,
                    precedence: prec,
                    is_left_associative: left,
                    commutative,
                    anti_commutative,
                    disallowed_left: DEFAULT_BINARY_DISALLOWED.to_vec(),
                },
            );
        }

        let functions = [
            ("sin", ids::SIN, 1),
            ("cos", ids::COS, 1),
            ("tan", ids::TAN, 1),
            ("asin", ids::ASIN, 1),
            ("acos", ids::ACOS, 1),
            ("atan", ids::ATAN, 1),
            ("atan2", ids::ATAN2, 2),
            ("sinh", ids::SINH, 1),
            ("cosh", ids::COSH, 1),
            ("tanh", ids::TANH, 1),
            ("asinh", ids::ASINH, 1),
            ("acosh", ids::ACOSH, 1),
            ("atanh", ids::ATANH, 1),
            ("exp", ids::EXP, 1),
            ("log", ids::LOG, 1),
            ("log10", ids::LOG10, 1),
            ("sqrt", ids::SQRT, 1),
            ("square", ids::SQUARE, 1),
            ("abs", ids::ABS, 1),
            ("pow", ids::POW_FN, 2),
        ];
        for (name, id, arity) in functions {
            ctx = ctx.with_function(name, FunctionToken::new(id, arity));
        }

        ctx
    }

    /// A context with no operators, functions or variables.
    pub fn empty() -> Self {
        Self {
            unary_operators: Vec::new(),
            binary_operators: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Declare additional variable names.
    pub fn with_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self = self.with_variable(name);
        }
        self
    }

    /// Declare a variable name. Duplicates are ignored.
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.variables.contains(&name) {
            self.variables.push(name);
            // Longest first, so a prefix never shadows a longer name.
            self.variables.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        }
        self
    }

    /// Register a unary operator matched by `symbol`.
    pub fn with_unary_operator(mut self, symbol: impl Into<String>, token: UnaryOperatorToken) -> Self {
        self.unary_operators.push(UnaryOperatorDef {
            symbol: symbol.into(),
            token,
        });
        self
    }

    /// Register a binary operator matched by `symbol`.
    pub fn with_binary_operator(
        mut self,
        symbol: impl Into<String>,
        token: BinaryOperatorToken,
    ) -> Self {
        self.binary_operators.push(BinaryOperatorDef {
            symbol: symbol.into(),
            token,
        });
        self
    }

    /// Register a function, replacing any function with the same name.
    pub fn with_function(mut self, name: impl Into<String>, token: FunctionToken) -> Self {
        let name = name.into();
        self.functions.retain(|f| f.name != name);
        self.functions.push(FunctionDef { name, token });
        self.functions
            .sort_by(|a, b| b.name.len().cmp(&a.name.len()).then_with(|| a.name.cmp(&b.name)));
        self
    }

    pub fn unary_operators(&self) -> &[UnaryOperatorDef] {
        &self.unary_operators
    }

    pub fn binary_operators(&self) -> &[BinaryOperatorDef] {
        &self.binary_operators
    }

    /// Registered functions, longest name first.
    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }

    /// Declared variables, longest name first.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The string an operator or function id is matched by.
    pub fn symbol_for(&self, id: TokenId) -> Option<&str> {
        self.unary_operators
            .iter()
            .find(|op| op.token.id == id)
            .map(|op| op.symbol.as_str())
            .or_else(|| {
                self.binary_operators
                    .iter()
                    .find(|op| op.token.id == id)
                    .map(|op| op.symbol.as_str())
            })
            .or_else(|| {
                self.functions
                    .iter()
                    .find(|f| f.token.id == id)
                    .map(|f| f.name.as_str())
            })
    }
}

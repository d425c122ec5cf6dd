//! # Compiled expressions
//!
//! [`Expression`] ties the stages together: lex, shunt, build. The compiled
//! tree is immutable and shared by every evaluation, and the runners handed
//! to a solver are plain closures over an `Arc<Expression>`.
//!
//! ```
//! use exprdiff_rs::expression::Expression;
//! use exprdiff_rs::lexer::LexContext;
//! use exprdiff_rs::node::{constant_fetcher, FetcherMap};
//! use ndarray::arr1;
//!
//! let ctx = LexContext::new().with_variables(["x"]);
//! let mut fetchers = FetcherMap::new();
//! fetchers.insert("x".to_string(), constant_fetcher(arr1(&[3.0]).into_dyn()));
//!
//! let expr = Expression::compile("x^2+1", &ctx, &fetchers).unwrap();
//! let value = expr.eval().unwrap().to_tensor().unwrap();
//! assert_eq!(value[[0]], 10.0);
//!
//! let slope = expr.diff("x").unwrap().to_tensor().unwrap();
//! assert_eq!(slope[[0]], 6.0);
//! ```

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::evaluated::Evaluated;
use crate::lexer::{LexContext, Lexer};
use crate::node::{build, FetcherMap, Node, NodeConstructorMap};
use crate::shunter::Shunter;
use crate::tensor::Tensor;

/// Zero-argument closure producing a value or a partial derivative.
pub type Runner = Arc<dyn Fn() -> Result<Evaluated> + Send + Sync>;

/// A compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Compile `source` with the default node constructors.
    pub fn compile(source: &str, ctx: &LexContext, fetchers: &FetcherMap) -> Result<Self> {
        Self::compile_with(source, ctx, fetchers, &NodeConstructorMap::default())
    }

    /// Compile `source` with caller-supplied node constructors.
    pub fn compile_with(
        source: &str,
        ctx: &LexContext,
        fetchers: &FetcherMap,
        constructors: &NodeConstructorMap,
    ) -> Result<Self> {
        let tokens = Lexer::new(ctx).lex(source)?;
        let postfix = Shunter::new().shunt(tokens)?;
        let root = build(postfix, constructors, fetchers)?;
        debug!("compiled '{}' into {} nodes", source, root.node_count());

        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Wrap an existing tree. The source is its printed form.
    pub fn from_node(root: Node) -> Self {
        Self {
            source: root.to_string(),
            root,
        }
    }

    /// The string the expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Names of the variables the expression reads.
    pub fn variables(&self) -> Vec<String> {
        self.root.variables()
    }

    pub fn eval(&self) -> Result<Evaluated> {
        self.root.eval()
    }

    /// Evaluate and materialize the result as a real tensor.
    pub fn eval_tensor(&self) -> Result<Tensor> {
        Ok(self.root.eval()?.to_tensor()?)
    }

    /// Partial derivative with respect to `wrt`, evaluated at the current values.
    pub fn diff(&self, wrt: &str) -> Result<Evaluated> {
        self.root.diff(wrt)
    }

    /// The symbolic partial derivative with respect to `wrt`.
    pub fn derivative(&self, wrt: &str) -> Result<Expression> {
        let root = self.root.derivative(wrt)?;
        debug!(
            "derivative of '{}' with respect to '{}' has {} nodes",
            self.source,
            wrt,
            root.node_count()
        );
        Ok(Self::from_node(root))
    }

    /// Closure evaluating the expression.
    pub fn value_runner(self: &Arc<Self>) -> Runner {
        let expr = Arc::clone(self);
        Arc::new(move || expr.eval())
    }

    /// One closure per name, each evaluating the partial derivative with
    /// respect to that name.
    pub fn derivative_runners<S: AsRef<str>>(self: &Arc<Self>, names: &[S]) -> Vec<Runner> {
        names
            .iter()
            .map(|name| {
                let expr = Arc::clone(self);
                let wrt = name.as_ref().to_string();
                Arc::new(move || expr.diff(&wrt)) as Runner
            })
            .collect()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

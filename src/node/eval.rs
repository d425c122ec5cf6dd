use super::Node;
use crate::error::Result;
use crate::evaluated::Evaluated;

impl Node {
    /// Evaluate the tree.
    ///
    /// Variables are re-read through their fetchers on every call. Constant
    /// operands are combined through the sentinel algebra, tensors through
    /// the elementwise backend.
    pub fn eval(&self) -> Result<Evaluated> {
        match self {
            Self::Number(c) => Ok(Evaluated::Symbol(c.clone())),

            Self::Tensor(t) => Ok(Evaluated::Value(t.clone())),

            Self::Variable(leaf) => Ok(Evaluated::Value(leaf.fetch())),

            Self::Unary(func, child) => {
                let value = child.eval()?;
                Ok(Evaluated::unary(*func, &value)?)
            }

            Self::Binary(op, lhs, rhs) => {
                let l = lhs.eval()?;
                let r = rhs.eval()?;
                Ok(Evaluated::binary(*op, &l, &r)?)
            }
        }
    }
}

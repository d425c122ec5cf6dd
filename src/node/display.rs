use std::fmt::{self, Write};

use super::{BinaryFn, Node, UnaryFn};

/// Fully parenthesised infix. Trees over real constants print as strings
/// the default lexer accepts again.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(c) => write!(f, "{}", c),
            Self::Tensor(t) => write!(f, "tensor{:?}", t.shape()),
            Self::Variable(leaf) => f.write_str(leaf.name()),
            Self::Unary(UnaryFn::Neg, child) => write!(f, "(-{})", child),
            Self::Unary(func, child) => write!(f, "{}({})", func.name(), child),
            Self::Binary(op, lhs, rhs) => match op.symbol() {
                Some(symbol) => write!(f, "({}{}{})", lhs, symbol, rhs),
                None => write!(f, "{}({},{})", op.name(), lhs, rhs),
            },
        }
    }
}

impl Node {
    /// Render the tree one node per line, children indented below parents.
    ///
    /// ```text
    /// op:mul
    ///   var : x
    ///   func:exp
    ///     var : y
    /// ```
    pub fn tree_string(&self) -> String {
        TreeView(self).to_string()
    }

    fn write_tree<W: Write>(&self, out: &mut W, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Self::Number(c) => writeln!(out, "{}num : {}", indent, c),
            Self::Tensor(t) => writeln!(out, "{}tensor : {:?}", indent, t.shape()),
            Self::Variable(leaf) => writeln!(out, "{}var : {}", indent, leaf.name()),
            Self::Unary(UnaryFn::Neg, _) => writeln!(out, "{}op:neg", indent),
            Self::Unary(func, _) => writeln!(out, "{}func:{}", indent, func.name()),
            Self::Binary(BinaryFn::Atan2, _, _) => writeln!(out, "{}func:atan2", indent),
            Self::Binary(op, _, _) => writeln!(out, "{}op:{}", indent, op.name()),
        }?;

        match self {
            Self::Unary(_, child) => child.write_tree(out, depth + 1),
            Self::Binary(_, lhs, rhs) => {
                lhs.write_tree(out, depth + 1)?;
                rhs.write_tree(out, depth + 1)
            }
            _ => Ok(()),
        }
    }
}

/// Display adapter printing a node in tree layout.
struct TreeView<'a>(&'a Node);

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_tree(f, 0)
    }
}

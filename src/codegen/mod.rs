//! Code generation seam
//!
//! A [`Generator`] converts blocks into target source code. Expression
//! blocks yield a code string paired with an operator-precedence [`Order`];
//! statement blocks yield a bare string. The two shapes are distinct
//! [`Generated`] variants rather than an untyped string-or-pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::block::Block;
use crate::core::workspace::Workspace;

/// Operator precedence of a generated expression.
///
/// Lower binds tighter. Generators compare child and parent orders to
/// decide where parentheses are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Order(pub u8);

impl Order {
    /// A single token; never needs parentheses
    pub const ATOMIC: Order = Order(0);
    /// Function call or member access
    pub const FUNCTION_CALL: Order = Order(2);
    /// Unary plus/minus/not
    pub const UNARY: Order = Order(4);
    /// `*` `/` `%`
    pub const MULTIPLICATION: Order = Order(5);
    /// `+` `-`
    pub const ADDITION: Order = Order(6);
    /// `<` `<=` `>` `>=` `==` `!=`
    pub const RELATIONAL: Order = Order(8);
    /// Weakest; always parenthesized when embedded
    pub const NONE: Order = Order(99);
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code produced for a single block.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// A statement (or statement chain); no precedence attached
    Statement(String),
    /// An expression and the precedence of its outermost operator
    Expression(String, Order),
}

impl Generated {
    /// The code string, whichever variant holds it.
    pub fn code(&self) -> &str {
        match self {
            Generated::Statement(code) => code,
            Generated::Expression(code, _) => code,
        }
    }

    /// The expression order, or `None` for a statement.
    pub fn order(&self) -> Option<Order> {
        match self {
            Generated::Statement(_) => None,
            Generated::Expression(_, order) => Some(*order),
        }
    }

    /// Unwrap into the code string, discarding any order.
    pub fn into_code(self) -> String {
        match self {
            Generated::Statement(code) => code,
            Generated::Expression(code, _) => code,
        }
    }
}

/// Code generation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    /// The generator has no rule for this block type
    #[error("generator has no rule for block type '{block_type}'")]
    UnsupportedBlock { block_type: String },

    /// A required input has no connected block
    #[error("block '{block_type}' is missing a block on input '{input}'")]
    MissingInput { block_type: String, input: String },

    /// A field value the generator cannot render
    #[error("block '{block_type}' has an unusable value in field '{field}'")]
    BadField { block_type: String, field: String },
}

/// Converts blocks into target source code.
pub trait Generator {
    /// The generator's name, used in reports (e.g. `"javascript"`).
    fn name(&self) -> &str;

    /// Reset per-workspace state before generating.
    ///
    /// Called once before whole-workspace generation and once before each
    /// single-block generation. Stateless generators can ignore it.
    fn init(&mut self, _workspace: &Workspace) {}

    /// Generate code for one block (and, for statements, its next chain).
    fn block_to_code(&mut self, block: &Block) -> Result<Generated, GeneratorError>;

    /// Generate code for the whole workspace.
    ///
    /// The default implementation initializes the generator, generates each
    /// top-level block in order, and joins the fragments with newlines.
    fn workspace_to_code(&mut self, workspace: &Workspace) -> Result<String, GeneratorError> {
        self.init(workspace);
        let mut fragments = Vec::with_capacity(workspace.top_blocks().len());
        for block in workspace.top_blocks() {
            fragments.push(self.block_to_code(block)?.into_code());
        }
        Ok(fragments.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_accessors() {
        let statement = Generated::Statement("print(5);".to_string());
        assert_eq!(statement.code(), "print(5);");
        assert_eq!(statement.order(), None);

        let expression = Generated::Expression("5".to_string(), Order::ATOMIC);
        assert_eq!(expression.code(), "5");
        assert_eq!(expression.order(), Some(Order::ATOMIC));
        assert_eq!(expression.into_code(), "5");
    }

    #[test]
    fn test_order_comparisons() {
        assert!(Order::ATOMIC < Order::MULTIPLICATION);
        assert!(Order::MULTIPLICATION < Order::ADDITION);
        assert!(Order::ADDITION < Order::NONE);
    }
}

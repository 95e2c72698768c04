//! Abstract Syntax Tree definitions for MochaScript
//!
//! A program is an ordered sequence of [`Node`]s. Each node exclusively owns
//! its children; the tree is built once by the parser and dropped after a
//! single evaluation pass.

use serde::Serialize;
use std::fmt;

/// A parsed program
pub type Program = Vec<Node>;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl BinOp {
    /// Source symbol of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Ge => ">=",
            BinOp::Le => "<=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinOp::Pow)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `elif` clause of an if statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    pub condition: Node,
    pub body: Vec<Node>,
}

/// Payload of `write(...)` / `writeln(...)`
///
/// The parser always fills exactly one side; the interpreter rejects
/// anything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WritePayload {
    pub text: Option<String>,
    pub expr: Option<Box<Node>>,
}

impl WritePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), expr: None }
    }

    pub fn expr(expr: Node) -> Self {
        Self { text: None, expr: Some(Box::new(expr)) }
    }
}

/// AST nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node")]
pub enum Node {
    // ==================== Literals ====================
    NumberLiteral { value: f64 },
    StringLiteral { value: String },
    BooleanLiteral { value: bool },

    // ==================== Expressions ====================
    Identifier { name: String },
    BinaryExpression {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },

    // ==================== Control Flow ====================
    IfStatement {
        condition: Box<Node>,
        then_branch: Vec<Node>,
        else_ifs: Vec<ElseIf>,
        else_branch: Option<Vec<Node>>,
    },
    ForStatement {
        init: Box<Node>,
        condition: Box<Node>,
        update: Box<Node>,
        body: Vec<Node>,
    },

    // ==================== Statements ====================
    DeclarationStatement {
        identifier: String,
        value: Box<Node>,
        mutable: bool,
    },
    AssignmentStatement {
        identifier: String,
        value: Box<Node>,
    },
    WriteStatement(WritePayload),
    WriteLineStatement(WritePayload),
    ReturnStatement { value: Box<Node> },
    CommentStatement { text: String },
}

impl Node {
    /// Name of the node variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Node::NumberLiteral { .. } => "NumberLiteral",
            Node::StringLiteral { .. } => "StringLiteral",
            Node::BooleanLiteral { .. } => "BooleanLiteral",
            Node::Identifier { .. } => "Identifier",
            Node::BinaryExpression { .. } => "BinaryExpression",
            Node::IfStatement { .. } => "IfStatement",
            Node::ForStatement { .. } => "ForStatement",
            Node::DeclarationStatement { .. } => "DeclarationStatement",
            Node::AssignmentStatement { .. } => "AssignmentStatement",
            Node::WriteStatement(_) => "WriteStatement",
            Node::WriteLineStatement(_) => "WriteLineStatement",
            Node::ReturnStatement { .. } => "ReturnStatement",
            Node::CommentStatement { .. } => "CommentStatement",
        }
    }

    /// Whether this node is an expression rather than a statement
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::NumberLiteral { .. }
                | Node::StringLiteral { .. }
                | Node::BooleanLiteral { .. }
                | Node::Identifier { .. }
                | Node::BinaryExpression { .. }
        )
    }

    pub fn binary(left: Node, op: BinOp, right: Node) -> Node {
        Node::BinaryExpression {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn number(value: f64) -> Node {
        Node::NumberLiteral { value }
    }

    pub fn ident(name: impl Into<String>) -> Node {
        Node::Identifier { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_names() {
        let node = Node::binary(Node::number(1.0), BinOp::Add, Node::ident("x"));
        assert_eq!(node.kind(), "BinaryExpression");
        assert!(node.is_expression());
        assert_eq!(BinOp::Ge.to_string(), ">=");

        let ret = Node::ReturnStatement { value: Box::new(Node::number(7.0)) };
        assert_eq!(ret.kind(), "ReturnStatement");
        assert!(!ret.is_expression());
    }

    #[test]
    fn test_only_pow_is_right_associative() {
        assert!(BinOp::Pow.is_right_associative());
        assert!(!BinOp::Sub.is_right_associative());
    }
}

//! Runtime module - values, scopes and the tree-walking evaluator

pub mod value;
pub mod environment;
pub mod interpreter;

pub use environment::{Environment, Variable};
pub use interpreter::{eval_expr, interpret, Interpreter, InterpreterOptions};
pub use value::Scalar;

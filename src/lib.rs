//! MochaScript
//!
//! A small scripting language run by a tree-walking interpreter:
//! source text is lexed into tokens, parsed into an AST and evaluated
//! against an [`Environment`] of nested variable scopes.

pub mod feedback;
pub mod frontend;
pub mod runtime;
pub mod utils;

use std::io::Write;

pub use frontend::{lex, parse};
pub use runtime::{Environment, Interpreter, InterpreterOptions, Scalar};
pub use utils::{Error, Result, Span};

/// Lex, parse and run `source` with default options.
///
/// Returns the exit code of a top-level `ret`, if one ran.
pub fn run_source<W: Write>(source: &str, env: &mut Environment, out: W) -> Result<Option<i32>> {
    run_source_with(source, env, out, InterpreterOptions::default())
}

/// [`run_source`] with explicit interpreter options
pub fn run_source_with<W: Write>(
    source: &str,
    env: &mut Environment,
    out: W,
    options: InterpreterOptions,
) -> Result<Option<i32>> {
    let program = parse(lex(source)?)?;
    Interpreter::with_options(out, options).interpret(&program, env)
}

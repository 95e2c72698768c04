//! Frontend module - Lexer, Parser

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

pub use lexer::lex;
pub use parser::parse;

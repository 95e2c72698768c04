//! Error handling for MochaScript

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Interpreter error
///
/// Every error is fatal for the current lex/parse/interpret call; nothing is
/// retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexer Errors ====================

    #[error("Unexpected character '{ch}' at {span}")]
    UnexpectedCharacter { ch: char, span: Span },

    #[error("Unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    // ==================== Parser Errors ====================

    #[error("Unexpected token {found} at {span}")]
    UnexpectedToken { found: String, span: Span },

    #[error("Expected {expected}, got {found} at {span}")]
    ExpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String },

    // ==================== Runtime Errors ====================

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Variable already declared in this scope: {name}")]
    DuplicateDeclaration { name: String },

    #[error("Cannot assign to immutable variable: {name}")]
    ImmutableAssignment { name: String },

    #[error("Cannot assign to undeclared variable: {name}")]
    UndeclaredAssignment { name: String },

    #[error("Identifier cannot be a keyword: {name}")]
    IllegalIdentifier { name: String },

    #[error("Invalid write payload: exactly one of text or expression must be set")]
    InvalidWritePayload,

    #[error("Unknown operator: {op}")]
    UnknownOperator { op: String },

    #[error("Unknown node: {kind}")]
    UnknownNode { kind: String },

    #[error("Cannot pop the global scope")]
    PopGlobalScope,

    #[error("Function already declared: {name}")]
    DuplicateFunction { name: String },

    #[error("Unknown function: {name}")]
    UndefinedFunction { name: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedCharacter { span, .. } => Some(*span),
            Self::UnterminatedString { span } => Some(*span),
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::ExpectedToken { span, .. } => Some(*span),
            _ => None,
        }
    }

    /// Stable diagnostic code for machine-readable reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "L001",
            Self::UnterminatedString { .. } => "L002",
            Self::UnexpectedToken { .. } => "P001",
            Self::ExpectedToken { .. } => "P002",
            Self::UnexpectedEndOfInput { .. } => "P003",
            Self::UndefinedVariable { .. } => "R001",
            Self::DuplicateDeclaration { .. } => "R002",
            Self::ImmutableAssignment { .. } => "R003",
            Self::UndeclaredAssignment { .. } => "R004",
            Self::IllegalIdentifier { .. } => "R005",
            Self::InvalidWritePayload => "R006",
            Self::UnknownOperator { .. } => "R007",
            Self::UnknownNode { .. } => "R008",
            Self::PopGlobalScope => "R009",
            Self::DuplicateFunction { .. } => "R010",
            Self::UndefinedFunction { .. } => "R011",
            Self::Io(_) => "R012",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

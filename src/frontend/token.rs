//! Token definitions for MochaScript

use crate::utils::Span;
use serde::Serialize;
use std::fmt;

/// Reserved words; none of these may be used as a variable name
pub const KEYWORDS: &[&str] = &[
    "def", "mut", "ret", "write", "writeln", "if", "elif", "else", "for", "true", "false",
];

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(flatten)]
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The text payload carried by the token, if any
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Alpha(s)
            | TokenKind::AlphaNum(s)
            | TokenKind::Number(s)
            | TokenKind::Str(s)
            | TokenKind::Comment(s) => Some(s),
            _ => None,
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text")]
pub enum TokenKind {
    // ============ Keywords ============
    /// def
    Def,
    /// mut
    Mut,
    /// ret
    Ret,
    /// write
    Write,
    /// writeln
    Writeln,
    /// if
    If,
    /// elif
    Elif,
    /// else
    Else,
    /// for
    For,
    /// true
    True,
    /// false
    False,

    // ============ Identifiers and Literals ============
    /// Identifier made of letters and underscores only
    Alpha(String),
    /// Identifier mixing letters/underscores with digits
    AlphaNum(String),
    /// Integer literal, kept as its digit run
    Number(String),
    /// `"` opening or closing a string literal
    StrDelim,
    /// String literal content between two delimiters
    Str(String),
    /// `@` line comment, without the sigil
    Comment(String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// ^
    Caret,
    /// =
    Assign,
    /// ==
    EqEq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// ;
    Semicolon,
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Def
                | TokenKind::Mut
                | TokenKind::Ret
                | TokenKind::Write
                | TokenKind::Writeln
                | TokenKind::If
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Try to convert a word to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "def" => Some(TokenKind::Def),
            "mut" => Some(TokenKind::Mut),
            "ret" => Some(TokenKind::Ret),
            "write" => Some(TokenKind::Write),
            "writeln" => Some(TokenKind::Writeln),
            "if" => Some(TokenKind::If),
            "elif" => Some(TokenKind::Elif),
            "else" => Some(TokenKind::Else),
            "for" => Some(TokenKind::For),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            _ => None,
        }
    }

    /// Whether this token can name a variable
    pub fn is_identifier(&self) -> bool {
        matches!(self, TokenKind::Alpha(_) | TokenKind::AlphaNum(_))
    }

    /// Get the precedence of a binary operator (for precedence climbing)
    /// Returns None if not a binary operator
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            // Exponentiation (right-associative)
            TokenKind::Caret => Some(4),

            // Multiplicative
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(3),

            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(2),

            // Comparison (lowest)
            TokenKind::Gt
            | TokenKind::Lt
            | TokenKind::Ge
            | TokenKind::Le
            | TokenKind::EqEq
            | TokenKind::Ne => Some(1),

            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Alpha(s) | TokenKind::AlphaNum(s) => write!(f, "identifier '{}'", s),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Str(s) => write!(f, "string content \"{}\"", s),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::StrDelim => write!(f, "'\"'"),
            TokenKind::Def => write!(f, "'def'"),
            TokenKind::Mut => write!(f, "'mut'"),
            TokenKind::Ret => write!(f, "'ret'"),
            TokenKind::Write => write!(f, "'write'"),
            TokenKind::Writeln => write!(f, "'writeln'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Elif => write!(f, "'elif'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::True => write!(f, "'true'"),
            TokenKind::False => write!(f, "'false'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::Ne => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Semicolon => write!(f, "';'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table_matches_keyword_list() {
        for word in KEYWORDS {
            let kind = TokenKind::keyword_from_str(word).expect("every listed word is a keyword");
            assert!(kind.is_keyword());
        }
        assert_eq!(TokenKind::keyword_from_str("return"), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(TokenKind::Caret.binary_precedence() > TokenKind::Star.binary_precedence());
        assert!(TokenKind::Star.binary_precedence() > TokenKind::Plus.binary_precedence());
        assert!(TokenKind::Plus.binary_precedence() > TokenKind::Le.binary_precedence());
        assert_eq!(TokenKind::Assign.binary_precedence(), None);
    }
}

//! Lexer for MochaScript
//!
//! Converts source code into a flat sequence of tokens in a single
//! left-to-right pass.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// Starts a line comment that runs to the next newline
const COMMENT_SIGIL: char = '@';

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line (1-based)
    line: usize,
    /// Current column (1-based)
    column: usize,
    /// Line and column of `start`
    start_line: usize,
    start_column: usize,
}

/// Lex `source` into its token sequence
pub fn lex(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Mark the current position as the start of a token
    fn begin(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line, self.start_column)
    }

    /// Create a token with the current span
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        let kind = TokenKind::keyword_from_str(&text).unwrap_or_else(|| {
            if text.chars().any(|c| c.is_ascii_digit()) {
                TokenKind::AlphaNum(text)
            } else {
                TokenKind::Alpha(text)
            }
        });

        self.make_token(kind)
    }

    /// Read an integer literal
    fn read_number(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.pos].iter().collect();
        self.make_token(TokenKind::Number(text))
    }

    /// Read a string literal as delimiter, content and delimiter tokens
    fn read_string(&mut self, out: &mut Vec<Token>) -> Result<()> {
        self.advance(); // consume opening quote
        let open = self.make_token(TokenKind::StrDelim);
        let open_span = open.span;
        out.push(open);

        self.begin();
        let mut value = String::new();

        loop {
            match self.peek() {
                None => return Err(Error::UnterminatedString { span: open_span }),
                Some('"') => break,
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                        }
                        None => return Err(Error::UnterminatedString { span: open_span }),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        out.push(self.make_token(TokenKind::Str(value)));

        self.begin();
        self.advance(); // consume closing quote
        out.push(self.make_token(TokenKind::StrDelim));
        Ok(())
    }

    /// Read a line comment; the newline itself is not part of it
    fn read_comment(&mut self) -> Token {
        self.advance(); // consume sigil
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        self.make_token(TokenKind::Comment(text))
    }

    /// Scan the next token(s) into `out`. Returns false at end of input.
    fn scan(&mut self, out: &mut Vec<Token>) -> Result<bool> {
        self.skip_whitespace();
        self.begin();

        let Some(c) = self.peek() else {
            return Ok(false);
        };

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' {
            out.push(self.read_identifier());
            return Ok(true);
        }

        // Numbers
        if c.is_ascii_digit() {
            out.push(self.read_number());
            return Ok(true);
        }

        if c == '"' {
            self.read_string(out)?;
            return Ok(true);
        }

        if c == COMMENT_SIGIL {
            out.push(self.read_comment());
            return Ok(true);
        }

        // Two-character comparisons win over their one-character prefixes
        let two = match (c, self.peek_next()) {
            ('<', Some('=')) => Some(TokenKind::Le),
            ('>', Some('=')) => Some(TokenKind::Ge),
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::Ne),
            _ => None,
        };
        if let Some(kind) = two {
            self.advance();
            self.advance();
            out.push(self.make_token(kind));
            return Ok(true);
        }

        // Operators and punctuation
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            _ => {
                self.advance();
                return Err(Error::UnexpectedCharacter { ch: c, span: self.make_span() });
            }
        };

        self.advance();
        out.push(self.make_token(kind));
        Ok(true)
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while self.scan(&mut tokens)? {}
        log::trace!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }
}

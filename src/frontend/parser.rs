//! Parser for MochaScript
//!
//! Recursive descent parser with precedence climbing for expressions.

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// Parse a token sequence into a program
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::from_tokens(tokens).parse_program()
}

/// Which statement the shared binding routine produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Declaration,
    Assignment,
}

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser from pre-tokenized input
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind()
            .is_some_and(|k| std::mem::discriminant(k) == std::mem::discriminant(kind))
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Zero-width span just past the last token
    fn end_span(&self) -> Span {
        match self.tokens.last() {
            Some(t) => Span::new(t.span.end, t.span.end, t.span.line, t.span.column + t.span.len()),
            None => Span::new(0, 0, 1, 1),
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        match self.current() {
            Some(token) => Error::ExpectedToken {
                expected: expected.to_string(),
                found: token.kind.to_string(),
                span: token.span,
            },
            None => Error::ExpectedToken {
                expected: expected.to_string(),
                found: "end of input".to_string(),
                span: self.end_span(),
            },
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.mismatch(&expected.to_string()))
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_comments(&mut self) {
        while matches!(self.current_kind(), Some(TokenKind::Comment(_))) {
            self.advance();
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_kind() {
            Some(TokenKind::Alpha(name)) | Some(TokenKind::AlphaNum(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.mismatch("identifier")),
        }
    }

    /// `"` content `"`
    fn parse_string_literal(&mut self) -> Result<String> {
        self.expect(TokenKind::StrDelim)?;
        let text = match self.current_kind() {
            Some(TokenKind::Str(text)) => text.clone(),
            _ => return Err(self.mismatch("string content")),
        };
        self.advance();
        self.expect(TokenKind::StrDelim)?;
        Ok(text)
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut program = Vec::new();

        loop {
            self.skip_comments();
            if self.is_at_end() {
                break;
            }
            program.push(self.parse_stmt()?);
        }

        log::debug!("parsed {} top-level statements", program.len());
        Ok(program)
    }

    fn parse_stmt(&mut self) -> Result<Node> {
        let Some(token) = self.current().cloned() else {
            return Err(Error::UnexpectedEndOfInput {
                expected: "statement".to_string(),
            });
        };

        match token.kind {
            TokenKind::Comment(text) => {
                self.advance();
                Ok(Node::CommentStatement { text })
            }
            TokenKind::Def => {
                self.advance();
                self.parse_binding(Binding::Declaration)
            }
            // Bare `mut x = ...;` declares a mutable variable
            TokenKind::Mut => self.parse_binding(Binding::Declaration),
            TokenKind::Alpha(_) | TokenKind::AlphaNum(_) => self.parse_binding(Binding::Assignment),
            TokenKind::If => {
                self.advance();
                self.parse_if()
            }
            TokenKind::For => {
                self.advance();
                self.parse_for()
            }
            TokenKind::Ret => {
                self.advance();
                self.parse_return()
            }
            TokenKind::Write => {
                self.advance();
                self.parse_write(false)
            }
            TokenKind::Writeln => {
                self.advance();
                self.parse_write(true)
            }
            other => Err(Error::UnexpectedToken {
                found: other.to_string(),
                span: token.span,
            }),
        }
    }

    /// `[mut] name = value;` for declarations, `name = value;` for assignments
    fn parse_binding(&mut self, binding: Binding) -> Result<Node> {
        let mutable = binding == Binding::Declaration && self.consume(&TokenKind::Mut);
        let identifier = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;

        let value = match self.current_kind() {
            Some(TokenKind::StrDelim) => Node::StringLiteral {
                value: self.parse_string_literal()?,
            },
            Some(TokenKind::True) => {
                self.advance();
                Node::BooleanLiteral { value: true }
            }
            Some(TokenKind::False) => {
                self.advance();
                Node::BooleanLiteral { value: false }
            }
            _ => self.parse_expr()?,
        };
        self.expect(TokenKind::Semicolon)?;

        let value = Box::new(value);
        Ok(match binding {
            Binding::Declaration => Node::DeclarationStatement {
                identifier,
                value,
                mutable,
            },
            Binding::Assignment => Node::AssignmentStatement { identifier, value },
        })
    }

    /// `{ stmt* }`; comments inside a block are kept as no-op statements
    fn parse_block(&mut self) -> Result<Vec<Node>> {
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }

        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_if(&mut self) -> Result<Node> {
        // A parenthesized condition is just a grouped primary
        let condition = self.parse_expr()?;
        let then_branch = self.parse_block()?;

        let mut else_ifs = Vec::new();
        while self.consume(&TokenKind::Elif) {
            let condition = self.parse_expr()?;
            let body = self.parse_block()?;
            else_ifs.push(ElseIf { condition, body });
        }

        let else_branch = if self.consume(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Node::IfStatement {
            condition: Box::new(condition),
            then_branch,
            else_ifs,
            else_branch,
        })
    }

    /// `for (init; condition; update) { body }`
    fn parse_for(&mut self) -> Result<Node> {
        self.expect(TokenKind::LParen)?;

        // init consumes its own `;`
        let init = if self.consume(&TokenKind::Def) || self.check(&TokenKind::Mut) {
            self.parse_binding(Binding::Declaration)?
        } else {
            self.parse_binding(Binding::Assignment)?
        };

        let condition = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;

        let is_assignment = self.current_kind().is_some_and(|k| k.is_identifier())
            && matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Assign));
        let update = if is_assignment {
            let identifier = self.expect_identifier()?;
            self.expect(TokenKind::Assign)?;
            Node::AssignmentStatement {
                identifier,
                value: Box::new(self.parse_expr()?),
            }
        } else {
            self.parse_expr()?
        };
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;

        Ok(Node::ForStatement {
            init: Box::new(init),
            condition: Box::new(condition),
            update: Box::new(update),
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Node> {
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Node::ReturnStatement {
            value: Box::new(value),
        })
    }

    /// `write(payload);` / `writeln(payload);`
    fn parse_write(&mut self, newline: bool) -> Result<Node> {
        self.expect(TokenKind::LParen)?;

        let payload = if self.check(&TokenKind::StrDelim) {
            WritePayload::text(self.parse_string_literal()?)
        } else {
            WritePayload::expr(self.parse_expr()?)
        };

        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(if newline {
            Node::WriteLineStatement(payload)
        } else {
            Node::WriteStatement(payload)
        })
    }

    // ==================== Expression Parsing (Precedence Climbing) ====================

    fn parse_expr(&mut self) -> Result<Node> {
        self.parse_expr_bp(0)
    }

    /// Parse expression with a minimum binding power
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Node> {
        let mut left = self.parse_primary()?;

        loop {
            let Some(op_token) = self.current() else {
                break;
            };
            let Some(bp) = op_token.kind.binary_precedence() else {
                break;
            };

            if bp < min_bp {
                break;
            }

            let op = Self::token_to_binop(&op_token.kind)?;
            self.advance();

            let next_bp = if op.is_right_associative() { bp } else { bp + 1 };
            let right = self.parse_expr_bp(next_bp)?;

            left = Node::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let Some(token) = self.current().cloned() else {
            return Err(Error::UnexpectedEndOfInput {
                expected: "expression".to_string(),
            });
        };

        match token.kind {
            TokenKind::Number(digits) => {
                self.advance();
                Ok(Node::NumberLiteral {
                    value: digits.parse().unwrap_or(f64::INFINITY),
                })
            }
            TokenKind::StrDelim => Ok(Node::StringLiteral {
                value: self.parse_string_literal()?,
            }),
            TokenKind::True => {
                self.advance();
                Ok(Node::BooleanLiteral { value: true })
            }
            TokenKind::False => {
                self.advance();
                Ok(Node::BooleanLiteral { value: false })
            }
            TokenKind::Alpha(name) | TokenKind::AlphaNum(name) => {
                self.advance();
                Ok(Node::Identifier { name })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            other => Err(Error::UnexpectedToken {
                found: other.to_string(),
                span: token.span,
            }),
        }
    }

    fn token_to_binop(kind: &TokenKind) -> Result<BinOp> {
        match kind {
            TokenKind::Plus => Ok(BinOp::Add),
            TokenKind::Minus => Ok(BinOp::Sub),
            TokenKind::Star => Ok(BinOp::Mul),
            TokenKind::Slash => Ok(BinOp::Div),
            TokenKind::Percent => Ok(BinOp::Mod),
            TokenKind::Caret => Ok(BinOp::Pow),
            TokenKind::Gt => Ok(BinOp::Gt),
            TokenKind::Lt => Ok(BinOp::Lt),
            TokenKind::Ge => Ok(BinOp::Ge),
            TokenKind::Le => Ok(BinOp::Le),
            TokenKind::EqEq => Ok(BinOp::Eq),
            TokenKind::Ne => Ok(BinOp::Ne),
            other => Err(Error::UnknownOperator { op: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::lex;

    fn parse_src(source: &str) -> Result<Program> {
        parse(lex(source)?)
    }

    fn num(value: f64) -> Node {
        Node::number(value)
    }

    #[test]
    fn test_declaration_and_assignment() {
        let program = parse_src("def x = 5; def mut y = 1; mut z = 2; x = 6;").unwrap();
        assert_eq!(
            program,
            vec![
                Node::DeclarationStatement {
                    identifier: "x".into(),
                    value: Box::new(num(5.0)),
                    mutable: false,
                },
                Node::DeclarationStatement {
                    identifier: "y".into(),
                    value: Box::new(num(1.0)),
                    mutable: true,
                },
                Node::DeclarationStatement {
                    identifier: "z".into(),
                    value: Box::new(num(2.0)),
                    mutable: true,
                },
                Node::AssignmentStatement {
                    identifier: "x".into(),
                    value: Box::new(num(6.0)),
                },
            ]
        );
    }

    #[test]
    fn test_literal_right_hand_sides() {
        let program = parse_src(r#"def s = "hi"; def b = false;"#).unwrap();
        assert!(matches!(
            &program[0],
            Node::DeclarationStatement { value, .. } if **value == Node::StringLiteral { value: "hi".into() }
        ));
        assert!(matches!(
            &program[1],
            Node::DeclarationStatement { value, .. } if **value == Node::BooleanLiteral { value: false }
        ));
    }

    #[test]
    fn test_precedence_and_associativity() {
        let program = parse_src("ret 2 + 3 * 4 > 1 - 2 - 3;").unwrap();
        let expected = Node::binary(
            Node::binary(num(2.0), BinOp::Add, Node::binary(num(3.0), BinOp::Mul, num(4.0))),
            BinOp::Gt,
            Node::binary(Node::binary(num(1.0), BinOp::Sub, num(2.0)), BinOp::Sub, num(3.0)),
        );
        assert_eq!(program, vec![Node::ReturnStatement { value: Box::new(expected) }]);
    }

    #[test]
    fn test_power_is_right_associative() {
        let program = parse_src("ret 2 ^ 3 ^ 2;").unwrap();
        let expected = Node::binary(num(2.0), BinOp::Pow, Node::binary(num(3.0), BinOp::Pow, num(2.0)));
        assert_eq!(program, vec![Node::ReturnStatement { value: Box::new(expected) }]);
    }

    #[test]
    fn test_parentheses_group() {
        let program = parse_src("ret (1 + 2) * x1;").unwrap();
        let expected = Node::binary(
            Node::binary(num(1.0), BinOp::Add, num(2.0)),
            BinOp::Mul,
            Node::ident("x1"),
        );
        assert_eq!(program, vec![Node::ReturnStatement { value: Box::new(expected) }]);
    }

    #[test]
    fn test_if_elif_else() {
        let program = parse_src(
            r#"
            if a > 0 { write("hi"); }
            elif (a == 0) { write("zero"); }
            else { write("bye"); }
            "#,
        )
        .unwrap();
        assert_eq!(program.len(), 1);
        match &program[0] {
            Node::IfStatement { condition, then_branch, else_ifs, else_branch } => {
                assert_eq!(**condition, Node::binary(Node::ident("a"), BinOp::Gt, num(0.0)));
                assert_eq!(then_branch, &vec![Node::WriteStatement(WritePayload::text("hi"))]);
                assert_eq!(else_ifs.len(), 1);
                assert_eq!(else_ifs[0].condition, Node::binary(Node::ident("a"), BinOp::Eq, num(0.0)));
                assert_eq!(else_ifs[0].body, vec![Node::WriteStatement(WritePayload::text("zero"))]);
                assert_eq!(
                    else_branch.as_deref(),
                    Some(&[Node::WriteStatement(WritePayload::text("bye"))][..])
                );
            }
            other => panic!("Expected IfStatement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_implicit_assignment_update() {
        let program = parse_src("for (def mut i = 0; i < 3; i = i + 1) { write(i); }").unwrap();
        match &program[0] {
            Node::ForStatement { init, condition, update, body } => {
                assert!(matches!(**init, Node::DeclarationStatement { mutable: true, .. }));
                assert_eq!(**condition, Node::binary(Node::ident("i"), BinOp::Lt, num(3.0)));
                assert_eq!(
                    **update,
                    Node::AssignmentStatement {
                        identifier: "i".into(),
                        value: Box::new(Node::binary(Node::ident("i"), BinOp::Add, num(1.0))),
                    }
                );
                assert_eq!(body, &vec![Node::WriteStatement(WritePayload::expr(Node::ident("i")))]);
            }
            other => panic!("Expected ForStatement, got {:?}", other),
        }
    }

    #[test]
    fn test_for_with_expression_update_and_assignment_init() {
        let program = parse_src("for (i = 0; i < 3; i + 1) { }").unwrap();
        match &program[0] {
            Node::ForStatement { init, update, body, .. } => {
                assert!(matches!(**init, Node::AssignmentStatement { .. }));
                assert_eq!(**update, Node::binary(Node::ident("i"), BinOp::Add, num(1.0)));
                assert!(body.is_empty());
            }
            other => panic!("Expected ForStatement, got {:?}", other),
        }
    }

    #[test]
    fn test_comments() {
        let program = parse_src("@ top\nif 1 { @ inside\n writeln(1); @ last\n }\n@ end").unwrap();
        assert_eq!(program.len(), 1);
        match &program[0] {
            Node::IfStatement { then_branch, .. } => {
                assert_eq!(then_branch.len(), 3);
                assert_eq!(then_branch[0], Node::CommentStatement { text: " inside".into() });
                assert!(matches!(then_branch[1], Node::WriteLineStatement(_)));
            }
            other => panic!("Expected IfStatement, got {:?}", other),
        }
        assert!(parse_src("@ only a comment").unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_token_at_statement_start() {
        let err = parse_src("def x = 1;\n+ 2;").unwrap_err();
        match err {
            Error::UnexpectedToken { found, span } => {
                assert_eq!(found, "'+'");
                assert_eq!(span.line, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(parse_src("else { }"), Err(Error::UnexpectedToken { .. })));
    }

    #[test]
    fn test_expected_token() {
        let err = parse_src("def x 5;").unwrap_err();
        assert!(matches!(
            err,
            Error::ExpectedToken { ref expected, ref found, .. } if expected == "'='" && found == "number 5"
        ));

        let err = parse_src("def if = 5;").unwrap_err();
        assert!(matches!(err, Error::ExpectedToken { ref expected, .. } if expected == "identifier"));
    }

    #[test]
    fn test_missing_token_at_end_of_input() {
        let err = parse_src("write(1)").unwrap_err();
        assert!(matches!(
            err,
            Error::ExpectedToken { ref expected, ref found, .. } if expected == "';'" && found == "end of input"
        ));

        let err = parse_src("if 1 { write(1);").unwrap_err();
        assert!(matches!(err, Error::ExpectedToken { ref expected, .. } if expected == "'}'"));
    }

    #[test]
    fn test_end_of_input_mid_expression() {
        assert_eq!(
            parse_src("def x = 1 +").unwrap_err(),
            Error::UnexpectedEndOfInput { expected: "expression".into() }
        );
    }

    #[test]
    fn test_string_literal_payload_is_verbatim_text() {
        let program = parse_src(r#"writeln("a + b");"#).unwrap();
        assert_eq!(program, vec![Node::WriteLineStatement(WritePayload::text("a + b"))]);
    }
}

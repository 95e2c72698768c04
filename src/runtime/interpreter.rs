//! Tree-walking interpreter for MochaScript
//!
//! Statements evaluate to `Option<Scalar>`: `Some` means a `ret` was reached
//! and the value is travelling outward. Blocks stop at the first `Some` and
//! hand it to their parent; at the top level it becomes the exit code.

use std::io::Write;

use crate::frontend::ast::{BinOp, ElseIf, Node, WritePayload};
use crate::frontend::token::KEYWORDS;
use crate::runtime::environment::Environment;
use crate::runtime::value::Scalar;
use crate::utils::{Error, Result};

/// Interpreter configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Give if/elif/else branches and for-loops their own scope. Off by
    /// default: declarations inside those blocks land in the enclosing scope.
    pub block_scope: bool,
}

/// Run `program` against `env`, writing program output to `out`.
///
/// Returns `Some(code)` when a `ret` ended the program.
pub fn interpret<W: Write>(program: &[Node], env: &mut Environment, out: W) -> Result<Option<i32>> {
    Interpreter::new(out).interpret(program, env)
}

/// Evaluate an expression node
pub fn eval_expr(node: &Node, env: &Environment) -> Result<Scalar> {
    match node {
        Node::NumberLiteral { value } => Ok(Scalar::Number(*value)),
        Node::StringLiteral { value } => Ok(Scalar::Str(value.clone())),
        Node::BooleanLiteral { value } => Ok(Scalar::Bool(*value)),
        Node::Identifier { name } => Ok(env.get_var(name)?.value.clone()),
        Node::BinaryExpression { left, op, right } => {
            let l = eval_expr(left, env)?.to_number();
            let r = eval_expr(right, env)?.to_number();
            Ok(Scalar::Number(apply_binop(*op, l, r)))
        }
        other => Err(Error::UnknownNode {
            kind: other.kind().to_string(),
        }),
    }
}

/// Arithmetic on f64; comparisons yield 1 or 0
fn apply_binop(op: BinOp, l: f64, r: f64) -> f64 {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Mod => l % r,
        BinOp::Pow => l.powf(r),
        BinOp::Gt => flag(l > r),
        BinOp::Lt => flag(l < r),
        BinOp::Ge => flag(l >= r),
        BinOp::Le => flag(l <= r),
        BinOp::Eq => flag(l == r),
        BinOp::Ne => flag(l != r),
    }
}

/// The interpreter; owns the output sink, borrows the environment per call
pub struct Interpreter<W: Write> {
    out: W,
    options: InterpreterOptions,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, InterpreterOptions::default())
    }

    pub fn with_options(out: W, options: InterpreterOptions) -> Self {
        Self { out, options }
    }

    /// Give back the output sink
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Execute every top-level statement in order. The first returned value
    /// stops the program and is converted to an exit code.
    pub fn interpret(&mut self, program: &[Node], env: &mut Environment) -> Result<Option<i32>> {
        for node in program {
            if let Some(value) = self.eval_stmt(node, env)? {
                let code = value.to_exit_code();
                log::debug!("program returned {} (exit code {})", value, code);
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    /// Execute one statement
    pub fn eval_stmt(&mut self, node: &Node, env: &mut Environment) -> Result<Option<Scalar>> {
        log::trace!("exec {}", node.kind());

        match node {
            Node::DeclarationStatement {
                identifier,
                value,
                mutable,
            } => {
                if KEYWORDS.contains(&identifier.as_str()) {
                    return Err(Error::IllegalIdentifier {
                        name: identifier.clone(),
                    });
                }
                let value = eval_expr(value, env)?;
                env.declare_var(identifier, value, *mutable)?;
                Ok(None)
            }

            Node::AssignmentStatement { identifier, value } => {
                if !env.has_var(identifier) {
                    return Err(Error::UndeclaredAssignment {
                        name: identifier.clone(),
                    });
                }
                let value = eval_expr(value, env)?;
                env.assign_var(identifier, value)?;
                Ok(None)
            }

            Node::IfStatement {
                condition,
                then_branch,
                else_ifs,
                else_branch,
            } => self.eval_if(condition, then_branch, else_ifs, else_branch.as_deref(), env),

            Node::ForStatement {
                init,
                condition,
                update,
                body,
            } => {
                if self.options.block_scope {
                    env.with_scope(|env| self.eval_for(init, condition, update, body, env))
                } else {
                    self.eval_for(init, condition, update, body, env)
                }
            }

            Node::WriteStatement(payload) => {
                self.write_payload(payload, env, false)?;
                Ok(None)
            }

            Node::WriteLineStatement(payload) => {
                self.write_payload(payload, env, true)?;
                Ok(None)
            }

            Node::ReturnStatement { value } => Ok(Some(eval_expr(value, env)?)),

            Node::CommentStatement { .. } => Ok(None),

            // Bare expression (a for-loop update): evaluated, value dropped
            expr => {
                eval_expr(expr, env)?;
                Ok(None)
            }
        }
    }

    fn eval_if(
        &mut self,
        condition: &Node,
        then_branch: &[Node],
        else_ifs: &[ElseIf],
        else_branch: Option<&[Node]>,
        env: &mut Environment,
    ) -> Result<Option<Scalar>> {
        if eval_expr(condition, env)?.is_truthy() {
            return self.exec_branch(then_branch, env);
        }

        for clause in else_ifs {
            if eval_expr(&clause.condition, env)?.is_truthy() {
                return self.exec_branch(&clause.body, env);
            }
        }

        match else_branch {
            Some(body) => self.exec_branch(body, env),
            None => Ok(None),
        }
    }

    fn eval_for(
        &mut self,
        init: &Node,
        condition: &Node,
        update: &Node,
        body: &[Node],
        env: &mut Environment,
    ) -> Result<Option<Scalar>> {
        self.eval_stmt(init, env)?;

        while eval_expr(condition, env)?.to_number() != 0.0 {
            if let Some(value) = self.exec_branch(body, env)? {
                return Ok(Some(value));
            }
            self.eval_stmt(update, env)?;
        }

        Ok(None)
    }

    /// Run a branch body, in its own scope when block scoping is on
    fn exec_branch(&mut self, body: &[Node], env: &mut Environment) -> Result<Option<Scalar>> {
        if self.options.block_scope {
            env.with_scope(|env| self.exec_block(body, env))
        } else {
            self.exec_block(body, env)
        }
    }

    /// Execute statements in order, stopping at the first returned value
    fn exec_block(&mut self, body: &[Node], env: &mut Environment) -> Result<Option<Scalar>> {
        for stmt in body {
            if let Some(value) = self.eval_stmt(stmt, env)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn write_payload(&mut self, payload: &WritePayload, env: &Environment, newline: bool) -> Result<()> {
        match (&payload.text, &payload.expr) {
            (Some(text), None) => self.out.write_all(text.as_bytes())?,
            (None, Some(expr)) => {
                let value = eval_expr(expr, env)?;
                write!(self.out, "{}", value)?;
            }
            _ => return Err(Error::InvalidWritePayload),
        }

        if newline {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

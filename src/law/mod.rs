//! Law compilation and evaluation.
//!
//! A law is the behavior of one operator: a pure function of two numeric
//! operands. Law source text is compiled once, at directive time, into an
//! AST and interpreted on every call — never handed to any general code
//! execution facility. The grammar exposes no loops and no names beyond
//! `a`, `b`, and the helper allow-list, so applying a law is bounded and
//! side-effect free.

pub mod lexer;
pub mod parser;

use std::fmt;

use crate::errors::{OplawError, Result};
use crate::law::lexer::Lexer;
use crate::law::parser::{BinOp, CmpOp, Func, Node, Operand, Parser};

/// Cap on law source length; keeps directive compilation bounded.
pub const MAX_LAW_LEN: usize = 512;

/// What a law produces. The evaluator performs no coercion on it.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", format_num(*n)),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Integral values print without a trailing `.0`.
fn format_num(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// A compiled law.
#[derive(Clone, Debug)]
pub struct Law {
    root: Node,
    source: String,
}

impl Law {
    /// Compile law source text. Any lexical, syntactic, arity, or type
    /// problem is a `BadDirective` — laws never fail at evaluation time.
    pub fn compile(source: &str) -> Result<Law> {
        let source = source.trim();
        if source.is_empty() {
            return Err(OplawError::BadDirective("empty law expression".into()));
        }
        if source.len() > MAX_LAW_LEN {
            return Err(OplawError::BadDirective(format!(
                "law expression exceeds {MAX_LAW_LEN} bytes"
            )));
        }
        let tokens = Lexer::new(source).tokenize()?;
        let root = Parser::new(tokens).parse()?;
        Ok(Law { root, source: source.to_string() })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Apply the law to two operands. Total: the compile-time type pass
    /// keeps strings out of numeric positions, and numeric edge cases
    /// (division by zero, overflow) follow IEEE-754.
    pub fn apply(&self, a: f64, b: f64) -> Value {
        eval(&self.root, a, b)
    }
}

fn eval(node: &Node, a: f64, b: f64) -> Value {
    match node {
        Node::Num(n) => Value::Num(*n),
        Node::Str(s) => Value::Str(s.clone()),
        Node::Var(Operand::A) => Value::Num(a),
        Node::Var(Operand::B) => Value::Num(b),
        Node::Neg(inner) => Value::Num(-eval_num(inner, a, b)),
        Node::Bin(op, lhs, rhs) => {
            let l = eval_num(lhs, a, b);
            let r = eval_num(rhs, a, b);
            Value::Num(match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::FloorDiv => (l / r).floor(),
                // Sign follows the divisor, consistent with `//` above.
                BinOp::Mod => l - r * (l / r).floor(),
                BinOp::Pow => l.powf(r),
            })
        }
        Node::Cmp(op, lhs, rhs) => {
            let l = eval_num(lhs, a, b);
            let r = eval_num(rhs, a, b);
            let holds = match op {
                CmpOp::Lt => l < r,
                CmpOp::Le => l <= r,
                CmpOp::Gt => l > r,
                CmpOp::Ge => l >= r,
                CmpOp::Eq => l == r,
                CmpOp::Ne => l != r,
            };
            Value::Num(if holds { 1.0 } else { 0.0 })
        }
        Node::Cond { then, cond, otherwise } => {
            if eval_num(cond, a, b) != 0.0 {
                eval(then, a, b)
            } else {
                eval(otherwise, a, b)
            }
        }
        Node::Call(func, args) => {
            let x = eval_num(&args[0], a, b);
            match func {
                Func::Abs => Value::Num(x.abs()),
                Func::Min => Value::Num(x.min(eval_num(&args[1], a, b))),
                Func::Max => Value::Num(x.max(eval_num(&args[1], a, b))),
                Func::Pow => Value::Num(x.powf(eval_num(&args[1], a, b))),
                Func::Round => Value::Num(x.round()),
                Func::Int => Value::Num(x.trunc()),
                Func::Float => Value::Num(x),
                Func::Str => Value::Str(format_num(x)),
                Func::Floor => Value::Num(x.floor()),
                Func::Ceil => Value::Num(x.ceil()),
                Func::Sqrt => Value::Num(x.sqrt()),
            }
        }
    }
}

fn eval_num(node: &Node, a: f64, b: f64) -> f64 {
    match eval(node, a, b) {
        Value::Num(n) => n,
        // Ruled out by the compile-time type pass.
        Value::Str(_) => f64::NAN,
    }
}

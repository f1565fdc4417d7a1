//! Law expression parser — builds an AST from law tokens.
//!
//! The grammar is deliberately closed: arithmetic, one comparison,
//! a Python-style ternary, and a fixed allow-list of numeric helpers.
//! There is no name lookup beyond `a`, `b`, the helper functions, and the
//! `math` namespace, no attribute access, and no loop construct, so a
//! compiled law can compute nothing but its return value.

use crate::errors::{OplawError, Result};
use crate::law::lexer::Token;

// ---------------------------------------------------------------------------
// AST nodes
// ---------------------------------------------------------------------------

/// The two free variables every law is a function of.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    A,
    B,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `//` — floor division.
    FloorDiv,
    Mod,
    /// `**` — exponentiation.
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Allow-listed helper functions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Func {
    Abs,
    Min,
    Max,
    Pow,
    Round,
    Int,
    Float,
    Str,
    // `math.` namespace
    Floor,
    Ceil,
    Sqrt,
}

impl Func {
    pub fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max | Self::Pow => 2,
            _ => 1,
        }
    }

    fn builtin(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Self::Abs),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "pow" => Some(Self::Pow),
            "round" => Some(Self::Round),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "str" => Some(Self::Str),
            _ => None,
        }
    }

    fn math(name: &str) -> Option<Self> {
        match name {
            "floor" => Some(Self::Floor),
            "ceil" => Some(Self::Ceil),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Num(f64),
    Str(String),
    Var(Operand),
    Neg(Box<Node>),
    Bin(BinOp, Box<Node>, Box<Node>),
    Cmp(CmpOp, Box<Node>, Box<Node>),
    /// `then if cond else otherwise` (Python operand order).
    Cond {
        then: Box<Node>,
        cond: Box<Node>,
        otherwise: Box<Node>,
    },
    Call(Func, Vec<Node>),
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a complete law expression; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<Node> {
        let node = self.parse_conditional()?;
        if !matches!(self.current(), Token::Eof) {
            return Err(OplawError::BadDirective(format!(
                "unexpected trailing {:?} in law expression",
                self.current()
            )));
        }
        typecheck(&node)?;
        Ok(node)
    }

    // conditional := comparison ('if' comparison 'else' conditional)?
    fn parse_conditional(&mut self) -> Result<Node> {
        let then = self.parse_comparison()?;
        if !self.check(&Token::If) {
            return Ok(then);
        }
        self.advance();
        let cond = self.parse_comparison()?;
        self.expect(&Token::Else)?;
        let otherwise = self.parse_conditional()?;
        Ok(Node::Cond {
            then: Box::new(then),
            cond: Box::new(cond),
            otherwise: Box::new(otherwise),
        })
    }

    // comparison := arith (cmp-op arith)?  — no chaining
    fn parse_comparison(&mut self) -> Result<Node> {
        let lhs = self.parse_arith()?;
        let op = match self.current() {
            Token::Lt => CmpOp::Lt,
            Token::Le => CmpOp::Le,
            Token::Gt => CmpOp::Gt,
            Token::Ge => CmpOp::Ge,
            Token::EqEq => CmpOp::Eq,
            Token::Ne => CmpOp::Ne,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_arith()?;
        Ok(Node::Cmp(op, Box::new(lhs), Box::new(rhs)))
    }

    // arith := term (('+'|'-') term)*
    fn parse_arith(&mut self) -> Result<Node> {
        let mut node = self.parse_term()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            node = Node::Bin(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    // term := factor (('*'|'/'|'//'|'%') factor)*
    fn parse_term(&mut self) -> Result<Node> {
        let mut node = self.parse_factor()?;
        loop {
            let op = match self.current() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::SlashSlash => BinOp::FloorDiv,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            node = Node::Bin(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    // factor := '-' factor | power
    fn parse_factor(&mut self) -> Result<Node> {
        if self.check(&Token::Minus) {
            self.advance();
            let inner = self.parse_factor()?;
            return Ok(Node::Neg(Box::new(inner)));
        }
        self.parse_power()
    }

    // power := atom ('**' factor)?  — right-associative
    fn parse_power(&mut self) -> Result<Node> {
        let base = self.parse_atom()?;
        if self.check(&Token::StarStar) {
            self.advance();
            let exp = self.parse_factor()?;
            return Ok(Node::Bin(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Node> {
        match self.current().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Node::Num(n))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Node::Str(s))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_conditional()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.advance();
                self.parse_name(&name)
            }
            other => Err(OplawError::BadDirective(format!(
                "expected operand in law expression, got {other:?}"
            ))),
        }
    }

    // A bare name is `a`/`b`; anything else must be an allow-listed call.
    fn parse_name(&mut self, name: &str) -> Result<Node> {
        match name {
            "a" => return Ok(Node::Var(Operand::A)),
            "b" => return Ok(Node::Var(Operand::B)),
            "math" => {
                self.expect(&Token::Dot)?;
                let member = self.expect_ident()?;
                let func = Func::math(&member).ok_or_else(|| {
                    OplawError::BadDirective(format!("unknown math function 'math.{member}'"))
                })?;
                return self.parse_call(func, &format!("math.{member}"));
            }
            _ => {}
        }

        let func = Func::builtin(name).ok_or_else(|| {
            OplawError::BadDirective(format!("unknown name '{name}' in law expression"))
        })?;
        self.parse_call(func, name)
    }

    fn parse_call(&mut self, func: Func, display: &str) -> Result<Node> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            args.push(self.parse_conditional()?);
            while self.check(&Token::Comma) {
                self.advance();
                args.push(self.parse_conditional()?);
            }
        }
        self.expect(&Token::RParen)?;

        if args.len() != func.arity() {
            return Err(OplawError::BadDirective(format!(
                "{display}() takes {} argument(s), got {}",
                func.arity(),
                args.len()
            )));
        }
        Ok(Node::Call(func, args))
    }

    // --- Helpers ---

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(OplawError::BadDirective(format!(
                "expected {expected:?} in law expression, got {:?}",
                self.current()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        if let Token::Ident(s) = self.current().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(OplawError::BadDirective(format!(
                "expected identifier in law expression, got {:?}",
                self.current()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Static type pass
// ---------------------------------------------------------------------------

/// Coarse value type of a law subexpression.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Ty {
    Num,
    Str,
    /// Ternary branches of different types; legal only as a law's result.
    Mixed,
}

/// Reject strings (and mixed ternaries) in numeric positions so that law
/// evaluation is total: the interpreter never meets a type it cannot use.
fn typecheck(node: &Node) -> Result<Ty> {
    match node {
        Node::Num(_) | Node::Var(_) => Ok(Ty::Num),
        Node::Str(_) => Ok(Ty::Str),
        Node::Neg(inner) => {
            require_num(inner, "unary '-'")?;
            Ok(Ty::Num)
        }
        Node::Bin(op, lhs, rhs) => {
            let what = format!("operator {op:?}");
            require_num(lhs, &what)?;
            require_num(rhs, &what)?;
            Ok(Ty::Num)
        }
        Node::Cmp(op, lhs, rhs) => {
            let what = format!("comparison {op:?}");
            require_num(lhs, &what)?;
            require_num(rhs, &what)?;
            Ok(Ty::Num)
        }
        Node::Cond { then, cond, otherwise } => {
            require_num(cond, "ternary condition")?;
            let t = typecheck(then)?;
            let o = typecheck(otherwise)?;
            Ok(if t == o { t } else { Ty::Mixed })
        }
        Node::Call(func, args) => {
            for arg in args {
                require_num(arg, "function argument")?;
            }
            Ok(match func {
                Func::Str => Ty::Str,
                _ => Ty::Num,
            })
        }
    }
}

fn require_num(node: &Node, what: &str) -> Result<()> {
    match typecheck(node)? {
        Ty::Num => Ok(()),
        Ty::Str | Ty::Mixed => Err(OplawError::BadDirective(format!(
            "{what} requires a numeric operand"
        ))),
    }
}

//! Contract expression trees.
//!
//! Preconditions, postconditions and type invariants are lists of boolean
//! conjuncts over this tree. Statement bodies are never represented here.

use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Implies,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Implies => "==>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    /// `|xs|`
    Length,
    /// `*r`
    Deref,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// n-ary conjunction
    And(Vec<Expr>),
    /// n-ary disjunction
    Or(Vec<Expr>),
    FieldAccess(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    ArrayLiteral(Vec<Expr>),
    RecordLiteral(Vec<(String, Expr)>),
    /// Direct call of a named callable
    Invoke(String, Vec<Expr>),
    /// Call through a lambda-valued expression
    IndirectInvoke(Box<Expr>, Vec<Expr>),
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    pub fn int(n: i64) -> Expr {
        Expr::Constant(Value::int(n))
    }

    pub fn boolean(b: bool) -> Expr {
        Expr::Constant(Value::Bool(b))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn lt(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Lt, lhs, rhs)
    }

    pub fn le(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Le, lhs, rhs)
    }

    pub fn gt(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Gt, lhs, rhs)
    }

    pub fn ge(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Ge, lhs, rhs)
    }

    pub fn equals(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Eq, lhs, rhs)
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn not(operand: Expr) -> Expr {
        Expr::Unary(UnaryOp::Not, Box::new(operand))
    }

    pub fn length(operand: Expr) -> Expr {
        Expr::Unary(UnaryOp::Length, Box::new(operand))
    }

    pub fn field(target: Expr, name: &str) -> Expr {
        Expr::FieldAccess(Box::new(target), name.to_string())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Expr], sep: &str) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", sep)?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            Expr::Constant(v) => write!(f, "{}", v),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Unary(UnaryOp::Not, e) => write!(f, "!({})", e),
            Expr::Unary(UnaryOp::Neg, e) => write!(f, "-({})", e),
            Expr::Unary(UnaryOp::Length, e) => write!(f, "|{}|", e),
            Expr::Unary(UnaryOp::Deref, e) => write!(f, "*{}", e),
            Expr::Binary(op, l, r) => write!(f, "({} {} {})", l, op.symbol(), r),
            Expr::And(items) => join(f, items, " && "),
            Expr::Or(items) => join(f, items, " || "),
            Expr::FieldAccess(e, name) => write!(f, "{}.{}", e, name),
            Expr::Index(e, i) => write!(f, "{}[{}]", e, i),
            Expr::ArrayLiteral(items) => {
                write!(f, "[")?;
                join(f, items, ", ")?;
                write!(f, "]")
            }
            Expr::RecordLiteral(fields) => {
                write!(f, "{{")?;
                for (i, (name, e)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, e)?;
                }
                write!(f, "}}")
            }
            Expr::Invoke(name, args) => {
                write!(f, "{}(", name)?;
                join(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::IndirectInvoke(target, args) => {
                write!(f, "{}(", target)?;
                join(f, args, ", ")?;
                write!(f, ")")
            }
        }
    }
}

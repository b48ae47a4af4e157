//! Constraint extraction: derive an integer range for one variable or field
//! from a boolean contract expression.
//!
//! The extractor only understands shapes where the target appears as a bare
//! operand (or inside `|target|`). `x + 2 < 10` yields nothing. Anything it
//! cannot read, including operands the evaluator reports as unbound, is
//! treated as "no constraint" rather than an error.

use crate::collaborators::Evaluator;
use crate::error::RuntimeFault;
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::interval::IntervalRange;
use crate::value::{Frame, Value};
use log::debug;

/// Extracts constraints on a named variable or record field
pub struct ConstraintExtractor<'a, E: Evaluator + ?Sized> {
    evaluator: &'a E,
    frame: Frame,
    /// `e.name` counts as the target
    fields: bool,
}

impl<'a, E: Evaluator + ?Sized> ConstraintExtractor<'a, E> {
    /// Sub-expressions are folded in an empty frame
    pub fn new(evaluator: &'a E) -> Self {
        Self {
            evaluator,
            frame: Frame::new(),
            fields: true,
        }
    }

    /// Fold sub-expressions in `frame` instead
    pub fn with_frame(evaluator: &'a E, frame: Frame) -> Self {
        Self {
            evaluator,
            frame,
            fields: true,
        }
    }

    /// Only `name` and `|name|` count as the target; field accesses such as
    /// `p.name` are left alone
    pub fn variables_only(mut self) -> Self {
        self.fields = false;
        self
    }

    /// Range `name` must lie in for the conjunction of `conjuncts` to hold
    pub fn extract_all(
        &self,
        conjuncts: &[Expr],
        name: &str,
    ) -> Result<Option<IntervalRange>, RuntimeFault> {
        self.combine(conjuncts, name, |a, b| a.intersection(b))
    }

    /// Range `name` must lie in for `expr` to hold; `None` means unconstrained
    pub fn extract(&self, expr: &Expr, name: &str) -> Result<Option<IntervalRange>, RuntimeFault> {
        let range = match expr {
            Expr::Binary(BinaryOp::Eq, lhs, rhs) => self.equality(lhs, rhs, name)?,
            Expr::Binary(op @ (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge), lhs, rhs) => {
                self.ordering(*op, lhs, rhs, name)?
            }
            Expr::Unary(UnaryOp::Not, operand) => {
                self.extract(operand, name)?.map(|r| r.swapped())
            }
            Expr::And(operands) => self.combine(operands, name, |a, b| a.intersection(b))?,
            Expr::Or(operands) => self.combine(operands, name, |a, b| a.union(b))?,
            _ => None,
        };
        if let Some(ref r) = range {
            debug!("Extracted {} for '{}' from {}", r, name, expr);
        }
        Ok(range)
    }

    fn combine<F>(
        &self,
        operands: &[Expr],
        name: &str,
        join: F,
    ) -> Result<Option<IntervalRange>, RuntimeFault>
    where
        F: Fn(&IntervalRange, &IntervalRange) -> IntervalRange,
    {
        let mut result: Option<IntervalRange> = None;
        for operand in operands {
            if let Some(range) = self.extract(operand, name)? {
                result = Some(match result {
                    Some(acc) => join(&acc, &range),
                    None => range,
                });
            }
        }
        Ok(result)
    }

    fn equality(&self, lhs: &Expr, rhs: &Expr, name: &str) -> Result<Option<IntervalRange>, RuntimeFault> {
        let other = if self.is_target(lhs, name) {
            rhs
        } else if self.is_target(rhs, name) {
            lhs
        } else {
            return Ok(None);
        };
        Ok(self.constant(other)?.map(IntervalRange::point))
    }

    fn ordering(
        &self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        name: &str,
    ) -> Result<Option<IntervalRange>, RuntimeFault> {
        let target_on_left = match (self.is_target(lhs, name), self.is_target(rhs, name)) {
            (true, false) => true,
            (false, true) => false,
            _ => return Ok(None),
        };
        let other = if target_on_left { rhs } else { lhs };
        let k = match self.constant(other)? {
            Some(k) => IntervalRange::point(k),
            None => return Ok(None),
        };

        let (left, right) = if target_on_left {
            (IntervalRange::top(), k)
        } else {
            (k, IntervalRange::top())
        };
        let (left, right) = match op {
            BinaryOp::Lt => left.less_than(&right),
            BinaryOp::Le => left.less_than_or_equals(&right),
            BinaryOp::Gt => left.greater_than(&right),
            BinaryOp::Ge => left.greater_than_or_equals(&right),
            _ => return Err(RuntimeFault::DeadCode(format!("ordering over {}", op.symbol()))),
        };
        Ok(Some(if target_on_left { left } else { right }))
    }

    /// Concrete integer value of a sub-expression not involving the target
    fn constant(&self, expr: &Expr) -> Result<Option<num_bigint::BigInt>, RuntimeFault> {
        match self.evaluator.evaluate(expr, &self.frame) {
            Ok(Value::Int(k)) => Ok(Some(k)),
            Ok(_) => Ok(None),
            Err(fault) if fault.is_unbound() => Ok(None),
            Err(fault) => Err(fault),
        }
    }

    /// The expression is the target itself: `name`, `e.name`, or `|target|`
    fn is_target(&self, expr: &Expr, name: &str) -> bool {
        match expr {
            Expr::Variable(v) => v == name,
            Expr::FieldAccess(_, field) => self.fields && field == name,
            Expr::Unary(UnaryOp::Length, inner) => self.is_target(inner, name),
            _ => false,
        }
    }
}

// Reference evaluator for contract expressions.
// Covers the pure expression language used in requires/ensures/where
// clauses. Calls to named callables need the host interpreter and fault with
// `Unsupported`.

use crate::collaborators::{Evaluator, InvariantChecker, Verdict};
use crate::error::RuntimeFault;
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::value::{Frame, LambdaBody, Value};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl ExprEvaluator {
    pub fn new() -> Self {
        ExprEvaluator
    }

    fn eval(&self, expr: &Expr, frame: &Frame) -> Result<Value, RuntimeFault> {
        match expr {
            Expr::Constant(v) => Ok(v.clone()),
            Expr::Variable(name) => frame
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeFault::Unbound(name.clone())),
            Expr::Unary(op, operand) => {
                let v = self.eval(operand, frame)?;
                self.unary(*op, v)
            }
            Expr::Binary(BinaryOp::Implies, lhs, rhs) => {
                if !expect_bool(self.eval(lhs, frame)?)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(expect_bool(self.eval(rhs, frame)?)?))
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs, frame)?;
                let r = self.eval(rhs, frame)?;
                binary(*op, l, r)
            }
            Expr::And(operands) => {
                for operand in operands {
                    if !expect_bool(self.eval(operand, frame)?)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expr::Or(operands) => {
                for operand in operands {
                    if expect_bool(self.eval(operand, frame)?)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Expr::FieldAccess(target, field) => match self.eval(target, frame)? {
                Value::Record(mut fields) => fields
                    .remove(field)
                    .ok_or_else(|| RuntimeFault::MissingField(field.clone())),
                Value::Null => Err(RuntimeFault::NullOperand),
                other => Err(mismatch("record", &other)),
            },
            Expr::Index(target, index) => {
                let items = match self.eval(target, frame)? {
                    Value::Array(items) => items,
                    Value::Null => return Err(RuntimeFault::NullOperand),
                    other => return Err(mismatch("array", &other)),
                };
                let index = expect_int(self.eval(index, frame)?)?;
                index
                    .to_usize()
                    .and_then(|i| items.get(i).cloned())
                    .ok_or(RuntimeFault::IndexOutOfBounds {
                        index,
                        length: items.len(),
                    })
            }
            Expr::ArrayLiteral(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|e| self.eval(e, frame))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Expr::RecordLiteral(fields) => {
                let mut record = BTreeMap::new();
                for (name, e) in fields {
                    record.insert(name.clone(), self.eval(e, frame)?);
                }
                Ok(Value::Record(record))
            }
            Expr::Invoke(name, _) => Err(RuntimeFault::Unsupported(format!("call to '{}'", name))),
            Expr::IndirectInvoke(target, _) => match self.eval(target, frame)? {
                Value::Lambda(lambda) => match lambda.body {
                    LambdaBody::ReturnCaptured => {
                        let mut outputs = lambda
                            .return_expressions()
                            .iter()
                            .map(|e| self.eval(e, &lambda.captured))
                            .collect::<Result<Vec<_>, _>>()?;
                        if outputs.len() == 1 {
                            Ok(outputs.remove(0))
                        } else {
                            Err(RuntimeFault::Unsupported(format!(
                                "lambda with {} return values in expression position",
                                outputs.len()
                            )))
                        }
                    }
                    LambdaBody::Declared(ref body) => {
                        Err(RuntimeFault::Unsupported(format!("lambda body '{}'", body)))
                    }
                },
                Value::Null => Err(RuntimeFault::NullOperand),
                other => Err(mismatch("lambda", &other)),
            },
        }
    }

    fn unary(&self, op: UnaryOp, v: Value) -> Result<Value, RuntimeFault> {
        match (op, v) {
            (_, Value::Null) => Err(RuntimeFault::NullOperand),
            (UnaryOp::Not, v) => Ok(Value::Bool(!expect_bool(v)?)),
            (UnaryOp::Neg, v) => Ok(Value::Int(-expect_int(v)?)),
            (UnaryOp::Length, Value::Array(items)) => Ok(Value::int(items.len() as u64)),
            (UnaryOp::Length, other) => Err(mismatch("array", &other)),
            (UnaryOp::Deref, Value::Reference(cell)) => Ok(cell.borrow().clone()),
            (UnaryOp::Deref, other) => Err(mismatch("reference", &other)),
        }
    }
}

fn binary(op: BinaryOp, l: Value, r: Value) -> Result<Value, RuntimeFault> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(l == r)),
        BinaryOp::Ne => return Ok(Value::Bool(l != r)),
        _ => {}
    }
    let a = expect_int(l)?;
    let b = expect_int(r)?;
    let result = match op {
        BinaryOp::Add => Value::Int(a + b),
        BinaryOp::Sub => Value::Int(a - b),
        BinaryOp::Mul => Value::Int(a * b),
        BinaryOp::Div | BinaryOp::Rem if b.is_zero() => return Err(RuntimeFault::DivisionByZero),
        BinaryOp::Div => Value::Int(a / b),
        BinaryOp::Rem => Value::Int(a % b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Implies => {
            return Err(RuntimeFault::DeadCode(format!("integer operator {}", op.symbol())))
        }
    };
    Ok(result)
}

fn mismatch(expected: &'static str, found: &Value) -> RuntimeFault {
    RuntimeFault::TypeMismatch {
        expected,
        found: found.kind().to_string(),
    }
}

fn expect_int(v: Value) -> Result<BigInt, RuntimeFault> {
    match v {
        Value::Int(n) => Ok(n),
        Value::Null => Err(RuntimeFault::NullOperand),
        other => Err(mismatch("int", &other)),
    }
}

fn expect_bool(v: Value) -> Result<bool, RuntimeFault> {
    match v {
        Value::Bool(b) => Ok(b),
        Value::Null => Err(RuntimeFault::NullOperand),
        other => Err(mismatch("bool", &other)),
    }
}

impl Evaluator for ExprEvaluator {
    fn evaluate(&self, expr: &Expr, frame: &Frame) -> Result<Value, RuntimeFault> {
        self.eval(expr, frame)
    }
}

impl InvariantChecker for ExprEvaluator {
    fn check(&self, frame: &Frame, conjuncts: &[Expr]) -> Result<Verdict, RuntimeFault> {
        for (i, conjunct) in conjuncts.iter().enumerate() {
            if !expect_bool(self.eval(conjunct, frame)?)? {
                return Ok(Verdict::Violated { conjunct: i });
            }
        }
        Ok(Verdict::Holds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Lambda;

    fn eval(expr: &Expr, frame: &Frame) -> Result<Value, RuntimeFault> {
        ExprEvaluator::new().evaluate(expr, frame)
    }

    #[test]
    fn test_arithmetic_and_comparison() {
        let frame = Frame::new().with("x", Value::int(7));
        let expr = Expr::lt(Expr::add(Expr::var("x"), Expr::int(2)), Expr::int(10));
        assert_eq!(eval(&expr, &frame), Ok(Value::Bool(true)));
        let div = Expr::binary(BinaryOp::Div, Expr::int(-7), Expr::int(2));
        assert_eq!(eval(&div, &frame), Ok(Value::int(-3)));
        let zero = Expr::binary(BinaryOp::Rem, Expr::int(1), Expr::int(0));
        assert_eq!(eval(&zero, &frame), Err(RuntimeFault::DivisionByZero));
    }

    #[test]
    fn test_unbound_variable() {
        assert_eq!(
            eval(&Expr::var("missing"), &Frame::new()),
            Err(RuntimeFault::Unbound("missing".to_string()))
        );
    }

    #[test]
    fn test_short_circuit() {
        // right operand would fault if evaluated
        let expr = Expr::And(vec![Expr::boolean(false), Expr::var("missing")]);
        assert_eq!(eval(&expr, &Frame::new()), Ok(Value::Bool(false)));
        let expr = Expr::binary(BinaryOp::Implies, Expr::boolean(false), Expr::var("missing"));
        assert_eq!(eval(&expr, &Frame::new()), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_arrays_records_and_references() {
        let frame = Frame::new()
            .with("xs", Value::Array(vec![Value::int(4), Value::int(5)]))
            .with("p", Value::record(vec![("x", Value::int(1))]))
            .with("r", Value::reference(Value::Bool(true)));
        assert_eq!(eval(&Expr::length(Expr::var("xs")), &frame), Ok(Value::int(2)));
        let idx = Expr::Index(Box::new(Expr::var("xs")), Box::new(Expr::int(1)));
        assert_eq!(eval(&idx, &frame), Ok(Value::int(5)));
        let oob = Expr::Index(Box::new(Expr::var("xs")), Box::new(Expr::int(2)));
        assert!(matches!(eval(&oob, &frame), Err(RuntimeFault::IndexOutOfBounds { .. })));
        assert_eq!(eval(&Expr::field(Expr::var("p"), "x"), &frame), Ok(Value::int(1)));
        let deref = Expr::Unary(UnaryOp::Deref, Box::new(Expr::var("r")));
        assert_eq!(eval(&deref, &frame), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_null_operand() {
        let frame = Frame::new().with("n", Value::Null);
        let expr = Expr::lt(Expr::var("n"), Expr::int(1));
        assert_eq!(eval(&expr, &frame), Err(RuntimeFault::NullOperand));
        assert_eq!(eval(&Expr::equals(Expr::var("n"), Expr::Constant(Value::Null)), &frame), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_captured_lambda_application() {
        let lambda = Lambda {
            parameters: vec!["a".to_string()],
            returns: vec!["out".to_string()],
            body: LambdaBody::ReturnCaptured,
            captured: Frame::new().with("out", Value::int(42)),
        };
        let frame = Frame::new().with("f", Value::Lambda(Box::new(lambda)));
        let call = Expr::IndirectInvoke(Box::new(Expr::var("f")), vec![Expr::int(0)]);
        assert_eq!(eval(&call, &frame), Ok(Value::int(42)));
    }

    #[test]
    fn test_check_reports_first_violation() {
        let checker = ExprEvaluator::new();
        let frame = Frame::new().with("x", Value::int(3));
        let conjuncts = vec![
            Expr::ge(Expr::var("x"), Expr::int(0)),
            Expr::lt(Expr::var("x"), Expr::int(3)),
        ];
        assert_eq!(checker.check(&frame, &conjuncts), Ok(Verdict::Violated { conjunct: 1 }));
        assert_eq!(checker.check(&frame, &conjuncts[..1]), Ok(Verdict::Holds));
        assert!(checker.check(&frame, &[Expr::int(1)]).is_err());
    }

    #[test]
    fn test_named_calls_are_unsupported() {
        let call = Expr::Invoke("f".to_string(), vec![]);
        assert!(matches!(eval(&call, &Frame::new()), Err(RuntimeFault::Unsupported(_))));
    }
}

//! Capabilities the engine consumes from the surrounding interpreter.
//!
//! The interpreter proper (statements, type checking, name resolution) lives
//! outside this crate. These traits are the seams through which generators,
//! the constraint extractor and the call optimizer reach it.

use crate::error::{EngineResult, ResolutionError, RuntimeFault};
use crate::expr::Expr;
use crate::optimizer::SpeculativeCallOptimizer;
use crate::types::{CallableDeclaration, FunctionType};
use crate::value::{Frame, Value};
use std::rc::Rc;

/// Outcome of checking a list of boolean conjuncts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Holds,
    /// Index of the first conjunct that evaluated to false
    Violated { conjunct: usize },
}

impl Verdict {
    pub fn holds(&self) -> bool {
        matches!(self, Verdict::Holds)
    }
}

/// Reduces an expression to a value in a frame
pub trait Evaluator {
    fn evaluate(&self, expr: &Expr, frame: &Frame) -> Result<Value, RuntimeFault>;
}

/// Checks contract conjuncts in a frame
///
/// A `Violated` verdict is an ordinary answer; `Err` is reserved for
/// conjuncts that could not be evaluated at all.
pub trait InvariantChecker {
    fn check(&self, frame: &Frame, conjuncts: &[Expr]) -> Result<Verdict, RuntimeFault>;
}

/// Finds the unique declaration for a name and optional signature
pub trait DeclarationResolver {
    fn resolve_exactly(
        &self,
        name: &str,
        signature: Option<&FunctionType>,
    ) -> Result<Rc<CallableDeclaration>, ResolutionError>;
}

/// Runs a callable with its real semantics
///
/// The optimizer passes itself in so nested calls made by the body can be
/// routed back through it.
pub trait CallableExecutor {
    fn execute(
        &mut self,
        optimizer: &mut SpeculativeCallOptimizer,
        callee: &CallableDeclaration,
        frame: &Frame,
        arguments: &[Value],
    ) -> EngineResult<Vec<Value>>;
}

/// Everything the call optimizer needs from the interpreter
pub trait CallEnvironment: Evaluator + InvariantChecker + DeclarationResolver + CallableExecutor {}

impl<T> CallEnvironment for T where T: Evaluator + InvariantChecker + DeclarationResolver + CallableExecutor {}

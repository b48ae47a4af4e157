//! Error taxonomy for generation, evaluation, resolution and the optimizer.
//!
//! Expected, recoverable outcomes (a candidate failing a postcondition during
//! synthesis) are not errors here; they are reported through
//! [`crate::collaborators::Verdict`]. Everything in this module is fatal for
//! the operation that raised it.

use num_bigint::BigInt;
use std::fmt;

/// Errors raised while building or driving value generators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The narrowed domain of a generator is empty
    CannotGenerate { reason: String },
    /// Integer bounds are inverted (`upper <= lower`) before generation begins
    IntegerRange { lower: BigInt, upper: BigInt },
    /// Array size bounds are inverted
    ArraySize { min: usize, max: usize },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::CannotGenerate { reason } => {
                write!(f, "Cannot generate value: {}", reason)
            }
            GenerationError::IntegerRange { lower, upper } => {
                write!(f, "Invalid integer range: upper bound {} <= lower bound {}", upper, lower)
            }
            GenerationError::ArraySize { min, max } => {
                write!(f, "Invalid array size bounds: max {} < min {}", max, min)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// Result type for generator operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Faults raised while evaluating an expression or executing a callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeFault {
    /// A variable has no binding in the frame
    Unbound(String),
    /// An operand evaluated to null where a value was required
    NullOperand,
    /// An operand has the wrong shape for the operation
    TypeMismatch { expected: &'static str, found: String },
    IndexOutOfBounds { index: BigInt, length: usize },
    DivisionByZero,
    MissingField(String),
    /// The expression form is outside what this evaluator understands
    Unsupported(String),
    /// A position assumed unreachable was reached
    DeadCode(String),
}

impl RuntimeFault {
    /// Faults that mean "some operand is not known yet" rather than a broken expression
    pub fn is_unbound(&self) -> bool {
        matches!(self, RuntimeFault::Unbound(_) | RuntimeFault::NullOperand)
    }
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeFault::Unbound(name) => write!(f, "Unbound variable '{}'", name),
            RuntimeFault::NullOperand => write!(f, "Operand is null"),
            RuntimeFault::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            RuntimeFault::IndexOutOfBounds { index, length } => {
                write!(f, "Index {} out of bounds for length {}", index, length)
            }
            RuntimeFault::DivisionByZero => write!(f, "Division by zero"),
            RuntimeFault::MissingField(name) => write!(f, "Record has no field '{}'", name),
            RuntimeFault::Unsupported(what) => write!(f, "Unsupported expression: {}", what),
            RuntimeFault::DeadCode(what) => write!(f, "Reached dead code: {}", what),
        }
    }
}

impl std::error::Error for RuntimeFault {}

/// Failures resolving a callable by name and signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    NotFound(String),
    Ambiguous { name: String, candidates: usize },
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::NotFound(name) => write!(f, "Unable to resolve callable '{}'", name),
            ResolutionError::Ambiguous { name, candidates } => {
                write!(f, "Ambiguous callable '{}' ({} candidates)", name, candidates)
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Top-level error propagated out of the test-generation entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Resolution(ResolutionError),
    Generation(GenerationError),
    Runtime(RuntimeFault),
    /// Internal consistency failure; always a bug in this crate
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Resolution(e) => write!(f, "Resolution error: {}", e),
            EngineError::Generation(e) => write!(f, "Generation error: {}", e),
            EngineError::Runtime(e) => write!(f, "Runtime fault: {}", e),
            EngineError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Resolution(e) => Some(e),
            EngineError::Generation(e) => Some(e),
            EngineError::Runtime(e) => Some(e),
            EngineError::Internal(_) => None,
        }
    }
}

impl From<ResolutionError> for EngineError {
    fn from(e: ResolutionError) -> Self {
        EngineError::Resolution(e)
    }
}

impl From<GenerationError> for EngineError {
    fn from(e: GenerationError) -> Self {
        EngineError::Generation(e)
    }
}

impl From<RuntimeFault> for EngineError {
    fn from(e: RuntimeFault) -> Self {
        EngineError::Runtime(e)
    }
}

/// Result type for engine-level operations
pub type EngineResult<T> = Result<T, EngineError>;

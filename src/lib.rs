//! # contractcheck
//!
//! Contract-guided test-case generation and speculative call synthesis for
//! typed callables with `requires`/`ensures` clauses.
//!
//! The crate has three layers:
//!
//! - an integer interval lattice ([`interval`]) and a constraint extractor
//!   ([`extract`]) that reads ranges out of contract expressions;
//! - typed value generators ([`generators`]) driven by random or exhaustive
//!   parameter-tuple strategies ([`strategy`]);
//! - a speculative call optimizer ([`optimizer`]) that answers calls by
//!   guessing outputs and checking them against the postcondition, falling
//!   back to real execution when the guess budget runs out.
//!
//! The host interpreter is reached only through the traits in
//! [`collaborators`].

pub mod collaborators;
pub mod config;
pub mod error;
pub mod eval;
pub mod expr;
pub mod extract;
pub mod generators;
pub mod interval;
pub mod optimizer;
pub mod strategy;
pub mod types;
pub mod value;

pub use collaborators::{
    CallEnvironment, CallableExecutor, DeclarationResolver, Evaluator, InvariantChecker, Verdict,
};
pub use config::{ConfigError, GenerationConfig, TestMode};
pub use error::{EngineError, EngineResult, GenerationError, GenerationResult, ResolutionError, RuntimeFault};
pub use eval::ExprEvaluator;
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use extract::ConstraintExtractor;
pub use generators::{Generator, GeneratorBuilder, Odometer, UNBOUNDED};
pub use interval::{Bound, IntervalRange};
pub use optimizer::{CallMemoTable, OptimizerStats, SpeculativeCallOptimizer};
pub use strategy::{ExhaustiveStrategy, RandomStrategy, Strategy};
pub use types::{CallableDeclaration, FunctionType, NominalType, Parameter, Type};
pub use value::{Frame, Lambda, LambdaBody, Value};

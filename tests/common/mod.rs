//! Shared fixtures for the integration tests: a scripted interpreter that
//! evaluates contracts with `ExprEvaluator` and records every check and
//! execution the optimizer asks of it.

#![allow(dead_code)]

use contractcheck::{
    CallableDeclaration, CallableExecutor, DeclarationResolver, EngineResult, Evaluator, Expr, ExprEvaluator,
    Frame, FunctionType, InvariantChecker, ResolutionError, RuntimeFault, SpeculativeCallOptimizer, Value,
    Verdict,
};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

type Body = Box<dyn Fn(&[Value]) -> Vec<Value>>;

/// A call the executor saw
#[derive(Debug, Clone)]
pub struct Execution {
    pub name: String,
    pub frame: Frame,
    pub arguments: Vec<Value>,
}

pub struct ScriptedEnvironment {
    evaluator: ExprEvaluator,
    declarations: Vec<Rc<CallableDeclaration>>,
    bodies: HashMap<String, Body>,
    nested: HashMap<String, (String, Vec<Expr>)>,
    checks: Cell<usize>,
    pub executions: Vec<Execution>,
}

impl ScriptedEnvironment {
    pub fn new() -> Self {
        Self {
            evaluator: ExprEvaluator::new(),
            declarations: Vec::new(),
            bodies: HashMap::new(),
            nested: HashMap::new(),
            checks: Cell::new(0),
            executions: Vec::new(),
        }
    }

    /// Declare a callable whose real body computes `body(arguments)`
    pub fn declare<F>(&mut self, declaration: CallableDeclaration, body: F)
    where
        F: Fn(&[Value]) -> Vec<Value> + 'static,
    {
        self.bodies.insert(declaration.name.clone(), Box::new(body));
        self.declarations.push(Rc::new(declaration));
    }

    /// Declare a callable whose real body only calls `callee` with `arguments`
    /// evaluated over its own parameters
    pub fn declare_forwarding(&mut self, declaration: CallableDeclaration, callee: &str, arguments: Vec<Expr>) {
        self.nested
            .insert(declaration.name.clone(), (callee.to_string(), arguments));
        self.declarations.push(Rc::new(declaration));
    }

    pub fn checks(&self) -> usize {
        self.checks.get()
    }

    pub fn executions_of(&self, name: &str) -> usize {
        self.executions.iter().filter(|e| e.name == name).count()
    }
}

impl Evaluator for ScriptedEnvironment {
    fn evaluate(&self, expr: &Expr, frame: &Frame) -> Result<Value, RuntimeFault> {
        self.evaluator.evaluate(expr, frame)
    }
}

impl InvariantChecker for ScriptedEnvironment {
    fn check(&self, frame: &Frame, conjuncts: &[Expr]) -> Result<Verdict, RuntimeFault> {
        self.checks.set(self.checks.get() + 1);
        self.evaluator.check(frame, conjuncts)
    }
}

impl DeclarationResolver for ScriptedEnvironment {
    fn resolve_exactly(
        &self,
        name: &str,
        signature: Option<&FunctionType>,
    ) -> Result<Rc<CallableDeclaration>, ResolutionError> {
        let candidates: Vec<&Rc<CallableDeclaration>> = self
            .declarations
            .iter()
            .filter(|d| d.name == name && signature.map_or(true, |s| d.signature() == *s))
            .collect();
        match candidates.as_slice() {
            [] => Err(ResolutionError::NotFound(name.to_string())),
            [only] => Ok(Rc::clone(only)),
            many => Err(ResolutionError::Ambiguous {
                name: name.to_string(),
                candidates: many.len(),
            }),
        }
    }
}

impl CallableExecutor for ScriptedEnvironment {
    fn execute(
        &mut self,
        optimizer: &mut SpeculativeCallOptimizer,
        callee: &CallableDeclaration,
        frame: &Frame,
        arguments: &[Value],
    ) -> EngineResult<Vec<Value>> {
        self.executions.push(Execution {
            name: callee.name.clone(),
            frame: frame.clone(),
            arguments: arguments.to_vec(),
        });
        if let Some((inner, inner_arguments)) = self.nested.get(&callee.name).cloned() {
            let mut local = Frame::new();
            for (parameter, value) in callee.parameters.iter().zip(arguments) {
                local.bind(parameter.name.as_str(), value.clone());
            }
            return optimizer.invoke(self, &inner, None, &inner_arguments, &local);
        }
        let body = self
            .bodies
            .get(&callee.name)
            .ok_or_else(|| RuntimeFault::Unsupported(format!("no body for '{}'", callee.name)))?;
        Ok(body(arguments))
    }
}

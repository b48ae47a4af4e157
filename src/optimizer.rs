//! Speculative call optimizer.
//!
//! Instead of running a callable's body, the optimizer guesses its outputs
//! and checks them against the postcondition. Each invocation goes through:
//!
//! 1. resolve the declaration and evaluate the arguments in the caller's frame
//! 2. return a memoized result for an equal argument tuple, if any
//! 3. bind the arguments into a pristine snapshot of the caller's frame
//! 4. up to `synthesis_budget` times: draw one random value per return
//!    parameter, reject it if any nominal invariant inside its declared type
//!    fails (array elements, record fields and cell contents included), bind
//!    the outputs into a fresh copy of the pristine frame and check `ensures`;
//!    the first candidate that passes is memoized and returned
//! 5. otherwise run the real body through the executor, unmemoized
//!
//! A rejected attempt only drops its working frame; nothing it bound can be
//! seen by the next attempt or by the fallback.

use crate::collaborators::CallEnvironment;
use crate::config::{GenerationConfig, TestMode};
use crate::error::{EngineResult, GenerationError, GenerationResult};
use crate::expr::Expr;
use crate::generators::{Generator, GeneratorBuilder};
use crate::types::{CallableDeclaration, FunctionType, NominalType, Type};
use crate::value::{Frame, Value};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Synthesized outputs keyed by callable identity, then by argument tuple
#[derive(Debug, Clone, Default)]
pub struct CallMemoTable {
    entries: HashMap<String, HashMap<Vec<Value>, Vec<Value>>>,
}

impl CallMemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str, arguments: &[Value]) -> Option<&Vec<Value>> {
        self.entries.get(identity)?.get(arguments)
    }

    pub fn insert(&mut self, identity: String, arguments: Vec<Value>, outputs: Vec<Value>) {
        self.entries.entry(identity).or_default().insert(arguments, outputs);
    }

    /// Number of memoized argument tuples across all callables
    pub fn len(&self) -> usize {
        self.entries.values().map(|calls| calls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters over the optimizer's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptimizerStats {
    pub invocations: u64,
    pub memo_hits: u64,
    pub attempts: u64,
    pub rejections: u64,
    pub syntheses: u64,
    pub fallbacks: u64,
}

pub struct SpeculativeCallOptimizer {
    config: GenerationConfig,
    rng: ChaCha8Rng,
    memo: CallMemoTable,
    stats: OptimizerStats,
}

impl SpeculativeCallOptimizer {
    /// Fails when the configured integer or array bounds are inverted
    pub fn new(config: GenerationConfig) -> GenerationResult<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            memo: CallMemoTable::new(),
            stats: OptimizerStats::default(),
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn memo(&self) -> &CallMemoTable {
        &self.memo
    }

    pub fn stats(&self) -> OptimizerStats {
        self.stats
    }

    /// Outputs of calling `name` with `arguments` evaluated in `frame`
    pub fn invoke(
        &mut self,
        env: &mut dyn CallEnvironment,
        name: &str,
        signature: Option<&FunctionType>,
        arguments: &[Expr],
        frame: &Frame,
    ) -> EngineResult<Vec<Value>> {
        self.stats.invocations += 1;
        let declaration = env.resolve_exactly(name, signature)?;
        let values = arguments
            .iter()
            .map(|argument| env.evaluate(argument, frame))
            .collect::<Result<Vec<_>, _>>()?;
        let identity = declaration.identity();

        if let Some(outputs) = self.memo.get(&identity, &values) {
            self.stats.memo_hits += 1;
            info!("Memo hit for {}", identity);
            return Ok(outputs.iter().map(Value::deep_copy).collect());
        }

        if let Some(outputs) = self.synthesize(env, &declaration, frame, &values)? {
            self.stats.syntheses += 1;
            info!("Synthesized outputs for {}", identity);
            let stored = outputs.iter().map(Value::deep_copy).collect();
            self.memo.insert(identity, values.iter().map(Value::deep_copy).collect(), stored);
            return Ok(outputs);
        }

        self.stats.fallbacks += 1;
        info!("Falling back to executing {}", identity);
        env.execute(self, &declaration, frame, &values)
    }

    /// The first candidate outputs satisfying the postcondition, if one turns
    /// up within the budget
    fn synthesize(
        &mut self,
        env: &mut dyn CallEnvironment,
        declaration: &CallableDeclaration,
        frame: &Frame,
        arguments: &[Value],
    ) -> GenerationResult<Option<Vec<Value>>> {
        if declaration.parameters.len() != arguments.len() {
            debug!(
                "Not synthesizing {}: {} arguments for {} parameters",
                declaration.identity(),
                arguments.len(),
                declaration.parameters.len()
            );
            return Ok(None);
        }
        let mut generators = match self.return_generators(&*env, declaration)? {
            Some(generators) => generators,
            None => return Ok(None),
        };

        let mut bound = frame.clone();
        for (parameter, value) in declaration.parameters.iter().zip(arguments) {
            bound.bind(parameter.name.as_str(), value.clone());
        }
        let pristine = bound.snapshot();

        for attempt in 0..self.config.synthesis_budget {
            self.stats.attempts += 1;
            let candidates: Vec<Value> = generators
                .iter_mut()
                .map(|g| g.draw(TestMode::Random, &mut self.rng))
                .collect();

            if let Some(slot) = violated_return_invariant(&*env, declaration, &candidates) {
                debug!(
                    "Attempt {} for {}: candidate for '{}' breaks its type invariant",
                    attempt, declaration.name, declaration.returns[slot].name
                );
                self.stats.rejections += 1;
                continue;
            }

            let mut working = pristine.snapshot();
            for (ret, value) in declaration.returns.iter().zip(&candidates) {
                working.bind(ret.name.as_str(), value.clone());
            }
            match env.check(&working, &declaration.ensures) {
                Ok(verdict) if verdict.holds() => return Ok(Some(candidates)),
                Ok(verdict) => debug!(
                    "Attempt {} for {} rejected: {:?}",
                    attempt, declaration.name, verdict
                ),
                Err(fault) => debug!(
                    "Attempt {} for {} faulted in postcondition: {}",
                    attempt, declaration.name, fault
                ),
            }
            self.stats.rejections += 1;
        }
        Ok(None)
    }

    /// One generator per return parameter; `None` when some return type has
    /// an empty domain. Inverted bounds are fatal.
    fn return_generators(
        &self,
        env: &dyn CallEnvironment,
        declaration: &CallableDeclaration,
    ) -> GenerationResult<Option<Vec<Generator>>> {
        let builder = GeneratorBuilder::new(&self.config, env);
        let built = declaration
            .returns
            .iter()
            .map(|ret| builder.build(&ret.ty))
            .collect::<GenerationResult<Vec<_>>>();
        match built {
            Ok(generators) => Ok(Some(generators)),
            Err(e @ GenerationError::CannotGenerate { .. }) => {
                debug!("No return generators for {}: {}", declaration.identity(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Index of the first return value breaking a nominal invariant anywhere in
/// its declared type
fn violated_return_invariant(
    env: &dyn CallEnvironment,
    declaration: &CallableDeclaration,
    candidates: &[Value],
) -> Option<usize> {
    declaration
        .returns
        .iter()
        .zip(candidates)
        .position(|(ret, value)| !satisfies_invariants(env, &ret.ty, value))
}

/// Checks every nominal invariant reachable through `ty` against the matching
/// part of `value`. A union is satisfied when any alternative is.
fn satisfies_invariants(env: &dyn CallEnvironment, ty: &Type, value: &Value) -> bool {
    match (ty, value) {
        (Type::Nominal(nominal), _) => {
            invariant_holds(env, nominal, value) && satisfies_invariants(env, &nominal.base, value)
        }
        (Type::Array(element), Value::Array(items)) => {
            items.iter().all(|item| satisfies_invariants(env, element, item))
        }
        (Type::Record(fields), Value::Record(values)) => fields.iter().all(|(name, field)| {
            values
                .get(name)
                .map_or(true, |v| satisfies_invariants(env, field, v))
        }),
        (Type::Reference(inner), Value::Reference(cell)) => {
            let contents = cell.borrow().clone();
            satisfies_invariants(env, inner, &contents)
        }
        (Type::Union(alternatives), _) => alternatives
            .iter()
            .any(|alternative| satisfies_invariants(env, alternative, value)),
        _ => true,
    }
}

fn invariant_holds(env: &dyn CallEnvironment, nominal: &NominalType, value: &Value) -> bool {
    if nominal.invariant.is_empty() {
        return true;
    }
    let frame = Frame::new().with(nominal.variable.as_str(), value.clone());
    matches!(env.check(&frame, &nominal.invariant), Ok(verdict) if verdict.holds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_table_keys_by_structure() {
        let mut memo = CallMemoTable::new();
        assert!(memo.is_empty());
        memo.insert(
            "f(int)->(int)".to_string(),
            vec![Value::int(2)],
            vec![Value::int(4)],
        );
        assert_eq!(memo.get("f(int)->(int)", &[Value::int(2)]), Some(&vec![Value::int(4)]));
        assert_eq!(memo.get("f(int)->(int)", &[Value::int(3)]), None);
        assert_eq!(memo.get("f(bool)->(int)", &[Value::int(2)]), None);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_memo_table_keys_references_by_contents() {
        let mut memo = CallMemoTable::new();
        memo.insert(
            "g(&int)->()".to_string(),
            vec![Value::reference(Value::int(1))],
            vec![],
        );
        assert!(memo.get("g(&int)->()", &[Value::reference(Value::int(1))]).is_some());
    }

    #[test]
    fn test_stats_serialize() {
        let stats = OptimizerStats {
            invocations: 2,
            memo_hits: 1,
            ..OptimizerStats::default()
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["invocations"], 2);
        assert_eq!(json["memo_hits"], 1);
        assert_eq!(json["fallbacks"], 0);
    }
}

//! Parameter-tuple strategies.
//!
//! A strategy holds one generator per formal parameter, each built from the
//! parameter's declared type and narrowed before the first draw. As an
//! `Iterator` a strategy yields one test run's worth of tuples; `next_tuple`
//! keeps drawing past that point.

use crate::collaborators::Evaluator;
use crate::config::{GenerationConfig, TestMode};
use crate::error::GenerationResult;
use crate::expr::Expr;
use crate::generators::{Generator, GeneratorBuilder, Odometer};
use crate::types::Parameter;
use crate::value::Value;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn build_generators<E: Evaluator + ?Sized>(
    parameters: &[Parameter],
    requires: &[Expr],
    config: &GenerationConfig,
    evaluator: &E,
) -> GenerationResult<Vec<Generator>> {
    config.validate()?;
    let builder = GeneratorBuilder::new(config, evaluator);
    parameters
        .iter()
        .map(|parameter| builder.build_for_parameter(parameter, requires))
        .collect()
}

/// Independent random samples, `num_tests` tuples per run
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    generators: Vec<Generator>,
    rng: ChaCha8Rng,
    remaining: usize,
}

impl RandomStrategy {
    pub fn new<E: Evaluator + ?Sized>(
        parameters: &[Parameter],
        requires: &[Expr],
        config: &GenerationConfig,
        evaluator: &E,
    ) -> GenerationResult<Self> {
        let generators = build_generators(parameters, requires, config, evaluator)?;
        debug!(
            "Random strategy over {} parameters, {} tests, seed {}",
            generators.len(),
            config.num_tests,
            config.seed
        );
        Ok(Self {
            generators,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            remaining: config.num_tests,
        })
    }

    pub fn next_tuple(&mut self) -> Vec<Value> {
        let rng = &mut self.rng;
        self.generators.iter().map(|g| g.draw_random(rng)).collect()
    }
}

impl Iterator for RandomStrategy {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.next_tuple())
    }
}

/// Every combination in odometer order, truncated to `num_tests`
#[derive(Debug, Clone)]
pub struct ExhaustiveStrategy {
    odometer: Odometer,
    cap: usize,
    produced: u128,
}

impl ExhaustiveStrategy {
    pub fn new<E: Evaluator + ?Sized>(
        parameters: &[Parameter],
        requires: &[Expr],
        config: &GenerationConfig,
        evaluator: &E,
    ) -> GenerationResult<Self> {
        let odometer = Odometer::new(build_generators(parameters, requires, config, evaluator)?);
        let strategy = Self {
            odometer,
            cap: config.num_tests,
            produced: 0,
        };
        debug!(
            "Exhaustive strategy over {} parameters: {} combinations, running {}",
            strategy.odometer.len(),
            strategy.total(),
            strategy.run_length()
        );
        Ok(strategy)
    }

    /// Size of the full cross product
    pub fn total(&self) -> u128 {
        self.odometer.cardinality()
    }

    /// Tuples yielded by the iterator: the cross product, capped
    pub fn run_length(&self) -> u128 {
        self.total().min(self.cap as u128)
    }

    pub fn next_tuple(&mut self) -> Vec<Value> {
        self.produced += 1;
        self.odometer.next()
    }

    pub fn reset(&mut self) {
        self.odometer.reset();
        self.produced = 0;
    }
}

impl Iterator for ExhaustiveStrategy {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        if self.produced >= self.run_length() {
            return None;
        }
        Some(self.next_tuple())
    }
}

/// Either strategy, chosen by the configured mode
#[derive(Debug, Clone)]
pub enum Strategy {
    Random(RandomStrategy),
    Exhaustive(ExhaustiveStrategy),
}

impl Strategy {
    pub fn new<E: Evaluator + ?Sized>(
        parameters: &[Parameter],
        requires: &[Expr],
        config: &GenerationConfig,
        evaluator: &E,
    ) -> GenerationResult<Self> {
        Ok(match config.mode {
            TestMode::Random => Strategy::Random(RandomStrategy::new(parameters, requires, config, evaluator)?),
            TestMode::Exhaustive => {
                Strategy::Exhaustive(ExhaustiveStrategy::new(parameters, requires, config, evaluator)?)
            }
        })
    }

    pub fn next_tuple(&mut self) -> Vec<Value> {
        match self {
            Strategy::Random(s) => s.next_tuple(),
            Strategy::Exhaustive(s) => s.next_tuple(),
        }
    }
}

impl Iterator for Strategy {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        match self {
            Strategy::Random(s) => s.next(),
            Strategy::Exhaustive(s) => s.next(),
        }
    }
}

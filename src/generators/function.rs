// Closure generator. A drawn lambda ignores its arguments and returns values
// drawn from one sub-generator per return slot. Every draw mints fresh local
// names so two lambdas never share captured bindings.

use super::{Generator, Odometer};
use crate::value::{Frame, Lambda, LambdaBody, Value};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};

static LAMBDA_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_lambda_id() -> u64 {
    LAMBDA_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct FunctionGenerator {
    arity: usize,
    returns: Odometer,
}

impl FunctionGenerator {
    pub fn new(arity: usize, returns: Vec<Generator>) -> Self {
        Self {
            arity,
            returns: Odometer::new(returns),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    fn close_over(&self, outputs: Vec<Value>) -> Value {
        let id = next_lambda_id();
        let parameters = (0..self.arity).map(|k| format!("$fn{}_p{}", id, k)).collect();
        let returns: Vec<String> = (0..outputs.len()).map(|k| format!("$fn{}_r{}", id, k)).collect();
        let mut captured = Frame::new();
        for (name, value) in returns.iter().zip(outputs) {
            captured.bind(name.as_str(), value);
        }
        Value::Lambda(Box::new(Lambda {
            parameters,
            returns,
            body: LambdaBody::ReturnCaptured,
            captured,
        }))
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        self.close_over(self.returns.draw_random(rng))
    }

    pub fn draw_at(&self, index: u128) -> Value {
        self.close_over(self.returns.draw_at(index))
    }

    pub fn next(&mut self) -> Value {
        let outputs = self.returns.next();
        self.close_over(outputs)
    }

    pub fn cardinality(&self) -> u128 {
        self.returns.cardinality()
    }

    pub fn reset(&mut self) {
        self.returns.reset();
    }

    pub fn is_exhausted(&self) -> bool {
        self.returns.is_exhausted()
    }
}

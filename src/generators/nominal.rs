// Generator for a nominal type: the base type's generator restricted to the
// range extracted from the type's `where` clause.

use super::Generator;
use crate::error::{GenerationError, GenerationResult};
use crate::interval::IntervalRange;
use crate::value::Value;
use log::debug;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct NominalGenerator {
    name: String,
    inner: Box<Generator>,
    range: IntervalRange,
}

impl NominalGenerator {
    /// Fails with `CannotGenerate` when `range` is empty, or when narrowing the
    /// base generator by it leaves nothing to draw.
    pub fn new(name: &str, mut inner: Generator, range: IntervalRange) -> GenerationResult<Self> {
        if range.is_empty() {
            log::warn!("Nominal type '{}' has empty domain {}", name, range);
            return Err(GenerationError::CannotGenerate {
                reason: format!("nominal type '{}' has empty domain {}", name, range),
            });
        }
        if !range.is_top() {
            inner.narrow(&range)?;
        }
        debug!("Built generator for nominal type '{}' within {}", name, range);
        Ok(Self {
            name: name.to_string(),
            inner: Box::new(inner),
            range,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &IntervalRange {
        &self.range
    }

    pub fn inner(&self) -> &Generator {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut Generator {
        &mut self.inner
    }

    pub fn narrow(&mut self, range: &IntervalRange) -> GenerationResult<()> {
        self.inner.narrow(range)?;
        self.range = self.range.intersection(range);
        Ok(())
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        self.inner.draw_random(rng)
    }

    pub fn draw_at(&self, index: u128) -> Value {
        self.inner.draw_at(index)
    }

    pub fn next(&mut self) -> Value {
        self.inner.next()
    }

    pub fn cardinality(&self) -> u128 {
        self.inner.cardinality()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::IntegerGenerator;
    use num_bigint::BigInt;

    fn ints(lower: i64, upper: i64) -> Generator {
        Generator::Integer(IntegerGenerator::new(BigInt::from(lower), BigInt::from(upper)).unwrap())
    }

    #[test]
    fn test_bottom_range_cannot_generate() {
        let result = NominalGenerator::new("never", ints(-3, 3), IntervalRange::finite(1, 0));
        assert!(matches!(result, Err(GenerationError::CannotGenerate { .. })));
    }

    #[test]
    fn test_range_outside_bounds_cannot_generate() {
        let result = NominalGenerator::new("big", ints(-3, 3), IntervalRange::at_least(100));
        assert!(matches!(result, Err(GenerationError::CannotGenerate { .. })));
    }

    #[test]
    fn test_narrows_base_generator() {
        let mut nat = NominalGenerator::new("nat", ints(-3, 3), IntervalRange::at_least(0)).unwrap();
        assert_eq!(nat.cardinality(), 3);
        let drawn: Vec<Value> = (0..4).map(|_| nat.next()).collect();
        assert_eq!(drawn, vec![Value::int(0), Value::int(1), Value::int(2), Value::int(0)]);
    }

    #[test]
    fn test_top_range_keeps_base() {
        let plain = NominalGenerator::new("id", ints(-3, 3), IntervalRange::top()).unwrap();
        assert_eq!(plain.cardinality(), 6);
        assert_eq!(plain.name(), "id");
    }
}

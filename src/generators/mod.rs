//! Typed value generators
//!
//! A generator produces values of one declared type, either as independent
//! random samples or by walking a fixed exhaustive order. Every variant
//! answers the same protocol:
//!
//! - `draw_random` - one independent uniform sample
//! - `draw_at(i)` - the value at position `i` of the exhaustive order
//! - `next` - the next exhaustive value, wrapping after a full cycle
//! - `cardinality` - number of distinct values in one cycle, or [`UNBOUNDED`]
//! - `reset` / `is_exhausted` - rewind, and whether a full cycle has been drawn
//!
//! Each generator owns its position counter. Two parameter slots of the same
//! type hold two independent instances.

mod builder;
mod composite;
mod function;
mod nominal;
mod primitive;

pub use builder::GeneratorBuilder;
pub use composite::{ArrayGenerator, Odometer, RecordGenerator, ReferenceGenerator, UnionGenerator};
pub use function::FunctionGenerator;
pub use nominal::NominalGenerator;
pub use primitive::{BoolGenerator, ByteGenerator, IntegerGenerator, NullGenerator};

use crate::config::TestMode;
use crate::error::{GenerationError, GenerationResult};
use crate::interval::IntervalRange;
use crate::value::Value;
use rand_chacha::ChaCha8Rng;

/// Cardinality of a domain too large to count in a `u128`
pub const UNBOUNDED: u128 = u128::MAX;

pub(crate) fn saturating_sum<I: IntoIterator<Item = u128>>(counts: I) -> u128 {
    counts.into_iter().fold(0u128, |acc, c| acc.saturating_add(c))
}

pub(crate) fn saturating_product<I: IntoIterator<Item = u128>>(counts: I) -> u128 {
    counts.into_iter().fold(1u128, |acc, c| acc.saturating_mul(c))
}

pub(crate) fn saturating_pow(base: u128, exponent: usize) -> u128 {
    u32::try_from(exponent)
        .map(|e| base.saturating_pow(e))
        .unwrap_or(if base > 1 { UNBOUNDED } else { base })
}

/// A generator for one value shape
#[derive(Debug, Clone)]
pub enum Generator {
    Null(NullGenerator),
    Bool(BoolGenerator),
    Byte(ByteGenerator),
    Integer(IntegerGenerator),
    Array(ArrayGenerator),
    Record(RecordGenerator),
    Union(UnionGenerator),
    Reference(ReferenceGenerator),
    Function(FunctionGenerator),
    Nominal(NominalGenerator),
}

macro_rules! dispatch {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Generator::Null($g) => $body,
            Generator::Bool($g) => $body,
            Generator::Byte($g) => $body,
            Generator::Integer($g) => $body,
            Generator::Array($g) => $body,
            Generator::Record($g) => $body,
            Generator::Union($g) => $body,
            Generator::Reference($g) => $body,
            Generator::Function($g) => $body,
            Generator::Nominal($g) => $body,
        }
    };
}

impl Generator {
    /// Next exhaustive value or an independent random sample, per `mode`
    pub fn draw(&mut self, mode: TestMode, rng: &mut ChaCha8Rng) -> Value {
        match mode {
            TestMode::Exhaustive => self.next(),
            TestMode::Random => self.draw_random(rng),
        }
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        dispatch!(self, g => g.draw_random(rng))
    }

    pub fn draw_at(&self, index: u128) -> Value {
        dispatch!(self, g => g.draw_at(index))
    }

    pub fn next(&mut self) -> Value {
        dispatch!(self, g => g.next())
    }

    pub fn cardinality(&self) -> u128 {
        dispatch!(self, g => g.cardinality())
    }

    pub fn reset(&mut self) {
        dispatch!(self, g => g.reset())
    }

    pub fn is_exhausted(&self) -> bool {
        dispatch!(self, g => g.is_exhausted())
    }

    /// Restrict the generator to values inside `range`
    ///
    /// Integers are bounded directly and arrays by their length; nominal
    /// generators pass the range to their base. Other shapes carry no integer
    /// domain and are left as they are. Narrowing never widens.
    pub fn narrow(&mut self, range: &IntervalRange) -> GenerationResult<()> {
        if range.is_empty() {
            log::warn!("Refusing to narrow by empty range {}", range);
            return Err(GenerationError::CannotGenerate {
                reason: format!("constraint range {} is empty", range),
            });
        }
        match self {
            Generator::Integer(g) => g.narrow(range),
            Generator::Array(g) => g.narrow(range),
            Generator::Nominal(g) => g.narrow(range),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use rand::SeedableRng;

    #[test]
    fn test_saturating_helpers() {
        assert_eq!(saturating_sum(vec![1, 2, 3]), 6);
        assert_eq!(saturating_sum(vec![UNBOUNDED, 1]), UNBOUNDED);
        assert_eq!(saturating_product(vec![]), 1);
        assert_eq!(saturating_product(vec![3, 2]), 6);
        assert_eq!(saturating_pow(2, 200), UNBOUNDED);
        assert_eq!(saturating_pow(0, 0), 1);
    }

    #[test]
    fn test_draw_follows_mode() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut generator =
            Generator::Integer(IntegerGenerator::new(BigInt::from(10), BigInt::from(13)).unwrap());
        assert_eq!(generator.draw(TestMode::Exhaustive, &mut rng), Value::int(10));
        assert_eq!(generator.draw(TestMode::Exhaustive, &mut rng), Value::int(11));
        for _ in 0..20 {
            let value = generator.draw(TestMode::Random, &mut rng);
            let n = value.as_int().cloned().unwrap();
            assert!(n >= BigInt::from(10) && n < BigInt::from(13));
        }
    }

    #[test]
    fn test_narrow_by_bottom_fails() {
        let mut generator = Generator::Bool(BoolGenerator::new());
        let result = generator.narrow(&IntervalRange::bottom());
        assert!(matches!(result, Err(GenerationError::CannotGenerate { .. })));
    }

    #[test]
    fn test_narrow_ignores_non_integer_shapes() {
        let mut generator = Generator::Byte(ByteGenerator::new());
        generator.narrow(&IntervalRange::finite(0, 2)).unwrap();
        assert_eq!(generator.cardinality(), 256);
    }
}

// Leaf generators: null, booleans, bytes and bounded integers.
// Each owns a position counter; exhaustive `next` is `draw_at(position)`
// followed by an increment, wrapping once the cycle is complete.

use super::UNBOUNDED;
use crate::error::{GenerationError, GenerationResult};
use crate::interval::{Bound, IntervalRange};
use crate::value::Value;
use log::debug;
use num_bigint::{BigInt, RandBigInt};
use num_traits::{Signed, ToPrimitive, Zero};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Default)]
pub struct NullGenerator {
    position: u128,
}

impl NullGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_random(&self, _rng: &mut ChaCha8Rng) -> Value {
        Value::Null
    }

    pub fn draw_at(&self, _index: u128) -> Value {
        Value::Null
    }

    pub fn next(&mut self) -> Value {
        if self.is_exhausted() {
            self.reset();
        }
        self.position += 1;
        Value::Null
    }

    pub fn cardinality(&self) -> u128 {
        1
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

/// `false` then `true`
#[derive(Debug, Clone, Default)]
pub struct BoolGenerator {
    position: u128,
}

impl BoolGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        Value::Bool(rng.gen::<bool>())
    }

    pub fn draw_at(&self, index: u128) -> Value {
        Value::Bool(index % 2 == 1)
    }

    pub fn next(&mut self) -> Value {
        if self.is_exhausted() {
            self.reset();
        }
        let value = self.draw_at(self.position);
        self.position += 1;
        value
    }

    pub fn cardinality(&self) -> u128 {
        2
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

/// All 256 byte values in ascending order
#[derive(Debug, Clone, Default)]
pub struct ByteGenerator {
    position: u128,
}

impl ByteGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        Value::Byte(rng.gen::<u8>())
    }

    pub fn draw_at(&self, index: u128) -> Value {
        Value::Byte((index % 256) as u8)
    }

    pub fn next(&mut self) -> Value {
        if self.is_exhausted() {
            self.reset();
        }
        let value = self.draw_at(self.position);
        self.position += 1;
        value
    }

    pub fn cardinality(&self) -> u128 {
        256
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

/// Integers in the half-open range `[lower, upper)`
#[derive(Debug, Clone)]
pub struct IntegerGenerator {
    lower: BigInt,
    upper: BigInt,
    position: u128,
}

impl IntegerGenerator {
    pub fn new(lower: BigInt, upper: BigInt) -> GenerationResult<Self> {
        if upper <= lower {
            return Err(GenerationError::IntegerRange { lower, upper });
        }
        Ok(Self {
            lower,
            upper,
            position: 0,
        })
    }

    pub fn lower(&self) -> &BigInt {
        &self.lower
    }

    pub fn upper(&self) -> &BigInt {
        &self.upper
    }

    pub fn range(&self) -> IntervalRange {
        IntervalRange::finite(self.lower.clone(), self.upper.clone())
    }

    /// Intersect the bounds with `range`; never widens
    pub fn narrow(&mut self, range: &IntervalRange) -> GenerationResult<()> {
        let narrowed = self.range().intersection(range);
        let (lower, upper) = match (narrowed.lower(), narrowed.upper()) {
            (Bound::Finite(l), Bound::Finite(u)) if l < u => (l.clone(), u.clone()),
            _ => {
                log::warn!("Integer domain {} narrowed by {} is empty", self.range(), range);
                return Err(GenerationError::CannotGenerate {
                    reason: format!("integer domain {} narrowed by {} is empty", self.range(), range),
                });
            }
        };
        debug!("Narrowed integer generator {} to [{}, {})", self.range(), lower, upper);
        self.lower = lower;
        self.upper = upper;
        self.position = 0;
        Ok(())
    }

    /// Rejection sampling; when the range straddles zero a magnitude is drawn
    /// and its sign chosen by a coin flip.
    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        let zero = BigInt::zero();
        if self.lower >= zero || self.upper <= zero {
            return Value::Int(rng.gen_bigint_range(&self.lower, &self.upper));
        }
        let magnitude_bound = std::cmp::max(self.lower.abs() + 1, self.upper.clone());
        loop {
            let mut candidate = rng.gen_bigint_range(&zero, &magnitude_bound);
            if rng.gen::<bool>() {
                candidate = -candidate;
            }
            if candidate >= self.lower && candidate < self.upper {
                return Value::Int(candidate);
            }
        }
    }

    pub fn draw_at(&self, index: u128) -> Value {
        let offset = index.checked_rem(self.cardinality()).unwrap_or(0);
        Value::Int(&self.lower + BigInt::from(offset))
    }

    pub fn next(&mut self) -> Value {
        if self.is_exhausted() {
            self.reset();
        }
        let value = self.draw_at(self.position);
        self.position += 1;
        value
    }

    pub fn cardinality(&self) -> u128 {
        (&self.upper - &self.lower).to_u128().unwrap_or(UNBOUNDED)
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

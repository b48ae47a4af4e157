//! Composite generators: arrays, records, unions and reference cells.
//!
//! Exhaustive enumeration over several sub-generators is a mixed-radix
//! odometer: the rightmost generator advances on every draw, and when it has
//! produced its whole cycle it is reset and the next generator to the left
//! advances. Every combination appears exactly once per cycle, in
//! lexicographic order over generator index.

use super::{saturating_pow, saturating_product, saturating_sum, Generator};
use crate::error::{GenerationError, GenerationResult};
use crate::interval::{Bound, IntervalRange};
use crate::value::Value;
use log::debug;
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Mixed-radix counter over an ordered list of generators
#[derive(Debug, Clone)]
pub struct Odometer {
    generators: Vec<Generator>,
    current: Option<Vec<Value>>,
    position: u128,
}

impl Odometer {
    pub fn new(generators: Vec<Generator>) -> Self {
        Self {
            generators,
            current: None,
            position: 0,
        }
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn generators_mut(&mut self) -> &mut [Generator] {
        &mut self.generators
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn cardinality(&self) -> u128 {
        saturating_product(self.generators.iter().map(|g| g.cardinality()))
    }

    /// Next combination in odometer order, wrapping after a full cycle
    pub fn next(&mut self) -> Vec<Value> {
        if self.is_exhausted() {
            self.reset();
        }
        let combination = match self.current.take() {
            None => self.generators.iter_mut().map(|g| g.next()).collect(),
            Some(mut digits) => {
                for (i, generator) in self.generators.iter_mut().enumerate().rev() {
                    let carry = generator.is_exhausted();
                    digits[i] = generator.next();
                    if !carry {
                        break;
                    }
                }
                digits
            }
        };
        self.position += 1;
        self.current = Some(combination.clone());
        combination
    }

    /// Combination at `index`; the rightmost generator is the least significant digit
    pub fn draw_at(&self, index: u128) -> Vec<Value> {
        let mut remaining = index.checked_rem(self.cardinality()).unwrap_or(0);
        let mut values = vec![Value::Null; self.generators.len()];
        for (i, generator) in self.generators.iter().enumerate().rev() {
            let radix = generator.cardinality().max(1);
            values[i] = generator.draw_at(remaining % radix);
            remaining /= radix;
        }
        values
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Vec<Value> {
        self.generators.iter().map(|g| g.draw_random(rng)).collect()
    }

    pub fn reset(&mut self) {
        for generator in &mut self.generators {
            generator.reset();
        }
        self.current = None;
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

/// Arrays with lengths in `[min_size, max_size]`; shorter arrays come first
#[derive(Debug, Clone)]
pub struct ArrayGenerator {
    element: Box<Generator>,
    min_size: usize,
    max_size: usize,
    position: u128,
}

impl ArrayGenerator {
    pub fn new(element: Generator, min_size: usize, max_size: usize) -> GenerationResult<Self> {
        if max_size < min_size {
            return Err(GenerationError::ArraySize {
                min: min_size,
                max: max_size,
            });
        }
        Ok(Self {
            element: Box::new(element),
            min_size,
            max_size,
            position: 0,
        })
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Intersect the size bounds with `range` (a constraint on the length)
    pub fn narrow(&mut self, range: &IntervalRange) -> GenerationResult<()> {
        let sizes = IntervalRange::finite(self.min_size as u64, self.max_size as u64 + 1);
        let narrowed = sizes.intersection(range);
        let bounds = match (narrowed.lower(), narrowed.upper()) {
            (Bound::Finite(l), Bound::Finite(u)) if l < u => {
                l.to_usize().zip((u - BigInt::one()).to_usize())
            }
            _ => None,
        };
        let (min_size, max_size) = bounds.ok_or_else(|| {
            log::warn!("Array sizes {} narrowed by {} are empty", sizes, range);
            GenerationError::CannotGenerate {
                reason: format!("array sizes {} narrowed by {} are empty", sizes, range),
            }
        })?;
        debug!("Narrowed array sizes to {}..={}", min_size, max_size);
        self.min_size = min_size;
        self.max_size = max_size;
        self.position = 0;
        Ok(())
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        let length = rng.gen_range(self.min_size..=self.max_size);
        Value::Array((0..length).map(|_| self.element.draw_random(rng)).collect())
    }

    pub fn draw_at(&self, index: u128) -> Value {
        let radix = self.element.cardinality().max(1);
        let mut remaining = index.checked_rem(self.cardinality()).unwrap_or(0);
        for length in self.min_size..=self.max_size {
            let count = saturating_pow(radix, length);
            if remaining < count || length == self.max_size {
                let mut items = vec![Value::Null; length];
                for slot in items.iter_mut().rev() {
                    *slot = self.element.draw_at(remaining % radix);
                    remaining /= radix;
                }
                return Value::Array(items);
            }
            remaining -= count;
        }
        Value::Array(Vec::new())
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
        let radix = self.element.cardinality();
        saturating_sum((self.min_size..=self.max_size).map(|length| saturating_pow(radix, length)))
    }

    pub fn reset(&mut self) {
        self.element.reset();
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

/// Records with one generator per field, enumerated by an odometer
#[derive(Debug, Clone)]
pub struct RecordGenerator {
    names: Vec<String>,
    fields: Odometer,
}

impl RecordGenerator {
    pub fn new(fields: Vec<(String, Generator)>) -> Self {
        let (names, generators): (Vec<_>, Vec<_>) = fields.into_iter().unzip();
        Self {
            names,
            fields: Odometer::new(generators),
        }
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Generator> {
        let index = self.names.iter().position(|n| n == name)?;
        self.fields.generators_mut().get_mut(index)
    }

    fn assemble(&self, values: Vec<Value>) -> Value {
        Value::record(self.names.iter().cloned().zip(values))
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        self.assemble(self.fields.draw_random(rng))
    }

    pub fn draw_at(&self, index: u128) -> Value {
        self.assemble(self.fields.draw_at(index))
    }

    pub fn next(&mut self) -> Value {
        let values = self.fields.next();
        self.assemble(values)
    }

    pub fn cardinality(&self) -> u128 {
        self.fields.cardinality()
    }

    pub fn reset(&mut self) {
        self.fields.reset();
    }

    pub fn is_exhausted(&self) -> bool {
        self.fields.is_exhausted()
    }
}

/// One of several alternatives; alternatives are enumerated in declaration order
#[derive(Debug, Clone)]
pub struct UnionGenerator {
    alternatives: Vec<Generator>,
    position: u128,
}

impl UnionGenerator {
    pub fn new(alternatives: Vec<Generator>) -> GenerationResult<Self> {
        if alternatives.is_empty() {
            return Err(GenerationError::CannotGenerate {
                reason: "union with no alternatives".to_string(),
            });
        }
        Ok(Self {
            alternatives,
            position: 0,
        })
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        let choice = rng.gen_range(0..self.alternatives.len());
        self.alternatives[choice].draw_random(rng)
    }

    pub fn draw_at(&self, index: u128) -> Value {
        let mut remaining = index.checked_rem(self.cardinality()).unwrap_or(0);
        let last = self.alternatives.len() - 1;
        for (i, alternative) in self.alternatives.iter().enumerate() {
            let count = alternative.cardinality();
            if remaining < count || i == last {
                return alternative.draw_at(remaining);
            }
            remaining -= count;
        }
        Value::Null
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
        saturating_sum(self.alternatives.iter().map(|g| g.cardinality()))
    }

    pub fn reset(&mut self) {
        for alternative in &mut self.alternatives {
            alternative.reset();
        }
        self.position = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cardinality()
    }
}

/// Wraps each drawn value in a fresh reference cell
#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    inner: Box<Generator>,
}

impl ReferenceGenerator {
    pub fn new(inner: Generator) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn draw_random(&self, rng: &mut ChaCha8Rng) -> Value {
        Value::reference(self.inner.draw_random(rng))
    }

    pub fn draw_at(&self, index: u128) -> Value {
        Value::reference(self.inner.draw_at(index))
    }

    pub fn next(&mut self) -> Value {
        Value::reference(self.inner.next())
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

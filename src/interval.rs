//! Integer interval lattice with signed infinities.
//!
//! A range is half-open: `[lower, upper)`. A point constraint `x == k` is the
//! range `[k, k+1)`. Any range whose lower bound exceeds its upper bound is
//! BOTTOM (the empty set); the canonical BOTTOM is `[1, 0)`.

use num_bigint::BigInt;
use num_traits::One;
use std::fmt;

/// One end of an interval
///
/// Variant order is numeric order, so the derived `Ord` places every finite
/// value strictly between the two infinities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bound {
    NegInf,
    Finite(BigInt),
    PosInf,
}

impl Bound {
    pub fn finite<T: Into<BigInt>>(n: T) -> Bound {
        Bound::Finite(n.into())
    }

    pub fn as_finite(&self) -> Option<&BigInt> {
        match self {
            Bound::Finite(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    /// Shift a finite bound; infinities absorb the offset
    pub fn offset(&self, delta: i64) -> Bound {
        match self {
            Bound::Finite(n) => Bound::Finite(n + delta),
            other => other.clone(),
        }
    }

    pub fn min(a: &Bound, b: &Bound) -> Bound {
        if a <= b {
            a.clone()
        } else {
            b.clone()
        }
    }

    pub fn max(a: &Bound, b: &Bound) -> Bound {
        if a >= b {
            a.clone()
        } else {
            b.clone()
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NegInf => write!(f, "-inf"),
            Bound::Finite(n) => write!(f, "{}", n),
            Bound::PosInf => write!(f, "+inf"),
        }
    }
}

/// Half-open integer range `[lower, upper)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntervalRange {
    lower: Bound,
    upper: Bound,
}

impl IntervalRange {
    /// Build a range from raw bounds; no normalisation is applied
    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    pub fn finite<L: Into<BigInt>, U: Into<BigInt>>(lower: L, upper: U) -> Self {
        Self::new(Bound::finite(lower), Bound::finite(upper))
    }

    /// `[k, k+1)`
    pub fn point<T: Into<BigInt>>(k: T) -> Self {
        let k = k.into();
        let next = &k + BigInt::one();
        Self::new(Bound::Finite(k), Bound::Finite(next))
    }

    /// `[k, +inf)`
    pub fn at_least<T: Into<BigInt>>(k: T) -> Self {
        Self::new(Bound::finite(k), Bound::PosInf)
    }

    /// `[-inf, k)`
    pub fn below<T: Into<BigInt>>(k: T) -> Self {
        Self::new(Bound::NegInf, Bound::finite(k))
    }

    pub fn top() -> Self {
        Self::new(Bound::NegInf, Bound::PosInf)
    }

    pub fn bottom() -> Self {
        Self::finite(1, 0)
    }

    pub fn lower(&self) -> &Bound {
        &self.lower
    }

    pub fn upper(&self) -> &Bound {
        &self.upper
    }

    pub fn is_top(&self) -> bool {
        self.lower == Bound::NegInf && self.upper == Bound::PosInf
    }

    pub fn is_bottom(&self) -> bool {
        self.lower > self.upper
    }

    /// No integer lies in the range (BOTTOM, or `[k, k)`)
    pub fn is_empty(&self) -> bool {
        self.lower >= self.upper
    }

    /// Number of integers in the range, `None` when unbounded
    pub fn size(&self) -> Option<BigInt> {
        if self.is_empty() {
            return Some(BigInt::from(0));
        }
        match (&self.lower, &self.upper) {
            (Bound::Finite(l), Bound::Finite(u)) => Some(u - l),
            _ => None,
        }
    }

    pub fn contains_value(&self, n: &BigInt) -> bool {
        let b = Bound::Finite(n.clone());
        self.lower <= b && b < self.upper
    }

    /// True iff this range's bounds dominate `other`'s on both ends
    pub fn contains(&self, other: &IntervalRange) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }

    pub fn add(&self, other: &IntervalRange) -> IntervalRange {
        if self.is_empty() || other.is_empty() {
            return IntervalRange::bottom();
        }
        let lower = match (&self.lower, &other.lower) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a + b),
            _ => Bound::NegInf,
        };
        // max(a) + max(b) = (ua - 1) + (ub - 1), exclusive bound adds one back
        let upper = match (&self.upper, &other.upper) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a + b - 1),
            _ => Bound::PosInf,
        };
        IntervalRange::new(lower, upper)
    }

    pub fn subtract(&self, other: &IntervalRange) -> IntervalRange {
        if self.is_empty() || other.is_empty() {
            return IntervalRange::bottom();
        }
        let lower = match (&self.lower, &other.upper) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a - b + 1),
            _ => Bound::NegInf,
        };
        let upper = match (&self.upper, &other.lower) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a - b),
            _ => Bound::PosInf,
        };
        IntervalRange::new(lower, upper)
    }

    /// Interval multiplication is not modelled: no constraint
    pub fn multiply(&self, _other: &IntervalRange) -> Option<IntervalRange> {
        None
    }

    /// Interval division is not modelled: no constraint
    pub fn divide(&self, _other: &IntervalRange) -> Option<IntervalRange> {
        None
    }

    /// Set difference is not representable as one range: no constraint
    pub fn difference(&self, _other: &IntervalRange) -> Option<IntervalRange> {
        None
    }

    pub fn union(&self, other: &IntervalRange) -> IntervalRange {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        IntervalRange::new(
            Bound::min(&self.lower, &other.lower),
            Bound::max(&self.upper, &other.upper),
        )
    }

    pub fn intersection(&self, other: &IntervalRange) -> IntervalRange {
        IntervalRange::new(
            Bound::max(&self.lower, &other.lower),
            Bound::min(&self.upper, &other.upper),
        )
    }

    /// Lower and upper bound exchanged verbatim. Not a set complement.
    pub fn swapped(&self) -> IntervalRange {
        IntervalRange::new(self.upper.clone(), self.lower.clone())
    }

    /// Constraints on `self` and `other` for `self < other` to hold
    pub fn less_than(&self, other: &IntervalRange) -> (IntervalRange, IntervalRange) {
        let lhs = self.intersection(&IntervalRange::new(Bound::NegInf, other.upper.offset(-1)));
        let rhs = other.intersection(&IntervalRange::new(self.lower.offset(1), Bound::PosInf));
        (lhs, rhs)
    }

    /// Constraints on `self` and `other` for `self <= other` to hold
    pub fn less_than_or_equals(&self, other: &IntervalRange) -> (IntervalRange, IntervalRange) {
        let lhs = self.intersection(&IntervalRange::new(Bound::NegInf, other.upper.clone()));
        let rhs = other.intersection(&IntervalRange::new(self.lower.clone(), Bound::PosInf));
        (lhs, rhs)
    }

    pub fn greater_than(&self, other: &IntervalRange) -> (IntervalRange, IntervalRange) {
        let (rhs, lhs) = other.less_than(self);
        (lhs, rhs)
    }

    pub fn greater_than_or_equals(&self, other: &IntervalRange) -> (IntervalRange, IntervalRange) {
        let (rhs, lhs) = other.less_than_or_equals(self);
        (lhs, rhs)
    }

    pub fn equals(&self, other: &IntervalRange) -> (IntervalRange, IntervalRange) {
        let both = self.intersection(other);
        (both.clone(), both)
    }
}

impl fmt::Display for IntervalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<IntervalRange> {
        vec![
            IntervalRange::finite(-5, 15),
            IntervalRange::finite(0, 1),
            IntervalRange::finite(3, 10),
            IntervalRange::finite(-2, 4),
            IntervalRange::at_least(4),
            IntervalRange::below(-1),
            IntervalRange::top(),
            IntervalRange::bottom(),
        ]
    }

    #[test]
    fn test_infinity_ordering() {
        let big = Bound::finite(i64::MAX);
        assert!(Bound::NegInf < Bound::finite(i64::MIN));
        assert!(big < Bound::PosInf);
        assert_eq!(Bound::min(&Bound::PosInf, &big), big);
        assert_eq!(Bound::max(&Bound::NegInf, &big), big);
    }

    #[test]
    fn test_union_and_intersection_commute() {
        for a in samples() {
            for b in samples() {
                assert_eq!(a.union(&b), b.union(&a), "union {} {}", a, b);
                assert_eq!(a.intersection(&b), b.intersection(&a), "intersection {} {}", a, b);
            }
        }
    }

    #[test]
    fn test_identities() {
        for r in samples() {
            assert_eq!(IntervalRange::top().intersection(&r), r);
            assert_eq!(IntervalRange::bottom().union(&r), r);
        }
    }

    #[test]
    fn test_point_and_bottom() {
        let p = IntervalRange::point(7);
        assert_eq!(p, IntervalRange::finite(7, 8));
        assert_eq!(p.size(), Some(BigInt::from(1)));
        assert!(IntervalRange::finite(1, 0).is_bottom());
        assert!(IntervalRange::finite(3, 3).is_empty());
        assert!(!IntervalRange::finite(3, 3).is_bottom());
        assert_eq!(IntervalRange::top().size(), None);
    }

    #[test]
    fn test_contains() {
        let outer = IntervalRange::finite(-5, 15);
        assert!(outer.contains(&IntervalRange::finite(4, 10)));
        assert!(!outer.contains(&IntervalRange::at_least(4)));
        assert!(IntervalRange::top().contains(&outer));
        assert!(outer.contains_value(&BigInt::from(14)));
        assert!(!outer.contains_value(&BigInt::from(15)));
    }

    #[test]
    fn test_add_and_subtract() {
        let a = IntervalRange::finite(0, 3); // 0..=2
        let b = IntervalRange::finite(10, 12); // 10..=11
        assert_eq!(a.add(&b), IntervalRange::finite(10, 14)); // 10..=13
        assert_eq!(b.subtract(&a), IntervalRange::finite(8, 12)); // 8..=11
        assert_eq!(a.add(&IntervalRange::at_least(1)), IntervalRange::at_least(1));
        assert_eq!(
            a.subtract(&IntervalRange::at_least(1)),
            IntervalRange::below(2)
        );
        assert!(a.add(&IntervalRange::bottom()).is_bottom());
    }

    #[test]
    fn test_unsupported_operations_give_no_constraint() {
        let a = IntervalRange::finite(0, 3);
        assert!(a.multiply(&a).is_none());
        assert!(a.divide(&a).is_none());
        assert!(a.difference(&a).is_none());
    }

    #[test]
    fn test_comparison_splitting() {
        let k = IntervalRange::point(10);
        let (x, _) = IntervalRange::top().less_than(&k);
        assert_eq!(x, IntervalRange::below(10));

        let (x, _) = IntervalRange::top().less_than_or_equals(&k);
        assert_eq!(x, IntervalRange::below(11));

        let (x, _) = IntervalRange::top().greater_than(&IntervalRange::point(3));
        assert_eq!(x, IntervalRange::at_least(4));

        let (x, _) = IntervalRange::top().greater_than_or_equals(&IntervalRange::point(3));
        assert_eq!(x, IntervalRange::at_least(3));

        let (_, y) = IntervalRange::point(3).less_than(&IntervalRange::top());
        assert_eq!(y, IntervalRange::at_least(4));

        let (a, b) = IntervalRange::finite(0, 10).equals(&IntervalRange::finite(5, 20));
        assert_eq!(a, IntervalRange::finite(5, 10));
        assert_eq!(b, IntervalRange::finite(5, 10));
    }

    #[test]
    fn test_swapped_is_verbatim() {
        let r = IntervalRange::below(5);
        let s = r.swapped();
        assert_eq!(s.lower(), &Bound::finite(5));
        assert_eq!(s.upper(), &Bound::NegInf);
        assert!(s.is_bottom());
    }

    #[test]
    fn test_display() {
        assert_eq!(IntervalRange::below(3).to_string(), "[-inf, 3)");
    }
}

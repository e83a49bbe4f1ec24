//! Arbitrary-precision signed exponents. Most exponents fit in a machine
//! word and stay in the `Small` form; values outside of the `i64` range are
//! promoted to a sign and a `BigInt` magnitude.

use super::bigint::BigInt;
use core::cmp::Ordering;
use core::ops::{Add, Neg, Sub};

/// A signed exponent of unbounded size. The representation is canonical:
/// a value that fits in an `i64` is always stored as `Small`, so the derived
/// structural equality is value equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exp {
    Small(i64),
    /// A promoted exponent: `(-1)^negative * magnitude`, with a magnitude
    /// outside of the `i64` range.
    Big { negative: bool, magnitude: BigInt },
}

impl Exp {
    pub fn zero() -> Self {
        Exp::Small(0)
    }

    /// Build an exponent from a sign and a magnitude, demoting to the small
    /// form when possible.
    pub fn from_parts(negative: bool, magnitude: BigInt) -> Self {
        if let Some(v) = magnitude.try_as_u64() {
            if !negative && v <= i64::MAX as u64 {
                return Exp::Small(v as i64);
            }
            if negative && v <= i64::MAX as u64 + 1 {
                return Exp::Small((v as i64).wrapping_neg());
            }
        }
        Exp::Big {
            negative,
            magnitude,
        }
    }

    /// Returns the sign and the magnitude of the exponent.
    pub fn to_parts(&self) -> (bool, BigInt) {
        match self {
            Exp::Small(v) => (*v < 0, BigInt::from_u64(v.unsigned_abs())),
            Exp::Big {
                negative,
                magnitude,
            } => (*negative, magnitude.clone()),
        }
    }

    /// Returns true if the exponent is stored in a single word.
    pub fn is_small(&self) -> bool {
        matches!(self, Exp::Small(_))
    }

    /// Returns the exponent as an i64, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Exp::Small(v) => Some(*v),
            Exp::Big { .. } => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Exp::Small(v) => *v < 0,
            Exp::Big { negative, .. } => *negative,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Exp::Small(0))
    }

    pub fn is_even(&self) -> bool {
        match self {
            Exp::Small(v) => v & 1 == 0,
            Exp::Big { magnitude, .. } => magnitude.is_even(),
        }
    }

    /// Returns the value as a usize if it is non-negative and fits.
    pub fn to_usize(&self) -> Option<usize> {
        match self {
            Exp::Small(v) if *v >= 0 => usize::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Add two signed magnitudes.
    fn add_parts(a: (bool, BigInt), b: (bool, BigInt)) -> Self {
        let (an, am) = a;
        let (bn, bm) = b;
        if an == bn {
            return Self::from_parts(an, am + bm);
        }
        let (diff, swapped) = am.abs_diff(&bm);
        let negative = if swapped { bn } else { an };
        if diff.is_zero() {
            return Self::zero();
        }
        Self::from_parts(negative, diff)
    }

    /// Returns self + rhs.
    pub fn add_i64(&self, rhs: i64) -> Self {
        if let Exp::Small(a) = self {
            if let Some(v) = a.checked_add(rhs) {
                return Exp::Small(v);
            }
        }
        Self::add_parts(self.to_parts(), Exp::Small(rhs).to_parts())
    }

    /// Returns self - rhs.
    pub fn sub_i64(&self, rhs: i64) -> Self {
        if let Exp::Small(a) = self {
            if let Some(v) = a.checked_sub(rhs) {
                return Exp::Small(v);
            }
        }
        let (neg, mag) = Exp::Small(rhs).to_parts();
        Self::add_parts(self.to_parts(), (!neg, mag))
    }

    /// Returns self + rhs for a bit count.
    pub fn add_usize(&self, rhs: usize) -> Self {
        match i64::try_from(rhs) {
            Ok(r) => self.add_i64(r),
            Err(_) => {
                self + &Exp::from_parts(false, BigInt::from_u64(rhs as u64))
            }
        }
    }

    /// Returns self - rhs for a bit count.
    pub fn sub_usize(&self, rhs: usize) -> Self {
        match i64::try_from(rhs) {
            Ok(r) => self.sub_i64(r),
            Err(_) => {
                self - &Exp::from_parts(false, BigInt::from_u64(rhs as u64))
            }
        }
    }

    /// Returns floor(self / 2).
    pub fn div2_floor(&self) -> Self {
        match self {
            Exp::Small(v) => Exp::Small(v >> 1),
            Exp::Big {
                negative,
                magnitude,
            } => {
                let mut m = magnitude.clone();
                let odd = m.is_odd();
                m.shift_right(1);
                if *negative && odd {
                    m.inplace_add(&BigInt::one());
                }
                Self::from_parts(*negative, m)
            }
        }
    }
}

impl Default for Exp {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Exp {
    fn from(val: i64) -> Self {
        Exp::Small(val)
    }
}

impl PartialOrd for Exp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Exp {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Exp::Small(a), Exp::Small(b)) = (self, other) {
            return a.cmp(b);
        }
        let (an, am) = self.to_parts();
        let (bn, bm) = other.to_parts();
        match (an, bn) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => am.cmp(&bm),
            (true, true) => bm.cmp(&am),
        }
    }
}

impl Add for &Exp {
    type Output = Exp;
    fn add(self, rhs: Self) -> Exp {
        if let (Exp::Small(a), Exp::Small(b)) = (self, rhs) {
            if let Some(v) = a.checked_add(*b) {
                return Exp::Small(v);
            }
        }
        Exp::add_parts(self.to_parts(), rhs.to_parts())
    }
}

impl Sub for &Exp {
    type Output = Exp;
    fn sub(self, rhs: Self) -> Exp {
        if let (Exp::Small(a), Exp::Small(b)) = (self, rhs) {
            if let Some(v) = a.checked_sub(*b) {
                return Exp::Small(v);
            }
        }
        let (neg, mag) = rhs.to_parts();
        Exp::add_parts(self.to_parts(), (!neg, mag))
    }
}

impl Neg for &Exp {
    type Output = Exp;
    fn neg(self) -> Exp {
        let (neg, mag) = self.to_parts();
        if mag.is_zero() {
            return Exp::zero();
        }
        Exp::from_parts(!neg, mag)
    }
}

#[test]
fn test_small_arithmetic() {
    let a = Exp::from(10);
    let b = Exp::from(-25);
    assert_eq!(&a + &b, Exp::Small(-15));
    assert_eq!(&a - &b, Exp::Small(35));
    assert_eq!(-&b, Exp::Small(25));
    assert_eq!(b.div2_floor(), Exp::Small(-13));
    assert_eq!(a.div2_floor(), Exp::Small(5));
    assert!(b < a);
    assert_eq!(a.to_usize(), Some(10));
    assert_eq!(b.to_usize(), None);
}

#[test]
fn test_promotion_and_demotion() {
    let max = Exp::from(i64::MAX);
    let big = max.add_i64(1);
    assert!(!big.is_small());
    assert!(big > max);
    assert_eq!(big.to_i64(), None);
    // Coming back into range demotes to the small form.
    assert_eq!(big.sub_i64(1), max);
    assert_eq!(&big - &big, Exp::zero());

    let min = Exp::from(i64::MIN);
    assert!(min.is_small());
    let below = min.sub_i64(1);
    assert!(!below.is_small());
    assert!(below < min);
    assert!(below < big);
    assert_eq!(below.add_i64(1), min);
    assert_eq!(-&min, big);

    // Doubling a promoted value and halving it again.
    let twice = &big + &big;
    assert_eq!(twice.div2_floor(), big);
    let neg_twice = &below + &below;
    assert_eq!(neg_twice.div2_floor(), below);
    assert_eq!(neg_twice.sub_i64(-1).div2_floor(), below);
    assert!(neg_twice.is_even());
}

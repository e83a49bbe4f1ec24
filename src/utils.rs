//! This file contains simple helper functions and test helpers: the random
//! number generator, random test values for `Arf` and `Mag`, the exact
//! rounding oracles, and the test configuration.

use super::bigint::BigInt;
use super::exponent::Exp;
use super::float::{Arf, PREC_EXACT};
use super::mag::{Mag, MAG_BITS};
use super::rounding::RoundingMode;
use core::cmp::Ordering;

/// Returns list of interesting values that various tests use to catch edge
/// cases.
pub fn get_special_test_values() -> [f64; 20] {
    [
        -f64::NAN,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::EPSILON,
        -f64::EPSILON,
        0.000000000000000000000000000000000000001,
        f64::MIN,
        f64::MAX,
        core::f64::consts::PI,
        core::f64::consts::LN_2,
        core::f64::consts::SQRT_2,
        core::f64::consts::E,
        0.0,
        -0.0,
        10.,
        -10.,
        -0.00001,
        0.1,
        355. / 113.,
    ]
}

// Linear-feedback shift register. We use this as a random number generator for
// tests.
#[derive(Debug, Clone)]
pub struct Lfsr {
    state: u32,
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfsr {
    /// Generate a new LFSR number generator.
    pub fn new() -> Lfsr {
        Lfsr { state: 0x13371337 }
    }

    /// Generate a new LFSR number generator that starts with a specific state.
    pub fn new_with_seed(seed: u32) -> Lfsr {
        Lfsr {
            state: 0x13371337 ^ seed,
        }
    }

    pub fn next(&mut self) {
        let a = (self.state >> 24) & 1;
        let b = (self.state >> 23) & 1;
        let c = (self.state >> 22) & 1;
        let d = (self.state >> 17) & 1;
        let n = a ^ b ^ c ^ d ^ 1;
        self.state <<= 1;
        self.state |= n;
    }

    fn get(&mut self) -> u32 {
        let mut res: u32 = 0;
        for _ in 0..32 {
            self.next();
            res <<= 1;
            res ^= self.state & 0x1;
        }
        res
    }

    pub fn get64(&mut self) -> u64 {
        ((self.get() as u64) << 32) | self.get() as u64
    }

    /// Returns a number in the range [0, n). `n` must be positive.
    pub fn get_below(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0, "empty range");
        self.get64() % n
    }

    pub fn get_bool(&mut self) -> bool {
        self.get() & 1 == 1
    }
}

// Implement `Iterator` for `Lfsr`.
impl Iterator for Lfsr {
    type Item = u64;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.get64())
    }
}

/// Returns a random mantissa with 1 to `bits` bits. The top bit is always
/// set. Mixes uniform bits with the shapes that stress carries and ties:
/// all ones, a single bit, and a few scattered bits.
fn random_mantissa(rng: &mut Lfsr, bits: u64) -> BigInt {
    debug_assert!(bits > 0, "mantissa needs at least one bit");
    let len = 1 + rng.get_below(bits) as usize;
    let top = len - 1;
    match rng.get_below(4) {
        0 => BigInt::all1s(len),
        1 => BigInt::one_hot(top),
        2 => {
            let mut m = BigInt::one_hot(top);
            if top > 0 {
                for _ in 0..1 + rng.get_below(3) {
                    let bit = rng.get_below(top as u64) as usize;
                    if !m.is_bit_set(bit) {
                        m.flip_bit(bit);
                    }
                }
            }
            m
        }
        _ => {
            let mut m = BigInt::from_iter(rng, len.div_ceil(64));
            m.mask(len);
            if !m.is_bit_set(top) {
                m.flip_bit(top);
            }
            m
        }
    }
}

/// Returns a random exponent whose magnitude has at most `exp_bits` bits.
/// Small exponents are favored, and magnitudes of more than 63 bits give
/// promoted exponents.
fn random_exp(rng: &mut Lfsr, exp_bits: u64) -> Exp {
    if exp_bits == 0 {
        return Exp::zero();
    }
    let limit = if rng.get_bool() {
        exp_bits.min(8)
    } else {
        exp_bits
    };
    let ebits = rng.get_below(limit + 1);
    let negative = rng.get_bool();
    if ebits <= 62 {
        let v = (rng.get64() & ((1u64 << ebits) - 1)) as i64;
        return Exp::from(if negative { -v } else { v });
    }
    let ebits = ebits as usize;
    let mut magnitude = BigInt::from_iter(rng, ebits.div_ceil(64));
    magnitude.mask(ebits);
    if !magnitude.is_bit_set(ebits - 1) {
        magnitude.flip_bit(ebits - 1);
    }
    Exp::from_parts(negative, magnitude)
}

impl Arf {
    /// Returns a random finite number with at most `bits` bits and an
    /// exponent of at most `exp_bits` bits. The result is zero about once in
    /// sixteen calls.
    pub fn randtest(rng: &mut Lfsr, bits: u64, exp_bits: u64) -> Self {
        if rng.get_below(16) == 0 {
            return Self::zero();
        }
        Self::randtest_not_zero(rng, bits, exp_bits)
    }

    /// Same as `randtest`, but never returns zero.
    pub fn randtest_not_zero(rng: &mut Lfsr, bits: u64, exp_bits: u64) -> Self {
        let m = random_mantissa(rng, bits);
        let exp = random_exp(rng, exp_bits);
        Self::from_parts(rng.get_bool(), exp, m)
    }

    /// Same as `randtest`, but about once in `special_freq` calls returns
    /// one of the special values zero, +inf, -inf or NaN.
    pub fn randtest_special(
        rng: &mut Lfsr,
        bits: u64,
        exp_bits: u64,
        special_freq: u64,
    ) -> Self {
        if special_freq > 0 && rng.get_below(special_freq) == 0 {
            return match rng.get_below(4) {
                0 => Self::zero(),
                1 => Self::pos_inf(),
                2 => Self::neg_inf(),
                _ => Self::nan(),
            };
        }
        Self::randtest(rng, bits, exp_bits)
    }
}

impl Mag {
    /// Returns a random finite bound with an exponent of at most `exp_bits`
    /// bits. The result is zero about once in sixteen calls.
    pub fn randtest(rng: &mut Lfsr, exp_bits: u64) -> Self {
        if rng.get_below(16) == 0 {
            return Self::zero();
        }
        let lo = 1u32 << (MAG_BITS - 1);
        let man = match rng.get_below(4) {
            0 => lo,
            1 => (1u32 << MAG_BITS) - 1,
            _ => lo | (rng.get() & (lo - 1)),
        };
        Self::from_parts(man, random_exp(rng, exp_bits))
    }

    /// Same as `randtest`, but about once in `special_freq` calls returns
    /// zero or infinity.
    pub fn randtest_special(
        rng: &mut Lfsr,
        exp_bits: u64,
        special_freq: u64,
    ) -> Self {
        if special_freq > 0 && rng.get_below(special_freq) == 0 {
            if rng.get_bool() {
                return Self::zero();
            }
            return Self::inf();
        }
        Self::randtest(rng, exp_bits)
    }
}

/// Returns the exponent `e - prec`.
fn exp_minus_prec(e: &Exp, prec: u64) -> Exp {
    match i64::try_from(prec) {
        Ok(p) => e.sub_i64(p),
        Err(_) => e - &Exp::from_parts(false, BigInt::from_u64(prec)),
    }
}

/// The representable neighbor of a rounded result on the side of the exact
/// value, and the exponent of the gap between the two.
struct Bracket {
    neighbor: Arf,
    gap: Exp,
}

/// Check everything that does not depend on the rounding mode. `cmp_exact`
/// compares a candidate with the exact value (Greater means that the
/// candidate is above the exact value).
fn check_bracket<F>(
    res: &Arf,
    ord: Ordering,
    prec: u64,
    cmp_exact: &F,
) -> Option<Bracket>
where
    F: Fn(&Arf) -> Ordering,
{
    if prec != PREC_EXACT && res.bits() as u64 > prec {
        return None;
    }
    let c = cmp_exact(res);
    if ord == Ordering::Equal || c == Ordering::Equal {
        return if ord == c {
            Some(Bracket {
                neighbor: res.clone(),
                gap: Exp::zero(),
            })
        } else {
            None
        };
    }
    if !res.is_normal() || prec == PREC_EXACT {
        return None;
    }

    // Rounding never crosses zero.
    let zero_side = if res.is_negative() {
        Ordering::Greater
    } else {
        Ordering::Less
    };
    if cmp_exact(&Arf::zero()) != zero_side {
        return None;
    }

    // The indicator talks about magnitudes.
    let expected = if res.is_negative() { c.reverse() } else { c };
    if expected != ord {
        return None;
    }

    // Step toward the exact value. Below a power of two the grid is twice as
    // dense.
    let mut gap = exp_minus_prec(res.get_exp(), prec);
    if ord == Ordering::Greater && res.bits() == 1 {
        gap = gap.sub_i64(1);
    }
    let step = Arf::from_int_exp(false, BigInt::one(), &gap);
    let abs = res.abs();
    let moved = if ord == Ordering::Greater {
        abs.sub(&step, PREC_EXACT, RoundingMode::Zero).0
    } else {
        abs.add(&step, PREC_EXACT, RoundingMode::Zero).0
    };
    let neighbor = if res.is_negative() { moved.neg() } else { moved };

    // The exact value lies strictly between the result and its neighbor.
    if cmp_exact(&neighbor) != c.reverse() {
        return None;
    }
    Some(Bracket { neighbor, gap })
}

/// Returns true if `res` with the rounding indicator `ord` is a correct
/// rounding to `prec` bits in the mode `rm` of the exact value that
/// `cmp_exact` describes. `cmp_exact(v)` must return the exact ordering of
/// `v` relative to the exact value.
pub fn check_rounding<F>(
    res: &Arf,
    ord: Ordering,
    prec: u64,
    rm: RoundingMode,
    cmp_exact: F,
) -> bool
where
    F: Fn(&Arf) -> Ordering,
{
    let bracket = match check_bracket(res, ord, prec, &cmp_exact) {
        Some(b) => b,
        None => return false,
    };
    if ord == Ordering::Equal {
        return true;
    }

    let c = cmp_exact(res);
    match rm {
        RoundingMode::Zero => ord == Ordering::Less,
        RoundingMode::Away => ord == Ordering::Greater,
        RoundingMode::Negative => c == Ordering::Less,
        RoundingMode::Positive => c == Ordering::Greater,
        RoundingMode::NearestTiesToEven => {
            let sum = res.add(&bracket.neighbor, PREC_EXACT, rm).0;
            let mid = sum.mul_2exp_i64(-1);
            let cm = cmp_exact(&mid);
            if cm == Ordering::Equal {
                // A tie goes to the value that is even on the finer grid.
                return res.low_exp() > bracket.gap;
            }
            // The exact value is on the result's side of the midpoint.
            cm == c.reverse()
        }
    }
}

/// Returns true if `res` is within one ulp of `exact` at precision `prec`,
/// on the side that `ord` reports, and has at most `prec` bits. Special
/// values must match exactly.
pub fn check_ulp(res: &Arf, exact: &Arf, ord: Ordering, prec: u64) -> bool {
    if exact.is_special() || res.is_special() {
        return res == exact && ord == Ordering::Equal;
    }
    let cmp_exact = |v: &Arf| v.partial_cmp(exact).unwrap_or(Ordering::Equal);
    check_bracket(res, ord, prec, &cmp_exact).is_some()
}

/// Controls how thorough the randomized tests are. The iteration counts of
/// the tests are scaled by `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestConfig {
    pub multiplier: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl TestConfig {
    pub fn new(multiplier: f64) -> Self {
        debug_assert!(multiplier > 0.0, "multiplier must be positive");
        TestConfig { multiplier }
    }

    /// Returns the number of iterations for a test that runs `base`
    /// iterations at the default multiplier. Always at least one.
    pub fn iterations(&self, base: u64) -> u64 {
        let n = base as f64 * self.multiplier;
        if n >= u64::MAX as f64 {
            return u64::MAX;
        }
        (n as u64).max(1)
    }

    /// Read the multiplier from the ARFLOAT_TEST_MULTIPLIER environment
    /// variable. Missing or invalid values give the default configuration.
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        std::env::var("ARFLOAT_TEST_MULTIPLIER")
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|m| m.is_finite() && *m > 0.0)
            .map(Self::new)
            .unwrap_or_default()
    }
}

#[test]
fn test_lfsr_balance() {
    let mut lfsr = Lfsr::new();

    // Count the number of items, and the number of 1s.
    let mut items = 0;
    let mut ones = 0;

    for _ in 0..10000 {
        let mut u = lfsr.get();
        for _ in 0..32 {
            items += 1;
            ones += u & 1;
            u >>= 1;
        }
    }
    // Make sure that we have around 50% 1s and 50% zeros.
    assert!((ones as f64) < (0.55 * items as f64));
    assert!((ones as f64) > (0.45 * items as f64));
}

#[test]
fn test_repetition() {
    let mut lfsr = Lfsr::new();
    let first = lfsr.get();
    let second = lfsr.get();

    // Make sure that the items don't repeat themselves too frequently.
    for _ in 0..30000 {
        assert_ne!(first, lfsr.get());
        assert_ne!(second, lfsr.get());
    }
}

#[test]
fn test_get_below() {
    let mut lfsr = Lfsr::new();
    let mut seen = [false; 7];
    for _ in 0..1000 {
        let v = lfsr.get_below(7);
        assert!(v < 7);
        seen[v as usize] = true;
    }
    assert!(seen.iter().all(|s| *s));
    assert_eq!(lfsr.get_below(1), 0);
}

#[test]
fn test_randtest_coverage() {
    let mut lfsr = Lfsr::new();
    let mut zeros = 0;
    let mut one_bit = 0;
    let mut full = 0;
    let mut promoted = 0;
    let mut negative = 0;
    for _ in 0..2000 {
        let x = Arf::randtest(&mut lfsr, 100, 80);
        assert!(x.is_finite());
        if x.is_zero() {
            zeros += 1;
            continue;
        }
        assert!(x.bits() <= 100);
        assert!(x.get_mantissa().is_odd());
        if x.bits() == 1 {
            one_bit += 1;
        }
        if x.bits() > 90 {
            full += 1;
        }
        if !x.get_exp().is_small() {
            promoted += 1;
        }
        if x.is_negative() {
            negative += 1;
        }
    }
    assert!(zeros > 0);
    assert!(one_bit > 0);
    assert!(full > 0);
    assert!(promoted > 0);
    assert!(negative > 0);

    for _ in 0..200 {
        assert!(!Arf::randtest_not_zero(&mut lfsr, 3, 10).is_zero());
    }
}

#[test]
fn test_randtest_special() {
    let mut lfsr = Lfsr::new();
    let (mut nan, mut pinf, mut ninf, mut normal) = (0, 0, 0, 0);
    for _ in 0..2000 {
        let x = Arf::randtest_special(&mut lfsr, 64, 20, 4);
        if x.is_nan() {
            nan += 1;
        } else if x.is_pos_inf() {
            pinf += 1;
        } else if x.is_neg_inf() {
            ninf += 1;
        } else if x.is_normal() {
            normal += 1;
        }
    }
    assert!(nan > 0 && pinf > 0 && ninf > 0);
    assert!(normal > 1000);

    let (mut zero, mut inf) = (0, 0);
    for _ in 0..1000 {
        let m = Mag::randtest_special(&mut lfsr, 70, 4);
        if m.is_zero() {
            zero += 1;
        } else if m.is_inf() {
            inf += 1;
        } else {
            let man = m.get_man();
            assert!((1 << 29..1 << 30).contains(&man));
        }
    }
    assert!(zero > 0 && inf > 0);
}

#[test]
fn test_check_rounding_oracle() {
    use RoundingMode::*;
    // The exact value 7 at two bits.
    let seven = Arf::from_u64(7);
    let cmp = |v: &Arf| v.partial_cmp(&seven).unwrap_or(Ordering::Equal);
    let six = Arf::from_u64(6);
    let eight = Arf::from_u64(8);
    let ten = Arf::from_u64(10);

    assert!(check_rounding(&six, Ordering::Less, 2, Zero, cmp));
    assert!(check_rounding(&eight, Ordering::Greater, 2, Away, cmp));
    let rne = NearestTiesToEven;
    assert!(check_rounding(&eight, Ordering::Greater, 2, rne, cmp));
    // The wrong direction, the wrong tie, and a result that is too far.
    assert!(!check_rounding(&eight, Ordering::Greater, 2, Zero, cmp));
    assert!(!check_rounding(&six, Ordering::Less, 2, rne, cmp));
    assert!(!check_rounding(&ten, Ordering::Greater, 2, Away, cmp));
    // A wrong indicator.
    assert!(!check_rounding(&six, Ordering::Greater, 2, Zero, cmp));
    assert!(!check_rounding(&six, Ordering::Equal, 2, Zero, cmp));

    // Negative values: -7 rounds toward -inf to -8.
    let m7 = seven.neg();
    let cmp = |v: &Arf| v.partial_cmp(&m7).unwrap_or(Ordering::Equal);
    assert!(check_rounding(&eight.neg(), Ordering::Greater, 2, Negative, cmp));
    assert!(check_rounding(&six.neg(), Ordering::Less, 2, Positive, cmp));
    assert!(!check_rounding(&six.neg(), Ordering::Less, 2, Negative, cmp));

    // 1/3 at two bits is nearest to 3/8, not 1/4.
    let three = Arf::from_u64(3);
    let one = Arf::one();
    let cmp = |v: &Arf| {
        let p = v.mul(&three, PREC_EXACT, rne).0;
        p.partial_cmp(&one).unwrap_or(Ordering::Equal)
    };
    let q = Arf::from_f64(0.375);
    let f = Arf::from_f64(0.25);
    assert!(check_rounding(&q, Ordering::Greater, 2, rne, cmp));
    assert!(!check_rounding(&f, Ordering::Less, 2, rne, cmp));
    assert!(check_rounding(&f, Ordering::Less, 2, Zero, cmp));
    assert!(check_rounding(&q, Ordering::Greater, 2, Positive, cmp));

    assert!(check_ulp(&six, &seven, Ordering::Less, 2));
    assert!(check_ulp(&eight, &seven, Ordering::Greater, 2));
    assert!(!check_ulp(&eight, &seven, Ordering::Less, 2));
    assert!(check_ulp(&seven, &seven, Ordering::Equal, 3));
    assert!(!check_ulp(&seven, &seven, Ordering::Equal, 2));
    assert!(check_ulp(&Arf::nan(), &Arf::nan(), Ordering::Equal, 2));
}

#[test]
fn test_config() {
    let cfg = TestConfig::default();
    assert_eq!(cfg.iterations(100), 100);
    assert_eq!(TestConfig::new(0.001).iterations(100), 1);
    assert_eq!(TestConfig::new(2.5).iterations(100), 250);
}

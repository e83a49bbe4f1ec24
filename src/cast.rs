//! Conversions between `Arf`, `Mag`, native floats, integers and scaled
//! big integers.

use super::bigint::BigInt;
use super::exponent::Exp;
use super::float::{Arf, Category};
use super::mag::Mag;
use super::rounding::RoundingMode;

// The layout of the IEEE-754 double.
const MANTISSA: u32 = 52;
const EXPONENT_MASK: u64 = 0x7ff;
const BIAS: i64 = 1023;
// The exponent of the lowest subnormal bit.
const MIN_LOW_EXP: i64 = -1074;

impl Arf {
    /// Load the native double `float`. The conversion is exact. Both zeros
    /// load as zero, and every NaN loads as NaN.
    pub fn from_f64(float: f64) -> Self {
        let bits = float.to_bits();
        // Extract the biased exponent (wipe the sign and mantissa).
        let biased_exp = ((bits >> MANTISSA) & EXPONENT_MASK) as i64;
        let sign = (bits >> 63) == 1;
        // Wipe the sign and exponent.
        let mut mantissa = bits & ((1 << MANTISSA) - 1);

        // Check for NaN/Inf
        if biased_exp == EXPONENT_MASK as i64 {
            if mantissa == 0 {
                return Self::inf(sign);
            }
            return Self::nan();
        }

        let mut low = biased_exp - BIAS - MANTISSA as i64;
        // Add the implicit bit for normal numbers.
        if biased_exp != 0 {
            mantissa += 1u64 << MANTISSA;
        } else {
            // Handle denormals, adjust the exponent to the legal range.
            low += 1;
        }
        Self::from_int_exp(sign, BigInt::from_u64(mantissa), &Exp::from(low))
    }

    /// Convert to a native double, rounding with `rm`. Results below the
    /// normal range are rounded to subnormals, and results that overflow
    /// give infinity or the largest finite double, as IEEE-754 does.
    pub fn to_f64(&self, rm: RoundingMode) -> f64 {
        match self.get_category() {
            Category::NaN => return f64::NAN,
            Category::Infinity => {
                return if self.is_negative() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
            }
            Category::Zero => return 0.0,
            Category::Normal => {}
        }
        let sign = self.is_negative();
        // Far out exponents behave the same as any large exponent.
        let e = clamp_exp(self.get_exp());

        // The number of bits that are left above the lowest subnormal bit.
        let avail = e - MIN_LOW_EXP;
        if avail <= 0 {
            // The value is below the smallest subnormal.
            let up = match rm {
                RoundingMode::NearestTiesToEven => {
                    avail == 0 && self.bits() > 1
                }
                _ => !rm.is_toward_zero(sign),
            };
            let mag = if up { f64::from_bits(1) } else { 0.0 };
            return if sign { -mag } else { mag };
        }

        let prec = avail.min(MANTISSA as i64 + 1) as u64;
        let (r, _) = self.set_round(prec, rm);
        let e = clamp_exp(r.get_exp());

        if e > BIAS + 1 {
            let big = if rm.is_toward_zero(sign) {
                f64::MAX
            } else {
                f64::INFINITY
            };
            return if sign { -big } else { big };
        }

        let m = r.get_mantissa().as_u64();
        let b = r.bits() as i64;
        let bits = if e - 1 >= 1 - BIAS {
            // Normal: place the top bit on the implicit bit and drop it.
            let exp = (e - 1 + BIAS) as u64;
            let sig = m << (MANTISSA as i64 + 1 - b);
            (exp << MANTISSA) | (sig & ((1 << MANTISSA) - 1))
        } else {
            // Subnormal: the mantissa counts units of 2^-1074.
            m << (e - b - MIN_LOW_EXP)
        };
        f64::from_bits(((sign as u64) << 63) | bits)
    }

    /// Load the integer `val`.
    pub fn from_u64(val: u64) -> Self {
        Self::from_int_exp(false, BigInt::from_u64(val), &Exp::zero())
    }

    /// Load the integer `val`.
    pub fn from_i64(val: i64) -> Self {
        Self::from_int_exp(
            val < 0,
            BigInt::from_u64(val.unsigned_abs()),
            &Exp::zero(),
        )
    }

    /// Load the non-negative integer `val`.
    pub fn from_bigint(val: &BigInt) -> Self {
        Self::from_int_exp(false, val.clone(), &Exp::zero())
    }

    /// Returns the exact value `(-1)^sign * m * 2^e`.
    pub fn from_bigint_2exp(sign: bool, m: &BigInt, e: &Exp) -> Self {
        Self::from_int_exp(sign, m.clone(), e)
    }

    /// Decompose the number into `(sign, m, e)` with the value
    /// `(-1)^sign * m * 2^e`, where `m` is odd (or zero). Returns None for
    /// infinities and NaN.
    pub fn to_bigint_2exp(&self) -> Option<(bool, BigInt, Exp)> {
        match self.get_category() {
            Category::Zero => Some((false, BigInt::zero(), Exp::zero())),
            Category::Normal => Some((
                self.is_negative(),
                self.get_mantissa().clone(),
                self.low_exp(),
            )),
            _ => None,
        }
    }

    /// Converts and returns the rounded integral part. Values outside of
    /// the i64 range saturate, and NaN gives zero.
    pub fn to_i64(&self, rm: RoundingMode) -> i64 {
        if self.is_nan() || self.is_zero() {
            return 0;
        }

        if self.is_inf() {
            if self.get_sign() {
                return i64::MIN;
            } else {
                return i64::MAX;
            }
        }

        let r = self.round_to_int(rm);
        if r.is_zero() {
            return 0;
        }
        let saturated = if r.is_negative() { i64::MIN } else { i64::MAX };
        let e = match r.get_exp().to_i64() {
            Some(e) if e <= 64 => e,
            _ => return saturated,
        };
        let mut m = r.get_mantissa().as_u64();
        m <<= e as usize - r.bits();
        if r.is_negative() {
            if m > 1 << 63 {
                return saturated;
            }
            (m as i64).wrapping_neg()
        } else {
            if m > i64::MAX as u64 {
                return saturated;
            }
            m as i64
        }
    }

    /// Returns an upper bound of the absolute value. Infinities and NaN
    /// give an infinite bound.
    pub fn get_mag(&self) -> Mag {
        match self.get_category() {
            Category::Zero => Mag::zero(),
            Category::Infinity | Category::NaN => Mag::inf(),
            Category::Normal => {
                // The top word has the msb in bit 63. Dropped bits bump the
                // word by one unit.
                let (top, inexact) = self.get_mantissa().top_u64();
                let v = top as u128 + inexact as u128;
                Mag::from_u128_2exp(v, &self.get_exp().sub_i64(64))
            }
        }
    }

    /// Returns the exact value of the bound `m`.
    pub fn from_mag(m: &Mag) -> Self {
        if m.is_inf() {
            return Self::pos_inf();
        }
        if m.is_zero() {
            return Self::zero();
        }
        let man = BigInt::from_u64(m.get_man() as u64);
        Self::from_int_exp(false, man, &m.low_exp())
    }
}

/// Returns the exponent as an i64, clamping values that are far outside of
/// the double range.
fn clamp_exp(e: &Exp) -> i64 {
    const LIMIT: i64 = 1 << 40;
    match e.to_i64() {
        Some(v) => v.clamp(-LIMIT, LIMIT),
        None if e.is_negative() => -LIMIT,
        None => LIMIT,
    }
}

impl Mag {
    /// Returns an upper bound of |d|. NaN gives infinity.
    pub fn from_f64(d: f64) -> Self {
        if d.is_nan() {
            return Self::inf();
        }
        Arf::from_f64(d).get_mag()
    }

    /// Returns an upper bound of |d| * 2^e.
    pub fn from_f64_2exp(d: f64, e: &Exp) -> Self {
        Self::from_f64(d).mul_2exp(e)
    }

    /// Returns an upper bound of `val`.
    pub fn from_u64(val: u64) -> Self {
        Self::from_u128_2exp(val as u128, &Exp::zero())
    }

    /// Returns an upper bound of `val`.
    pub fn from_bigint(val: &BigInt) -> Self {
        Arf::from_bigint(val).get_mag()
    }

    /// Returns an upper bound of `m * 2^e`.
    pub fn from_bigint_2exp(m: &BigInt, e: &Exp) -> Self {
        Self::from_bigint(m).mul_2exp(e)
    }

    /// Returns an upper bound as a double. Bounds that are too large give
    /// infinity, and bounds below the normal range give the smallest positive
    /// normal double.
    pub fn to_f64(&self) -> f64 {
        if self.is_inf() {
            return f64::INFINITY;
        }
        if self.is_zero() {
            return 0.0;
        }
        if clamp_exp(self.get_exp()) <= 1 - BIAS {
            return f64::MIN_POSITIVE;
        }
        Arf::from_mag(self).to_f64(RoundingMode::Positive)
    }

    /// Returns the exact value as a fraction `(numerator, denominator)`.
    /// Returns None for infinity, and for exponents that are too large to
    /// shift by.
    pub fn to_fraction(&self) -> Option<(BigInt, BigInt)> {
        if self.is_inf() {
            return None;
        }
        if self.is_zero() {
            return Some((BigInt::zero(), BigInt::one()));
        }
        let man = BigInt::from_u64(self.get_man() as u64);
        let low = self.low_exp();
        if low.is_negative() {
            let shift = (-&low).to_usize()?;
            let mut den = BigInt::one();
            den.shift_left(shift);
            Some((man, den))
        } else {
            let shift = low.to_usize()?;
            let mut num = man;
            num.shift_left(shift);
            Some((num, BigInt::one()))
        }
    }
}

#[cfg(test)]
use super::utils;

#[test]
fn test_round_trip_native_float_cast() {
    let pi = 355. / 113.;
    let a = Arf::from_f64(pi);
    assert_eq!(pi, a.to_f64(RoundingMode::NearestTiesToEven));

    assert!(Arf::from_f64(f64::NAN).is_nan());
    assert!(!Arf::from_f64(f64::NAN).is_inf());
    assert!(Arf::from_f64(f64::INFINITY).is_pos_inf());
    assert!(Arf::from_f64(f64::NEG_INFINITY).is_neg_inf());
    assert!(Arf::from_f64(-0.0).is_zero());
    assert!(Arf::from_f64(f64::from_bits((0xffff_ffffu64) << 32)).is_nan());

    let mut lfsr = utils::Lfsr::new();
    for i in 0..20000 {
        let v = if i < 20 {
            utils::get_special_test_values()[i]
        } else {
            f64::from_bits(lfsr.get64())
        };
        let a = Arf::from_f64(v);
        for rm in RoundingMode::ALL {
            let r = a.to_f64(rm);
            assert!(r == v || (r.is_nan() && v.is_nan()), "{}", v);
        }
    }
}

#[test]
fn test_load_subnormals() {
    let tiny = Arf::from_f64(f64::from_bits(1));
    assert_eq!(tiny, Arf::one().mul_2exp_i64(-1074));
    let x = Arf::from_f64(f64::from_bits(0b1100));
    assert_eq!(x, Arf::from_u64(3).mul_2exp_i64(-1072));
    let m = Arf::from_f64(f64::MIN_POSITIVE);
    assert_eq!(m, Arf::one().mul_2exp_i64(-1022));
    assert_eq!(Arf::from_f64(f64::MAX).bits(), 53);
}

#[test]
fn test_to_f64_matches_native() {
    // The exact product rounded once matches the hardware, including
    // subnormal results and overflow.
    let mut lfsr = utils::Lfsr::new();
    let rne = RoundingMode::NearestTiesToEven;
    for _ in 0..20000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64() ^ (lfsr.get64() >> 2));
        let native = f0 * f1;
        let exact = Arf::from_f64(f0).mul(
            &Arf::from_f64(f1),
            crate::float::PREC_EXACT,
            rne,
        );
        let r = exact.0.to_f64(rne);
        if native.is_nan() {
            assert!(r.is_nan());
            continue;
        }
        if native == 0.0 {
            assert_eq!(r, 0.0);
            continue;
        }
        assert_eq!(r.to_bits(), native.to_bits(), "{} * {}", f0, f1);
    }
}

#[test]
fn test_to_f64_directed() {
    let mut lfsr = utils::Lfsr::new();
    for _ in 0..5000 {
        let x = Arf::randtest_not_zero(&mut lfsr, 120, 11);
        let down = x.to_f64(RoundingMode::Negative);
        let up = x.to_f64(RoundingMode::Positive);
        assert!(Arf::from_f64(down) <= x);
        assert!(Arf::from_f64(up) >= x);
        let exact = Arf::from_f64(down) == x;
        if exact {
            assert_eq!(down, up);
        } else {
            // The two results are neighbors.
            assert!(down < up);
            let next = if down >= 0.0 {
                f64::from_bits(down.to_bits() + 1)
            } else {
                f64::from_bits(down.to_bits() - 1)
            };
            assert!(next == up || (down == 0.0 && up == f64::from_bits(1)));
        }
        let toward_zero = x.to_f64(RoundingMode::Zero);
        let away = x.to_f64(RoundingMode::Away);
        assert!(toward_zero.abs() <= away.abs());
        if x.is_negative() {
            assert_eq!(toward_zero, up);
            assert_eq!(away, down);
        } else {
            assert_eq!(toward_zero, down);
            assert_eq!(away, up);
        }
    }
}

#[test]
fn test_to_f64_underflow_overflow() {
    use RoundingMode::*;
    let half_tiny = Arf::one().mul_2exp_i64(-1075);
    assert_eq!(half_tiny.to_f64(NearestTiesToEven), 0.0);
    assert_eq!(half_tiny.to_f64(Away), f64::from_bits(1));
    assert_eq!(half_tiny.neg().to_f64(Negative), -f64::from_bits(1));
    assert_eq!(half_tiny.to_f64(Zero), 0.0);

    let above_half = Arf::from_u64(1025).mul_2exp_i64(-1085);
    assert_eq!(above_half.to_f64(NearestTiesToEven), f64::from_bits(1));
    let far = Arf::one().mul_2exp_i64(-100_000);
    assert_eq!(far.to_f64(NearestTiesToEven), 0.0);
    assert_eq!(far.to_f64(Positive), f64::from_bits(1));
    assert_eq!(far.neg().to_f64(Positive), 0.0);

    // 1.5 * 2^-1074 is a tie between 1 and 2 units; 2 is even.
    let tie = Arf::from_u64(3).mul_2exp_i64(-1075);
    assert_eq!(tie.to_f64(NearestTiesToEven), f64::from_bits(2));

    let big = Arf::one().mul_2exp_i64(1024);
    assert_eq!(big.to_f64(NearestTiesToEven), f64::INFINITY);
    assert_eq!(big.to_f64(Zero), f64::MAX);
    assert_eq!(big.to_f64(Negative), f64::MAX);
    assert_eq!(big.neg().to_f64(Positive), -f64::MAX);
    assert_eq!(big.neg().to_f64(Away), f64::NEG_INFINITY);
    let huge = Arf::one().mul_2exp(&Exp::from(i64::MAX).add_i64(1));
    assert_eq!(huge.to_f64(NearestTiesToEven), f64::INFINITY);
    // Just below the rounding boundary of f64::MAX.
    let max = Arf::from_f64(f64::MAX);
    let ulp = max.ulp(53);
    let below = max.add(&ulp.mul_2exp_i64(-2), 60, Zero).0;
    assert_eq!(below.to_f64(NearestTiesToEven), f64::MAX);
    assert_eq!(below.to_f64(Positive), f64::INFINITY);
}

#[test]
fn test_cast_from_integers() {
    let rne = RoundingMode::NearestTiesToEven;
    assert_eq!(Arf::from_i64(1 << 32).to_f64(rne), (1u64 << 32) as f64);
    assert_eq!(Arf::from_i64(0).to_f64(rne), 0.);
    assert!(Arf::from_u64(0).is_zero());
    assert_eq!(Arf::from_u64(u64::MAX).bits(), 64);
    assert_eq!(Arf::from_i64(i64::MIN).to_i64(rne), i64::MIN);
    assert_eq!(Arf::from_i64(i64::MAX).to_i64(rne), i64::MAX);

    for i in -100..100 {
        let a = Arf::from_i64(i);
        let b = Arf::from_f64(i as f64);
        assert_eq!(a, b);
        assert_eq!(a.to_i64(rne), i);
    }

    let big = BigInt::from_u64(12345);
    let x = Arf::from_bigint_2exp(true, &big, &Exp::from(-3));
    assert_eq!(x.to_f64(rne), -12345.0 / 8.0);
    let (sign, m, e) = x.to_bigint_2exp().unwrap();
    assert!(sign);
    assert_eq!(Arf::from_bigint_2exp(sign, &m, &e), x);
    assert!(m.is_odd());
    assert_eq!(Arf::from_bigint(&big), Arf::from_u64(12345));
    assert!(Arf::nan().to_bigint_2exp().is_none());
    assert_eq!(
        Arf::zero().to_bigint_2exp(),
        Some((false, BigInt::zero(), Exp::zero()))
    );
}

#[test]
fn test_rounding_to_integer() {
    use RoundingMode::*;
    // Test the low integers with round-to-zero.
    for i in 0..100 {
        let r = Arf::from_f64(i as f64 + 0.1).to_i64(Zero);
        assert_eq!(i, r);
    }

    let check = |v: f64, rm: RoundingMode, expected: i64| {
        assert_eq!(Arf::from_f64(v).to_i64(rm), expected, "{} {:?}", v, rm);
    };
    check(2.5, NearestTiesToEven, 2);
    check(3.5, NearestTiesToEven, 4);
    check(0.5, NearestTiesToEven, 0);
    check(0.75, NearestTiesToEven, 1);
    check(-2.5, Away, -3);
    check(-2.5, Positive, -2);
    check(-2.5, Negative, -3);
    check(2.1, Positive, 3);
    check(1e30, Zero, i64::MAX);
    check(-1e30, Zero, i64::MIN);
    check(9223372036854775807.0, Zero, i64::MAX);
    check(f64::NAN, NearestTiesToEven, 0);
    check(f64::NEG_INFINITY, NearestTiesToEven, i64::MIN);
    check(f64::INFINITY, NearestTiesToEven, i64::MAX);
}

#[test]
fn test_get_mag() {
    let mut lfsr = utils::Lfsr::new();
    let rne = RoundingMode::NearestTiesToEven;
    // 1 + 2^-29 is the loosest relative bound.
    let slack = Arf::one().add(&Arf::one().mul_2exp_i64(-29), 64, rne).0;
    for _ in 0..5000 {
        let x = Arf::randtest_special(&mut lfsr, 200, 70, 20);
        let m = x.get_mag();
        if x.is_nan() || x.is_inf() {
            assert!(m.is_inf());
            continue;
        }
        let b = Arf::from_mag(&m);
        let ax = x.abs();
        assert!(b >= ax);
        let loose = ax.mul(&slack, crate::float::PREC_EXACT, rne).0;
        assert!(b <= loose);
        // Exact values with at most 30 bits load exactly.
        if x.bits() <= 30 {
            assert_eq!(b, ax);
        }
    }
}

#[test]
fn test_mag_conversions() {
    assert!(Mag::from_f64(f64::NAN).is_inf());
    assert!(Mag::from_f64(f64::NEG_INFINITY).is_inf());
    assert!(Mag::from_f64(0.0).is_zero());
    assert_eq!(Mag::from_f64(-3.0), Mag::from_u64(3));
    assert_eq!(Mag::from_f64_2exp(3.0, &Exp::from(2)), Mag::from_u64(12));
    assert_eq!(Mag::from_bigint(&BigInt::from_u64(96)), Mag::from_u64(96));
    assert_eq!(
        Mag::from_bigint_2exp(&BigInt::from_u64(5), &Exp::from(-1)),
        Mag::from_f64(2.5)
    );

    // A value that needs more than 30 bits is rounded up.
    let v = 0.1;
    let m = Mag::from_f64(v);
    assert!(m.to_f64() > v);
    assert!(m.to_f64() < v * (1.0 + 1e-8));

    assert_eq!(Mag::from_u64(7).to_f64(), 7.0);
    assert_eq!(Mag::inf().to_f64(), f64::INFINITY);
    assert_eq!(Mag::zero().to_f64(), 0.0);
    let tiny = Mag::one().mul_2exp_i64(-5000);
    assert_eq!(tiny.to_f64(), f64::MIN_POSITIVE);
    let huge = Mag::one().mul_2exp_i64(5000);
    assert_eq!(huge.to_f64(), f64::INFINITY);

    let (num, den) = Mag::from_f64(0.75).to_fraction().unwrap();
    let q = Arf::from_bigint(&num)
        .div(&Arf::from_bigint(&den), 64, RoundingMode::Zero)
        .0;
    assert_eq!(q, Arf::from_f64(0.75));
    let (num, den) = Mag::from_u64(1 << 40).to_fraction().unwrap();
    assert_eq!(num.msb_index(), 41);
    assert_eq!(den, BigInt::one());
    assert_eq!(
        Mag::zero().to_fraction(),
        Some((BigInt::zero(), BigInt::one()))
    );
    assert!(Mag::inf().to_fraction().is_none());
}

//! Correctly rounded arithmetic on `Arf` values. Every operation returns the
//! result rounded to `prec` bits in the mode `rm`, and an `Ordering` that
//! tells how the magnitude of the result compares to the magnitude of the
//! exact result (`Equal` when no rounding happened).

use super::bigint::BigInt;
use super::exponent::Exp;
use super::float::{Arf, Category, PREC_EXACT};
use super::rounding::{LossFraction, RoundingMode};
use core::cmp::{min, Ordering};
use core::ops::{Add, Mul, Neg, Sub};

/// Convert a non-negative exponent difference into a bit count. Gaps that do
/// not fit in a machine word only come from exact results that could never
/// be allocated.
fn bit_offset(e: &Exp) -> usize {
    match e.to_usize() {
        Some(bits) => bits,
        None => panic!("exponent gap {:?} is not addressable", e),
    }
}

/// Returns e - prec.
fn sub_prec(e: &Exp, prec: u64) -> Exp {
    match i64::try_from(prec) {
        Ok(p) => e.sub_i64(p),
        Err(_) => e - &Exp::from_parts(false, BigInt::from_u64(prec)),
    }
}

/// Return the mantissa of `x` shifted left so that its lowest bit lands on
/// the exponent `low`, which must not be above the lowest bit of `x`.
fn mantissa_at(man: &BigInt, man_low: &Exp, low: &Exp) -> BigInt {
    let mut m = man.clone();
    let bits = bit_offset(&(man_low - low));
    if bits > 0 {
        m.shift_left(bits);
    }
    m
}

impl Arf {
    /// Computes a+b rounded to `prec` bits using the rounding mode `rm`.
    pub fn add(
        &self,
        b: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        Self::add_sub(self, b, false, prec, rm)
    }

    /// Computes a-b rounded to `prec` bits using the rounding mode `rm`.
    pub fn sub(
        &self,
        b: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        Self::add_sub(self, b, true, prec, rm)
    }

    fn add_sub(
        a: &Self,
        b: &Self,
        subtract: bool,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        let b_sign = b.get_sign() ^ subtract;
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _) | (_, Category::NaN) => {
                (Self::nan(), Ordering::Equal)
            }

            (Category::Infinity, Category::Infinity) => {
                if a.get_sign() != b_sign {
                    return (Self::nan(), Ordering::Equal);
                }
                (a.clone(), Ordering::Equal)
            }

            (Category::Infinity, _) => (a.clone(), Ordering::Equal),

            (_, Category::Infinity) => (Self::inf(b_sign), Ordering::Equal),

            (Category::Zero, Category::Zero) => (Self::zero(), Ordering::Equal),

            (Category::Normal, Category::Zero) => a.set_round(prec, rm),

            (Category::Zero, Category::Normal) => {
                if subtract {
                    b.neg().set_round(prec, rm)
                } else {
                    b.set_round(prec, rm)
                }
            }

            (Category::Normal, Category::Normal) => {
                Self::add_normals(a, a.get_sign(), b, b_sign, prec, rm)
            }
        }
    }

    /// An inner function that adds two normal numbers with the signs `sa`
    /// and `sb`. The exact sum is formed on a common exponent and rounded
    /// once. An operand that lies entirely below the rounding window is
    /// replaced by a single sticky bit, which keeps the cost proportional to
    /// the operand sizes and the precision.
    fn add_normals(
        a: &Self,
        sa: bool,
        b: &Self,
        sb: bool,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        // Make `x` the operand with the highest top bit.
        let (x, sx, y, sy) = if a.get_exp() >= b.get_exp() {
            (a, sa, b, sb)
        } else {
            (b, sb, a, sa)
        };

        let x_low = x.low_exp();
        let mut y_low = y.low_exp();
        let mut y_man = y.get_mantissa().clone();

        if prec != PREC_EXACT {
            // Every representable result and every rounding midpoint is a
            // multiple of 2^t. If |y| < 2^t then x + y rounds like x plus any
            // other tiny value of the same sign.
            let window = sub_prec(x.get_exp(), prec).sub_i64(2);
            let t = min(x_low.clone(), window);
            if *y.get_exp() <= t {
                y_man = BigInt::one();
                y_low = t.sub_i64(1);
            }
        }

        let low = min(x_low.clone(), y_low.clone());
        let xm = mantissa_at(x.get_mantissa(), &x_low, &low);
        let ym = mantissa_at(&y_man, &y_low, &low);

        let (sum, sign) = if sx == sy {
            (xm + ym, sx)
        } else {
            let (diff, swapped) = xm.abs_diff(&ym);
            if diff.is_zero() {
                return (Self::zero(), Ordering::Equal);
            }
            (diff, if swapped { sy } else { sx })
        };

        Self::from_rounded(
            sign,
            &sum,
            &low,
            LossFraction::ExactlyZero,
            prec,
            rm,
        )
    }

    /// Compute a*b rounded to `prec` bits using the rounding mode `rm`.
    pub fn mul(
        &self,
        b: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        let a = self;
        let sign = a.get_sign() ^ b.get_sign();

        match (a.get_category(), b.get_category()) {
            (Category::NaN, _) | (_, Category::NaN) => {
                (Self::nan(), Ordering::Equal)
            }
            (Category::Zero, Category::Infinity)
            | (Category::Infinity, Category::Zero) => {
                (Self::nan(), Ordering::Equal)
            }
            (Category::Infinity, _) | (_, Category::Infinity) => {
                (Self::inf(sign), Ordering::Equal)
            }
            (Category::Zero, _) | (_, Category::Zero) => {
                (Self::zero(), Ordering::Equal)
            }
            (Category::Normal, Category::Normal) => {
                let m = a.get_mantissa() * b.get_mantissa();
                let low = &a.low_exp() + &b.low_exp();
                Self::from_rounded(
                    sign,
                    &m,
                    &low,
                    LossFraction::ExactlyZero,
                    prec,
                    rm,
                )
            }
        }
    }

    /// Compute a/b rounded to `prec` bits using the rounding mode `rm`.
    pub fn div(
        &self,
        b: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        debug_assert!(prec != PREC_EXACT, "division has no exact precision");
        let a = self;
        let sign = a.get_sign() ^ b.get_sign();
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _)
            | (_, Category::NaN)
            | (Category::Zero, Category::Zero)
            | (Category::Infinity, Category::Infinity) => {
                (Self::nan(), Ordering::Equal)
            }

            (_, Category::Infinity) => (Self::zero(), Ordering::Equal),
            (Category::Zero, _) => (Self::zero(), Ordering::Equal),
            (_, Category::Zero) => (Self::inf(sign), Ordering::Equal),
            (Category::Infinity, _) => (Self::inf(sign), Ordering::Equal),
            (Category::Normal, Category::Normal) => {
                Self::div_normals(a, b, sign, prec, rm)
            }
        }
    }

    /// Compute a/b, where both `a` and `b` are normals. The quotient is
    /// computed with at least `prec + 1` bits, and the remainder describes
    /// the lost fraction exactly.
    fn div_normals(
        a: &Self,
        b: &Self,
        sign: bool,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        let la = a.bits() as u64;
        let lb = b.bits() as u64;
        // Shift the dividend so that the integer quotient has enough bits.
        let shift =
            prec.saturating_add(1).saturating_add(lb).saturating_sub(la);
        let shift = usize::try_from(shift).unwrap_or(usize::MAX);

        let mut q = a.get_mantissa().clone();
        q.shift_left(shift);
        let rem = q.inplace_div(b.get_mantissa());
        let loss = LossFraction::from_ratio(&rem, b.get_mantissa());

        let low = (&a.low_exp() - &b.low_exp()).sub_usize(shift);
        Self::from_rounded(sign, &q, &low, loss, prec, rm)
    }

    /// Compute the square root rounded to `prec` bits using the rounding
    /// mode `rm`. Negative numbers give NaN.
    pub fn sqrt(&self, prec: u64, rm: RoundingMode) -> (Self, Ordering) {
        debug_assert!(prec != PREC_EXACT, "sqrt has no exact precision");
        match self.get_category() {
            Category::Zero => (Self::zero(), Ordering::Equal),
            Category::NaN => (Self::nan(), Ordering::Equal),
            Category::Infinity | Category::Normal if self.is_negative() => {
                (Self::nan(), Ordering::Equal)
            }
            Category::Infinity => (self.clone(), Ordering::Equal),
            Category::Normal => self.sqrt_normal(prec, rm),
        }
    }

    fn sqrt_normal(&self, prec: u64, rm: RoundingMode) -> (Self, Ordering) {
        let mut m = self.get_mantissa().clone();
        let mut low = self.low_exp();

        // Make the exponent even, so that it can be halved.
        if !low.is_even() {
            m.shift_left(1);
            low = low.sub_i64(1);
        }

        // The root of an n-bit number has ceil(n/2) bits. Scale by 4^k to get
        // at least prec + 1 bits.
        let bits = m.msb_index() as u64;
        let k = prec.saturating_add(1).saturating_sub(bits / 2);
        let k = usize::try_from(k).unwrap_or(usize::MAX / 4);
        m.shift_left(2 * k);
        low = low.sub_usize(2 * k);

        let root = m.isqrt();
        let (rem, _) = m.abs_diff(&(&root * &root));
        // sqrt(N) = r + f, and f > 1/2 iff N - r^2 > r. The fraction is never
        // exactly one half.
        let loss = if rem.is_zero() {
            LossFraction::ExactlyZero
        } else if rem <= root {
            LossFraction::LessThanHalf
        } else {
            LossFraction::MoreThanHalf
        };

        Self::from_rounded(false, &root, &low.div2_floor(), loss, prec, rm)
    }

    /// Returns self + x*y with a single rounding to `prec` bits.
    pub fn addmul(
        &self,
        x: &Self,
        y: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        let (p, _) = x.mul(y, PREC_EXACT, rm);
        self.add(&p, prec, rm)
    }

    /// Returns self - x*y with a single rounding to `prec` bits.
    pub fn submul(
        &self,
        x: &Self,
        y: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        let (p, _) = x.mul(y, PREC_EXACT, rm);
        self.sub(&p, prec, rm)
    }

    /// Accumulate x*y into this number, rounding once to `prec` bits.
    pub fn addmul_assign(
        &mut self,
        x: &Self,
        y: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> Ordering {
        let (res, ord) = self.addmul(x, y, prec, rm);
        *self = res;
        ord
    }

    /// Subtract x*y from this number, rounding once to `prec` bits.
    pub fn submul_assign(
        &mut self,
        x: &Self,
        y: &Self,
        prec: u64,
        rm: RoundingMode,
    ) -> Ordering {
        let (res, ord) = self.submul(x, y, prec, rm);
        *self = res;
        ord
    }
}

// The operators are exact.

impl Add for &Arf {
    type Output = Arf;

    fn add(self, rhs: Self) -> Arf {
        Arf::add(self, rhs, PREC_EXACT, RoundingMode::Zero).0
    }
}

impl Sub for &Arf {
    type Output = Arf;

    fn sub(self, rhs: Self) -> Arf {
        Arf::sub(self, rhs, PREC_EXACT, RoundingMode::Zero).0
    }
}

impl Mul for &Arf {
    type Output = Arf;

    fn mul(self, rhs: Self) -> Arf {
        Arf::mul(self, rhs, PREC_EXACT, RoundingMode::Zero).0
    }
}

impl Neg for &Arf {
    type Output = Arf;

    fn neg(self) -> Arf {
        Arf::neg(self)
    }
}

#[cfg(test)]
use RoundingMode::NearestTiesToEven as rne;

#[test]
fn test_add_small_integers() {
    let x = Arf::from_u64(3);
    let y = Arf::from_u64(4);
    let (z, ord) = x.add(&y, 53, rne);
    assert_eq!(z, Arf::from_u64(7));
    assert_eq!(ord, Ordering::Equal);

    let (z, ord) = x.sub(&y, 53, rne);
    assert_eq!(z, Arf::from_i64(-1));
    assert_eq!(ord, Ordering::Equal);

    // 7 does not fit in two bits.
    let (z, ord) = x.add(&y, 2, RoundingMode::Zero);
    assert_eq!(z, Arf::from_u64(6));
    assert_eq!(ord, Ordering::Less);
    let (z, ord) = x.add(&y, 2, RoundingMode::Negative);
    assert_eq!(z, Arf::from_u64(6));
    assert_eq!(ord, Ordering::Less);
    let (z, ord) = x.add(&y, 2, RoundingMode::Away);
    assert_eq!(z, Arf::from_u64(8));
    assert_eq!(ord, Ordering::Greater);
    // 7 is halfway between 6 and 8; 8 has the even mantissa.
    let (z, _) = x.add(&y, 2, rne);
    assert_eq!(z, Arf::from_u64(8));
}

#[test]
fn test_addition() {
    fn add_helper(a: f64, b: f64) -> f64 {
        let a = Arf::from_f64(a);
        let b = Arf::from_f64(b);
        let (c, _) = a.add(&b, 53, rne);
        c.to_f64(rne)
    }

    assert_eq!(add_helper(0., -4.), -4.);
    assert_eq!(add_helper(-4., 0.), -4.);
    assert_eq!(add_helper(1., 1.), 2.);
    assert_eq!(add_helper(8., 4.), 12.);
    assert_eq!(add_helper(128., 2.), 130.);
    assert_eq!(add_helper(128., -8.), 120.);
    assert_eq!(add_helper(64., -60.), 4.);
    assert_eq!(add_helper(69., -65.), 4.);
    assert_eq!(add_helper(69., 69.), 138.);
    assert_eq!(add_helper(69., 1.), 70.);
    assert_eq!(add_helper(-128., -8.), -136.);
    assert_eq!(add_helper(64., -65.), -1.);
    assert_eq!(add_helper(-64., -65.), -129.);
    assert_eq!(add_helper(-15., -15.), -30.);
    assert_eq!(add_helper(-15., 15.), 0.);

    for i in -4..15 {
        for j in i..15 {
            assert_eq!(
                add_helper(f64::from(j), f64::from(i)),
                f64::from(i) + f64::from(j)
            );
        }
    }
}

// Pg 120.  Chapter 4. Basic Properties and Algorithms.
#[test]
fn test_addition_large_numbers() {
    let add = |a: &Arf, b: &Arf| a.add(b, 53, rne).0;
    let sub = |a: &Arf, b: &Arf| a.sub(b, 53, rne).0;
    let one = Arf::from_i64(1);
    let mut a = Arf::from_i64(1);

    while sub(&add(&a, &one), &a) == one {
        a = add(&a, &a);
    }

    let mut b = one.clone();
    while sub(&add(&a, &b), &a) != b {
        b = add(&b, &one);
    }

    assert_eq!(a.to_f64(rne), 9007199254740992.);
    assert_eq!(b.to_f64(rne), 2.);
}

#[test]
fn test_add_far_apart() {
    // 1 + 2^-1000000 at 64 bits: only the sticky bit survives.
    let one = Arf::one();
    let tiny = Arf::one().mul_2exp_i64(-1_000_000);
    let (r, ord) = one.add(&tiny, 64, RoundingMode::Zero);
    assert!(r.is_one());
    assert_eq!(ord, Ordering::Less);
    let (r, ord) = one.add(&tiny, 64, RoundingMode::Away);
    assert_eq!(r, Arf::from_u64((1 << 63) + 1).mul_2exp_i64(-63));
    assert_eq!(ord, Ordering::Greater);
    let (r, ord) = one.sub(&tiny, 64, RoundingMode::Zero);
    assert_eq!(r, Arf::from_u64(u64::MAX).mul_2exp_i64(-64));
    assert_eq!(ord, Ordering::Less);
    let (r, ord) = one.sub(&tiny, 64, rne);
    assert!(r.is_one());
    assert_eq!(ord, Ordering::Greater);

    // Promoted exponents work the same way.
    let huge = Arf::one().mul_2exp(&Exp::from(i64::MAX).add_i64(10));
    let (r, ord) = huge.add(&one, 10, RoundingMode::Positive);
    assert_eq!(r, huge.add(&huge.ulp(10), PREC_EXACT, rne).0);
    assert_eq!(ord, Ordering::Greater);
    let (r, ord) = one.sub(&huge, 10, rne);
    assert_eq!(r, huge.neg());
    assert_eq!(ord, Ordering::Greater);
}

#[test]
fn test_add_special_values() {
    let inf = Arf::pos_inf();
    let ninf = Arf::neg_inf();
    let nan = Arf::nan();
    let x = Arf::from_f64(1.5);
    let zero = Arf::zero();

    assert!(inf.sub(&inf, 53, rne).0.is_nan());
    assert!(inf.add(&ninf, 53, rne).0.is_nan());
    assert!(inf.add(&inf, 53, rne).0.is_pos_inf());
    assert!(inf.sub(&ninf, 53, rne).0.is_pos_inf());
    assert!(nan.add(&x, 53, rne).0.is_nan());
    assert!(x.add(&nan, 53, rne).0.is_nan());
    assert!(x.sub(&inf, 53, rne).0.is_neg_inf());
    assert!(ninf.add(&x, 53, rne).0.is_neg_inf());
    assert_eq!(x.add(&zero, 53, rne), (x.clone(), Ordering::Equal));
    assert_eq!(zero.sub(&x, 53, rne), (x.neg(), Ordering::Equal));
    assert_eq!(x.sub(&x, 53, rne), (zero.clone(), Ordering::Equal));
    // Adding zero still rounds.
    let (r, ord) = x.add(&zero, 1, RoundingMode::Zero);
    assert!(r.is_one());
    assert_eq!(ord, Ordering::Less);
}

#[test]
fn test_sub_from_zero_directed() {
    use RoundingMode::{Negative, Positive};
    let zero = Arf::zero();
    let x = Arf::from_f64(1.5);

    // 0 - 1.5 = -1.5 rounds by the sign of the result.
    let (r, ord) = zero.sub(&x, 1, Negative);
    assert_eq!(r, Arf::from_i64(-2));
    assert_eq!(ord, Ordering::Greater);
    let (r, ord) = zero.sub(&x, 1, Positive);
    assert_eq!(r, Arf::from_i64(-1));
    assert_eq!(ord, Ordering::Less);

    // 0 - (-1.5) = 1.5.
    let (r, ord) = zero.sub(&x.neg(), 1, Negative);
    assert_eq!(r, Arf::one());
    assert_eq!(ord, Ordering::Less);
    let (r, ord) = zero.sub(&x.neg(), 1, Positive);
    assert_eq!(r, Arf::from_u64(2));
    assert_eq!(ord, Ordering::Greater);

    // A zero accumulator takes the same path.
    let three = Arf::from_u64(3);
    let half = Arf::from_f64(0.5);
    let (r, ord) = zero.submul(&three, &half, 1, Negative);
    assert_eq!(r, Arf::from_i64(-2));
    assert_eq!(ord, Ordering::Greater);
    let (r, ord) = zero.submul(&three, &half, 1, Positive);
    assert_eq!(r, Arf::from_i64(-1));
    assert_eq!(ord, Ordering::Less);
}

#[test]
fn test_add_random_vals() {
    use crate::utils;

    let mut lfsr = utils::Lfsr::new();

    fn add_f64(a: f64, b: f64) -> f64 {
        let a = Arf::from_f64(a);
        let b = Arf::from_f64(b);
        a.add(&b, 53, rne).0.to_f64(rne)
    }

    for _ in 0..20000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64());
        let r1 = f0 + f1;
        // The unbounded exponent does not overflow or lose subnormal bits.
        if !r1.is_normal() {
            continue;
        }
        let r0 = add_f64(f0, f1);
        assert_eq!(r0.to_bits(), r1.to_bits());
    }
}

#[test]
fn test_mul_regular_values() {
    let values = [-5.0, 0., -0., 24., 1., 11., 10000., 256., 0.1, 3., 17.5];

    fn mul_f64(a: f64, b: f64) -> f64 {
        let a = Arf::from_f64(a);
        let b = Arf::from_f64(b);
        a.mul(&b, 53, rne).0.to_f64(rne)
    }

    for v0 in values {
        for v1 in values {
            let r0 = mul_f64(v0, v1);
            let r1 = v0 * v1;
            // Arf has an unsigned zero.
            assert_eq!(r0, r1);
        }
    }
}

#[test]
fn test_mul_special_values() {
    use crate::utils;

    for v0 in utils::get_special_test_values() {
        for v1 in utils::get_special_test_values() {
            let a = Arf::from_f64(v0);
            let b = Arf::from_f64(v1);
            let r0 = a.mul(&b, 53, rne).0;
            let r1 = v0 * v1;
            // The exponent is unbounded, so only infinite inputs give inf.
            let any_inf = v0.is_infinite() || v1.is_infinite();
            assert_eq!(r0.is_nan(), r1.is_nan());
            assert_eq!(r0.is_inf(), any_inf && !r1.is_nan());
            if r1.is_normal() {
                assert_eq!(r0.to_f64(rne), r1);
            }
        }
    }
}

#[test]
fn test_mul_random_vals() {
    use crate::utils;
    let mut lfsr = utils::Lfsr::new();

    for _ in 0..20000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64());
        let r1 = f0 * f1;
        if !r1.is_normal() {
            continue;
        }
        let a = Arf::from_f64(f0);
        let b = Arf::from_f64(f1);
        let r0 = a.mul(&b, 53, rne).0.to_f64(rne);
        assert_eq!(r0.to_bits(), r1.to_bits());
    }
}

#[test]
fn test_square_tiny_value() {
    // The smallest 4-bit value with a huge negative exponent, squared at 4
    // bits rounding toward +inf.
    let e = Exp::from(i64::MIN).sub_i64(5);
    let x = Arf::from_parts(false, e, BigInt::from_u64(0b1001));
    let (sq, ord) = x.mul(&x, 4, RoundingMode::Positive);
    let exact = &x * &x;
    assert!(sq >= exact);
    assert_eq!(ord, Ordering::Greater);
    assert!(sq.bits() <= 4);
    assert!(crate::utils::check_ulp(&sq, &exact, ord, 4));
    // 0b1001^2 = 0b1010001 rounds up to 0b1011.
    assert_eq!(sq.get_mantissa().as_u64(), 0b1011);
}

#[test]
fn test_div_simple() {
    let a: f64 = 1.0;
    let b: f64 = 7.0;
    let (c, ord) = Arf::from_f64(a).div(&Arf::from_f64(b), 53, rne);
    assert_eq!(c.to_f64(rne), a / b);
    assert_ne!(ord, Ordering::Equal);

    let (c, ord) = Arf::from_u64(21).div(&Arf::from_i64(-7), 10, rne);
    assert_eq!(c, Arf::from_i64(-3));
    assert_eq!(ord, Ordering::Equal);
}

#[test]
fn test_div_special_values() {
    use crate::utils;

    for v0 in utils::get_special_test_values() {
        for v1 in utils::get_special_test_values() {
            let a = Arf::from_f64(v0);
            let b = Arf::from_f64(v1);
            let r0 = a.div(&b, 53, rne).0;
            let r1 = v0 / v1;
            let inf = v0.is_infinite() || (v1 == 0.0 && v0 != 0.0);
            assert_eq!(r0.is_nan(), r1.is_nan(), "{} / {}", v0, v1);
            assert_eq!(r0.is_inf(), inf && !r1.is_nan(), "{} / {}", v0, v1);
            if r1.is_normal() {
                assert_eq!(r0.to_f64(rne), r1);
            }
        }
    }
}

#[test]
fn test_div_random_vals() {
    use crate::utils;
    let mut lfsr = utils::Lfsr::new();

    for _ in 0..5000 {
        let f0 = f64::from_bits(lfsr.get64());
        let f1 = f64::from_bits(lfsr.get64());
        let r1 = f0 / f1;
        if !r1.is_normal() {
            continue;
        }
        let a = Arf::from_f64(f0);
        let b = Arf::from_f64(f1);
        let r0 = a.div(&b, 53, rne).0.to_f64(rne);
        assert_eq!(r0.to_bits(), r1.to_bits());
    }
}

#[test]
fn test_sqrt() {
    use crate::utils;

    // Perfect squares are exact.
    for i in 1..256 {
        let (r, ord) = Arf::from_u64(i * i).sqrt(53, rne);
        assert_eq!(r, Arf::from_u64(i));
        assert_eq!(ord, Ordering::Equal);
    }

    // Test the category of the different special values.
    for v_f64 in utils::get_special_test_values() {
        let vf = Arf::from_f64(v_f64).sqrt(53, rne).0;
        assert_eq!(vf.is_inf(), v_f64.sqrt().is_infinite());
        assert_eq!(vf.is_nan(), v_f64.sqrt().is_nan());
        if v_f64.sqrt().is_normal() {
            assert_eq!(vf.to_f64(rne), v_f64.sqrt());
        }
    }

    // Compare with the hardware square root.
    fn check(inp: f64, res: f64) {
        assert_eq!(Arf::from_f64(inp).sqrt(53, rne).0.to_f64(rne), res);
    }
    check(1.5, 1.224744871391589);
    check(2.3, 1.51657508881031);
    check(6.7, 2.588435821108957);
    check(11.45, 3.383784863137726);
    check(199120056003.73413, 446228.70369770494);
    check(0.6666666666666666, 0.816496580927726);
    check(1.1085159520988087e-5, 0.00332943831914455);
    check(5.0120298432056786e-8, 0.0002238756316173263);

    let mut lfsr = utils::Lfsr::new();
    for _ in 0..5000 {
        let v = f64::from_bits(lfsr.get64() >> 1);
        if !v.is_normal() {
            continue;
        }
        check(v, v.sqrt());
    }
}

#[test]
fn test_sqrt_negative() {
    assert!(Arf::from_i64(-4).sqrt(53, rne).0.is_nan());
    assert!(Arf::neg_inf().sqrt(53, rne).0.is_nan());
    assert!(Arf::pos_inf().sqrt(53, rne).0.is_pos_inf());
    assert!(Arf::zero().sqrt(53, rne).0.is_zero());
}

#[test]
fn test_addmul() {
    // 1 + 3*5 at 3 bits: 16 is exact.
    let mut acc = Arf::one();
    let ord = acc.addmul_assign(
        &Arf::from_u64(3),
        &Arf::from_u64(5),
        3,
        RoundingMode::Zero,
    );
    assert_eq!(acc, Arf::from_u64(16));
    assert_eq!(ord, Ordering::Equal);

    // 16 - 7*3 = -5 at 2 bits toward zero is -4.
    let ord = acc.submul_assign(
        &Arf::from_u64(7),
        &Arf::from_u64(3),
        2,
        RoundingMode::Zero,
    );
    assert_eq!(acc, Arf::from_i64(-4));
    assert_eq!(ord, Ordering::Less);

    // A single rounding: 2^60 + 1 - 2^60 is exactly 1 even though 2^60 + 1
    // does not fit in the precision.
    let big = Arf::one().mul_2exp_i64(60);
    let (r, ord) = Arf::one()
        .addmul(&big, &Arf::one(), PREC_EXACT, rne)
        .0
        .submul(&big, &Arf::one(), 8, rne);
    assert!(r.is_one());
    assert_eq!(ord, Ordering::Equal);

    // NaN in the product contaminates the result.
    let (r, _) = Arf::one().addmul(&Arf::zero(), &Arf::pos_inf(), 53, rne);
    assert!(r.is_nan());
}

#[test]
fn test_operators() {
    let a = Arf::from_f64(8.0);
    let b = Arf::from_f64(2.0);
    assert_eq!((&a + &b).to_f64(rne), 10.0);
    assert_eq!((&a - &b).to_f64(rne), 6.0);
    assert_eq!((&a * &b).to_f64(rne), 16.0);
    assert_eq!((-&a).to_f64(rne), -8.0);
    assert_eq!((-&b).neg(), b);
}

#[test]
fn test_famous_pentium4_bug() {
    // https://en.wikipedia.org/wiki/Pentium_FDIV_bug
    let a = Arf::from_u64(4_195_835);
    let b = Arf::from_u64(3_145_727);
    let (res, _) = a.div(&b, 53, rne);
    assert_eq!(res.to_f64(rne), 4_195_835f64 / 3_145_727f64);
}

#[cfg(test)]
fn test_iterations(base: u64) -> u64 {
    #[cfg(feature = "std")]
    let cfg = crate::utils::TestConfig::from_env();
    #[cfg(not(feature = "std"))]
    let cfg = crate::utils::TestConfig::default();
    cfg.iterations(base)
}

#[cfg(test)]
fn random_rm(lfsr: &mut crate::utils::Lfsr) -> RoundingMode {
    RoundingMode::ALL[lfsr.get_below(5) as usize]
}

#[test]
fn test_rounding_matches_exact_result() {
    use crate::utils::{check_ulp, Lfsr};
    let mut lfsr = Lfsr::new();

    for _ in 0..test_iterations(3000) {
        let x = Arf::randtest_special(&mut lfsr, 200, 10, 16);
        let y = Arf::randtest_special(&mut lfsr, 200, 10, 16);
        let z = Arf::randtest(&mut lfsr, 200, 10);
        let prec = 1 + lfsr.get_below(300);
        let rm = random_rm(&mut lfsr);

        // The rounded operation is the exact result rounded once.
        type Op = fn(&Arf, &Arf, u64, RoundingMode) -> (Arf, Ordering);
        let ops: [Op; 3] = [Arf::add, Arf::sub, Arf::mul];
        for op in ops {
            let (res, ord) = op(&x, &y, prec, rm);
            let (exact, exact_ord) = op(&x, &y, PREC_EXACT, rm);
            assert_eq!(exact_ord, Ordering::Equal);
            assert_eq!((res.clone(), ord), exact.set_round(prec, rm));
            assert!(check_ulp(&res, &exact, ord, prec));
        }

        let (res, ord) = z.addmul(&x, &y, prec, rm);
        let prod = &x * &y;
        let exact = z.add(&prod, PREC_EXACT, rm).0;
        assert_eq!((res, ord), exact.set_round(prec, rm));

        let (res, ord) = z.submul(&x, &y, prec, rm);
        let exact = z.sub(&prod, PREC_EXACT, rm).0;
        assert_eq!((res, ord), exact.set_round(prec, rm));
    }
}

#[test]
fn test_add_rounding_far_exponents() {
    use crate::utils::{check_rounding, Lfsr};
    let mut lfsr = Lfsr::new();

    for _ in 0..test_iterations(2000) {
        // Exponents of up to 80 bits: the exact sum is far too large to
        // build, so compare against it through the larger operand.
        let x = Arf::randtest_not_zero(&mut lfsr, 150, 80);
        let y = Arf::randtest_not_zero(&mut lfsr, 150, 80);
        let prec = 1 + lfsr.get_below(200);
        let rm = random_rm(&mut lfsr);
        let (big, small) = if x.get_exp() >= y.get_exp() {
            (&x, &y)
        } else {
            (&y, &x)
        };

        let (res, ord) = x.add(&y, prec, rm);
        let cmp = |v: &Arf| {
            let d = v.sub(big, PREC_EXACT, rm).0;
            d.partial_cmp(small).unwrap()
        };
        assert!(check_rounding(&res, ord, prec, rm, cmp));

        let (res, ord) = x.sub(&y, prec, rm);
        let neg = y.neg();
        let (big, small) = if big == &x { (&x, &neg) } else { (&neg, &x) };
        let cmp = |v: &Arf| {
            let d = v.sub(big, PREC_EXACT, rm).0;
            d.partial_cmp(small).unwrap()
        };
        assert!(check_rounding(&res, ord, prec, rm, cmp));
    }
}

#[test]
fn test_div_rounding() {
    use crate::utils::{check_rounding, Lfsr};
    let mut lfsr = Lfsr::new();

    for _ in 0..test_iterations(2000) {
        let x = Arf::randtest_not_zero(&mut lfsr, 300, 70);
        let y = Arf::randtest_not_zero(&mut lfsr, 300, 70);
        let prec = 1 + lfsr.get_below(300);
        let rm = random_rm(&mut lfsr);

        let (q, ord) = x.div(&y, prec, rm);
        // Compare v with x/y through v*y and x.
        let cmp = |v: &Arf| {
            let p = v.mul(&y, PREC_EXACT, rm).0;
            let c = p.partial_cmp(&x).unwrap();
            if y.is_negative() {
                c.reverse()
            } else {
                c
            }
        };
        assert!(check_rounding(&q, ord, prec, rm, cmp));
    }

    // Exact quotients are exact.
    let (q, ord) = Arf::from_u64(3 << 40).div(&Arf::from_u64(3), 2, rne);
    assert_eq!(q, Arf::one().mul_2exp_i64(40));
    assert_eq!(ord, Ordering::Equal);
}

#[test]
fn test_sqrt_rounding() {
    use crate::utils::{check_rounding, Lfsr};
    let mut lfsr = Lfsr::new();

    for _ in 0..test_iterations(2000) {
        let x = Arf::randtest_not_zero(&mut lfsr, 300, 70).abs();
        let prec = 1 + lfsr.get_below(300);
        let rm = random_rm(&mut lfsr);

        let (r, ord) = x.sqrt(prec, rm);
        let cmp = |v: &Arf| {
            if v.is_negative() {
                return Ordering::Less;
            }
            let sq = v.mul(v, PREC_EXACT, rm).0;
            sq.partial_cmp(&x).unwrap()
        };
        assert!(check_rounding(&r, ord, prec, rm, cmp));
    }

    // Even powers of two are exact at any precision.
    let x = Arf::one().mul_2exp(&Exp::from(i64::MIN).sub_i64(2));
    let (r, ord) = x.sqrt(1, RoundingMode::Away);
    assert_eq!(ord, Ordering::Equal);
    assert_eq!(r.mul(&r, PREC_EXACT, rne).0, x);
}

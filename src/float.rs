use super::bigint::BigInt;
use super::exponent::Exp;
use super::rounding::{round_mantissa, LossFraction, RoundingMode};
use core::cmp::Ordering;

/// Requests an exact result. Valid for operations whose exact result is
/// always representable (add, sub, mul, addmul, submul, set_round). Passing
/// it to div or sqrt is a caller error.
pub const PREC_EXACT: u64 = u64::MAX;

/// Declare the different categories of the floating point number. These
/// categories are internal to the float, and can be access by the acessors:
/// is_inf, is_zero, is_nan, is_normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Infinity,
    NaN,
    Normal,
    Zero,
}

/// This is the main data structure of this library. It represents an exact
/// binary floating-point number with an unbounded mantissa and an unbounded
/// exponent, or one of the special values zero, +inf, -inf and NaN.
///
/// A normal number has the value `(-1)^sign * m * 2^(exp - bits(m))`: the
/// mantissa read as a binary fraction lies in [1/2, 1). The mantissa is kept
/// odd, so every value has exactly one encoding and `bits(m)` is the number
/// of significant bits. Zero and NaN are unsigned.
///
/// The arithmetic operations take a precision and a rounding mode, and
/// return the rounded result together with the direction of the rounding
/// (see `arithmetic`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arf {
    // The Sign bit.
    sign: bool,
    // The exponent of the top bit, plus one.
    exp: Exp,
    // The odd significand, aligned to the right.
    mantissa: BigInt,
    // The kind of number this float represents.
    category: Category,
}

impl Arf {
    /// Create a new number with the value `(-1)^sign * mantissa *
    /// 2^(exp - bits(mantissa))`. The mantissa does not need to be odd.
    pub fn from_parts(sign: bool, exp: Exp, mantissa: BigInt) -> Self {
        if mantissa.is_zero() {
            return Self::zero();
        }
        let mut mantissa = mantissa;
        // Stripping the trailing zeros does not move the top bit, so the
        // exponent stays the same.
        mantissa.strip_trailing_zeros();
        Arf {
            sign,
            exp,
            mantissa,
            category: Category::Normal,
        }
    }

    /// Create the exact number `(-1)^sign * mantissa * 2^low`.
    pub fn from_int_exp(sign: bool, mantissa: BigInt, low: &Exp) -> Self {
        if mantissa.is_zero() {
            return Self::zero();
        }
        let exp = low.add_usize(mantissa.msb_index());
        Self::from_parts(sign, exp, mantissa)
    }

    /// Round the exact value `(-1)^sign * (mantissa + loss) * 2^low` to
    /// `prec` bits, and return the result with the rounding direction.
    pub(crate) fn from_rounded(
        sign: bool,
        mantissa: &BigInt,
        low: &Exp,
        loss: LossFraction,
        prec: u64,
        rm: RoundingMode,
    ) -> (Self, Ordering) {
        if mantissa.is_zero() {
            debug_assert!(loss.is_exactly_zero());
            return (Self::zero(), Ordering::Equal);
        }
        let res = round_mantissa(sign, mantissa, loss, prec, rm);
        let low = low.add_usize(res.shift);
        (Self::from_int_exp(sign, res.mantissa, &low), res.ord)
    }

    /// Returns a new zero float.
    pub fn zero() -> Self {
        Arf {
            sign: false,
            exp: Exp::zero(),
            mantissa: BigInt::zero(),
            category: Category::Zero,
        }
    }

    /// Returns a new float with the value one.
    pub fn one() -> Self {
        Self::from_parts(false, Exp::from(1), BigInt::one())
    }

    /// Returns a new infinity float.
    pub fn inf(sign: bool) -> Self {
        Arf {
            sign,
            exp: Exp::zero(),
            mantissa: BigInt::zero(),
            category: Category::Infinity,
        }
    }

    /// Returns +inf.
    pub fn pos_inf() -> Self {
        Self::inf(false)
    }

    /// Returns -inf.
    pub fn neg_inf() -> Self {
        Self::inf(true)
    }

    /// Returns a new NaN float.
    pub fn nan() -> Self {
        Arf {
            sign: false,
            exp: Exp::zero(),
            mantissa: BigInt::zero(),
            category: Category::NaN,
        }
    }

    /// Returns true if the number is negative
    pub fn is_negative(&self) -> bool {
        self.sign
    }

    /// Returns true if the number is +-inf.
    pub fn is_inf(&self) -> bool {
        self.category == Category::Infinity
    }

    pub fn is_pos_inf(&self) -> bool {
        self.is_inf() && !self.sign
    }

    pub fn is_neg_inf(&self) -> bool {
        self.is_inf() && self.sign
    }

    /// Returns true if the number is NaN.
    pub fn is_nan(&self) -> bool {
        self.category == Category::NaN
    }

    /// Returns true if the number is zero.
    pub fn is_zero(&self) -> bool {
        self.category == Category::Zero
    }

    /// Returns true if this number is normal (not Zero, Nan, Inf).
    pub fn is_normal(&self) -> bool {
        self.category == Category::Normal
    }

    /// Returns true for zero, infinities and NaN.
    pub fn is_special(&self) -> bool {
        !self.is_normal()
    }

    /// Returns true for zero and normal numbers.
    pub fn is_finite(&self) -> bool {
        self.is_normal() || self.is_zero()
    }

    /// Returns true if the number is exactly one.
    pub fn is_one(&self) -> bool {
        *self == Self::one()
    }

    /// Returns true if the number is an integer (zero included).
    pub fn is_int(&self) -> bool {
        match self.category {
            Category::Zero => true,
            Category::Normal => !self.low_exp().is_negative(),
            _ => false,
        }
    }

    /// Returns the sign of the float. True means negative.
    pub fn get_sign(&self) -> bool {
        self.sign
    }

    /// Returns -1, 0 or 1 according to the sign. NaN gives 0.
    pub fn sgn(&self) -> i32 {
        match self.category {
            Category::Zero | Category::NaN => 0,
            _ => {
                if self.sign {
                    -1
                } else {
                    1
                }
            }
        }
    }

    /// Returns the (odd) mantissa of the float.
    pub fn get_mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// Returns the exponent of the float: the value lies in
    /// [2^(exp-1), 2^exp).
    pub fn get_exp(&self) -> &Exp {
        &self.exp
    }

    /// Returns the exponent of the lowest set bit of the mantissa.
    pub fn low_exp(&self) -> Exp {
        self.exp.sub_usize(self.mantissa.msb_index())
    }

    /// Returns the category of the float.
    pub fn get_category(&self) -> Category {
        self.category
    }

    /// Returns the number of significant bits (zero for special values).
    pub fn bits(&self) -> usize {
        self.mantissa.msb_index()
    }

    /// Returns a new float which has a flipped sign (negated value).
    pub fn neg(&self) -> Self {
        let mut x = self.clone();
        if x.is_normal() || x.is_inf() {
            x.sign = !x.sign;
        }
        x
    }

    /// Returns the absolute value of this float.
    pub fn abs(&self) -> Self {
        let mut x = self.clone();
        x.sign = false;
        x
    }

    /// Returns x * 2^e, exactly.
    pub fn mul_2exp(&self, e: &Exp) -> Self {
        let mut x = self.clone();
        if x.is_normal() {
            x.exp = &x.exp + e;
        }
        x
    }

    /// Returns x * 2^e, exactly.
    pub fn mul_2exp_i64(&self, e: i64) -> Self {
        self.mul_2exp(&Exp::from(e))
    }

    /// Round this number to `prec` bits using the rounding mode `rm`.
    pub fn set_round(&self, prec: u64, rm: RoundingMode) -> (Self, Ordering) {
        if !self.is_normal() || self.bits() as u64 <= prec {
            return (self.clone(), Ordering::Equal);
        }
        Self::from_rounded(
            self.sign,
            &self.mantissa,
            &self.low_exp(),
            LossFraction::ExactlyZero,
            prec,
            rm,
        )
    }

    /// Returns the unit in the last place of this number at precision
    /// `prec`, 2^(exp - prec). Special values give NaN.
    pub fn ulp(&self, prec: u64) -> Self {
        if !self.is_normal() {
            return Self::nan();
        }
        let low = match i64::try_from(prec) {
            Ok(p) => self.exp.sub_i64(p),
            Err(_) => {
                &self.exp - &Exp::from_parts(false, BigInt::from_u64(prec))
            }
        };
        Self::from_int_exp(false, BigInt::one(), &low)
    }

    /// Returns the largest integer that is not greater than the number.
    pub fn floor(&self) -> Self {
        self.round_to_int(RoundingMode::Negative)
    }

    /// Returns the smallest integer that is not less than the number.
    pub fn ceil(&self) -> Self {
        self.round_to_int(RoundingMode::Positive)
    }

    /// Round to an integer in the direction of the directed mode `rm`.
    pub(crate) fn round_to_int(&self, rm: RoundingMode) -> Self {
        if self.is_int() || !self.is_normal() {
            return self.clone();
        }
        // The integer part has exactly `exp` bits, so rounding to that
        // precision rounds to an integer.
        match self.exp.to_i64() {
            Some(e) if e > 0 => self.set_round(e as u64, rm).0,
            _ => {
                // The magnitude is below one.
                let to_one = match rm {
                    RoundingMode::NearestTiesToEven => {
                        // Only values above one half round up.
                        self.exp.is_zero() && self.bits() > 1
                    }
                    _ => !rm.is_toward_zero(self.sign),
                };
                if to_one {
                    let one = Self::one();
                    if self.sign {
                        one.neg()
                    } else {
                        one
                    }
                } else {
                    Self::zero()
                }
            }
        }
    }

    /// Compare the absolute values. NaN compared with NaN is Equal; NaN
    /// compared with any other value is unordered.
    pub fn cmp_abs(&self, other: &Self) -> Option<Ordering> {
        self.abs().partial_cmp(&other.abs())
    }

    /// Compare |x| with 2^e. Returns None for NaN.
    pub fn cmp_2exp(&self, e: &Exp) -> Option<Ordering> {
        match self.category {
            Category::NaN => None,
            Category::Zero => Some(Ordering::Less),
            Category::Infinity => Some(Ordering::Greater),
            Category::Normal => {
                // 2^e has the exponent e + 1 in our representation.
                let e1 = e.add_i64(1);
                match self.exp.cmp(&e1) {
                    Ordering::Equal => {
                        if self.bits() == 1 {
                            Some(Ordering::Equal)
                        } else {
                            Some(Ordering::Greater)
                        }
                    }
                    ord => Some(ord),
                }
            }
        }
    }

    /// Returns the greater of self and `other`. NaN is ignored if the other
    /// operand is a number.
    pub fn max(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        } else if other.is_nan() {
            return self.clone();
        }
        if self > other {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// Returns the smaller of self and `other`. NaN is ignored if the other
    /// operand is a number.
    pub fn min(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        } else if other.is_nan() {
            return self.clone();
        }
        if self > other {
            other.clone()
        } else {
            self.clone()
        }
    }

    /// Prints the number using the internal representation.
    #[cfg(feature = "std")]
    pub fn dump(&self) {
        use std::println;
        let sign = if self.sign { "-" } else { "+" };
        match self.category {
            Category::NaN => {
                println!("[NaN]");
            }
            Category::Infinity => {
                println!("[{}Inf]", sign);
            }
            Category::Zero => {
                println!("[0]");
            }
            Category::Normal => {
                println!(
                    "Arf[{} E={:?} M={:?}]",
                    sign, self.exp, &self.mantissa[..]
                );
            }
        }
    }
}

impl Default for Arf {
    fn default() -> Self {
        Self::zero()
    }
}

/// Compare the magnitudes of two normal numbers with the same sign position:
/// exponents first, then the mantissas aligned at their top bit.
fn cmp_normal_magnitudes(a: &Arf, b: &Arf) -> Ordering {
    match a.exp.cmp(&b.exp) {
        Ordering::Equal => {}
        ord => return ord,
    }
    let la = a.bits();
    let lb = b.bits();
    // Align the shorter mantissa with the top of the longer one. The
    // mantissas are odd, so equal alignment means equal values, and a longer
    // mantissa with the same top bits has extra nonzero low bits.
    match la.cmp(&lb) {
        Ordering::Equal => a.mantissa.cmp(&b.mantissa),
        Ordering::Greater => {
            let mut bm = b.mantissa.clone();
            bm.shift_left(la - lb);
            match a.mantissa.cmp(&bm) {
                Ordering::Equal => Ordering::Greater,
                ord => ord,
            }
        }
        Ordering::Less => {
            let mut am = a.mantissa.clone();
            am.shift_left(lb - la);
            match am.cmp(&b.mantissa) {
                Ordering::Equal => Ordering::Less,
                ord => ord,
            }
        }
    }
}

/// The total order of the extended reals. NaN compared with NaN is Equal
/// (matching the structural equality), NaN compared with a number is
/// unordered.
impl PartialOrd for Arf {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let bool_to_ord = |ord: bool| -> Option<Ordering> {
            if ord {
                Some(Ordering::Less)
            } else {
                Some(Ordering::Greater)
            }
        };

        match (self.category, other.category) {
            (Category::NaN, Category::NaN) => Some(Ordering::Equal),
            (Category::NaN, _) | (_, Category::NaN) => None,
            (Category::Zero, Category::Zero) => Some(Ordering::Equal),
            (Category::Infinity, Category::Infinity) => {
                if self.sign == other.sign {
                    Some(Ordering::Equal)
                } else {
                    bool_to_ord(self.sign)
                }
            }
            (Category::Infinity, Category::Normal)
            | (Category::Infinity, Category::Zero)
            | (Category::Normal, Category::Zero) => bool_to_ord(self.sign),

            (Category::Normal, Category::Infinity)
            | (Category::Zero, Category::Infinity)
            | (Category::Zero, Category::Normal) => bool_to_ord(!other.sign),

            (Category::Normal, Category::Normal) => {
                if self.sign != other.sign {
                    return bool_to_ord(self.sign);
                }
                let ord = cmp_normal_magnitudes(self, other);
                if self.sign {
                    Some(ord.reverse())
                } else {
                    Some(ord)
                }
            }
        }
    }
}

#[cfg(feature = "std")]
#[test]
fn test_comparisons() {
    use super::utils;

    // Compare a bunch of special values, using the <,>,== operators and check
    // that they match the comparison on doubles.
    for first in utils::get_special_test_values() {
        for second in utils::get_special_test_values() {
            let a = Arf::from_f64(first);
            let b = Arf::from_f64(second);
            if first.is_nan() || second.is_nan() {
                // NaN is only ordered against NaN.
                let both = first.is_nan() && second.is_nan();
                assert_eq!(a.partial_cmp(&b).is_some(), both);
                continue;
            }
            assert_eq!(first < second, a < b, "<");
            assert_eq!(first == second, a == b, "==");
            assert_eq!(first > second, a > b, ">");
        }
    }
}

#[test]
fn test_cmp_random_values() {
    use crate::utils::Lfsr;
    let mut lfsr = Lfsr::new();
    let rm = RoundingMode::NearestTiesToEven;

    for i in 0..5000 {
        // Multi-word mantissas with exponents close enough that the
        // difference is cheap to compute exactly.
        let x = Arf::randtest(&mut lfsr, 300, 10);
        let y = if i % 8 == 0 {
            x.clone()
        } else {
            Arf::randtest(&mut lfsr, 300, 10)
        };
        let diff = x.sub(&y, PREC_EXACT, rm).0;
        let expected = diff.sgn().cmp(&0);

        assert_eq!(x.partial_cmp(&y), Some(expected));
        assert_eq!(y.partial_cmp(&x), Some(expected.reverse()));
        assert_eq!(x == y, expected == Ordering::Equal);
        let mag = x.abs().sub(&y.abs(), PREC_EXACT, rm).0;
        assert_eq!(x.cmp_abs(&y), Some(mag.sgn().cmp(&0)));
        if expected == Ordering::Less {
            assert_eq!(x.min(&y), x);
            assert_eq!(x.max(&y), y);
        }
    }
}

#[test]
fn test_cmp_mantissa_tie_break() {
    // 0b1011 * 2^-4 and 0b101 * 2^-3 share the top bits; the longer one has
    // an extra low bit and is larger.
    let a = Arf::from_parts(false, Exp::from(0), BigInt::from_u64(0b1011));
    let b = Arf::from_parts(false, Exp::from(0), BigInt::from_u64(0b101));
    assert_eq!(a.partial_cmp(&b), Some(Ordering::Greater));
    assert_eq!(b.partial_cmp(&a), Some(Ordering::Less));
    assert_eq!(a.neg().partial_cmp(&b.neg()), Some(Ordering::Less));

    // The same mantissa with trailing zeros is the same number.
    let c = Arf::from_parts(false, Exp::from(0), BigInt::from_u64(0b1010));
    assert_eq!(c, b);
    assert_eq!(c.bits(), 3);
}

#[test]
fn test_nan_convention() {
    let nan = Arf::nan();
    assert_eq!(nan.partial_cmp(&Arf::nan()), Some(Ordering::Equal));
    assert_eq!(nan, Arf::nan());
    assert_eq!(nan.partial_cmp(&Arf::one()), None);
    assert_eq!(Arf::one().partial_cmp(&nan), None);
    assert_eq!(nan.partial_cmp(&Arf::pos_inf()), None);
    assert_eq!(nan.cmp_abs(&Arf::zero()), None);
    assert_eq!(nan.sgn(), 0);
}

#[test]
fn test_one_imm() {
    let x = Arf::one();
    assert!(x.is_one());
    assert!(x.is_int());
    assert_eq!(x.bits(), 1);
    assert_eq!(x.get_exp(), &Exp::from(1));
    assert_eq!(x.low_exp(), Exp::from(0));
    assert_eq!(x.sgn(), 1);
    assert_eq!(x.neg().sgn(), -1);
}

#[test]
fn test_cmp_2exp() {
    let one = Arf::one();
    assert_eq!(one.cmp_2exp(&Exp::from(0)), Some(Ordering::Equal));
    assert_eq!(one.cmp_2exp(&Exp::from(1)), Some(Ordering::Less));
    assert_eq!(one.cmp_2exp(&Exp::from(-1)), Some(Ordering::Greater));
    let three = Arf::from_parts(false, Exp::from(2), BigInt::from_u64(3));
    assert_eq!(three.cmp_2exp(&Exp::from(1)), Some(Ordering::Greater));
    assert_eq!(three.neg().cmp_2exp(&Exp::from(2)), Some(Ordering::Less));
    assert_eq!(Arf::zero().cmp_2exp(&Exp::from(-100)), Some(Ordering::Less));
    assert_eq!(Arf::nan().cmp_2exp(&Exp::from(0)), None);
}

#[test]
fn test_floor_ceil() {
    fn check(v: f64) {
        let x = Arf::from_f64(v);
        assert_eq!(x.floor().to_f64(RoundingMode::Zero), v.floor(), "{}", v);
        assert_eq!(x.ceil().to_f64(RoundingMode::Zero), v.ceil(), "{}", v);
    }
    for v in [
        0.4, 1.4, 1.99, 2.0, -2.4, -0.5, 0.5, 0.75, -0.75, 1999999.5, 7.0,
        -1.0, 1e-30, -1e-30, 123456789.125, 4503599627370497.0,
    ] {
        check(v);
    }
    assert!(Arf::nan().floor().is_nan());
    assert!(Arf::neg_inf().ceil().is_neg_inf());
}

#[test]
fn test_set_round() {
    // 0b1011 at 2 bits.
    let x = Arf::from_parts(false, Exp::from(4), BigInt::from_u64(0b1011));
    let (r, ord) = x.set_round(2, RoundingMode::Zero);
    assert_eq!(r, Arf::from_parts(false, Exp::from(4), BigInt::from_u64(0b10)));
    assert_eq!(ord, Ordering::Less);
    let (r, ord) = x.set_round(2, RoundingMode::Away);
    assert_eq!(r, Arf::from_parts(false, Exp::from(4), BigInt::from_u64(0b11)));
    assert_eq!(ord, Ordering::Greater);
    let (r, ord) = x.set_round(PREC_EXACT, RoundingMode::Away);
    assert_eq!(r, x);
    assert_eq!(ord, Ordering::Equal);
    // Rounding up can carry into a new exponent.
    let y = Arf::from_parts(false, Exp::from(0), BigInt::from_u64(0b111));
    let (r, _) = y.set_round(2, RoundingMode::NearestTiesToEven);
    assert!(r.is_one());
    assert_eq!(y.ulp(2), Arf::from_parts(false, Exp::from(-1), BigInt::one()));
}

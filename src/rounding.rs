//! The rounding policy shared by every `Arf` operation: the rounding modes,
//! the description of the bits that are lost by truncation, and the single
//! procedure that rounds an exact integer mantissa to a target precision.

use super::bigint::BigInt;
use core::cmp::Ordering;

/// Defines the supported rounding modes. They only apply to finite nonzero
/// results; special values are never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round toward zero (down in magnitude).
    Zero,
    /// Round away from zero (up in magnitude).
    Away,
    /// Round toward negative infinity (floor).
    Negative,
    /// Round toward positive infinity (ceiling).
    Positive,
    /// Round to the nearest value, ties go to the even mantissa.
    NearestTiesToEven,
}

impl RoundingMode {
    /// All of the rounding modes, for iterating in tests and benchmarks.
    pub const ALL: [RoundingMode; 5] = [
        RoundingMode::Zero,
        RoundingMode::Away,
        RoundingMode::Negative,
        RoundingMode::Positive,
        RoundingMode::NearestTiesToEven,
    ];

    /// Parse the rounding mode from its name.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "Zero" => Some(RoundingMode::Zero),
            "Away" => Some(RoundingMode::Away),
            "Negative" => Some(RoundingMode::Negative),
            "Positive" => Some(RoundingMode::Positive),
            "NearestTiesToEven" => Some(RoundingMode::NearestTiesToEven),
            _ => None,
        }
    }

    /// Returns the name of the rounding mode.
    pub fn as_string(&self) -> &'static str {
        match self {
            RoundingMode::Zero => "Zero",
            RoundingMode::Away => "Away",
            RoundingMode::Negative => "Negative",
            RoundingMode::Positive => "Positive",
            RoundingMode::NearestTiesToEven => "NearestTiesToEven",
        }
    }

    /// Returns true if a value with the sign `sign` (true means negative) is
    /// rounded toward zero by this mode, when the mode is directed.
    pub fn is_toward_zero(&self, sign: bool) -> bool {
        match self {
            RoundingMode::Zero => true,
            RoundingMode::Away => false,
            RoundingMode::Negative => !sign,
            RoundingMode::Positive => sign,
            RoundingMode::NearestTiesToEven => false,
        }
    }
}

/// Reports the kind of values that are lost when we shift right bits. In some
/// context this used as the two guard bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LossFraction {
    ExactlyZero,  //0000000
    LessThanHalf, //0xxxxxx
    ExactlyHalf,  //1000000
    MoreThanHalf, //1xxxxxx
}

impl LossFraction {
    pub fn is_exactly_zero(&self) -> bool {
        matches!(self, Self::ExactlyZero)
    }
    pub fn is_lt_half(&self) -> bool {
        matches!(self, Self::LessThanHalf) || self.is_exactly_zero()
    }
    pub fn is_exactly_half(&self) -> bool {
        matches!(self, Self::ExactlyHalf)
    }
    pub fn is_mt_half(&self) -> bool {
        matches!(self, Self::MoreThanHalf)
    }

    /// Describe the fraction `rem / div` (with rem < div).
    pub fn from_ratio(rem: &BigInt, div: &BigInt) -> Self {
        if rem.is_zero() {
            return LossFraction::ExactlyZero;
        }
        let mut rem_2x = rem.clone();
        rem_2x.shift_left(1);
        match rem_2x.cmp(div) {
            Ordering::Less => LossFraction::LessThanHalf,
            Ordering::Equal => LossFraction::ExactlyHalf,
            Ordering::Greater => LossFraction::MoreThanHalf,
        }
    }
}

/// Shift `val` by `bits`, and report the loss.
pub(crate) fn shift_right_with_loss(
    val: &BigInt,
    bits: usize,
) -> (BigInt, LossFraction) {
    if bits == 0 {
        return (val.clone(), LossFraction::ExactlyZero);
    }
    let mut val = val.clone();
    let loss = val.get_loss_kind_for_bit(bits);
    val.shift_right(bits);
    (val, loss)
}

/// Combine the loss of accuracy with `msb` more significant and `lsb`
/// less significant.
pub(crate) fn combine_loss_fraction(
    msb: LossFraction,
    lsb: LossFraction,
) -> LossFraction {
    if !lsb.is_exactly_zero() {
        if msb.is_exactly_zero() {
            return LossFraction::LessThanHalf;
        } else if msb.is_exactly_half() {
            return LossFraction::MoreThanHalf;
        }
    }
    msb
}

/// Returns true if we need to round away from zero (increment the mantissa).
/// The value is `mantissa + loss` units; `sign` is true for negative values.
pub(crate) fn need_round_away_from_zero(
    rm: RoundingMode,
    sign: bool,
    loss: LossFraction,
    mantissa_is_odd: bool,
) -> bool {
    if loss.is_exactly_zero() {
        return false;
    }
    match rm {
        RoundingMode::Positive => !sign,
        RoundingMode::Negative => sign,
        RoundingMode::Zero => false,
        RoundingMode::Away => true,
        RoundingMode::NearestTiesToEven => {
            if loss.is_mt_half() {
                return true;
            }
            loss.is_exactly_half() && mantissa_is_odd
        }
    }
}

/// The result of rounding a mantissa.
#[derive(Debug, Clone)]
pub(crate) struct Rounded {
    /// The rounded mantissa, with at most `prec` bits.
    pub mantissa: BigInt,
    /// How many bits the exact mantissa was shifted to the right. The value
    /// of the result is `mantissa * 2^shift` units of the input.
    pub shift: usize,
    /// The rounding indicator: Greater if the magnitude was rounded up, Less
    /// if it was rounded down, Equal if the result is exact.
    pub ord: Ordering,
}

/// Round the exact magnitude `mantissa + loss` (where `loss` describes a
/// fraction of one unit below the lowest bit of `mantissa`) to at most `prec`
/// bits, following `rm` for a value of sign `sign`.
///
/// The incoming loss is only meaningful if `mantissa` has at least `prec`
/// bits, because otherwise the rounding position would fall below bit zero.
pub(crate) fn round_mantissa(
    sign: bool,
    mantissa: &BigInt,
    loss: LossFraction,
    prec: u64,
    rm: RoundingMode,
) -> Rounded {
    debug_assert!(prec > 0, "precision must be positive");
    let bits = mantissa.msb_index() as u64;
    debug_assert!(loss.is_exactly_zero() || bits >= prec);

    // Step I - truncate to the precision, and collect the lost bits.
    let shift = bits.saturating_sub(prec) as usize;
    let (mut m, loss) = if shift > 0 {
        let (m, loss2) = shift_right_with_loss(mantissa, shift);
        (m, combine_loss_fraction(loss2, loss))
    } else {
        (mantissa.clone(), loss)
    };

    if loss.is_exactly_zero() {
        return Rounded {
            mantissa: m,
            shift,
            ord: Ordering::Equal,
        };
    }

    // Step II - round the number.
    if !need_round_away_from_zero(rm, sign, loss, m.is_odd()) {
        return Rounded {
            mantissa: m,
            shift,
            ord: Ordering::Less,
        };
    }

    m.inplace_add(&BigInt::one());
    let mut shift = shift;
    // Did the mantissa overflow into a new bit? Then it is a power of two and
    // the shift is exact.
    if m.msb_index() as u64 > prec {
        m.shift_right(1);
        shift += 1;
    }
    Rounded {
        mantissa: m,
        shift,
        ord: Ordering::Greater,
    }
}

#[test]
fn test_round_mantissa_modes() {
    use RoundingMode::*;
    // 0b10110 rounded to 3 bits: 0b101|10 -> half, the kept part is odd.
    let m = BigInt::from_u64(0b10110);
    let none = LossFraction::ExactlyZero;

    let r = round_mantissa(false, &m, none, 3, NearestTiesToEven);
    assert_eq!(r.mantissa.as_u64(), 0b110);
    assert_eq!(r.shift, 2);
    assert_eq!(r.ord, Ordering::Greater);

    let r = round_mantissa(false, &m, none, 3, Zero);
    assert_eq!(r.mantissa.as_u64(), 0b101);
    assert_eq!(r.ord, Ordering::Less);

    let r = round_mantissa(true, &m, none, 3, Negative);
    assert_eq!(r.mantissa.as_u64(), 0b110);
    assert_eq!(r.ord, Ordering::Greater);

    let r = round_mantissa(true, &m, none, 3, Positive);
    assert_eq!(r.mantissa.as_u64(), 0b101);
    assert_eq!(r.ord, Ordering::Less);

    // A tie with an even kept part stays.
    let m = BigInt::from_u64(0b10010);
    let r = round_mantissa(false, &m, none, 3, NearestTiesToEven);
    assert_eq!(r.mantissa.as_u64(), 0b100);
    assert_eq!(r.ord, Ordering::Less);

    // A sticky bit below the tie breaks it upward.
    let loss = LossFraction::LessThanHalf;
    let r = round_mantissa(false, &m, loss, 3, NearestTiesToEven);
    assert_eq!(r.mantissa.as_u64(), 0b101);
    assert_eq!(r.ord, Ordering::Greater);

    // Exact values are not touched.
    let m = BigInt::from_u64(0b101);
    let r = round_mantissa(false, &m, none, 3, Away);
    assert_eq!(r.mantissa.as_u64(), 0b101);
    assert_eq!(r.shift, 0);
    assert_eq!(r.ord, Ordering::Equal);
}

#[test]
fn test_round_mantissa_carry() {
    // 0b1111|1 rounded up to 4 bits carries into a fifth bit.
    let m = BigInt::from_u64(0b11111);
    let r = round_mantissa(
        false,
        &m,
        LossFraction::ExactlyZero,
        4,
        RoundingMode::Away,
    );
    assert_eq!(r.mantissa.as_u64(), 0b1000);
    assert_eq!(r.shift, 2);
    assert_eq!(r.ord, Ordering::Greater);

    // The incoming fraction rounds a value that already fits.
    let m = BigInt::from_u64(0b1111);
    let r = round_mantissa(
        false,
        &m,
        LossFraction::MoreThanHalf,
        4,
        RoundingMode::NearestTiesToEven,
    );
    assert_eq!(r.mantissa.as_u64(), 0b1000);
    assert_eq!(r.shift, 1);
}

#[test]
fn test_combine_loss() {
    use LossFraction::*;
    assert_eq!(combine_loss_fraction(ExactlyZero, LessThanHalf), LessThanHalf);
    assert_eq!(combine_loss_fraction(ExactlyHalf, LessThanHalf), MoreThanHalf);
    assert_eq!(combine_loss_fraction(ExactlyHalf, ExactlyZero), ExactlyHalf);
    assert_eq!(combine_loss_fraction(MoreThanHalf, MoreThanHalf), MoreThanHalf);
    assert_eq!(
        LossFraction::from_ratio(&BigInt::from_u64(3), &BigInt::from_u64(6)),
        ExactlyHalf
    );
    assert_eq!(
        LossFraction::from_ratio(&BigInt::from_u64(2), &BigInt::from_u64(6)),
        LessThanHalf
    );
}

#[test]
fn test_mode_names() {
    for rm in RoundingMode::ALL {
        assert_eq!(RoundingMode::from_string(rm.as_string()), Some(rm));
    }
    assert_eq!(RoundingMode::from_string("Nearest"), None);
}

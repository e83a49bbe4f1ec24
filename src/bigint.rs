//! This module contains the unsigned big-int that stores the mantissa of `Arf`
//! values and the magnitude of promoted exponents.

extern crate alloc;

use core::cmp::Ordering;
use core::ops::{
    Add, AddAssign, Deref, Div, DivAssign, Mul, MulAssign, Sub, SubAssign,
};

use alloc::vec::Vec;

use crate::rounding::LossFraction;

/// An arbitrary-size unsigned integer backed by `Vec<u64>` (least significant
/// word first). It implements the exact integer operations that the float
/// kernel needs: add, sub, mul (Karatsuba for large inputs), long division,
/// shifts and integer square root.
///
/// # Examples
///
/// ```
///    use arfloat::BigInt;
///
///    let x = BigInt::from_u64(1995);
///    let y = BigInt::from_u64(90210);
///
///    let z = x * y;
///    assert_eq!(z.try_as_u64(), Some(179968950));
///    assert_eq!(z.isqrt().try_as_u64(), Some(13415));
/// ```
#[derive(Debug, Clone)]
pub struct BigInt {
    parts: Vec<u64>,
}

impl BigInt {
    /// Create a new zero big int number.
    pub fn zero() -> Self {
        BigInt::from_u64(0)
    }

    /// Create a new number with the value 1.
    pub fn one() -> Self {
        Self::from_u64(1)
    }

    /// Create a new number with a single '1' set at bit `bit`.
    pub fn one_hot(bit: usize) -> Self {
        let mut x = Self::zero();
        x.flip_bit(bit);
        x
    }

    /// Create a new number, where the first `bits` bits are set to 1.
    pub fn all1s(bits: usize) -> Self {
        if bits == 0 {
            return Self::zero();
        }
        let mut x = Self::one();
        x.shift_left(bits);
        let _ = x.inplace_sub(&Self::one());
        debug_assert_eq!(x.msb_index(), bits);
        x
    }

    /// Create a number and set the lowest 64 bits to `val`.
    pub fn from_u64(val: u64) -> Self {
        BigInt {
            parts: Vec::from([val]),
        }
    }

    /// Create a number and set the lowest 128 bits to `val`.
    pub fn from_u128(val: u128) -> Self {
        let a = val as u64;
        let b = (val >> 64) as u64;
        BigInt {
            parts: Vec::from([a, b]),
        }
    }

    /// Create a pseudorandom number with `parts` number of parts in the word.
    /// The random number generator is initialized with `seed`.
    pub fn pseudorandom(parts: usize, seed: u32) -> Self {
        use crate::utils::Lfsr;
        let mut ll = Lfsr::new_with_seed(seed);

        BigInt::from_iter(&mut ll, parts)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the value as a u64, or None if it does not fit.
    pub fn try_as_u64(&self) -> Option<u64> {
        if self.parts[1..].iter().any(|&x| x != 0) {
            return None;
        }
        Some(self.parts[0])
    }

    /// Returns the value as a u128, or None if it does not fit.
    pub fn try_as_u128(&self) -> Option<u128> {
        if self.len() > 2 && self.parts[2..].iter().any(|&x| x != 0) {
            return None;
        }
        let hi = if self.len() >= 2 { self.parts[1] } else { 0 };
        Some((self.parts[0] as u128) + ((hi as u128) << 64))
    }

    /// Returns the lowest 64 bits.
    pub fn as_u64(&self) -> u64 {
        debug_assert!(self.try_as_u64().is_some(), "value does not fit");
        self.parts[0]
    }

    /// Returns the top 64 bits of the number, aligned so that the msb of the
    /// number is the msb of the word, and a flag that reports whether any
    /// lower bits were dropped.
    pub fn top_u64(&self) -> (u64, bool) {
        let bits = self.msb_index();
        if bits <= 64 {
            return (self.parts[0] << (64 - bits as u32) % 64, false);
        }
        let shift = bits - 64;
        let mut top = self.clone();
        top.shift_right(shift);
        let inexact = self.trailing_zeros() < shift;
        (top.parts[0], inexact)
    }

    /// Return true if the number is equal to zero.
    pub fn is_zero(&self) -> bool {
        self.parts.iter().all(|&elem| elem == 0)
    }

    /// Returns true if this number is even.
    pub fn is_even(&self) -> bool {
        (self.parts[0] & 0x1) == 0
    }

    /// Returns true if this number is odd.
    pub fn is_odd(&self) -> bool {
        (self.parts[0] & 0x1) == 1
    }

    /// Returns true if the bit at index `bit_num` is set.
    pub fn is_bit_set(&self, bit_num: usize) -> bool {
        let which_word = bit_num / u64::BITS as usize;
        let bit_in_word = bit_num % u64::BITS as usize;
        if which_word >= self.len() {
            return false;
        }
        (self.parts[which_word] >> bit_in_word) & 1 == 1
    }

    /// Flip the `bit_num` bit.
    pub fn flip_bit(&mut self, bit_num: usize) {
        let which_word = bit_num / u64::BITS as usize;
        let bit_in_word = bit_num % u64::BITS as usize;
        self.grow(which_word + 1);
        self.parts[which_word] ^= 1 << bit_in_word;
    }

    /// Zero out all of the bits above `bits`.
    pub fn mask(&mut self, bits: usize) {
        let mut bits = bits;
        for i in 0..self.len() {
            if bits >= 64 {
                bits -= 64;
                continue;
            }

            if bits == 0 {
                self.parts[i] = 0;
                continue;
            }

            let mask = (1u64 << bits) - 1;
            self.parts[i] &= mask;
            bits = 0;
        }
    }

    /// Returns the fraction that is lost when the number is truncated at
    /// `bit` (bit > 0), relative to one unit at position `bit`.
    pub(crate) fn get_loss_kind_for_bit(&self, bit: usize) -> LossFraction {
        debug_assert!(bit > 0);
        if self.is_zero() {
            return LossFraction::ExactlyZero;
        }
        if bit > self.len() * 64 {
            return LossFraction::LessThanHalf;
        }
        let mut a = self.clone();
        a.mask(bit);
        if a.is_zero() {
            return LossFraction::ExactlyZero;
        }
        let half = Self::one_hot(bit - 1);
        match a.cmp(&half) {
            Ordering::Less => LossFraction::LessThanHalf,
            Ordering::Equal => LossFraction::ExactlyHalf,
            Ordering::Greater => LossFraction::MoreThanHalf,
        }
    }

    /// Returns the index of the most significant bit (the highest '1'),
    /// using 1-based counting (the first bit is 1, and zero means no bits are
    /// set). This is the bit length of the number.
    pub fn msb_index(&self) -> usize {
        for i in (0..self.len()).rev() {
            let part = self.parts[i];
            if part != 0 {
                let idx = 64 - part.leading_zeros() as usize;
                return i * 64 + idx;
            }
        }
        0
    }

    /// Returns the index of the first '1' in the number. The number must not
    ///  be a zero.
    pub fn trailing_zeros(&self) -> usize {
        debug_assert!(!self.is_zero());
        for i in 0..self.len() {
            let part = self.parts[i];
            if part != 0 {
                let idx = part.trailing_zeros() as usize;
                return i * 64 + idx;
            }
        }
        0
    }

    /// Shift out the trailing zero bits and return how many were removed.
    pub fn strip_trailing_zeros(&mut self) -> usize {
        if self.is_zero() {
            return 0;
        }
        let tz = self.trailing_zeros();
        if tz > 0 {
            self.shift_right(tz);
        }
        tz
    }

    // Construct a bigint from the words in 'parts'.
    pub fn from_parts(parts: &[u64]) -> Self {
        if parts.is_empty() {
            return Self::zero();
        }
        BigInt {
            parts: parts.to_vec(),
        }
    }

    // Construct a bigint from an iterator that generates u64 parts.
    // Take the first 'k' words.
    pub fn from_iter<I: Iterator<Item = u64>>(iter: &mut I, k: usize) -> Self {
        let parts: Vec<u64> = iter.take(k).collect();
        Self::from_parts(&parts)
    }

    /// Ensure that there are at least 'size' words in the bigint.
    pub fn grow(&mut self, size: usize) {
        if self.len() < size {
            self.parts.resize(size, 0);
        }
    }

    /// Remove the leading zero words from the bigint.
    fn shrink(&mut self) {
        while self.len() > 2 && self.parts[self.len() - 1] == 0 {
            self.parts.pop();
        }
    }

    /// Add `rhs` to this number.
    pub fn inplace_add(&mut self, rhs: &Self) {
        self.inplace_add_slice(&rhs.parts[..]);
    }

    /// Implements addition of the 'rhs' sequence of words to this number.
    #[allow(clippy::needless_range_loop)]
    pub(crate) fn inplace_add_slice(&mut self, rhs: &[u64]) {
        self.grow(rhs.len());
        let mut carry: bool = false;
        for i in 0..rhs.len() {
            let first = self.parts[i].overflowing_add(rhs[i]);
            let second = first.0.overflowing_add(carry as u64);
            carry = first.1 || second.1;
            self.parts[i] = second.0;
        }
        // Continue to propagate the carry flag.
        for i in rhs.len()..self.len() {
            let second = self.parts[i].overflowing_add(carry as u64);
            carry = second.1;
            self.parts[i] = second.0;
        }
        if carry {
            self.parts.push(1);
        }
        self.shrink()
    }

    /// Subtract `rhs` from self, and return true if the operation
    /// overflowed (borrow).
    #[must_use]
    pub fn inplace_sub(&mut self, rhs: &Self) -> bool {
        self.inplace_sub_slice(&rhs.parts[..], 0)
    }

    /// Implements subtraction of the 'rhs' sequence of words to this number.
    /// The parameter `bottom_zeros` specifies how many lower *words* in `rhs`
    /// are zeros and can be ignored. This is used by the division algorithm
    /// that shifts the divisor.
    #[allow(clippy::needless_range_loop)]
    fn inplace_sub_slice(&mut self, rhs: &[u64], bottom_zeros: usize) -> bool {
        self.grow(rhs.len());
        let mut borrow: bool = false;

        for i in bottom_zeros..rhs.len() {
            let first = self.parts[i].overflowing_sub(rhs[i]);
            let second = first.0.overflowing_sub(borrow as u64);
            borrow = first.1 || second.1;
            self.parts[i] = second.0;
        }
        // Propagate the borrow bit.
        for i in rhs.len()..self.len() {
            let second = self.parts[i].overflowing_sub(borrow as u64);
            self.parts[i] = second.0;
            borrow = second.1;
        }
        self.shrink();
        borrow
    }

    /// Returns |self - rhs| and true if rhs was larger than self.
    pub fn abs_diff(&self, rhs: &Self) -> (Self, bool) {
        if *self < *rhs {
            let mut res = rhs.clone();
            let borrow = res.inplace_sub(self);
            debug_assert!(!borrow);
            (res, true)
        } else {
            let mut res = self.clone();
            let borrow = res.inplace_sub(rhs);
            debug_assert!(!borrow);
            (res, false)
        }
    }

    fn zeros(size: usize) -> Vec<u64> {
        core::iter::repeat(0).take(size).collect()
    }

    /// Multiply `rhs` into self.
    pub fn inplace_mul(&mut self, rhs: &Self) {
        if self.len() > KARATSUBA_SIZE_THRESHOLD
            || rhs.len() > KARATSUBA_SIZE_THRESHOLD
        {
            *self = Self::mul_karatsuba(self, rhs);
            return;
        }
        self.inplace_mul_slice(rhs);
    }

    /// Implements multiplication of the 'rhs' sequence of words to this number.
    fn inplace_mul_slice(&mut self, rhs: &[u64]) {
        let size = self.len() + rhs.len() + 1;
        let mut parts = Self::zeros(size);
        let mut carries = Self::zeros(size);

        for i in 0..self.len() {
            for j in 0..rhs.len() {
                let pi = self.parts[i] as u128;
                let pij = pi * rhs[j] as u128;

                let add0 = parts[i + j].overflowing_add(pij as u64);
                parts[i + j] = add0.0;
                carries[i + j] += add0.1 as u64;
                let add1 = parts[i + j + 1].overflowing_add((pij >> 64) as u64);
                parts[i + j + 1] = add1.0;
                carries[i + j + 1] += add1.1 as u64;
            }
        }
        self.grow(size);
        let mut carry: u64 = 0;
        for i in 0..size {
            let add0 = parts[i].overflowing_add(carry);
            self.parts[i] = add0.0;
            carry = add0.1 as u64 + carries[i];
        }
        self.shrink();
        debug_assert!(carry == 0);
    }

    /// Divide self by `divisor`, and return the remainder. The divisor must
    /// not be zero.
    pub fn inplace_div(&mut self, divisor: &Self) -> Self {
        debug_assert!(!divisor.is_zero(), "division by zero");
        let mut dividend = self.clone();
        let mut divisor = divisor.clone();
        let mut quotient = Self::zero();

        // Single word division.
        let words = (dividend.try_as_u64(), divisor.try_as_u64());
        if let (Some(a), Some(b)) = words {
            *self = Self::from_u64(a / b);
            return Self::from_u64(a % b);
        }

        let dividend_msb = dividend.msb_index();
        let divisor_msb = divisor.msb_index();

        if divisor_msb > dividend_msb {
            let ret = self.clone();
            *self = Self::zero();
            return ret;
        }

        // Align the first bit of the divisor with the first bit of the
        // dividend.
        let bits = dividend_msb - divisor_msb;
        divisor.shift_left(bits);

        // Perform the long division.
        for i in (0..bits + 1).rev() {
            // Find out how many of the lower words of the divisor are zeros.
            let low_zeros = i / 64;

            if dividend >= divisor {
                let overflow = dividend.inplace_sub_slice(&divisor, low_zeros);
                debug_assert!(!overflow);
                quotient.flip_bit(i);
            }
            divisor.shift_right(1);
        }

        *self = quotient;
        self.shrink();
        dividend
    }

    /// Returns the integer square root (the floor of the square root) of
    /// this number.
    pub fn isqrt(&self) -> Self {
        if let Some(v) = self.try_as_u128() {
            return Self::from_u128(isqrt_u128(v));
        }
        // Newton iteration, starting above the root.
        let mut x = Self::one_hot(self.msb_index().div_ceil(2));
        loop {
            let mut y = self.clone();
            let _ = y.inplace_div(&x);
            y.inplace_add(&x);
            y.shift_right(1);
            if y >= x {
                return x;
            }
            x = y;
        }
    }

    /// Shift the bits in the numbers `bits` to the left.
    pub fn shift_left(&mut self, bits: usize) {
        let words_to_shift = bits / u64::BITS as usize;
        let bits_in_word = bits % u64::BITS as usize;

        self.grow(self.len() + words_to_shift + 1);

        // If we only need to move blocks.
        if bits_in_word == 0 {
            for i in (0..self.len()).rev() {
                self.parts[i] = if i >= words_to_shift {
                    self.parts[i - words_to_shift]
                } else {
                    0
                };
            }
            self.shrink();
            return;
        }

        for i in (0..self.len()).rev() {
            let left_val = if i >= words_to_shift {
                self.parts[i - words_to_shift]
            } else {
                0
            };
            let right_val = if i > words_to_shift {
                self.parts[i - words_to_shift - 1]
            } else {
                0
            };
            let right = right_val >> (u64::BITS as usize - bits_in_word);
            let left = left_val << bits_in_word;
            self.parts[i] = left | right;
        }
        self.shrink();
    }

    /// Shift the bits in the numbers `bits` to the right.
    pub fn shift_right(&mut self, bits: usize) {
        let words_to_shift = bits / u64::BITS as usize;
        let bits_in_word = bits % u64::BITS as usize;

        // If we only need to move blocks.
        if bits_in_word == 0 {
            for i in 0..self.len() {
                self.parts[i] = if i + words_to_shift < self.len() {
                    self.parts[i + words_to_shift]
                } else {
                    0
                };
            }
            self.shrink();
            return;
        }

        for i in 0..self.len() {
            let left_val = if i + words_to_shift < self.len() {
                self.parts[i + words_to_shift]
            } else {
                0
            };
            let right_val = if i + 1 + words_to_shift < self.len() {
                self.parts[i + 1 + words_to_shift]
            } else {
                0
            };
            let right = right_val << (u64::BITS as usize - bits_in_word);
            let left = left_val >> bits_in_word;
            self.parts[i] = left | right;
        }
        self.shrink();
    }

    /// Returns the word at idx `idx`.
    pub fn get_part(&self, idx: usize) -> u64 {
        self.parts[idx]
    }
}

/// Returns the floor of the square root of `v`.
pub(crate) fn isqrt_u128(v: u128) -> u128 {
    if v < 2 {
        return v;
    }
    // Start from a power of two above the root and walk down with Newton.
    let bits = 128 - v.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + v / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

impl Default for BigInt {
    fn default() -> Self {
        Self::zero()
    }
}

#[test]
fn test_shl() {
    let mut x = BigInt::from_u64(0xff00ff);
    assert_eq!(x.get_part(0), 0xff00ff);
    x.shift_left(17);
    assert_eq!(x.get_part(0), 0x1fe01fe0000);
    x.shift_left(17);
    assert_eq!(x.get_part(0), 0x3fc03fc00000000);
    x.shift_left(64);
    assert_eq!(x.get_part(1), 0x3fc03fc00000000);
}

#[test]
fn test_shr() {
    let mut x = BigInt::from_u64(0xff00ff);
    x.shift_left(128);
    assert_eq!(x.get_part(2), 0xff00ff);
    x.shift_right(17);
    assert_eq!(x.get_part(1), 0x807f800000000000);
    x.shift_right(17);
    assert_eq!(x.get_part(1), 0x03fc03fc0000000);
    x.shift_right(64);
    assert_eq!(x.get_part(0), 0x03fc03fc0000000);
}

#[test]
fn test_mul_basic() {
    let mut x = BigInt::from_u64(0xffff_ffff_ffff_ffff);
    let y = BigInt::from_u64(25);
    x.inplace_mul(&x.clone());
    x.inplace_mul(&y);
    assert_eq!(x.get_part(0), 0x19);
    assert_eq!(x.get_part(1), 0xffff_ffff_ffff_ffce);
    assert_eq!(x.get_part(2), 0x18);
}

#[test]
fn test_div_basic() {
    let mut x1 = BigInt::from_u64(49);
    let mut x2 = BigInt::from_u64(703);
    let y = BigInt::from_u64(7);

    let rem = x1.inplace_div(&y);
    assert_eq!(x1.as_u64(), 7);
    assert_eq!(rem.as_u64(), 0);

    let rem = x2.inplace_div(&y);
    assert_eq!(x2.as_u64(), 100);
    assert_eq!(rem.as_u64(), 3);

    // Multi-word division with a remainder.
    let mut x3 = BigInt::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788);
    let y3 = BigInt::from_u128(0x1_0000_0000_0000_0003);
    let expected = 0x1234_5678_9abc_def0_1122_3344_5566_7788u128;
    let divisor = 0x1_0000_0000_0000_0003u128;
    let rem = x3.inplace_div(&y3);
    assert_eq!(x3.try_as_u128(), Some(expected / divisor));
    assert_eq!(rem.try_as_u128(), Some(expected % divisor));
}

#[test]
fn test_isqrt() {
    for i in 0..2000u64 {
        let sq = BigInt::from_u64(i * i);
        assert_eq!(sq.isqrt().as_u64(), i);
        let sq1 = BigInt::from_u64(i * i + 2 * i);
        assert_eq!(sq1.isqrt().as_u64(), i);
    }

    // A multi-word perfect square, and its neighbours.
    let mut root = BigInt::pseudorandom(3, 7);
    root.flip_bit(200);
    let square = &root * &root;
    assert_eq!(square.isqrt(), root);
    let mut below = square.clone();
    let _ = below.inplace_sub(&BigInt::one());
    let mut root_m1 = root.clone();
    let _ = root_m1.inplace_sub(&BigInt::one());
    assert_eq!(below.isqrt(), root_m1);
    let above = square + 1;
    assert_eq!(above.isqrt(), root);
}

#[test]
fn test_top_u64() {
    let x = BigInt::from_u64(0b1011);
    assert_eq!(x.top_u64(), (0b1011 << 60, false));

    let mut y = BigInt::from_u64(0xffff_0000_0000_0001);
    y.shift_left(70);
    assert_eq!(y.top_u64(), (0xffff_0000_0000_0001, false));
    let y = y + 1;
    assert_eq!(y.top_u64(), (0xffff_0000_0000_0001, true));
}

#[test]
fn test_strip_trailing_zeros() {
    let mut x = BigInt::from_u64(0b1011000);
    assert_eq!(x.strip_trailing_zeros(), 3);
    assert_eq!(x.as_u64(), 0b1011);
    let mut y = BigInt::one_hot(130);
    assert_eq!(y.strip_trailing_zeros(), 130);
    assert_eq!(y.as_u64(), 1);
    assert!(y.is_bit_set(0));
    assert!(!y.is_bit_set(1));
    assert!(!y.is_bit_set(500));
}

#[allow(dead_code)]
fn test_with_random_values(
    correct: fn(u128, u128) -> (u128, bool),
    test: fn(u128, u128) -> (u128, bool),
) {
    use super::utils::Lfsr;

    // Test addition, multiplication, subtraction with random values.
    let mut lfsr = Lfsr::new();

    for _ in 0..50000 {
        let v0 = lfsr.get64();
        let v1 = lfsr.get64();
        let v2 = lfsr.get64();
        let v3 = lfsr.get64();

        let n1 = (v0 as u128) + ((v1 as u128) << 64);
        let n2 = (v2 as u128) + ((v3 as u128) << 64);

        let v1 = correct(n1, n2);
        let v2 = test(n1, n2);
        assert_eq!(v1.0, v2.0, "Incorrect value");
        assert_eq!(v1.1, v2.1, "Incorrect carry");
    }
}

#[test]
fn test_sub_basic() {
    // Check a single overflowing sub operation.
    let mut x = BigInt::from_parts(&[0x0, 0x1, 0]);
    let y = BigInt::from_u64(0x1);
    let c1 = x.inplace_sub(&y);
    assert!(!c1);
    assert_eq!(x.get_part(0), 0xffffffffffffffff);
    assert_eq!(x.get_part(1), 0);

    let mut x = BigInt::from_parts(&[0x1, 0x1, 0x1]);
    let y = BigInt::from_parts(&[0x0, 0x1, 0x0]);
    let c1 = x.inplace_sub(&y);
    assert!(!c1);
    assert_eq!(x.get_part(0), 0x1);
    assert_eq!(x.get_part(1), 0);
    assert_eq!(x.get_part(2), 0x1);

    let (d, swapped) = BigInt::from_u64(5).abs_diff(&BigInt::from_u64(9));
    assert_eq!(d.as_u64(), 4);
    assert!(swapped);
}

#[test]
fn test_basic_operations() {
    // Check Add, Mul, Sub, Div in comparison to native u128.
    fn correct_sub(a: u128, b: u128) -> (u128, bool) {
        a.overflowing_sub(b)
    }
    fn correct_add(a: u128, b: u128) -> (u128, bool) {
        a.overflowing_add(b)
    }
    fn correct_mul(a: u128, b: u128) -> (u128, bool) {
        a.overflowing_mul(b)
    }
    fn correct_div(a: u128, b: u128) -> (u128, bool) {
        a.overflowing_div(b)
    }

    fn truncate(mut a: BigInt) -> (u128, bool) {
        let carry = a.len() > 2 && a.parts[2..].iter().any(|&x| x != 0);
        a.mask(128);
        (a.try_as_u128().unwrap_or(0), carry)
    }
    fn test_sub(a: u128, b: u128) -> (u128, bool) {
        let mut a = BigInt::from_u128(a);
        let b = BigInt::from_u128(b);
        let c = a.inplace_sub(&b);
        (truncate(a).0, c)
    }
    fn test_add(a: u128, b: u128) -> (u128, bool) {
        let mut a = BigInt::from_u128(a);
        let b = BigInt::from_u128(b);
        a.inplace_add(&b);
        truncate(a)
    }
    fn test_mul(a: u128, b: u128) -> (u128, bool) {
        let mut a = BigInt::from_u128(a);
        let b = BigInt::from_u128(b);
        a.inplace_mul(&b);
        truncate(a)
    }
    fn test_div(a: u128, b: u128) -> (u128, bool) {
        let mut a = BigInt::from_u128(a);
        let b = BigInt::from_u128(b);
        a.inplace_div(&b);
        (a.try_as_u128().unwrap_or(0), false)
    }

    test_with_random_values(correct_mul, test_mul);
    test_with_random_values(correct_div, test_div);
    test_with_random_values(correct_add, test_add);
    test_with_random_values(correct_sub, test_sub);
}

#[test]
fn test_msb() {
    let x = BigInt::from_u64(0xffffffff00000000);
    assert_eq!(x.msb_index(), 64);

    let x = BigInt::from_u64(0x0);
    assert_eq!(x.msb_index(), 0);

    let x = BigInt::from_u64(0x1);
    assert_eq!(x.msb_index(), 1);

    for i in 0..256 {
        let mut x = BigInt::from_u64(0x1);
        x.shift_left(i);
        assert_eq!(x.msb_index(), i + 1);
        assert_eq!(x.trailing_zeros(), i);
    }
}

#[test]
fn test_loss_kind() {
    let x = BigInt::from_u64(0b10000000);
    assert!(x.get_loss_kind_for_bit(3).is_exactly_zero());
    let x = BigInt::from_u64(0b10000111);
    assert!(x.get_loss_kind_for_bit(3).is_mt_half());
    let x = BigInt::from_u64(0b10000100);
    assert!(x.get_loss_kind_for_bit(3).is_exactly_half());
    let x = BigInt::from_u64(0b10000001);
    assert!(x.get_loss_kind_for_bit(3).is_lt_half());
    // Truncating above the number loses less than half.
    assert!(x.get_loss_kind_for_bit(300).is_lt_half());
}

impl Eq for BigInt {}

impl PartialEq for BigInt {
    fn eq(&self, other: &BigInt) -> bool {
        self.cmp(other).is_eq()
    }
}
impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        // This part word is longer.
        if self.len() > other.len()
            && self.parts[other.len()..].iter().any(|&x| x != 0)
        {
            return Ordering::Greater;
        }

        // The other word is longer.
        if other.len() > self.len()
            && other.parts[self.len()..].iter().any(|&x| x != 0)
        {
            return Ordering::Less;
        }
        let same_len = other.len().min(self.len());

        // Compare all of the digits, from MSB to LSB.
        for i in (0..same_len).rev() {
            match self.parts[i].cmp(&other.parts[i]) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

macro_rules! declare_operator {
    ($trait_name:ident,
     $func_name:ident,
     $func_impl_name:ident) => {
        // Self + Self
        impl $trait_name for BigInt {
            type Output = Self;

            fn $func_name(self, rhs: Self) -> Self::Output {
                self.$func_name(&rhs)
            }
        }

        // Self + &Self -> Self
        impl $trait_name<&Self> for BigInt {
            type Output = Self;
            fn $func_name(self, rhs: &Self) -> Self::Output {
                let mut n = self;
                let _ = n.$func_impl_name(rhs);
                n
            }
        }

        // &Self + &Self -> Self
        impl $trait_name<Self> for &BigInt {
            type Output = BigInt;
            fn $func_name(self, rhs: Self) -> Self::Output {
                let mut n = self.clone();
                let _ = n.$func_impl_name(rhs);
                n
            }
        }

        // Self + u64 -> Self
        impl $trait_name<u64> for BigInt {
            type Output = Self;
            fn $func_name(self, rhs: u64) -> Self::Output {
                let mut n = self;
                let _ = n.$func_impl_name(&Self::from_u64(rhs));
                n
            }
        }
    };
}

declare_operator!(Add, add, inplace_add);
declare_operator!(Sub, sub, inplace_sub);
declare_operator!(Mul, mul, inplace_mul);
declare_operator!(Div, div, inplace_div);

macro_rules! declare_assign_operator {
    ($trait_name:ident,
     $func_name:ident,
     $func_impl_name:ident) => {
        impl $trait_name for BigInt {
            fn $func_name(&mut self, rhs: Self) {
                let _ = self.$func_impl_name(&rhs);
            }
        }

        impl $trait_name<&BigInt> for BigInt {
            fn $func_name(&mut self, rhs: &Self) {
                let _ = self.$func_impl_name(rhs);
            }
        }
    };
}

declare_assign_operator!(AddAssign, add_assign, inplace_add);
declare_assign_operator!(SubAssign, sub_assign, inplace_sub);
declare_assign_operator!(MulAssign, mul_assign, inplace_mul);
declare_assign_operator!(DivAssign, div_assign, inplace_div);

#[test]
fn test_bigint_operators() {
    type BI = BigInt;
    let x = BI::from_u64(10);
    let y = BI::from_u64(1);

    let c = ((&x - &y) * x) / 2;
    assert_eq!(c.as_u64(), 45);
    assert_eq!((&y + &y).as_u64(), 2);
}

#[test]
fn test_all1s_ctor() {
    type BI = BigInt;
    assert_eq!(BI::all1s(0).get_part(0), 0b0);
    assert_eq!(BI::all1s(1).get_part(0), 0b1);
    assert_eq!(BI::all1s(5).get_part(0), 0b11111);
    assert_eq!(BI::all1s(32).get_part(0), 0xffffffff);
}

/// Bigint numbers above this size use the karatsuba algorithm for
/// multiplication. The number represents the number of words in the bigint.
/// Numbers below this threshold use the traditional O(n^2) multiplication.
const KARATSUBA_SIZE_THRESHOLD: usize = 64;

impl BigInt {
    fn mul_karatsuba(lhs: &[u64], rhs: &[u64]) -> BigInt {
        // Algorithm description:
        // https://en.wikipedia.org/wiki/Karatsuba_algorithm

        // Handle small numbers using the traditional O(n^2) algorithm.
        if lhs.len().min(rhs.len()) < KARATSUBA_SIZE_THRESHOLD {
            // Handle zero-sized inputs.
            if lhs.is_empty() || rhs.is_empty() {
                return BigInt::zero();
            }
            let mut lhs = BigInt::from_parts(lhs);
            lhs.inplace_mul_slice(rhs);
            return lhs;
        }

        // Split the big-int into two parts. One of the parts might be
        // zero-sized.
        let mid = lhs.len().max(rhs.len()) / 2;
        let a = &lhs[0..mid.min(lhs.len())];
        let b = &lhs[mid.min(lhs.len())..];
        let c = &rhs[0..mid.min(rhs.len())];
        let d = &rhs[mid.min(rhs.len())..];

        // Compute 'a*c' and 'b*d'.
        let ac = Self::mul_karatsuba(a, c);
        let mut bd = Self::mul_karatsuba(b, d);

        // Compute (a+b) * (c+d).
        let mut a_b = BigInt::from_parts(a);
        a_b.inplace_add_slice(b);
        let mut c_d = BigInt::from_parts(c);
        c_d.inplace_add_slice(d);

        let mut ad_plus_bc = Self::mul_karatsuba(&a_b, &c_d);

        // Compute (a+b) * (c+d) - ac - bd
        let _ = ad_plus_bc.inplace_sub_slice(&ac, 0);
        let _ = ad_plus_bc.inplace_sub_slice(&bd, 0);

        // Add the parts of the word together.
        bd.shift_left(64 * mid * 2);
        ad_plus_bc.shift_left(64 * mid);
        bd.inplace_add(&ad_plus_bc);
        bd.inplace_add(&ac);
        bd
    }
}

#[test]
fn test_mul_karatsuba() {
    use crate::utils::Lfsr;
    let mut ll = Lfsr::new();

    // Compare the multiplication of karatsuba to the direct multiplication on
    // two random numbers of lengths 'r' and 'l'.
    fn test_sizes(l: usize, r: usize, ll: &mut Lfsr) {
        let mut a = BigInt::from_iter(ll, l);
        let b = BigInt::from_iter(ll, r);
        let res = BigInt::mul_karatsuba(&a, &b);
        a.inplace_mul_slice(&b);
        assert_eq!(res, a);
    }

    test_sizes(1, 1, &mut ll);
    test_sizes(100, 1, &mut ll);
    test_sizes(1, 100, &mut ll);
    test_sizes(100, 100, &mut ll);

    for i in 64..70 {
        for j in 60..70 {
            test_sizes(i, j, &mut ll);
        }
    }
}

impl Deref for BigInt {
    type Target = [u64];

    fn deref(&self) -> &Self::Target {
        &self.parts[..]
    }
}

//! ARFloat is a `no_std` kernel for rigorous arbitrary-precision arithmetic.
//! It provides the two number types that ball (midpoint-radius) arithmetic is
//! built from:
//!
//! * `Arf`: an exact binary floating-point number with an unbounded mantissa
//!   and an unbounded exponent. Every operation rounds to a requested number
//!   of bits with one of five rounding modes, and reports the direction of
//!   the rounding.
//! * `Mag`: a fast upper bound for a non-negative number, with a 30-bit
//!   mantissa. Every operation returns a result that is not smaller than the
//!   exact result.
//!
//! # Example
//!```
//!  use arfloat::{Arf, Mag, RoundingMode};
//!  use core::cmp::Ordering;
//!
//!  let x = Arf::from_u64(3);
//!  let y = Arf::from_u64(4);
//!  let (z, ord) = x.add(&y, 53, RoundingMode::NearestTiesToEven);
//!  assert_eq!(z, Arf::from_u64(7));
//!  assert_eq!(ord, Ordering::Equal);
//!
//!  // 1/3 at 10 bits, rounded down.
//!  let (q, ord) = Arf::one().div(&x, 10, RoundingMode::Zero);
//!  assert_eq!(ord, Ordering::Less);
//!  assert!(q.bits() <= 10);
//!
//!  // A radius bound.
//!  let r = Mag::from_u64(2).mul(&Mag::from_u64(3));
//!  assert!(r >= Mag::from_u64(6));
//!```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod arithmetic;
mod bigint;
mod cast;
mod exponent;
mod float;
mod mag;
mod rounding;
mod utils;

#[cfg(feature = "python")]
mod py;

pub use self::bigint::BigInt;
pub use self::exponent::Exp;
pub use self::float::{Arf, Category, PREC_EXACT};
pub use self::mag::{Mag, MAG_BITS, MAG_MAX_LAGOM_EXP};
pub use self::rounding::RoundingMode;
pub use self::utils::{check_rounding, check_ulp, Lfsr, TestConfig};

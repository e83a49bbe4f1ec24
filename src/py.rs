use crate::{Arf, Exp, Mag, RoundingMode, PREC_EXACT};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::format;
use std::string::String;

/// Parse a rounding mode name, reporting bad names as ValueError.
fn parse_rm(rm: &str) -> PyResult<RoundingMode> {
    RoundingMode::from_string(rm).ok_or_else(|| {
        PyValueError::new_err(format!("Invalid rounding mode: {}", rm))
    })
}

/// Check a precision coming from Python. Division and square root have no
/// exact result, so they need a finite precision.
fn check_prec(prec: u64, allow_exact: bool) -> PyResult<u64> {
    if prec == 0 {
        return Err(PyValueError::new_err("The precision must be positive"));
    }
    if prec == PREC_EXACT && !allow_exact {
        return Err(PyValueError::new_err(
            "This operation needs a finite precision",
        ));
    }
    Ok(prec)
}

/// Returns the name of the rounding direction of an indicator.
fn ord_name(ord: core::cmp::Ordering) -> &'static str {
    match ord {
        core::cmp::Ordering::Less => "Less",
        core::cmp::Ordering::Equal => "Equal",
        core::cmp::Ordering::Greater => "Greater",
    }
}

/// An arbitrary-precision binary floating-point number.
///
/// The arithmetic methods take a precision in bits and a rounding mode:
///     "Zero", "Away", "Negative", "Positive", "NearestTiesToEven"
/// and return a pair of the rounded result and the rounding direction:
///     "Less", "Equal" or "Greater" (compared in magnitude).
#[pyclass(name = "Arf")]
struct PyArf {
    inner: Arf,
}

#[pymethods]
impl PyArf {
    /// Create a number from a Python float. The conversion is exact.
    #[new]
    fn new(val: f64) -> Self {
        PyArf {
            inner: Arf::from_f64(val),
        }
    }

    fn __str__(&self) -> String {
        format!("{:?}", self.inner)
    }
    fn __repr__(&self) -> String {
        self.__str__()
    }
    /// Returns the number of significant bits.
    fn bits(&self) -> usize {
        self.inner.bits()
    }
    /// Returns the exponent of the float, if it fits in 64 bits.
    fn get_exponent(&self) -> Option<i64> {
        self.inner.get_exp().to_i64()
    }
    /// Returns the category of the float.
    fn get_category(&self) -> String {
        format!("{:?}", self.inner.get_category())
    }
    /// Returns true if the number is negative.
    fn is_negative(&self) -> bool {
        self.inner.is_negative()
    }
    /// Returns true if the number is +-inf.
    fn is_inf(&self) -> bool {
        self.inner.is_inf()
    }
    /// Returns true if the number is NaN.
    fn is_nan(&self) -> bool {
        self.inner.is_nan()
    }
    /// Returns true if the number is zero.
    fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }
    /// Returns true if this number is normal (not Zero, Nan, Inf).
    fn is_normal(&self) -> bool {
        self.inner.is_normal()
    }

    fn add(
        &self,
        other: &PyArf,
        prec: u64,
        rm: &str,
    ) -> PyResult<(PyArf, &'static str)> {
        let prec = check_prec(prec, true)?;
        let (val, ord) = self.inner.add(&other.inner, prec, parse_rm(rm)?);
        Ok((PyArf { inner: val }, ord_name(ord)))
    }
    fn sub(
        &self,
        other: &PyArf,
        prec: u64,
        rm: &str,
    ) -> PyResult<(PyArf, &'static str)> {
        let prec = check_prec(prec, true)?;
        let (val, ord) = self.inner.sub(&other.inner, prec, parse_rm(rm)?);
        Ok((PyArf { inner: val }, ord_name(ord)))
    }
    fn mul(
        &self,
        other: &PyArf,
        prec: u64,
        rm: &str,
    ) -> PyResult<(PyArf, &'static str)> {
        let prec = check_prec(prec, true)?;
        let (val, ord) = self.inner.mul(&other.inner, prec, parse_rm(rm)?);
        Ok((PyArf { inner: val }, ord_name(ord)))
    }
    fn div(
        &self,
        other: &PyArf,
        prec: u64,
        rm: &str,
    ) -> PyResult<(PyArf, &'static str)> {
        let prec = check_prec(prec, false)?;
        let (val, ord) = self.inner.div(&other.inner, prec, parse_rm(rm)?);
        Ok((PyArf { inner: val }, ord_name(ord)))
    }
    fn sqrt(&self, prec: u64, rm: &str) -> PyResult<(PyArf, &'static str)> {
        let prec = check_prec(prec, false)?;
        let (val, ord) = self.inner.sqrt(prec, parse_rm(rm)?);
        Ok((PyArf { inner: val }, ord_name(ord)))
    }
    /// Round the number to `prec` bits.
    fn set_round(
        &self,
        prec: u64,
        rm: &str,
    ) -> PyResult<(PyArf, &'static str)> {
        let prec = check_prec(prec, true)?;
        let (val, ord) = self.inner.set_round(prec, parse_rm(rm)?);
        Ok((PyArf { inner: val }, ord_name(ord)))
    }

    // The operators are exact.
    fn __add__(&self, other: &PyArf) -> PyArf {
        PyArf {
            inner: &self.inner + &other.inner,
        }
    }
    fn __sub__(&self, other: &PyArf) -> PyArf {
        PyArf {
            inner: &self.inner - &other.inner,
        }
    }
    fn __mul__(&self, other: &PyArf) -> PyArf {
        PyArf {
            inner: &self.inner * &other.inner,
        }
    }
    fn __neg__(&self) -> PyArf {
        PyArf {
            inner: self.inner.neg(),
        }
    }
    /// Returns the absolute value of the number.
    fn abs(&self) -> PyArf {
        PyArf {
            inner: self.inner.abs(),
        }
    }
    /// Returns x * 2^e.
    fn mul_2exp(&self, e: i64) -> PyArf {
        PyArf {
            inner: self.inner.mul_2exp_i64(e),
        }
    }
    fn __lt__(&self, other: &PyArf) -> bool {
        self.inner < other.inner
    }
    fn __le__(&self, other: &PyArf) -> bool {
        self.inner <= other.inner
    }
    fn __eq__(&self, other: &PyArf) -> bool {
        self.inner == other.inner
    }
    fn __ne__(&self, other: &PyArf) -> bool {
        self.inner != other.inner
    }
    fn __gt__(&self, other: &PyArf) -> bool {
        self.inner > other.inner
    }
    fn __ge__(&self, other: &PyArf) -> bool {
        self.inner >= other.inner
    }
    /// Convert to f64 with the rounding mode `rm`.
    fn to_float64(&self, rm: &str) -> PyResult<f64> {
        Ok(self.inner.to_f64(parse_rm(rm)?))
    }
    /// Convert to an integer with the rounding mode `rm`.
    fn to_i64(&self, rm: &str) -> PyResult<i64> {
        Ok(self.inner.to_i64(parse_rm(rm)?))
    }
    /// Returns an upper bound of the absolute value.
    fn get_mag(&self) -> PyMag {
        PyMag {
            inner: self.inner.get_mag(),
        }
    }
    /// Prints the number using the internal representation.
    fn dump(&self) {
        self.inner.dump();
    }
} // impl PyArf

/// An upper bound for a non-negative number, with a 30-bit mantissa.
#[pyclass(name = "Mag")]
struct PyMag {
    inner: Mag,
}

#[pymethods]
impl PyMag {
    /// Create an upper bound of |val|.
    #[new]
    fn new(val: f64) -> Self {
        PyMag {
            inner: Mag::from_f64(val),
        }
    }
    fn __str__(&self) -> String {
        format!("{:?}", self.inner)
    }
    fn __repr__(&self) -> String {
        self.__str__()
    }
    fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }
    fn is_inf(&self) -> bool {
        self.inner.is_inf()
    }
    fn __add__(&self, other: &PyMag) -> PyMag {
        PyMag {
            inner: self.inner.add(&other.inner),
        }
    }
    fn __mul__(&self, other: &PyMag) -> PyMag {
        PyMag {
            inner: self.inner.mul(&other.inner),
        }
    }
    fn __truediv__(&self, other: &PyMag) -> PyMag {
        PyMag {
            inner: self.inner.div(&other.inner),
        }
    }
    /// Returns an upper bound of max(self - other, 0).
    fn sub(&self, other: &PyMag) -> PyMag {
        PyMag {
            inner: self.inner.sub(&other.inner),
        }
    }
    fn sqrt(&self) -> PyMag {
        PyMag {
            inner: self.inner.sqrt(),
        }
    }
    fn pow(&self, e: u64) -> PyMag {
        PyMag {
            inner: self.inner.pow_ui(e),
        }
    }
    /// Returns self * 2^e.
    fn mul_2exp(&self, e: i64) -> PyMag {
        PyMag {
            inner: self.inner.mul_2exp(&Exp::from(e)),
        }
    }
    fn __lt__(&self, other: &PyMag) -> bool {
        self.inner < other.inner
    }
    fn __le__(&self, other: &PyMag) -> bool {
        self.inner <= other.inner
    }
    fn __eq__(&self, other: &PyMag) -> bool {
        self.inner == other.inner
    }
    fn __gt__(&self, other: &PyMag) -> bool {
        self.inner > other.inner
    }
    fn __ge__(&self, other: &PyMag) -> bool {
        self.inner >= other.inner
    }
    /// Convert to an f64 that is not smaller than the bound.
    fn to_float64(&self) -> f64 {
        self.inner.to_f64()
    }
    /// Returns the exact value of the bound.
    fn to_arf(&self) -> PyArf {
        PyArf {
            inner: Arf::from_mag(&self.inner),
        }
    }
    /// Prints the bound using the internal representation.
    fn dump(&self) {
        self.inner.dump();
    }
} // impl PyMag

/// Returns a new number with the integer value 'val'.
#[pyfunction]
fn from_i64(val: i64) -> PyResult<PyArf> {
    Ok(PyArf {
        inner: Arf::from_i64(val),
    })
}

/// Returns a + b * c, rounded once to `prec` bits.
#[pyfunction]
fn addmul(
    a: &PyArf,
    b: &PyArf,
    c: &PyArf,
    prec: u64,
    rm: &str,
) -> PyResult<(PyArf, &'static str)> {
    let prec = check_prec(prec, true)?;
    let rm = parse_rm(rm)?;
    let (val, ord) = a.inner.addmul(&b.inner, &c.inner, prec, rm);
    Ok((PyArf { inner: val }, ord_name(ord)))
}

#[pymodule]
fn _arfloat(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyArf>()?;
    m.add_class::<PyMag>()?;

    // Add the functions to the module
    m.add_function(wrap_pyfunction!(from_i64, m)?)?;
    m.add_function(wrap_pyfunction!(addmul, m)?)?;
    Ok(())
}

#[test]
fn test_check_prec() {
    assert!(check_prec(0, true).is_err());
    assert!(check_prec(PREC_EXACT, false).is_err());
    assert_eq!(check_prec(PREC_EXACT, true).ok(), Some(PREC_EXACT));
    assert_eq!(check_prec(53, false).ok(), Some(53));
}

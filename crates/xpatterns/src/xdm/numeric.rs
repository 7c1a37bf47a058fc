//! Numeric operations on boxed atomic values.
//!
//! Every operation preserves the numeric subtype of its input. NaN and the infinities
//! pass through unchanged; negative zero is produced where XPath requires it.

use super::XdmAtomicValue;
use crate::engine::runtime::{Error, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NumericKind {
    Integer,
    Decimal,
    Float,
    Double,
}

pub fn classify(v: &XdmAtomicValue) -> Option<NumericKind> {
    match v {
        XdmAtomicValue::Integer(_) => Some(NumericKind::Integer),
        XdmAtomicValue::Decimal(_) => Some(NumericKind::Decimal),
        XdmAtomicValue::Float(_) => Some(NumericKind::Float),
        XdmAtomicValue::Double(_) => Some(NumericKind::Double),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn to_f64(v: &XdmAtomicValue) -> Option<f64> {
    match v {
        XdmAtomicValue::Integer(i) => Some(*i as f64),
        XdmAtomicValue::Decimal(d) | XdmAtomicValue::Double(d) => Some(*d),
        XdmAtomicValue::Float(f) => Some(f64::from(*f)),
        _ => None,
    }
}

fn not_numeric(v: &XdmAtomicValue, op: &str) -> Error {
    Error::from_code(
        ErrorCode::XPTY0004,
        format!("{op} requires a numeric value, got {}", v.atomic_type()),
    )
}

/// `fn:round`: halves go toward positive infinity, so `-2.5` becomes `-2`.
fn round_half_up(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let f = x.floor();
    let r = if x - f >= 0.5 { f + 1.0 } else { f };
    if r == 0.0 { r.copysign(x) } else { r }
}

/// Fractions this close to one half count as ties for `xs:decimal`, whose `f64` storage
/// turns `2.345 * 100` into `234.50000000000003`.
const DECIMAL_TIE_EPSILON: f64 = 1e-9;

fn half_even(y: f64, tie_epsilon: f64) -> f64 {
    let f = y.floor();
    let diff = y - f;
    if (diff - 0.5).abs() <= tie_epsilon {
        if f % 2.0 == 0.0 { f } else { f + 1.0 }
    } else if diff > 0.5 {
        f + 1.0
    } else {
        f
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fractional_half_even(x: f64, scale: i64, tie_epsilon: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    let r = if scale >= 0 {
        if scale > 15 {
            return x;
        }
        let factor = 10_f64.powi(scale as i32);
        let scaled = x * factor;
        if !scaled.is_finite() {
            return x;
        }
        half_even(scaled, tie_epsilon) / factor
    } else {
        let digits = scale.unsigned_abs();
        if digits > 308 {
            return 0.0_f64.copysign(x);
        }
        let factor = 10_f64.powi(digits as i32);
        half_even(x / factor, tie_epsilon) * factor
    };
    if r == 0.0 { r.copysign(x) } else { r }
}

fn integer_half_even(v: i64, scale: i64) -> Result<i64, Error> {
    if scale >= 0 {
        return Ok(v);
    }
    // |i64| < 10^19, so any coarser scale rounds to zero.
    let digits = scale.unsigned_abs();
    if digits > 19 {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation)]
    let factor = 10_i128.pow(digits as u32);
    let wide = i128::from(v);
    let q = wide.div_euclid(factor);
    let rem = wide.rem_euclid(factor);
    let upper = factor - rem;
    let q = if rem > upper || (rem == upper && q % 2 != 0) {
        q + 1
    } else {
        q
    };
    i64::try_from(q * factor).map_err(|_| {
        Error::from_code(
            ErrorCode::FOAR0002,
            "integer overflow in round-half-to-even",
        )
    })
}

impl XdmAtomicValue {
    #[allow(clippy::cast_possible_truncation)]
    fn map_fractional(&self, op: &str, f: impl Fn(f64) -> f64) -> Result<Self, Error> {
        match self {
            XdmAtomicValue::Integer(i) => Ok(XdmAtomicValue::Integer(*i)),
            XdmAtomicValue::Decimal(d) => Ok(XdmAtomicValue::Decimal(f(*d))),
            XdmAtomicValue::Double(d) => Ok(XdmAtomicValue::Double(f(*d))),
            XdmAtomicValue::Float(x) => Ok(XdmAtomicValue::Float(f(f64::from(*x)) as f32)),
            other => Err(not_numeric(other, op)),
        }
    }

    pub fn floor(&self) -> Result<Self, Error> {
        self.map_fractional("fn:floor", f64::floor)
    }

    pub fn ceiling(&self) -> Result<Self, Error> {
        self.map_fractional("fn:ceiling", f64::ceil)
    }

    pub fn round(&self) -> Result<Self, Error> {
        self.map_fractional("fn:round", round_half_up)
    }

    pub fn abs(&self) -> Result<Self, Error> {
        match self {
            XdmAtomicValue::Integer(i) => i.checked_abs().map(XdmAtomicValue::Integer).ok_or_else(|| {
                Error::from_code(ErrorCode::FOAR0002, "integer overflow in fn:abs")
            }),
            XdmAtomicValue::Float(x) => Ok(XdmAtomicValue::Float(x.abs())),
            other => other.map_fractional("fn:abs", f64::abs),
        }
    }

    /// Banker's rounding at `scale` decimal digits; negative scales round to powers of ten.
    #[allow(clippy::cast_possible_truncation)]
    pub fn round_half_to_even(&self, scale: i64) -> Result<Self, Error> {
        match self {
            XdmAtomicValue::Integer(i) => integer_half_even(*i, scale).map(XdmAtomicValue::Integer),
            XdmAtomicValue::Decimal(d) => Ok(XdmAtomicValue::Decimal(fractional_half_even(
                *d,
                scale,
                DECIMAL_TIE_EPSILON,
            ))),
            XdmAtomicValue::Double(d) => {
                Ok(XdmAtomicValue::Double(fractional_half_even(*d, scale, 0.0)))
            }
            XdmAtomicValue::Float(x) => Ok(XdmAtomicValue::Float(
                fractional_half_even(f64::from(*x), scale, 0.0) as f32,
            )),
            other => Err(not_numeric(other, "fn:round-half-to-even")),
        }
    }

    /// Integer view of a numeric value; fractional parts are truncated.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_integer(&self) -> Result<i64, Error> {
        if let XdmAtomicValue::Integer(i) = self {
            return Ok(*i);
        }
        let Some(v) = to_f64(self) else {
            return Err(not_numeric(self, "integer conversion"));
        };
        if !v.is_finite() || v.trunc().abs() >= i64::MAX as f64 {
            return Err(Error::from_code(
                ErrorCode::FOCA0002,
                format!("cannot convert {} to xs:integer", self),
            ));
        }
        Ok(v.trunc() as i64)
    }
}

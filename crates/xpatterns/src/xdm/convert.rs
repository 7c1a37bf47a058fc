//! Value conversions used by function conversion: atomization, casting from
//! `xs:untypedAtomic`, numeric promotion and the XPath 1.0 compatibility coercions.

use super::numeric::to_f64;
use super::{XdmAtomicValue, XdmItem};
use crate::engine::runtime::{Error, ErrorCode};
use crate::iter::ForwardIterator;
use crate::model::XdmNode;
use crate::types::AtomicType;

/// Atomize one item. Nodes contribute their typed value (possibly several values).
pub fn atomize<N: XdmNode>(item: XdmItem<N>) -> Vec<XdmAtomicValue> {
    match item {
        XdmItem::Atomic(a) => vec![a],
        XdmItem::Node(n) => n.typed_value(),
    }
}

/// `fn:string` of a single item.
pub fn string_value<N: XdmNode>(item: &XdmItem<N>) -> String {
    match item {
        XdmItem::Atomic(a) => a.to_string(),
        XdmItem::Node(n) => n.string_value(),
    }
}

/// `fn:number` of an optional item; absent or unparsable input yields NaN.
pub fn number_value<N: XdmNode>(item: Option<&XdmItem<N>>) -> f64 {
    match item {
        None => f64::NAN,
        Some(XdmItem::Node(n)) => parse_double(&n.string_value()).unwrap_or(f64::NAN),
        Some(XdmItem::Atomic(a)) => atomic_number_value(a),
    }
}

fn atomic_number_value(a: &XdmAtomicValue) -> f64 {
    match a {
        XdmAtomicValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        XdmAtomicValue::String(s) | XdmAtomicValue::UntypedAtomic(s) => {
            parse_double(s).unwrap_or(f64::NAN)
        }
        other => to_f64(other).unwrap_or(f64::NAN),
    }
}

fn invalid_lexical(lexical: &str, target: AtomicType) -> Error {
    Error::from_code(
        ErrorCode::FORG0001,
        format!("cannot cast '{lexical}' to {target}"),
    )
}

fn parse_double(lexical: &str) -> Option<f64> {
    let s = lexical.trim();
    match s {
        "INF" | "+INF" => return Some(f64::INFINITY),
        "-INF" => return Some(f64::NEG_INFINITY),
        "NaN" => return Some(f64::NAN),
        _ => {}
    }
    // Rust accepts "inf"/"nan" spellings that XML Schema does not
    let valid = !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if valid { s.parse().ok() } else { None }
}

fn parse_decimal(lexical: &str) -> Option<f64> {
    let s = lexical.trim();
    let valid = s.chars().any(|c| c.is_ascii_digit())
        && s.chars().enumerate().all(|(i, c)| {
            c.is_ascii_digit() || c == '.' || (i == 0 && matches!(c, '+' | '-'))
        })
        && s.matches('.').count() <= 1;
    if valid { s.parse().ok() } else { None }
}

/// Cast the lexical form of an `xs:untypedAtomic` value to `target`.
///
/// `numeric` and `anyAtomicType` targets follow function conversion: untyped values become
/// `xs:double` for numeric parameters and stay untyped for generic ones.
pub fn cast_from_untyped(lexical: &str, target: AtomicType) -> Result<XdmAtomicValue, Error> {
    let value = match target {
        AtomicType::AnyAtomic | AtomicType::UntypedAtomic => XdmAtomicValue::untyped(lexical),
        AtomicType::String => XdmAtomicValue::string(lexical),
        AtomicType::AnyUri => XdmAtomicValue::AnyUri(lexical.trim().into()),
        AtomicType::Boolean => match lexical.trim() {
            "true" | "1" => XdmAtomicValue::Boolean(true),
            "false" | "0" => XdmAtomicValue::Boolean(false),
            _ => return Err(invalid_lexical(lexical, target)),
        },
        AtomicType::Integer => lexical
            .trim()
            .parse::<i64>()
            .map(XdmAtomicValue::Integer)
            .map_err(|_| invalid_lexical(lexical, target))?,
        AtomicType::Decimal => parse_decimal(lexical)
            .map(XdmAtomicValue::Decimal)
            .ok_or_else(|| invalid_lexical(lexical, target))?,
        AtomicType::Double | AtomicType::Numeric => parse_double(lexical)
            .map(XdmAtomicValue::Double)
            .ok_or_else(|| invalid_lexical(lexical, AtomicType::Double))?,
        #[allow(clippy::cast_possible_truncation)]
        AtomicType::Float => parse_double(lexical)
            .map(|d| XdmAtomicValue::Float(d as f32))
            .ok_or_else(|| invalid_lexical(lexical, target))?,
        AtomicType::QName => {
            return Err(Error::type_error(
                "xs:untypedAtomic cannot be cast to xs:QName",
            ));
        }
    };
    Ok(value)
}

/// Numeric type promotion and URI-to-string promotion.
pub fn promotable(from: AtomicType, to: AtomicType) -> bool {
    match to {
        AtomicType::Double => matches!(
            from,
            AtomicType::Integer | AtomicType::Decimal | AtomicType::Float
        ),
        AtomicType::Float => matches!(from, AtomicType::Integer | AtomicType::Decimal),
        AtomicType::String => from == AtomicType::AnyUri,
        _ => false,
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn promote(value: &XdmAtomicValue, to: AtomicType) -> Option<XdmAtomicValue> {
    if !promotable(value.atomic_type(), to) {
        return None;
    }
    match to {
        AtomicType::Double => to_f64(value).map(XdmAtomicValue::Double),
        AtomicType::Float => to_f64(value).map(|d| XdmAtomicValue::Float(d as f32)),
        AtomicType::String => Some(XdmAtomicValue::string(value.to_string())),
        _ => None,
    }
}

/// Convert one atomized argument value toward `target`. Values that neither are untyped
/// nor promotable are returned unchanged for the item check that follows.
pub fn convert_argument(
    value: XdmAtomicValue,
    target: AtomicType,
) -> Result<XdmAtomicValue, Error> {
    if let XdmAtomicValue::UntypedAtomic(s) = &value {
        return cast_from_untyped(s, target);
    }
    if value.atomic_type().is_subtype_of(target) {
        return Ok(value);
    }
    Ok(promote(&value, target).unwrap_or(value))
}

/// Effective boolean value of a sequence.
pub fn effective_boolean_value<N: XdmNode>(
    seq: &mut dyn ForwardIterator<N>,
) -> Result<bool, Error> {
    let Some(first) = seq.next_item().transpose()? else {
        return Ok(false);
    };
    let atomic = match first {
        XdmItem::Node(_) => return Ok(true),
        XdmItem::Atomic(a) => a,
    };
    if seq.next_item().transpose()?.is_some() {
        return Err(Error::from_code(
            ErrorCode::FORG0006,
            "effective boolean value of a sequence of two or more atomic values",
        ));
    }
    match atomic {
        XdmAtomicValue::Boolean(b) => Ok(b),
        XdmAtomicValue::String(s) | XdmAtomicValue::UntypedAtomic(s) | XdmAtomicValue::AnyUri(s) => {
            Ok(!s.is_empty())
        }
        XdmAtomicValue::Integer(i) => Ok(i != 0),
        XdmAtomicValue::Decimal(d) | XdmAtomicValue::Double(d) => Ok(!(d == 0.0 || d.is_nan())),
        XdmAtomicValue::Float(f) => Ok(!(f == 0.0 || f.is_nan())),
        XdmAtomicValue::QName { .. } => Err(Error::from_code(
            ErrorCode::FORG0006,
            "effective boolean value is not defined for xs:QName",
        )),
    }
}

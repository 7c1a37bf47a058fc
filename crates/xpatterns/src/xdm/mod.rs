use compact_str::CompactString;
use core::fmt;
use string_cache::DefaultAtom;

use crate::types::AtomicType;

pub mod convert;
pub mod numeric;

/// Namespace-qualified name with interned parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<DefaultAtom>,
    pub local: DefaultAtom,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<&str>, local: &str) -> Self {
        Self {
            ns_uri: ns_uri.map(DefaultAtom::from),
            local: DefaultAtom::from(local),
        }
    }

    /// A name in no namespace.
    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }

    pub fn ns_uri(&self) -> Option<&str> {
        self.ns_uri.as_deref()
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Boxed atomic values.
///
/// Numeric subtypes are stored distinctly so that `instance of` style checks and the
/// numeric functions can preserve the operand's type (`fn:floor(xs:integer)` stays an
/// integer). `xs:decimal` shares the `f64` representation with `xs:double`.
#[derive(Debug, Clone, PartialEq)]
pub enum XdmAtomicValue {
    Boolean(bool),
    String(CompactString),
    UntypedAtomic(CompactString),
    AnyUri(CompactString),
    Integer(i64),
    Decimal(f64),
    Double(f64),
    Float(f32),
    QName {
        ns_uri: Option<DefaultAtom>,
        prefix: Option<DefaultAtom>,
        local: DefaultAtom,
    },
}

impl XdmAtomicValue {
    pub fn string(s: impl Into<CompactString>) -> Self {
        XdmAtomicValue::String(s.into())
    }

    pub fn untyped(s: impl Into<CompactString>) -> Self {
        XdmAtomicValue::UntypedAtomic(s.into())
    }

    /// The most specific built-in type of this value.
    pub fn atomic_type(&self) -> AtomicType {
        match self {
            XdmAtomicValue::Boolean(_) => AtomicType::Boolean,
            XdmAtomicValue::String(_) => AtomicType::String,
            XdmAtomicValue::UntypedAtomic(_) => AtomicType::UntypedAtomic,
            XdmAtomicValue::AnyUri(_) => AtomicType::AnyUri,
            XdmAtomicValue::Integer(_) => AtomicType::Integer,
            XdmAtomicValue::Decimal(_) => AtomicType::Decimal,
            XdmAtomicValue::Double(_) => AtomicType::Double,
            XdmAtomicValue::Float(_) => AtomicType::Float,
            XdmAtomicValue::QName { .. } => AtomicType::QName,
        }
    }

    pub fn is_numeric(&self) -> bool {
        numeric::classify(self).is_some()
    }
}

impl fmt::Display for XdmAtomicValue {
    /// Canonical lexical form, as produced by `fn:string`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XdmAtomicValue::Boolean(b) => write!(f, "{b}"),
            XdmAtomicValue::String(s)
            | XdmAtomicValue::UntypedAtomic(s)
            | XdmAtomicValue::AnyUri(s) => f.write_str(s),
            XdmAtomicValue::Integer(i) => write!(f, "{i}"),
            XdmAtomicValue::Decimal(d) => f.write_str(&format_decimal(*d)),
            XdmAtomicValue::Double(d) => f.write_str(&format_double(*d)),
            XdmAtomicValue::Float(x) => f.write_str(&format_float(*x)),
            XdmAtomicValue::QName { prefix, local, .. } => match prefix {
                Some(p) => write!(f, "{p}:{local}"),
                None => f.write_str(local),
            },
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_decimal(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

fn special_float(v: f64) -> Option<&'static str> {
    if v.is_nan() {
        Some("NaN")
    } else if v.is_infinite() {
        Some(if v > 0.0 { "INF" } else { "-INF" })
    } else if v == 0.0 {
        Some(if v.is_sign_negative() { "-0" } else { "0" })
    } else {
        None
    }
}

// Values between 1e-6 and 1e6 use decimal notation, everything else scientific
// notation with at least one fractional mantissa digit ("1.0E7").
fn scientific(s: String) -> String {
    match s.split_once('E') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0E{exp}"),
        _ => s,
    }
}

fn format_double(v: f64) -> String {
    if let Some(s) = special_float(v) {
        return s.to_string();
    }
    if (1e-6..1e6).contains(&v.abs()) {
        format_decimal(v)
    } else {
        scientific(format!("{v:E}"))
    }
}

fn format_float(v: f32) -> String {
    let wide = f64::from(v);
    if let Some(s) = special_float(wide) {
        return s.to_string();
    }
    if (1e-6..1e6).contains(&wide.abs()) {
        if v.fract() == 0.0 {
            format_decimal(wide)
        } else {
            format!("{v}")
        }
    } else {
        scientific(format!("{v:E}"))
    }
}

pub type XdmSequence<N> = Vec<XdmItem<N>>;

/// One item flowing through evaluation: a node reference or a boxed atomic value.
///
/// Absence ("no item") is expressed as `Option::None` by the APIs that can produce it,
/// which keeps it distinct from a present empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(XdmAtomicValue),
}

impl<N> XdmItem<N> {
    pub fn as_atomic(&self) -> Option<&XdmAtomicValue> {
        match self {
            XdmItem::Atomic(a) => Some(a),
            XdmItem::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            XdmItem::Node(n) => Some(n),
            XdmItem::Atomic(_) => None,
        }
    }
}

impl<N> From<XdmAtomicValue> for XdmItem<N> {
    fn from(a: XdmAtomicValue) -> Self {
        XdmItem::Atomic(a)
    }
}

impl<N> fmt::Display for XdmItem<N>
where
    N: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XdmItem::Node(_) => write!(f, "<node>"),
            XdmItem::Atomic(a) => write!(f, "{a}"),
        }
    }
}

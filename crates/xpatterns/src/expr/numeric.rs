//! `fn:floor`, `fn:ceiling`, `fn:round`, `fn:abs` and `fn:round-half-to-even`.
//!
//! All five take `xs:numeric?`, return the empty sequence for an empty argument and
//! keep the numeric subtype of the argument.

use smallvec::smallvec;

use super::{Expr, ExprNode, OperandTypes, Operands, TypeChecker};
use crate::consts::FNS;
use crate::engine::runtime::{DynamicContext, Error, ErrorCode, StaticContext};
use crate::iter::{BoxedIterator, from_option};
use crate::model::XdmNode;
use crate::types::{AtomicType, Cardinality, ItemType, SequenceType, common};
use crate::xdm::{ExpandedName, XdmAtomicValue, XdmItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericFn {
    Floor,
    Ceiling,
    Round,
    Abs,
    RoundHalfToEven,
}

impl NumericFn {
    pub fn local_name(self) -> &'static str {
        match self {
            NumericFn::Floor => "floor",
            NumericFn::Ceiling => "ceiling",
            NumericFn::Round => "round",
            NumericFn::Abs => "abs",
            NumericFn::RoundHalfToEven => "round-half-to-even",
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Some(match name {
            "floor" => NumericFn::Floor,
            "ceiling" => NumericFn::Ceiling,
            "round" => NumericFn::Round,
            "abs" => NumericFn::Abs,
            "round-half-to-even" => NumericFn::RoundHalfToEven,
            _ => return None,
        })
    }

    fn accepts_arity(self, arity: usize) -> bool {
        match self {
            NumericFn::RoundHalfToEven => matches!(arity, 1 | 2),
            _ => arity == 1,
        }
    }

    fn apply(self, value: &XdmAtomicValue, scale: i64) -> Result<XdmAtomicValue, Error> {
        match self {
            NumericFn::Floor => value.floor(),
            NumericFn::Ceiling => value.ceiling(),
            NumericFn::Round => value.round(),
            NumericFn::Abs => value.abs(),
            NumericFn::RoundHalfToEven => value.round_half_to_even(scale),
        }
    }
}

/// Call of one of the numeric rounding functions.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFunction {
    func: NumericFn,
    arg: Box<Expr>,
    /// Precision argument of `fn:round-half-to-even`; absent means 0.
    scale: Option<Box<Expr>>,
}

impl NumericFunction {
    fn unary(func: NumericFn, arg: Expr) -> Self {
        Self {
            func,
            arg: Box::new(arg),
            scale: None,
        }
    }

    pub fn floor(arg: Expr) -> Self {
        Self::unary(NumericFn::Floor, arg)
    }

    pub fn ceiling(arg: Expr) -> Self {
        Self::unary(NumericFn::Ceiling, arg)
    }

    pub fn round(arg: Expr) -> Self {
        Self::unary(NumericFn::Round, arg)
    }

    pub fn abs(arg: Expr) -> Self {
        Self::unary(NumericFn::Abs, arg)
    }

    pub fn round_half_to_even(arg: Expr, scale: Option<Expr>) -> Self {
        Self {
            func: NumericFn::RoundHalfToEven,
            arg: Box::new(arg),
            scale: scale.map(Box::new),
        }
    }

    pub fn function(&self) -> NumericFn {
        self.func
    }

    fn scale<N: XdmNode>(&self, ctx: &DynamicContext<N>) -> Result<i64, Error> {
        let Some(scale) = &self.scale else {
            return Ok(0);
        };
        match scale.evaluate_singleton(ctx)? {
            Some(XdmItem::Atomic(v)) => v.to_integer(),
            _ => Err(Error::type_error(
                "the precision of fn:round-half-to-even must be exactly one xs:integer",
            )),
        }
    }
}

impl ExprNode for NumericFunction {
    fn static_type(&self) -> SequenceType {
        let arg = self.arg.static_type();
        let item = match arg.item_type() {
            ItemType::Empty => return SequenceType::empty(),
            ItemType::Atomic(t) if t.is_numeric() => ItemType::Atomic(*t),
            _ => ItemType::Atomic(AtomicType::Numeric),
        };
        let card = arg
            .cardinality()
            .intersection(&Cardinality::zero_or_one())
            .unwrap_or(Cardinality::zero_or_one());
        SequenceType::normalized(item, card)
    }

    fn expected_operand_types(&self) -> OperandTypes {
        let mut types: OperandTypes = smallvec![common::ZERO_OR_ONE_NUMERIC.clone()];
        if self.scale.is_some() {
            types.push(common::EXACTLY_ONE_INTEGER.clone());
        }
        types
    }

    fn operands(&self) -> Operands<'_> {
        let mut ops: Operands<'_> = smallvec![&*self.arg];
        if let Some(scale) = &self.scale {
            ops.push(&**scale);
        }
        ops
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let arg = self.arg.type_check(ctx, &common::ZERO_OR_ONE_NUMERIC)?;
        let scale = self
            .scale
            .map(|s| s.type_check(ctx, &common::EXACTLY_ONE_INTEGER))
            .transpose()?;
        let node = NumericFunction {
            func: self.func,
            arg: Box::new(arg),
            scale: scale.map(Box::new),
        };
        TypeChecker::apply_function_conversion(node.into(), required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        Ok(from_option(self.evaluate_singleton(ctx)?))
    }

    fn evaluate_singleton<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        let value = match self.arg.evaluate_singleton(ctx)? {
            None => return Ok(None),
            Some(XdmItem::Atomic(v)) => v,
            Some(XdmItem::Node(_)) => {
                return Err(Error::type_error(format!(
                    "fn:{} requires an atomic argument",
                    self.func.local_name()
                )));
            }
        };
        let scale = self.scale(ctx)?;
        self.func
            .apply(&value, scale)
            .map(|v| Some(XdmItem::Atomic(v)))
    }
}

/// Bind a call by name to a numeric function node.
///
/// Unprefixed names resolve against the default function namespace. Unknown names
/// and wrong arities are `err:XPST0017`.
pub fn resolve_numeric_function(
    name: &ExpandedName,
    args: Vec<Expr>,
    ctx: &dyn StaticContext,
) -> Result<Expr, Error> {
    let ns = name.ns_uri().or_else(|| ctx.default_function_namespace());
    let func = (ns == Some(FNS))
        .then(|| NumericFn::from_local_name(&name.local))
        .flatten()
        .filter(|f| f.accepts_arity(args.len()));
    let Some(func) = func else {
        return Err(Error::from_code(
            ErrorCode::XPST0017,
            format!("no function {name}#{} is known", args.len()),
        ));
    };
    let mut args = args.into_iter();
    let (Some(arg), scale) = (args.next(), args.next()) else {
        return Err(Error::from_code(
            ErrorCode::XPST0017,
            format!("no function {name}#0 is known"),
        ));
    };
    tracing::debug!(function = func.local_name(), "resolved numeric function");
    Ok(match func {
        NumericFn::RoundHalfToEven => NumericFunction::round_half_to_even(arg, scale),
        other => NumericFunction::unary(other, arg),
    }
    .into())
}

use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

use super::basic::one_operand;
use super::{Expr, ExprNode, OperandTypes, Operands, TypeChecker};
use crate::engine::runtime::{DynamicContext, Error, ErrorCode, StaticContext};
use crate::iter::{BoxedIterator, FlatMapIterator, ItemMapper, from_option};
use crate::model::XdmNode;
use crate::types::{AtomicType, ItemType, MultiItemType, SequenceType, common};
use crate::xdm::convert::{
    atomize, convert_argument, effective_boolean_value, number_value, promotable, string_value,
};
use crate::xdm::{XdmAtomicValue, XdmItem};

/// Replaces every item by its typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Atomizer {
    operand: Box<Expr>,
}

impl Atomizer {
    pub fn new(operand: Expr) -> Self {
        Self {
            operand: Box::new(operand),
        }
    }
}

impl ExprNode for Atomizer {
    fn static_type(&self) -> SequenceType {
        let op = self.operand.static_type();
        op.with_item_type(op.item_type().atomized())
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ITEMS.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = self.operand.type_check(ctx, &common::ZERO_OR_MORE_ITEMS)?;
        let node: Expr = if operand
            .static_type()
            .item_type()
            .is_subtype_of(&ItemType::Atomic(AtomicType::AnyAtomic))
        {
            operand
        } else {
            Atomizer::new(operand).into()
        };
        TypeChecker::apply_function_conversion(node, required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        let mapper: ItemMapper<N> = Arc::new(|item: XdmItem<N>| {
            Ok(atomize(item).into_iter().map(XdmItem::Atomic).collect())
        });
        Ok(Box::new(FlatMapIterator::new(
            self.operand.evaluate_sequence(ctx)?,
            mapper,
        )))
    }
}

fn untyped_target(target: AtomicType) -> AtomicType {
    match target {
        AtomicType::AnyAtomic => AtomicType::UntypedAtomic,
        AtomicType::Numeric => AtomicType::Double,
        t => t,
    }
}

fn converted_item_type(op: &ItemType, target: AtomicType) -> ItemType {
    match op {
        ItemType::Atomic(AtomicType::UntypedAtomic) => ItemType::Atomic(untyped_target(target)),
        ItemType::Atomic(t) if promotable(*t, target) => ItemType::Atomic(target),
        ItemType::Multi(m) => {
            MultiItemType::new(m.members().iter().map(|t| converted_item_type(t, target)))
        }
        other => other.clone(),
    }
}

/// Casts `xs:untypedAtomic` items to the parameter type and applies type promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentConverter {
    operand: Box<Expr>,
    target: AtomicType,
}

impl ArgumentConverter {
    pub fn new(operand: Expr, target: AtomicType) -> Self {
        Self {
            operand: Box::new(operand),
            target,
        }
    }

    pub fn target(&self) -> AtomicType {
        self.target
    }

    /// Whether items of `operand` may need casting or promotion to reach `target`.
    pub fn is_needed(operand: &ItemType, target: AtomicType) -> bool {
        if matches!(target, AtomicType::AnyAtomic | AtomicType::UntypedAtomic) {
            return false;
        }
        if operand.overlaps(&ItemType::Atomic(AtomicType::UntypedAtomic)) {
            return true;
        }
        [
            AtomicType::Integer,
            AtomicType::Decimal,
            AtomicType::Float,
            AtomicType::AnyUri,
        ]
        .into_iter()
        .any(|from| promotable(from, target) && operand.overlaps(&ItemType::Atomic(from)))
    }
}

impl ExprNode for ArgumentConverter {
    fn static_type(&self) -> SequenceType {
        let op = self.operand.static_type();
        op.with_item_type(converted_item_type(op.item_type(), self.target))
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ATOMIC.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = self.operand.type_check(ctx, &common::ZERO_OR_MORE_ATOMIC)?;
        let node: Expr = if Self::is_needed(operand.static_type().item_type(), self.target) {
            ArgumentConverter::new(operand, self.target).into()
        } else {
            operand
        };
        TypeChecker::apply_function_conversion(node, required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        let target = self.target;
        let mapper: ItemMapper<N> = Arc::new(move |item: XdmItem<N>| {
            atomize(item)
                .into_iter()
                .map(|a| convert_argument(a, target).map(XdmItem::Atomic))
                .collect::<Result<SmallVec<_>, _>>()
        });
        Ok(Box::new(FlatMapIterator::new(
            self.operand.evaluate_sequence(ctx)?,
            mapper,
        )))
    }
}

/// XPath 1.0 coercion applied in compatibility mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompatConversion {
    /// `fn:string` of the first item, `""` when empty.
    ToString,
    /// `fn:number` of the first item, NaN when empty.
    ToNumber,
    /// Effective boolean value.
    ToBoolean,
}

impl CompatConversion {
    pub fn for_target(target: AtomicType) -> Option<Self> {
        match target {
            AtomicType::String => Some(CompatConversion::ToString),
            AtomicType::Double | AtomicType::Numeric => Some(CompatConversion::ToNumber),
            AtomicType::Boolean => Some(CompatConversion::ToBoolean),
            _ => None,
        }
    }

    fn result_type(self) -> &'static SequenceType {
        match self {
            CompatConversion::ToString => &common::EXACTLY_ONE_STRING,
            CompatConversion::ToNumber => &common::EXACTLY_ONE_DOUBLE,
            CompatConversion::ToBoolean => &common::EXACTLY_ONE_BOOLEAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityConverter {
    operand: Box<Expr>,
    conversion: CompatConversion,
}

impl CompatibilityConverter {
    pub fn new(operand: Expr, conversion: CompatConversion) -> Self {
        Self {
            operand: Box::new(operand),
            conversion,
        }
    }

    pub fn conversion(&self) -> CompatConversion {
        self.conversion
    }
}

impl ExprNode for CompatibilityConverter {
    fn static_type(&self) -> SequenceType {
        self.conversion.result_type().clone()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ITEMS.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = self.operand.type_check(ctx, &common::ZERO_OR_MORE_ITEMS)?;
        TypeChecker::apply_function_conversion(
            CompatibilityConverter::new(operand, self.conversion).into(),
            required,
            ctx,
            ErrorCode::XPTY0004,
        )
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
        let mut it = self.operand.evaluate_sequence(ctx)?;
        let value = match self.conversion {
            CompatConversion::ToBoolean => {
                XdmAtomicValue::Boolean(effective_boolean_value(it.as_mut())?)
            }
            CompatConversion::ToString => {
                let first = it.next_item().transpose()?;
                XdmAtomicValue::string(first.as_ref().map(string_value).unwrap_or_default())
            }
            CompatConversion::ToNumber => {
                let first = it.next_item().transpose()?;
                XdmAtomicValue::Double(number_value(first.as_ref()))
            }
        };
        Ok(Some(XdmItem::Atomic(value)))
    }
}

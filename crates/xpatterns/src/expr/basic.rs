use smallvec::smallvec;

use super::{Expr, ExprNode, OperandTypes, Operands, TypeChecker};
use crate::engine::runtime::{DynamicContext, Error, ErrorCode, StaticContext};
use crate::iter::{BoxedIterator, ConcatIterator, EmptyIterator, ListIterator, SingletonIterator};
use crate::model::XdmNode;
use crate::types::{Cardinality, ItemType, SequenceType, common};
use crate::xdm::{ExpandedName, XdmAtomicValue, XdmItem};

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    value: XdmAtomicValue,
}

impl Literal {
    pub fn new(value: XdmAtomicValue) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &XdmAtomicValue {
        &self.value
    }
}

impl ExprNode for Literal {
    fn static_type(&self) -> SequenceType {
        SequenceType::new_unchecked(
            ItemType::Atomic(self.value.atomic_type()),
            Cardinality::exactly_one(),
        )
    }

    fn expected_operand_types(&self) -> OperandTypes {
        OperandTypes::new()
    }

    fn operands(&self) -> Operands<'_> {
        Operands::new()
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        TypeChecker::apply_function_conversion(self.into(), required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        _ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        Ok(Box::new(SingletonIterator::new(XdmItem::Atomic(
            self.value.clone(),
        ))))
    }

    fn evaluate_singleton<N: XdmNode>(
        &self,
        _ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        Ok(Some(XdmItem::Atomic(self.value.clone())))
    }
}

/// `()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmptySequence;

impl ExprNode for EmptySequence {
    fn static_type(&self) -> SequenceType {
        SequenceType::empty()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        OperandTypes::new()
    }

    fn operands(&self) -> Operands<'_> {
        Operands::new()
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        TypeChecker::apply_function_conversion(self.into(), required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        _ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        Ok(Box::new(EmptyIterator::new()))
    }

    fn evaluate_singleton<N: XdmNode>(
        &self,
        _ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        Ok(None)
    }
}

/// `.`; its static type comes from the static context during type check.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextItem {
    ty: SequenceType,
}

impl ContextItem {
    pub fn new() -> Self {
        Self {
            ty: common::EXACTLY_ONE_ITEM.clone(),
        }
    }
}

impl Default for ContextItem {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprNode for ContextItem {
    fn static_type(&self) -> SequenceType {
        self.ty.clone()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        OperandTypes::new()
    }

    fn operands(&self) -> Operands<'_> {
        Operands::new()
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let ty = ctx
            .context_item_type()
            .cloned()
            .unwrap_or_else(|| common::EXACTLY_ONE_ITEM.clone());
        TypeChecker::apply_function_conversion(
            ContextItem { ty }.into(),
            required,
            ctx,
            ErrorCode::XPTY0004,
        )
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        let item = self.evaluate_singleton(ctx)?;
        Ok(crate::iter::from_option(item))
    }

    fn evaluate_singleton<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        match &ctx.context_item {
            Some(item) => Ok(Some(item.clone())),
            None => Err(Error::from_code(
                ErrorCode::XPDY0002,
                "context item is undefined",
            )),
        }
    }
}

/// `$name`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    name: ExpandedName,
    ty: SequenceType,
}

impl VariableRef {
    pub fn new(name: ExpandedName) -> Self {
        Self {
            name,
            ty: common::ZERO_OR_MORE_ITEMS.clone(),
        }
    }

    pub fn name(&self) -> &ExpandedName {
        &self.name
    }
}

impl ExprNode for VariableRef {
    fn static_type(&self) -> SequenceType {
        self.ty.clone()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        OperandTypes::new()
    }

    fn operands(&self) -> Operands<'_> {
        Operands::new()
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let Some(ty) = ctx.variable_type(&self.name).cloned() else {
            return Err(Error::from_code(
                ErrorCode::XPST0008,
                format!("variable ${} is not declared", self.name),
            ));
        };
        TypeChecker::apply_function_conversion(
            VariableRef { ty, ..self }.into(),
            required,
            ctx,
            ErrorCode::XPTY0004,
        )
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        match ctx.variable(&self.name) {
            Some(value) => Ok(Box::new(ListIterator::new(value.clone()))),
            None => Err(Error::from_code(
                ErrorCode::XPDY0002,
                format!("variable ${} has no value", self.name),
            )),
        }
    }
}

/// The comma operator: operands' items in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConstructor {
    items: Vec<Expr>,
}

impl SequenceConstructor {
    pub fn new(items: Vec<Expr>) -> Self {
        Self { items }
    }
}

impl ExprNode for SequenceConstructor {
    fn static_type(&self) -> SequenceType {
        self.items
            .iter()
            .fold(SequenceType::empty(), |acc, e| acc.concat(&e.static_type()))
    }

    fn expected_operand_types(&self) -> OperandTypes {
        self.items
            .iter()
            .map(|_| common::ZERO_OR_MORE_ITEMS.clone())
            .collect()
    }

    fn operands(&self) -> Operands<'_> {
        self.items.iter().collect()
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let items = self
            .items
            .into_iter()
            .map(|e| e.type_check(ctx, &common::ZERO_OR_MORE_ITEMS))
            .collect::<Result<Vec<_>, _>>()?;
        let node: Expr = match items.len() {
            0 => EmptySequence.into(),
            _ => SequenceConstructor { items }.into(),
        };
        TypeChecker::apply_function_conversion(node, required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        let parts = self
            .items
            .iter()
            .map(|e| e.evaluate_sequence(ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(ConcatIterator::new(parts)))
    }
}

// Single-operand nodes share the same operand plumbing.
pub(super) fn one_operand(operand: &Expr) -> Operands<'_> {
    smallvec![operand]
}

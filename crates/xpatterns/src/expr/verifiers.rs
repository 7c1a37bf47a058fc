use smallvec::smallvec;

use super::basic::one_operand;
use super::{Expr, ExprNode, OperandTypes, Operands, TypeChecker};
use crate::engine::runtime::{DynamicContext, Error, ErrorCode, StaticContext};
use crate::iter::{BoxedIterator, VerifyingIterator};
use crate::model::XdmNode;
use crate::types::{Cardinality, ItemType, SequenceType, common};

/// Run-time check that the operand yields a number of items within `required`.
#[derive(Debug, Clone, PartialEq)]
pub struct CardinalityVerifier {
    operand: Box<Expr>,
    required: Cardinality,
    code: ErrorCode,
}

impl CardinalityVerifier {
    pub fn new(operand: Expr, required: Cardinality, code: ErrorCode) -> Self {
        Self {
            operand: Box::new(operand),
            required,
            code,
        }
    }

    pub fn required(&self) -> Cardinality {
        self.required
    }

    pub(crate) fn code(&self) -> ErrorCode {
        self.code
    }

    pub(crate) fn into_operand(self) -> Expr {
        *self.operand
    }
}

impl ExprNode for CardinalityVerifier {
    fn static_type(&self) -> SequenceType {
        let op = self.operand.static_type();
        match op.cardinality().intersection(&self.required) {
            Some(c) => op.with_cardinality(c),
            // the verifier can only fail; keep the asserted count
            None => op.with_cardinality(self.required),
        }
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ITEMS.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = self.operand.type_check(ctx, &common::ZERO_OR_MORE_ITEMS)?;
        let asserted = SequenceType::new_unchecked(ItemType::Item, self.required);
        let node = TypeChecker::check_assertion(operand, &asserted, self.code)?;
        TypeChecker::apply_function_conversion(node, required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        Ok(Box::new(VerifyingIterator::new(
            self.operand.evaluate_sequence(ctx)?,
            None,
            Some(self.required),
            self.code,
        )))
    }
}

/// Run-time check that every item of the operand matches `required`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemVerifier {
    operand: Box<Expr>,
    required: ItemType,
    code: ErrorCode,
}

impl ItemVerifier {
    pub fn new(operand: Expr, required: ItemType, code: ErrorCode) -> Self {
        Self {
            operand: Box::new(operand),
            required,
            code,
        }
    }

    pub fn required(&self) -> &ItemType {
        &self.required
    }

    pub(crate) fn code(&self) -> ErrorCode {
        self.code
    }

    pub(crate) fn into_operand(self) -> Expr {
        *self.operand
    }
}

impl ExprNode for ItemVerifier {
    fn static_type(&self) -> SequenceType {
        self.operand
            .static_type()
            .with_item_type(self.required.clone())
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ITEMS.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = self.operand.type_check(ctx, &common::ZERO_OR_MORE_ITEMS)?;
        let asserted =
            SequenceType::new_unchecked(self.required.clone(), Cardinality::zero_or_more());
        let node = TypeChecker::check_assertion(operand, &asserted, self.code)?;
        TypeChecker::apply_function_conversion(node, required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        Ok(Box::new(VerifyingIterator::new(
            self.operand.evaluate_sequence(ctx)?,
            Some(self.required.clone()),
            None,
            self.code,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::runtime::{DynamicContextBuilder, StaticContextBuilder};
    use crate::expr::ExprKind;
    use crate::model::simple::SimpleNode;
    use crate::types::AtomicType;
    use crate::xdm::ExpandedName;

    #[test]
    fn proven_cardinality_drops_the_verifier() {
        let ctx = StaticContextBuilder::new().build();
        let e: Expr = CardinalityVerifier::new(
            Expr::integer(1),
            Cardinality::exactly_one(),
            ErrorCode::XPTY0004,
        )
        .into();
        let checked = e.type_check(&ctx, &common::ZERO_OR_MORE_ITEMS).unwrap();
        assert_eq!(checked.kind(), ExprKind::Literal);
    }

    #[test]
    fn item_verifier_narrows_static_type() {
        let v = ItemVerifier::new(
            Expr::variable(ExpandedName::local("x")),
            ItemType::Atomic(AtomicType::String),
            ErrorCode::XPTY0004,
        );
        assert_eq!(v.static_type().to_string(), "xs:string*");
    }

    #[test]
    fn cardinality_verifier_fails_lazily() {
        let name = ExpandedName::local("x");
        let ctx = DynamicContextBuilder::<SimpleNode>::new()
            .with_variable(
                name.clone(),
                vec![
                    crate::xdm::XdmItem::from(crate::xdm::XdmAtomicValue::Integer(1)),
                    crate::xdm::XdmItem::from(crate::xdm::XdmAtomicValue::Integer(2)),
                ],
            )
            .build();
        let v = CardinalityVerifier::new(
            Expr::variable(name),
            Cardinality::zero_or_one(),
            ErrorCode::XPDY0050,
        );
        let mut it = v.evaluate_sequence(&ctx).unwrap();
        assert!(it.next_item().unwrap().is_ok());
        let err = it.next_item().unwrap().unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPDY0050);
    }
}

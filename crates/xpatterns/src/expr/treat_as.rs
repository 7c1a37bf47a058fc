use smallvec::smallvec;

use super::basic::one_operand;
use super::type_checker::Verdict;
use super::{Expr, ExprNode, OperandTypes, Operands, TypeChecker};
use crate::engine::runtime::{DynamicContext, Error, ErrorCode, StaticContext};
use crate::iter::{BoxedIterator, VerifyingIterator};
use crate::model::XdmNode;
use crate::types::{SequenceType, common};

/// `expr treat as type`: asserts the operand's type without converting it.
///
/// The static type is the asserted type. Whatever cannot be proven during type
/// checking is verified lazily while the operand is pulled, failing with
/// `err:XPDY0050`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatAs {
    operand: Box<Expr>,
    req_type: SequenceType,
    verify_items: bool,
    verify_cardinality: bool,
}

impl TreatAs {
    pub fn new(operand: Expr, req_type: SequenceType) -> Self {
        Self {
            operand: Box::new(operand),
            req_type,
            verify_items: true,
            verify_cardinality: true,
        }
    }

    pub fn req_type(&self) -> &SequenceType {
        &self.req_type
    }
}

impl ExprNode for TreatAs {
    fn static_type(&self) -> SequenceType {
        self.req_type.clone()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ITEMS.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = self.operand.type_check(ctx, &common::ZERO_OR_MORE_ITEMS)?;
        let actual = operand.static_type();
        let items = TypeChecker::item_verdict(&actual, &self.req_type, ErrorCode::XPDY0050)?;
        let count =
            TypeChecker::cardinality_verdict(&actual, &self.req_type, ErrorCode::XPDY0050)?;
        tracing::trace!(operand = %actual, asserted = %self.req_type, ?items, ?count, "treat as");
        let node = TreatAs {
            operand: Box::new(operand),
            req_type: self.req_type,
            verify_items: items == Verdict::Unknown,
            verify_cardinality: count == Verdict::Unknown,
        };
        TypeChecker::apply_function_conversion(node.into(), required, ctx, ErrorCode::XPTY0004)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        let source = self.operand.evaluate_sequence(ctx)?;
        if !self.verify_items && !self.verify_cardinality {
            return Ok(source);
        }
        let item_type = self
            .verify_items
            .then(|| self.req_type.item_type().clone());
        let cardinality = self
            .verify_cardinality
            .then(|| self.req_type.cardinality());
        Ok(Box::new(VerifyingIterator::new(
            source,
            item_type,
            cardinality,
            ErrorCode::XPDY0050,
        )))
    }
}

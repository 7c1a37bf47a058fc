use smallvec::smallvec;

use super::basic::one_operand;
use super::{Expr, ExprNode, OperandTypes, Operands};
use crate::engine::runtime::{DynamicContext, Error, StaticCompatibilityContext, StaticContext};
use crate::iter::BoxedIterator;
use crate::model::XdmNode;
use crate::types::{SequenceType, common};
use crate::xdm::XdmItem;

/// Type checks its operand with XPath 1.0 compatibility mode switched on.
///
/// The node exists only for type checking: `type_check` returns the rewritten
/// operand, so it never survives into an evaluated tree.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCompatibilityStore {
    operand: Box<Expr>,
}

impl StaticCompatibilityStore {
    pub fn new(operand: Expr) -> Self {
        Self {
            operand: Box::new(operand),
        }
    }
}

impl ExprNode for StaticCompatibilityStore {
    fn static_type(&self) -> SequenceType {
        self.operand.static_type()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ZERO_OR_MORE_ITEMS.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        tracing::trace!(required = %required, "entering XPath 1.0 compatibility mode");
        let compat = StaticCompatibilityContext::new(ctx);
        self.operand.type_check(&compat, required)
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        self.operand.evaluate_sequence(ctx)
    }

    fn evaluate_singleton<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        self.operand.evaluate_singleton(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::runtime::StaticContextBuilder;
    use crate::expr::ExprKind;

    #[test]
    fn static_type_is_the_operands() {
        let s = StaticCompatibilityStore::new(Expr::integer(4));
        assert_eq!(s.static_type(), common::EXACTLY_ONE_INTEGER);
    }

    #[test]
    fn type_check_replaces_itself_with_the_operand() {
        let ctx = StaticContextBuilder::new().build();
        let e = Expr::from(StaticCompatibilityStore::new(Expr::integer(4)))
            .type_check(&ctx, &common::ZERO_OR_MORE_ITEMS)
            .unwrap();
        assert_eq!(e, Expr::integer(4));
    }

    #[test]
    fn operand_is_checked_in_compatibility_mode() {
        let ctx = StaticContextBuilder::new().build();
        let e = Expr::from(StaticCompatibilityStore::new(Expr::sequence([
            Expr::string("1"),
            Expr::string("2"),
        ])))
        .type_check(&ctx, &common::EXACTLY_ONE_DOUBLE)
        .unwrap();
        assert_eq!(e.kind(), ExprKind::CompatibilityConverter);
        assert!(!ctx.xpath10_compatibility());
    }
}

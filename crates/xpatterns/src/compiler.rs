//! Entry points that take an expression tree through the type-check pass and evaluate the
//! result.

use crate::engine::runtime::{DynamicContext, Error, StaticContext};
use crate::expr::{Expr, ExprNode};
use crate::iter::XdmSequenceStream;
use crate::model::XdmNode;
use crate::types::{SequenceType, common};
use crate::xdm::{XdmItem, XdmSequence};

/// A type-checked expression ready for evaluation. Reusable across dynamic contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    expr: Expr,
}

/// Type check `expr` with no constraint on its result.
///
/// # Errors
///
/// Returns the first static error raised by the type-check pass.
pub fn compile(expr: Expr, ctx: &dyn StaticContext) -> Result<CompiledExpr, Error> {
    compile_with_required(expr, ctx, &common::ZERO_OR_MORE_ITEMS)
}

/// Type check `expr` against `required`, applying function conversion to the result.
///
/// # Errors
///
/// Returns the first static error raised by the type-check pass.
pub fn compile_with_required(
    expr: Expr,
    ctx: &dyn StaticContext,
    required: &SequenceType,
) -> Result<CompiledExpr, Error> {
    tracing::debug!(
        root = ?expr.kind(),
        %required,
        compat = ctx.xpath10_compatibility(),
        "type checking expression"
    );
    let expr = expr.type_check(ctx, required).inspect_err(|e| {
        tracing::debug!(error = %e, "type check failed");
    })?;
    tracing::debug!(static_type = %expr.static_type(), nodes = expr.kinds().len(), "type check done");
    Ok(CompiledExpr { expr })
}

impl CompiledExpr {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn static_type(&self) -> SequenceType {
        self.expr.static_type()
    }

    /// Evaluate and collect every item.
    ///
    /// # Errors
    ///
    /// Returns the first dynamic error encountered.
    pub fn evaluate<N: XdmNode>(&self, ctx: &DynamicContext<N>) -> Result<XdmSequence<N>, Error> {
        self.evaluate_stream(ctx)?.materialize()
    }

    /// Evaluate lazily. Errors raised while pulling items surface from the stream.
    ///
    /// # Errors
    ///
    /// Returns errors raised while setting up the evaluation.
    pub fn evaluate_stream<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<XdmSequenceStream<N>, Error> {
        Ok(XdmSequenceStream::new(self.expr.evaluate_sequence(ctx)?))
    }

    /// First item only; the rest of the sequence is never pulled.
    ///
    /// # Errors
    ///
    /// Returns an error raised before the first item is produced.
    pub fn evaluate_first<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        self.evaluate_stream(ctx)?.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::runtime::{DynamicContextBuilder, ErrorCode, StaticContextBuilder};
    use crate::model::simple::SimpleNode;
    use crate::xdm::XdmAtomicValue;

    #[test]
    fn compile_then_evaluate() {
        let sctx = StaticContextBuilder::new().build();
        let compiled = compile(Expr::sequence([Expr::integer(1), Expr::string("a")]), &sctx).unwrap();
        let dctx = DynamicContextBuilder::<SimpleNode>::new().build();
        let out = compiled.evaluate(&dctx).unwrap();
        assert_eq!(
            out,
            vec![
                XdmItem::Atomic(XdmAtomicValue::Integer(1)),
                XdmItem::Atomic(XdmAtomicValue::string("a")),
            ]
        );
    }

    #[test]
    fn required_type_is_applied_to_the_root() {
        let sctx = StaticContextBuilder::new().build();
        let err = compile_with_required(Expr::string("a"), &sctx, &common::EXACTLY_ONE_INTEGER)
            .unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
    }

    #[test]
    fn missing_context_item_is_a_dynamic_error() {
        let sctx = StaticContextBuilder::new().build();
        let compiled = compile(Expr::context_item(), &sctx).unwrap();
        let dctx = DynamicContextBuilder::<SimpleNode>::new().build();
        let err = compiled.evaluate_first(&dctx).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPDY0002);
    }
}

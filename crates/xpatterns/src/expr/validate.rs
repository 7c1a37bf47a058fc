use smallvec::smallvec;

use super::basic::one_operand;
use super::{Expr, ExprNode, OperandTypes, Operands, TypeChecker};
use crate::engine::runtime::{DynamicContext, Error, ErrorCode, StaticContext, ValidationMode};
use crate::iter::{BoxedIterator, from_option};
use crate::model::{NodeKind, XdmNode};
use crate::types::{SequenceType, common};
use crate::xdm::XdmItem;

/// `validate lax|strict { expr }`.
///
/// The operand must be exactly one element or document node; anything else is
/// `err:XQTY0030`, statically when provable and otherwise at run time. Validation itself
/// is delegated to the [`SchemaValidator`](crate::engine::runtime::SchemaValidator) of the
/// dynamic context.
#[derive(Debug, Clone, PartialEq)]
pub struct Validate {
    operand: Box<Expr>,
    mode: ValidationMode,
}

impl Validate {
    /// Build a validate expression. Only the operand conversion is applied here; the
    /// operand is not otherwise type checked until the whole tree is.
    pub fn create(
        operand: Expr,
        mode: ValidationMode,
        ctx: &dyn StaticContext,
    ) -> Result<Expr, Error> {
        let operand = TypeChecker::apply_function_conversion(
            operand,
            &common::ELEMENT_OR_DOCUMENT,
            ctx,
            ErrorCode::XQTY0030,
        )?;
        Ok(Validate {
            operand: Box::new(operand),
            mode,
        }
        .into())
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Peel off the verifiers `create` wrapped around the operand. They were derived
    /// from its unchecked static type and must not stand in for the real check.
    fn strip_operand_verifiers(operand: Expr) -> Expr {
        match operand {
            Expr::ItemVerifier(v) if v.code() == ErrorCode::XQTY0030 => {
                Self::strip_operand_verifiers(v.into_operand())
            }
            Expr::CardinalityVerifier(v) if v.code() == ErrorCode::XQTY0030 => {
                Self::strip_operand_verifiers(v.into_operand())
            }
            other => other,
        }
    }

    fn not_validatable() -> Error {
        Error::from_code(
            ErrorCode::XQTY0030,
            "the operand of validate must be exactly one element or document node",
        )
    }
}

impl ExprNode for Validate {
    fn static_type(&self) -> SequenceType {
        common::ELEMENT_OR_DOCUMENT.clone()
    }

    fn expected_operand_types(&self) -> OperandTypes {
        smallvec![common::ELEMENT_OR_DOCUMENT.clone()]
    }

    fn operands(&self) -> Operands<'_> {
        one_operand(&self.operand)
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        let operand = Self::strip_operand_verifiers(*self.operand)
            .type_check(ctx, &common::ZERO_OR_MORE_ITEMS)?;
        let operand = TypeChecker::apply_function_conversion(
            operand,
            &common::ELEMENT_OR_DOCUMENT,
            ctx,
            ErrorCode::XQTY0030,
        )?;
        let node = Validate {
            operand: Box::new(operand),
            mode: self.mode,
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
        let node = match self.operand.evaluate_singleton(ctx)? {
            Some(XdmItem::Node(n))
                if matches!(n.kind(), NodeKind::Element | NodeKind::Document) =>
            {
                n
            }
            _ => return Err(Self::not_validatable()),
        };
        match (&ctx.schema_validator, self.mode) {
            (Some(validator), mode) => validator
                .validate(&node, mode)
                .map(|n| Some(XdmItem::Node(n))),
            (None, ValidationMode::Lax) => Ok(Some(XdmItem::Node(node))),
            (None, ValidationMode::Strict) => Err(Error::from_code(
                ErrorCode::XQDY0084,
                "strict validation requested but no schema is available",
            )),
        }
    }
}

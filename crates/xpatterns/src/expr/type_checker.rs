use super::{
    ArgumentConverter, Atomizer, CardinalityVerifier, CompatConversion, CompatibilityConverter,
    Expr, ExprNode, ItemVerifier,
};
use crate::engine::runtime::{Error, ErrorCode, StaticContext};
use crate::types::{AtomicType, Cardinality, ItemType, SequenceType};

/// Outcome of comparing an operand's static type with a required type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Statically proven; nothing to check at run time.
    Proven,
    /// May or may not hold; needs a run-time check.
    Unknown,
}

/// Function conversion rules: atomization, untyped casting, promotion, the XPath 1.0
/// compatibility coercions, and verification of item type and cardinality.
pub struct TypeChecker;

impl TypeChecker {
    /// Make `expr` conform to `required`, inserting converter and verifier nodes as needed.
    ///
    /// Static mismatches are reported with `code`; verifiers inserted here report run-time
    /// mismatches with the same code.
    pub fn apply_function_conversion(
        expr: Expr,
        required: &SequenceType,
        ctx: &dyn StaticContext,
        code: ErrorCode,
    ) -> Result<Expr, Error> {
        if required.is_zero_or_more_items() {
            return Ok(expr);
        }
        let mut expr = expr;
        if let ItemType::Atomic(target) = required.item_type() {
            let target = *target;
            if ctx.xpath10_compatibility()
                && let Some(conversion) = CompatConversion::for_target(target)
                && !expr.static_type().is_subtype_of(required)
            {
                tracing::trace!(required = %target, ?conversion, "inserting compatibility converter");
                expr = CompatibilityConverter::new(expr, conversion).into();
            }
            if !expr
                .static_type()
                .item_type()
                .is_subtype_of(&ItemType::Atomic(AtomicType::AnyAtomic))
            {
                tracing::trace!(operand = %expr.static_type(), "inserting atomizer");
                expr = Atomizer::new(expr).into();
            }
            if ArgumentConverter::is_needed(expr.static_type().item_type(), target) {
                tracing::trace!(operand = %expr.static_type(), required = %target, "inserting argument converter");
                expr = ArgumentConverter::new(expr, target).into();
            }
        }
        Self::verify(expr, required, code)
    }

    /// Verify item type and cardinality only, without conversions.
    pub fn check_assertion(
        expr: Expr,
        required: &SequenceType,
        code: ErrorCode,
    ) -> Result<Expr, Error> {
        Self::verify(expr, required, code)
    }

    fn verify(expr: Expr, required: &SequenceType, code: ErrorCode) -> Result<Expr, Error> {
        let actual = expr.static_type();
        let mut expr = expr;
        if Self::item_verdict(&actual, required, code)? == Verdict::Unknown {
            tracing::trace!(operand = %actual, required = %required.item_type(), "inserting item verifier");
            expr = ItemVerifier::new(expr, required.item_type().clone(), code).into();
        }
        if Self::cardinality_verdict(&actual, required, code)? == Verdict::Unknown {
            tracing::trace!(operand = %actual.cardinality(), required = %required.cardinality(), "inserting cardinality verifier");
            expr = CardinalityVerifier::new(expr, required.cardinality(), code).into();
        }
        Ok(expr)
    }

    pub(crate) fn item_verdict(
        actual: &SequenceType,
        required: &SequenceType,
        code: ErrorCode,
    ) -> Result<Verdict, Error> {
        // empty-sequence() constrains only the count
        if required.is_empty_sequence()
            || actual.item_type().is_subtype_of(required.item_type())
        {
            return Ok(Verdict::Proven);
        }
        let may_be_empty =
            actual.cardinality().allows_empty() && required.cardinality().allows_empty();
        if actual.item_type().overlaps(required.item_type()) || may_be_empty {
            Ok(Verdict::Unknown)
        } else {
            Err(Error::from_code(
                code,
                format!("required type is {required}, but the expression has type {actual}"),
            ))
        }
    }

    pub(crate) fn cardinality_verdict(
        actual: &SequenceType,
        required: &SequenceType,
        code: ErrorCode,
    ) -> Result<Verdict, Error> {
        let (have, want): (Cardinality, Cardinality) =
            (actual.cardinality(), required.cardinality());
        if have.is_subset_of(&want) {
            Ok(Verdict::Proven)
        } else if have.intersects(&want) {
            Ok(Verdict::Unknown)
        } else {
            Err(Error::from_code(
                code,
                format!("required cardinality is {want}, but the expression yields {have}"),
            ))
        }
    }
}

//! Expression tree, type-check rewriting and evaluation.
//!
//! The node set is closed: [`Expr`] is an enum over every node kind and dispatches to the
//! per-node [`ExprNode`] implementations. Type checking consumes a node and returns its
//! replacement, which may be the node itself, its operand (for nodes that only exist to
//! influence checking) or the node wrapped in conversion and verification nodes.

use core::fmt;
use smallvec::SmallVec;

use crate::engine::runtime::{DynamicContext, Error, StaticContext};
use crate::iter::BoxedIterator;
use crate::model::XdmNode;
use crate::types::SequenceType;
use crate::xdm::{ExpandedName, XdmAtomicValue, XdmItem};

mod basic;
mod compat_store;
mod converters;
mod numeric;
mod treat_as;
mod type_checker;
mod validate;
mod verifiers;

pub use basic::{ContextItem, EmptySequence, Literal, SequenceConstructor, VariableRef};
pub use compat_store::StaticCompatibilityStore;
pub use converters::{ArgumentConverter, Atomizer, CompatConversion, CompatibilityConverter};
pub use numeric::{NumericFn, NumericFunction, resolve_numeric_function};
pub use treat_as::TreatAs;
pub use type_checker::TypeChecker;
pub use validate::Validate;
pub use verifiers::{CardinalityVerifier, ItemVerifier};

pub type Operands<'a> = SmallVec<[&'a Expr; 2]>;
pub type OperandTypes = SmallVec<[SequenceType; 2]>;

/// Behaviour shared by every expression node.
pub trait ExprNode: Sized {
    /// The type of the values this node produces.
    fn static_type(&self) -> SequenceType;

    /// The types this node requires of its operands, in operand order.
    fn expected_operand_types(&self) -> OperandTypes;

    fn operands(&self) -> Operands<'_>;

    /// Check operands first, then make the result conform to `required`.
    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error>;

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error>;

    /// Evaluate to at most one item. More than one item is a type error.
    fn evaluate_singleton<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        let mut it = self.evaluate_sequence(ctx)?;
        let first = it.next_item().transpose()?;
        if first.is_some() && it.next_item().transpose()?.is_some() {
            return Err(Error::type_error(
                "a sequence of more than one item is not allowed here",
            ));
        }
        Ok(first)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    EmptySequence,
    ContextItem,
    VariableRef,
    Sequence,
    TreatAs,
    StaticCompatibilityStore,
    Validate,
    ArgumentConverter,
    Atomizer,
    CompatibilityConverter,
    CardinalityVerifier,
    ItemVerifier,
    NumericFunction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    EmptySequence(EmptySequence),
    ContextItem(ContextItem),
    VariableRef(VariableRef),
    Sequence(SequenceConstructor),
    TreatAs(TreatAs),
    CompatibilityStore(StaticCompatibilityStore),
    Validate(Validate),
    ArgumentConverter(ArgumentConverter),
    Atomizer(Atomizer),
    CompatibilityConverter(CompatibilityConverter),
    CardinalityVerifier(CardinalityVerifier),
    ItemVerifier(ItemVerifier),
    NumericFunction(NumericFunction),
}

macro_rules! dispatch {
    ($self:expr, $node:ident => $body:expr) => {
        match $self {
            Expr::Literal($node) => $body,
            Expr::EmptySequence($node) => $body,
            Expr::ContextItem($node) => $body,
            Expr::VariableRef($node) => $body,
            Expr::Sequence($node) => $body,
            Expr::TreatAs($node) => $body,
            Expr::CompatibilityStore($node) => $body,
            Expr::Validate($node) => $body,
            Expr::ArgumentConverter($node) => $body,
            Expr::Atomizer($node) => $body,
            Expr::CompatibilityConverter($node) => $body,
            Expr::CardinalityVerifier($node) => $body,
            Expr::ItemVerifier($node) => $body,
            Expr::NumericFunction($node) => $body,
        }
    };
}

macro_rules! impl_from_node {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(node: $ty) -> Self {
                    Expr::$variant(node)
                }
            }
        )*
    };
}

impl_from_node!(
    Literal(Literal),
    EmptySequence(EmptySequence),
    ContextItem(ContextItem),
    VariableRef(VariableRef),
    Sequence(SequenceConstructor),
    TreatAs(TreatAs),
    CompatibilityStore(StaticCompatibilityStore),
    Validate(Validate),
    ArgumentConverter(ArgumentConverter),
    Atomizer(Atomizer),
    CompatibilityConverter(CompatibilityConverter),
    CardinalityVerifier(CardinalityVerifier),
    ItemVerifier(ItemVerifier),
    NumericFunction(NumericFunction),
);

impl ExprNode for Expr {
    fn static_type(&self) -> SequenceType {
        dispatch!(self, n => n.static_type())
    }

    fn expected_operand_types(&self) -> OperandTypes {
        dispatch!(self, n => n.expected_operand_types())
    }

    fn operands(&self) -> Operands<'_> {
        dispatch!(self, n => n.operands())
    }

    fn type_check(self, ctx: &dyn StaticContext, required: &SequenceType) -> Result<Expr, Error> {
        dispatch!(self, n => n.type_check(ctx, required))
    }

    fn evaluate_sequence<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<BoxedIterator<N>, Error> {
        dispatch!(self, n => n.evaluate_sequence(ctx))
    }

    fn evaluate_singleton<N: XdmNode>(
        &self,
        ctx: &DynamicContext<N>,
    ) -> Result<Option<XdmItem<N>>, Error> {
        dispatch!(self, n => n.evaluate_singleton(ctx))
    }
}

impl Expr {
    pub fn literal(value: XdmAtomicValue) -> Self {
        Literal::new(value).into()
    }

    pub fn integer(v: i64) -> Self {
        Self::literal(XdmAtomicValue::Integer(v))
    }

    pub fn decimal(v: f64) -> Self {
        Self::literal(XdmAtomicValue::Decimal(v))
    }

    pub fn double(v: f64) -> Self {
        Self::literal(XdmAtomicValue::Double(v))
    }

    pub fn string(s: &str) -> Self {
        Self::literal(XdmAtomicValue::string(s))
    }

    pub fn untyped(s: &str) -> Self {
        Self::literal(XdmAtomicValue::untyped(s))
    }

    pub fn boolean(b: bool) -> Self {
        Self::literal(XdmAtomicValue::Boolean(b))
    }

    pub fn empty() -> Self {
        EmptySequence.into()
    }

    pub fn context_item() -> Self {
        ContextItem::new().into()
    }

    pub fn variable(name: ExpandedName) -> Self {
        VariableRef::new(name).into()
    }

    /// The comma operator.
    pub fn sequence(items: impl IntoIterator<Item = Expr>) -> Self {
        SequenceConstructor::new(items.into_iter().collect()).into()
    }

    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Literal(_) => ExprKind::Literal,
            Expr::EmptySequence(_) => ExprKind::EmptySequence,
            Expr::ContextItem(_) => ExprKind::ContextItem,
            Expr::VariableRef(_) => ExprKind::VariableRef,
            Expr::Sequence(_) => ExprKind::Sequence,
            Expr::TreatAs(_) => ExprKind::TreatAs,
            Expr::CompatibilityStore(_) => ExprKind::StaticCompatibilityStore,
            Expr::Validate(_) => ExprKind::Validate,
            Expr::ArgumentConverter(_) => ExprKind::ArgumentConverter,
            Expr::Atomizer(_) => ExprKind::Atomizer,
            Expr::CompatibilityConverter(_) => ExprKind::CompatibilityConverter,
            Expr::CardinalityVerifier(_) => ExprKind::CardinalityVerifier,
            Expr::ItemVerifier(_) => ExprKind::ItemVerifier,
            Expr::NumericFunction(_) => ExprKind::NumericFunction,
        }
    }

    /// Pre-order traversal.
    pub fn walk(&self, visit: &mut impl FnMut(&Expr)) {
        visit(self);
        for op in self.operands() {
            op.walk(visit);
        }
    }

    /// Node kinds in pre-order; handy for asserting on rewrites.
    pub fn kinds(&self) -> Vec<ExprKind> {
        let mut out = Vec::new();
        self.walk(&mut |e| out.push(e.kind()));
        out
    }

    fn label(&self) -> String {
        match self {
            Expr::Literal(l) => format!("Literal {}", l.value()),
            Expr::VariableRef(v) => format!("VariableRef ${}", v.name()),
            Expr::TreatAs(t) => format!("TreatAs {}", t.req_type()),
            Expr::Validate(v) => format!("Validate {:?}", v.mode()),
            Expr::ArgumentConverter(a) => format!("ArgumentConverter {}", a.target()),
            Expr::CompatibilityConverter(c) => format!("CompatibilityConverter {:?}", c.conversion()),
            Expr::CardinalityVerifier(c) => format!("CardinalityVerifier {}", c.required()),
            Expr::ItemVerifier(i) => format!("ItemVerifier {}", i.required()),
            Expr::NumericFunction(n) => format!("fn:{}", n.function().local_name()),
            other => format!("{:?}", other.kind()),
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} : {}",
            "",
            self.label(),
            self.static_type(),
            indent = depth * 2
        )?;
        for op in self.operands() {
            op.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

/// One line per node, operands indented below their parent.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

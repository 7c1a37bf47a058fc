//! Statically typed XPath/XQuery expression core.
//!
//! The crate models the part of an XQuery engine that sits between the parser and the
//! evaluator: sequence types, the type-check pass that rewrites an expression tree by
//! inserting conversion and verification nodes, and lazy, pull-based evaluation of the
//! rewritten tree against a caller-supplied dynamic context.
//!
//! ```
//! use xpatterns::expr::{Expr, NumericFunction};
//! use xpatterns::engine::runtime::{DynamicContextBuilder, StaticContextBuilder};
//! use xpatterns::model::simple::SimpleNode;
//! use xpatterns::xdm::{XdmAtomicValue, XdmItem};
//! use xpatterns::compile;
//!
//! let static_ctx = StaticContextBuilder::new().build();
//! let expr = Expr::from(NumericFunction::round_half_to_even(Expr::decimal(2.5), None));
//! let compiled = compile(expr, &static_ctx).unwrap();
//! let dyn_ctx = DynamicContextBuilder::<SimpleNode>::new().build();
//! let out = compiled.evaluate(&dyn_ctx).unwrap();
//! assert_eq!(out, vec![XdmItem::Atomic(XdmAtomicValue::Decimal(2.0))]);
//! ```

pub mod compiler;
pub mod consts;
pub mod engine;
pub mod expr;
pub mod iter;
pub mod model;
pub mod types;
pub mod xdm;

pub use compiler::{CompiledExpr, compile, compile_with_required};
pub use engine::runtime::{
    DynamicContext, DynamicContextBuilder, Error, ErrorCode, GenericStaticContext, StaticContext,
    StaticContextBuilder,
};
pub use expr::{Expr, ExprNode, TypeChecker};
pub use model::{NodeKind, QName, XdmNode};
pub use types::{AtomicType, Cardinality, ItemType, SequenceType, parse_sequence_type};
pub use xdm::{ExpandedName, XdmAtomicValue, XdmItem, XdmSequence};

use xpatterns::engine::runtime::{DynamicContextBuilder, StaticContextBuilder};
use xpatterns::expr::{CompatConversion, ExprKind, StaticCompatibilityStore};
use xpatterns::model::simple::{SimpleNode, elem, text};
use xpatterns::types::common;
use xpatterns::xdm::{XdmAtomicValue as A, XdmItem as I};
use xpatterns::{ErrorCode, Expr, ExprNode, ExpandedName, compile_with_required};

#[test]
fn static_type_is_forwarded() {
    let operand = Expr::sequence([Expr::integer(1), Expr::integer(2)]);
    let store = StaticCompatibilityStore::new(operand.clone());
    assert_eq!(store.static_type(), operand.static_type());
}

#[test]
fn store_disappears_after_type_check() {
    let ctx = StaticContextBuilder::new().build();
    let compiled = compile_with_required(
        StaticCompatibilityStore::new(Expr::string("x")).into(),
        &ctx,
        &common::EXACTLY_ONE_STRING,
    )
    .expect("compile");
    assert_eq!(compiled.expr(), &Expr::string("x"));
}

#[test]
fn first_item_is_taken_for_string_parameters() {
    let ctx = StaticContextBuilder::new().build();
    let compiled = compile_with_required(
        StaticCompatibilityStore::new(Expr::sequence([Expr::integer(10), Expr::integer(20)])).into(),
        &ctx,
        &common::EXACTLY_ONE_STRING,
    )
    .expect("compile");
    let Expr::CompatibilityConverter(c) = compiled.expr() else {
        panic!("unexpected tree:\n{}", compiled.expr());
    };
    assert_eq!(c.conversion(), CompatConversion::ToString);
    let dctx = DynamicContextBuilder::<SimpleNode>::new().build();
    assert_eq!(compiled.evaluate(&dctx).expect("eval"), vec![I::Atomic(A::string("10"))]);
}

#[test]
fn empty_sequence_becomes_nan_for_numbers() {
    let ctx = StaticContextBuilder::new().build();
    let compiled = compile_with_required(
        StaticCompatibilityStore::new(Expr::empty()).into(),
        &ctx,
        &common::EXACTLY_ONE_DOUBLE,
    )
    .expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new().build();
    match compiled.evaluate_first(&dctx).expect("eval") {
        Some(I::Atomic(A::Double(d))) => assert!(d.is_nan()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn nodes_use_effective_boolean_value() {
    let name = ExpandedName::local("nodes");
    let sctx = StaticContextBuilder::new()
        .with_variable(name.clone(), common::ZERO_OR_MORE_ITEMS.clone())
        .build();
    let compiled = compile_with_required(
        StaticCompatibilityStore::new(Expr::variable(name.clone())).into(),
        &sctx,
        &common::EXACTLY_ONE_BOOLEAN,
    )
    .expect("compile");
    let root = elem("root").child(text("a")).build();
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_variable(name, vec![I::Node(root.clone()), I::Node(root)])
        .build();
    assert_eq!(compiled.evaluate(&dctx).expect("eval"), vec![I::Atomic(A::Boolean(true))]);
}

#[test]
fn without_the_store_multiple_items_are_rejected() {
    let ctx = StaticContextBuilder::new().build();
    let err = compile_with_required(
        Expr::sequence([Expr::string("a"), Expr::string("b")]),
        &ctx,
        &common::EXACTLY_ONE_STRING,
    )
    .expect_err("cardinality");
    assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
}

#[test]
fn without_the_store_unknown_cardinality_is_checked_at_run_time() {
    let name = ExpandedName::local("v");
    let sctx = StaticContextBuilder::new()
        .with_variable(name.clone(), common::ZERO_OR_MORE_ATOMIC.clone())
        .build();
    let compiled = compile_with_required(Expr::variable(name.clone()), &sctx, &common::EXACTLY_ONE_STRING)
        .expect("compile");
    assert_eq!(compiled.expr().kind(), ExprKind::CardinalityVerifier);
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_variable(name, vec![I::Atomic(A::string("a")), I::Atomic(A::string("b"))])
        .build();
    let err = compiled.evaluate(&dctx).expect_err("cardinality");
    assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
}

use rstest::rstest;
use xpatterns::consts::FNS;
use xpatterns::engine::runtime::{DynamicContextBuilder, StaticContextBuilder};
use xpatterns::expr::{NumericFunction, resolve_numeric_function};
use xpatterns::model::simple::{SimpleNode, elem, text};
use xpatterns::xdm::{XdmAtomicValue as A, XdmItem as I};
use xpatterns::{ErrorCode, Expr, ExpandedName, compile};

fn eval(expr: Expr) -> Result<Vec<I<SimpleNode>>, xpatterns::Error> {
    let sctx = StaticContextBuilder::new().build();
    let dctx = DynamicContextBuilder::<SimpleNode>::new().build();
    compile(expr, &sctx)?.evaluate(&dctx)
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    let sctx = StaticContextBuilder::new().build();
    resolve_numeric_function(&ExpandedName::local(name), args, &sctx).expect("known function")
}

#[rstest]
#[case(2.5, 2.0)]
#[case(3.5, 4.0)]
#[case(-2.5, -2.0)]
#[case(2.51, 3.0)]
fn round_half_to_even_ties(#[case] input: f64, #[case] expected: f64) {
    let out = eval(call("round-half-to-even", vec![Expr::decimal(input)])).expect("eval");
    assert_eq!(out, vec![I::Atomic(A::Decimal(expected))]);
}

#[rstest]
#[case(2.345, 2.34)]
#[case(2.675, 2.68)]
#[case(-2.345, -2.34)]
#[case(2.3451, 2.35)]
fn round_half_to_even_ties_at_positive_precision(#[case] input: f64, #[case] expected: f64) {
    let out = eval(call(
        "round-half-to-even",
        vec![Expr::decimal(input), Expr::integer(2)],
    ))
    .expect("eval");
    assert_eq!(out, vec![I::Atomic(A::Decimal(expected))]);
}

#[rstest]
#[case(-1)]
#[case(1)]
#[case(i64::MIN)]
fn integer_rounded_far_beyond_its_digits_is_zero(#[case] input: i64) {
    let out = eval(call(
        "round-half-to-even",
        vec![Expr::integer(input), Expr::integer(-38)],
    ))
    .expect("eval");
    assert_eq!(out, vec![I::Atomic(A::Integer(0))]);
}

#[rstest]
#[case(2.5)]
#[case(3.567_812)]
#[case(-0.5)]
fn omitted_precision_equals_zero(#[case] input: f64) {
    let implicit = eval(call("round-half-to-even", vec![Expr::double(input)])).expect("eval");
    let explicit = eval(call(
        "round-half-to-even",
        vec![Expr::double(input), Expr::integer(0)],
    ))
    .expect("eval");
    assert_eq!(implicit, explicit);
}

#[rstest]
#[case("floor")]
#[case("ceiling")]
#[case("round")]
#[case("abs")]
#[case("round-half-to-even")]
fn empty_argument_yields_empty_sequence(#[case] name: &str) {
    assert_eq!(eval(call(name, vec![Expr::empty()])).expect("eval"), vec![]);
}

#[rstest]
#[case("floor", A::Integer(5))]
#[case("ceiling", A::Integer(5))]
#[case("round", A::Integer(5))]
#[case("abs", A::Integer(5))]
#[case("round-half-to-even", A::Integer(5))]
fn integer_stays_integer(#[case] name: &str, #[case] expected: A) {
    assert_eq!(
        eval(call(name, vec![Expr::integer(5)])).expect("eval"),
        vec![I::Atomic(expected)]
    );
}

#[rstest]
#[case("floor", -1.5, -2.0)]
#[case("ceiling", -1.5, -1.0)]
#[case("round", -1.5, -1.0)]
#[case("round", 1.5, 2.0)]
#[case("abs", -1.5, 1.5)]
fn doubles(#[case] name: &str, #[case] input: f64, #[case] expected: f64) {
    assert_eq!(
        eval(call(name, vec![Expr::double(input)])).expect("eval"),
        vec![I::Atomic(A::Double(expected))]
    );
}

#[test]
fn negative_precision_rounds_to_tens() {
    let out = eval(call(
        "round-half-to-even",
        vec![Expr::double(35612.25), Expr::integer(-2)],
    ))
    .expect("eval");
    assert_eq!(out, vec![I::Atomic(A::Double(35600.0))]);
}

#[test]
fn untyped_node_content_is_cast_to_double() {
    let name = ExpandedName::local("n");
    let sctx = StaticContextBuilder::new()
        .with_variable(name.clone(), "element()".parse().expect("type"))
        .build();
    let compiled = compile(
        NumericFunction::floor(Expr::variable(name.clone())).into(),
        &sctx,
    )
    .expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_variable(name, vec![I::Node(elem("price").child(text("12.75")).build())])
        .build();
    assert_eq!(compiled.evaluate(&dctx).expect("eval"), vec![I::Atomic(A::Double(12.0))]);
}

#[test]
fn unparsable_untyped_value_is_a_cast_error() {
    let err = eval(NumericFunction::abs(Expr::untyped("twelve")).into()).expect_err("FORG0001");
    assert_eq!(err.code_enum(), ErrorCode::FORG0001);
}

#[test]
fn string_argument_is_rejected() {
    let err = eval(NumericFunction::ceiling(Expr::string("1")).into()).expect_err("XPTY0004");
    assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
}

#[test]
fn two_items_are_rejected() {
    let err = eval(NumericFunction::floor(Expr::sequence([Expr::integer(1), Expr::integer(2)])).into())
        .expect_err("XPTY0004");
    assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
}

#[test]
fn overflowing_abs_fails() {
    let err = eval(NumericFunction::abs(Expr::integer(i64::MIN)).into()).expect_err("FOAR0002");
    assert_eq!(err.code_enum(), ErrorCode::FOAR0002);
}

#[rstest]
#[case(None, "round", 1)]
#[case(Some(FNS), "abs", 1)]
#[case(Some(FNS), "round-half-to-even", 2)]
fn resolves_known_functions(#[case] ns: Option<&str>, #[case] local: &str, #[case] arity: usize) {
    let sctx = StaticContextBuilder::new().build();
    let args = (0..arity).map(|_| Expr::integer(1)).collect();
    assert!(resolve_numeric_function(&ExpandedName::new(ns, local), args, &sctx).is_ok());
}

#[rstest]
#[case(None, "floor", 2)]
#[case(None, "round-half-to-even", 3)]
#[case(None, "ceiling", 0)]
#[case(None, "sqrt", 1)]
#[case(Some("urn:example"), "abs", 1)]
fn unknown_functions_are_static_errors(
    #[case] ns: Option<&str>,
    #[case] local: &str,
    #[case] arity: usize,
) {
    let sctx = StaticContextBuilder::new().build();
    let args = (0..arity).map(|_| Expr::integer(1)).collect();
    let err = resolve_numeric_function(&ExpandedName::new(ns, local), args, &sctx)
        .expect_err("XPST0017");
    assert_eq!(err.code_enum(), ErrorCode::XPST0017);
}

#[test]
fn unprefixed_names_use_the_default_function_namespace() {
    let sctx = StaticContextBuilder::new()
        .with_default_function_namespace("urn:custom")
        .build();
    let err = resolve_numeric_function(&ExpandedName::local("floor"), vec![Expr::integer(1)], &sctx)
        .expect_err("XPST0017");
    assert_eq!(err.code_enum(), ErrorCode::XPST0017);
}

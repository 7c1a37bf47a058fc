use std::sync::Arc;

use rstest::rstest;

use xpatterns::engine::runtime::{
    DynamicContextBuilder, ErrorCode, SchemaValidator, StaticContextBuilder, ValidationMode,
};
use xpatterns::expr::Validate;
use xpatterns::model::simple::{SimpleNode, doc, elem};
use xpatterns::types::common;
use xpatterns::xdm::{XdmAtomicValue as A, XdmItem as I};
use xpatterns::{Error, Expr, ExprNode, ExpandedName, NodeKind, XdmNode, compile};

struct RenamingValidator;

impl SchemaValidator<SimpleNode> for RenamingValidator {
    fn validate(&self, node: &SimpleNode, mode: ValidationMode) -> Result<SimpleNode, Error> {
        assert_eq!(mode, ValidationMode::Strict);
        assert_eq!(node.kind(), NodeKind::Element);
        Ok(elem("validated").build())
    }
}

struct RejectingValidator;

impl SchemaValidator<SimpleNode> for RejectingValidator {
    fn validate(&self, _node: &SimpleNode, _mode: ValidationMode) -> Result<SimpleNode, Error> {
        Err(Error::from_code(ErrorCode::FOER0000, "invalid"))
    }
}

#[test]
fn atomic_operand_is_a_static_type_error() {
    let ctx = StaticContextBuilder::new().build();
    let err = Validate::create(Expr::integer(1), ValidationMode::Lax, &ctx).expect_err("XQTY0030");
    assert_eq!(err.code_enum(), ErrorCode::XQTY0030);
}

#[test]
fn empty_operand_is_a_static_type_error() {
    let ctx = StaticContextBuilder::new().build();
    let err = Validate::create(Expr::empty(), ValidationMode::Lax, &ctx).expect_err("XQTY0030");
    assert_eq!(err.code_enum(), ErrorCode::XQTY0030);
}

#[test]
fn static_type_is_element_or_document() {
    let ctx = StaticContextBuilder::new().build();
    let v = Validate::create(Expr::context_item(), ValidationMode::Lax, &ctx).expect("create");
    assert_eq!(v.static_type(), *common::ELEMENT_OR_DOCUMENT);
}

#[test]
fn lax_without_schema_returns_the_document() {
    let sctx = StaticContextBuilder::new().build();
    let v = Validate::create(Expr::context_item(), ValidationMode::Lax, &sctx).expect("create");
    let compiled = compile(v, &sctx).expect("compile");
    let d = doc().child(elem("root")).build();
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_context_item(I::Node(d.clone()))
        .build();
    assert_eq!(compiled.evaluate(&dctx).expect("eval"), vec![I::Node(d)]);
}

#[test]
fn strict_without_schema_fails() {
    let sctx = StaticContextBuilder::new().build();
    let v = Validate::create(Expr::context_item(), ValidationMode::Strict, &sctx).expect("create");
    let compiled = compile(v, &sctx).expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_context_item(I::Node(elem("root").build()))
        .build();
    let err = compiled.evaluate(&dctx).expect_err("XQDY0084");
    assert_eq!(err.code_enum(), ErrorCode::XQDY0084);
}

#[test]
fn validator_result_replaces_the_operand() {
    let sctx = StaticContextBuilder::new().build();
    let v = Validate::create(Expr::context_item(), ValidationMode::Strict, &sctx).expect("create");
    let compiled = compile(v, &sctx).expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_context_item(I::Node(elem("root").build()))
        .with_schema_validator(Arc::new(RenamingValidator))
        .build();
    let out = compiled.evaluate_first(&dctx).expect("eval");
    let Some(I::Node(n)) = out else {
        panic!("expected a node, got {out:?}");
    };
    assert_eq!(n.name().map(|q| q.local), Some("validated".to_string()));
}

#[test]
fn validator_errors_propagate() {
    let sctx = StaticContextBuilder::new().build();
    let v = Validate::create(Expr::context_item(), ValidationMode::Lax, &sctx).expect("create");
    let compiled = compile(v, &sctx).expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_context_item(I::Node(elem("root").build()))
        .with_schema_validator(Arc::new(RejectingValidator))
        .build();
    let err = compiled.evaluate(&dctx).expect_err("validator error");
    assert_eq!(err.code_enum(), ErrorCode::FOER0000);
}

#[test]
fn atomic_context_item_fails_at_run_time() {
    let sctx = StaticContextBuilder::new().build();
    let v = Validate::create(Expr::context_item(), ValidationMode::Lax, &sctx).expect("create");
    let compiled = compile(v, &sctx).expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_context_item(A::string("text"))
        .build();
    let err = compiled.evaluate(&dctx).expect_err("XQTY0030");
    assert_eq!(err.code_enum(), ErrorCode::XQTY0030);
}

#[test]
fn undeclared_variable_operand_is_reported() {
    let sctx = StaticContextBuilder::new().build();
    let v = Validate::create(
        Expr::variable(ExpandedName::local("missing")),
        ValidationMode::Lax,
        &sctx,
    )
    .expect("create does not check the operand");
    let err = compile(v, &sctx).expect_err("XPST0008");
    assert_eq!(err.code_enum(), ErrorCode::XPST0008);
}

#[rstest]
#[case("xs:string")]
#[case("xs:string?")]
#[case("xs:string*")]
#[case("xs:integer+")]
fn atomic_variable_operand_is_a_static_type_error(#[case] declared: &str) {
    let name = ExpandedName::local("s");
    let sctx = StaticContextBuilder::new()
        .with_variable(name.clone(), declared.parse().expect("type"))
        .build();
    let v = Validate::create(Expr::variable(name), ValidationMode::Lax, &sctx).expect("create");
    let err = compile(v, &sctx).expect_err("XQTY0030");
    assert_eq!(err.code_enum(), ErrorCode::XQTY0030);
}

use rstest::rstest;
use xpatterns::engine::runtime::StaticContextBuilder;
use xpatterns::types::common;
use xpatterns::{AtomicType, Cardinality, ErrorCode, ItemType, NodeKind, SequenceType, parse_sequence_type};

#[rstest]
#[case("xs:integer?", ItemType::Atomic(AtomicType::Integer), Cardinality::zero_or_one())]
#[case("node()*", ItemType::AnyNode, Cardinality::zero_or_more())]
#[case("attribute()+", ItemType::Node(NodeKind::Attribute), Cardinality::one_or_more())]
#[case("xs:anyAtomicType", ItemType::Atomic(AtomicType::AnyAtomic), Cardinality::exactly_one())]
fn parses_item_type_and_occurrence(
    #[case] input: &str,
    #[case] item: ItemType,
    #[case] card: Cardinality,
) {
    let ty: SequenceType = input.parse().expect("parse");
    assert_eq!(ty.item_type(), &item);
    assert_eq!(ty.cardinality(), card);
}

#[test]
fn empty_sequence_has_empty_cardinality() {
    let ty: SequenceType = "empty-sequence()".parse().expect("parse");
    assert!(ty.is_empty_sequence());
    assert_eq!(ty, common::EMPTY_SEQUENCE);
}

#[test]
fn element_or_document_union() {
    let ty: SequenceType = "(element() | document-node())".parse().expect("parse");
    assert_eq!(ty, *common::ELEMENT_OR_DOCUMENT);
}

#[test]
fn bound_schema_prefix_resolves() {
    let ctx = StaticContextBuilder::new()
        .with_namespace("xsd", "http://www.w3.org/2001/XMLSchema")
        .build();
    let ty = parse_sequence_type("xsd:string*", &ctx).expect("parse");
    assert_eq!(ty.to_string(), "xs:string*");
}

#[rstest]
#[case("xs:integer+?", ErrorCode::XPST0003)]
#[case("nope:integer", ErrorCode::XPST0081)]
#[case("xs:date", ErrorCode::XPST0051)]
fn invalid_types_are_static_errors(#[case] input: &str, #[case] code: ErrorCode) {
    let err = input.parse::<SequenceType>().expect_err("error");
    assert_eq!(err.code_enum(), code);
}

#[rstest]
#[case("xs:integer", "xs:decimal?", true)]
#[case("xs:integer*", "xs:integer+", false)]
#[case("element()", "node()", true)]
#[case("empty-sequence()", "xs:string?", true)]
#[case("xs:string", "xs:anyAtomicType", true)]
#[case("node()", "element()", false)]
fn subtype_relation(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
    let a: SequenceType = a.parse().expect("parse");
    let b: SequenceType = b.parse().expect("parse");
    assert_eq!(a.is_subtype_of(&b), expected);
}

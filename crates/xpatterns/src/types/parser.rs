use core::str::FromStr;
use pest::Parser;
use pest::iterators::Pair;

use super::{AtomicType, Cardinality, ItemType, MultiItemType, SequenceType};
use crate::consts::XS;
use crate::engine::runtime::{Error, ErrorCode, StaticContext, StaticContextBuilder};
use crate::model::NodeKind;

#[derive(pest_derive::Parser)]
#[grammar = "types/sequence_type.pest"]
pub struct SequenceTypeParser;

/// Parse the textual form of a sequence type, e.g. `xs:integer?` or `element()+`.
///
/// Prefixes are resolved against `ctx`; an unprefixed atomic type name is taken from the
/// XML Schema namespace.
pub fn parse_sequence_type(input: &str, ctx: &dyn StaticContext) -> Result<SequenceType, Error> {
    let mut pairs = SequenceTypeParser::parse(Rule::sequence_type, input)?;
    let Some(root) = pairs.next() else {
        return Err(Error::from_code(ErrorCode::XPST0003, "empty sequence type"));
    };
    let mut item = None;
    let mut cardinality = Cardinality::exactly_one();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::empty_sequence => return Ok(SequenceType::empty()),
            Rule::item_type => item = Some(build_item_type(pair, ctx)?),
            Rule::occurrence => {
                cardinality = match pair.as_str() {
                    "?" => Cardinality::zero_or_one(),
                    "*" => Cardinality::zero_or_more(),
                    _ => Cardinality::one_or_more(),
                };
            }
            _ => {}
        }
    }
    let Some(item) = item else {
        return Err(Error::from_code(
            ErrorCode::XPST0003,
            format!("missing item type in '{input}'"),
        ));
    };
    SequenceType::new(item, cardinality)
}

fn build_item_type(pair: Pair<'_, Rule>, ctx: &dyn StaticContext) -> Result<ItemType, Error> {
    let Some(inner) = pair.into_inner().next() else {
        return Err(Error::from_code(ErrorCode::XPST0003, "missing item type"));
    };
    match inner.as_rule() {
        Rule::any_item => Ok(ItemType::Item),
        Rule::kind_test => Ok(build_kind_test(inner)),
        Rule::union_type => {
            let members = inner
                .into_inner()
                .map(|p| build_item_type(p, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MultiItemType::new(members))
        }
        Rule::atomic_type => build_atomic_type(inner, ctx),
        other => Err(Error::from_code(
            ErrorCode::XPST0003,
            format!("unexpected {other:?} in item type"),
        )),
    }
}

fn build_kind_test(pair: Pair<'_, Rule>) -> ItemType {
    let kind = pair.into_inner().next().map(|p| p.as_rule());
    match kind {
        Some(Rule::document_test) => ItemType::Node(NodeKind::Document),
        Some(Rule::element_test) => ItemType::Node(NodeKind::Element),
        Some(Rule::attribute_test) => ItemType::Node(NodeKind::Attribute),
        Some(Rule::text_test) => ItemType::Node(NodeKind::Text),
        Some(Rule::comment_test) => ItemType::Node(NodeKind::Comment),
        Some(Rule::pi_test) => ItemType::Node(NodeKind::ProcessingInstruction),
        Some(Rule::namespace_test) => ItemType::Node(NodeKind::Namespace),
        _ => ItemType::AnyNode,
    }
}

fn build_atomic_type(pair: Pair<'_, Rule>, ctx: &dyn StaticContext) -> Result<ItemType, Error> {
    let text = pair.as_str();
    let mut prefix = None;
    let mut local = "";
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::prefix => prefix = Some(p.as_str()),
            Rule::local_name => local = p.as_str(),
            _ => {}
        }
    }
    let ns = match prefix {
        Some(pfx) => ctx.namespace_uri(pfx).ok_or_else(|| {
            Error::from_code(
                ErrorCode::XPST0081,
                format!("namespace prefix '{pfx}' is not bound"),
            )
        })?,
        None => XS,
    };
    if ns != XS {
        return Err(Error::from_code(
            ErrorCode::XPST0051,
            format!("'{text}' is not a known atomic type"),
        ));
    }
    AtomicType::from_local_name(local)
        .map(ItemType::Atomic)
        .ok_or_else(|| {
            Error::from_code(
                ErrorCode::XPST0051,
                format!("'{text}' is not a known atomic type"),
            )
        })
}

impl FromStr for SequenceType {
    type Err = Error;

    /// Parse with the default prefix bindings (`xs`, `fn`, `xml`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sequence_type(s, &StaticContextBuilder::new().build())
    }
}

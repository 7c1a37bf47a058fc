//! Shared sequence types referenced across expression nodes.

use std::sync::LazyLock;

use super::{AtomicType, Cardinality, ItemType, MultiItemType, SequenceType};
use crate::model::NodeKind;

const fn atomic(t: AtomicType, c: Cardinality) -> SequenceType {
    SequenceType::new_unchecked(ItemType::Atomic(t), c)
}

pub static ZERO_OR_MORE_ITEMS: SequenceType =
    SequenceType::new_unchecked(ItemType::Item, Cardinality::zero_or_more());
pub static ZERO_OR_ONE_ITEM: SequenceType =
    SequenceType::new_unchecked(ItemType::Item, Cardinality::zero_or_one());
pub static EXACTLY_ONE_ITEM: SequenceType =
    SequenceType::new_unchecked(ItemType::Item, Cardinality::exactly_one());
pub static EMPTY_SEQUENCE: SequenceType = SequenceType::empty();

pub static ZERO_OR_MORE_ATOMIC: SequenceType =
    atomic(AtomicType::AnyAtomic, Cardinality::zero_or_more());
pub static ZERO_OR_ONE_NUMERIC: SequenceType =
    atomic(AtomicType::Numeric, Cardinality::zero_or_one());
pub static EXACTLY_ONE_INTEGER: SequenceType =
    atomic(AtomicType::Integer, Cardinality::exactly_one());
pub static EXACTLY_ONE_DOUBLE: SequenceType =
    atomic(AtomicType::Double, Cardinality::exactly_one());
pub static EXACTLY_ONE_STRING: SequenceType =
    atomic(AtomicType::String, Cardinality::exactly_one());
pub static EXACTLY_ONE_BOOLEAN: SequenceType =
    atomic(AtomicType::Boolean, Cardinality::exactly_one());

/// `(element() | document-node())`, exactly one: the operand type of `validate`.
pub static ELEMENT_OR_DOCUMENT: LazyLock<SequenceType> = LazyLock::new(|| {
    SequenceType::new_unchecked(
        MultiItemType::new([
            ItemType::Node(NodeKind::Element),
            ItemType::Node(NodeKind::Document),
        ]),
        Cardinality::exactly_one(),
    )
});

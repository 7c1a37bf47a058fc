use core::fmt;
use itertools::Itertools;
use std::sync::Arc;

use crate::model::{NodeKind, XdmNode};
use crate::xdm::XdmItem;

/// Built-in atomic types known to the type checker.
///
/// `Numeric` is the pseudo-union `xs:decimal | xs:double | xs:float` used in function
/// signatures; it never is the dynamic type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicType {
    AnyAtomic,
    UntypedAtomic,
    String,
    Boolean,
    AnyUri,
    QName,
    Numeric,
    Decimal,
    Integer,
    Double,
    Float,
}

impl AtomicType {
    pub fn parent(self) -> Option<AtomicType> {
        match self {
            AtomicType::AnyAtomic => None,
            AtomicType::UntypedAtomic
            | AtomicType::String
            | AtomicType::Boolean
            | AtomicType::AnyUri
            | AtomicType::QName
            | AtomicType::Numeric => Some(AtomicType::AnyAtomic),
            AtomicType::Decimal | AtomicType::Double | AtomicType::Float => {
                Some(AtomicType::Numeric)
            }
            AtomicType::Integer => Some(AtomicType::Decimal),
        }
    }

    pub fn is_subtype_of(self, other: AtomicType) -> bool {
        let mut cur = Some(self);
        while let Some(t) = cur {
            if t == other {
                return true;
            }
            cur = t.parent();
        }
        false
    }

    pub fn is_numeric(self) -> bool {
        self.is_subtype_of(AtomicType::Numeric)
    }

    /// Nearest common supertype.
    pub fn common_supertype(self, other: AtomicType) -> AtomicType {
        let mut cur = Some(self);
        while let Some(t) = cur {
            if other.is_subtype_of(t) {
                return t;
            }
            cur = t.parent();
        }
        AtomicType::AnyAtomic
    }

    pub fn local_name(self) -> &'static str {
        match self {
            AtomicType::AnyAtomic => "anyAtomicType",
            AtomicType::UntypedAtomic => "untypedAtomic",
            AtomicType::String => "string",
            AtomicType::Boolean => "boolean",
            AtomicType::AnyUri => "anyURI",
            AtomicType::QName => "QName",
            AtomicType::Numeric => "numeric",
            AtomicType::Decimal => "decimal",
            AtomicType::Integer => "integer",
            AtomicType::Double => "double",
            AtomicType::Float => "float",
        }
    }

    pub fn from_local_name(name: &str) -> Option<AtomicType> {
        Some(match name {
            "anyAtomicType" => AtomicType::AnyAtomic,
            "untypedAtomic" => AtomicType::UntypedAtomic,
            "string" => AtomicType::String,
            "boolean" => AtomicType::Boolean,
            "anyURI" => AtomicType::AnyUri,
            "QName" => AtomicType::QName,
            "numeric" => AtomicType::Numeric,
            "decimal" => AtomicType::Decimal,
            "integer" => AtomicType::Integer,
            "double" => AtomicType::Double,
            "float" => AtomicType::Float,
            _ => return None,
        })
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.local_name())
    }
}

/// Classifier for single items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// Matches no item; only meaningful as the item type of `empty-sequence()`.
    Empty,
    Item,
    AnyNode,
    Node(NodeKind),
    Atomic(AtomicType),
    Multi(MultiItemType),
}

/// Union of two or more item types that are not subtypes of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiItemType(Arc<[ItemType]>);

impl MultiItemType {
    /// Build a union, flattening nested unions and dropping members subsumed by others.
    /// Collapses to the single remaining member, or `Empty` when nothing remains.
    pub fn new(members: impl IntoIterator<Item = ItemType>) -> ItemType {
        let mut flat: Vec<ItemType> = Vec::new();
        for m in members {
            match m {
                ItemType::Multi(inner) => flat.extend(inner.0.iter().cloned()),
                ItemType::Empty => {}
                other => flat.push(other),
            }
        }
        let mut kept: Vec<ItemType> = Vec::with_capacity(flat.len());
        for (i, t) in flat.iter().enumerate() {
            let subsumed = flat.iter().enumerate().any(|(j, o)| {
                j != i && t.is_subtype_of(o) && (!o.is_subtype_of(t) || j < i)
            });
            if !subsumed {
                kept.push(t.clone());
            }
        }
        match kept.len() {
            0 => ItemType::Empty,
            1 => kept.pop().unwrap_or(ItemType::Empty),
            _ => ItemType::Multi(MultiItemType(kept.into())),
        }
    }

    pub fn members(&self) -> &[ItemType] {
        &self.0
    }
}

fn kind_test_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Document => "document-node()",
        NodeKind::Element => "element()",
        NodeKind::Attribute => "attribute()",
        NodeKind::Text => "text()",
        NodeKind::Comment => "comment()",
        NodeKind::ProcessingInstruction => "processing-instruction()",
        NodeKind::Namespace => "namespace-node()",
    }
}

impl ItemType {
    pub fn atomic(t: AtomicType) -> Self {
        ItemType::Atomic(t)
    }

    pub fn is_node_type(&self) -> bool {
        match self {
            ItemType::AnyNode | ItemType::Node(_) => true,
            ItemType::Multi(m) => m.members().iter().all(ItemType::is_node_type),
            _ => false,
        }
    }

    pub fn is_atomic_type(&self) -> bool {
        match self {
            ItemType::Atomic(_) => true,
            ItemType::Multi(m) => m.members().iter().all(ItemType::is_atomic_type),
            _ => false,
        }
    }

    /// Every item matching `self` also matches `other`.
    pub fn is_subtype_of(&self, other: &ItemType) -> bool {
        match (self, other) {
            (ItemType::Empty, _) | (_, ItemType::Item) => true,
            (ItemType::Item, _) | (_, ItemType::Empty) => false,
            (ItemType::Multi(m), o) => m.members().iter().all(|t| t.is_subtype_of(o)),
            (s, ItemType::Multi(m)) => m.members().iter().any(|t| s.is_subtype_of(t)),
            (ItemType::AnyNode | ItemType::Node(_), ItemType::AnyNode) => true,
            (ItemType::Node(a), ItemType::Node(b)) => a == b,
            (ItemType::Atomic(a), ItemType::Atomic(b)) => a.is_subtype_of(*b),
            _ => false,
        }
    }

    /// Some item could match both types.
    pub fn overlaps(&self, other: &ItemType) -> bool {
        match (self, other) {
            (ItemType::Empty, _) | (_, ItemType::Empty) => false,
            (ItemType::Item, _) | (_, ItemType::Item) => true,
            (ItemType::Multi(m), o) | (o, ItemType::Multi(m)) => {
                m.members().iter().any(|t| t.overlaps(o))
            }
            (ItemType::AnyNode, ItemType::AnyNode | ItemType::Node(_))
            | (ItemType::Node(_), ItemType::AnyNode) => true,
            (ItemType::Node(a), ItemType::Node(b)) => a == b,
            (ItemType::Atomic(a), ItemType::Atomic(b)) => {
                a.is_subtype_of(*b) || b.is_subtype_of(*a)
            }
            _ => false,
        }
    }

    /// Least type covering both.
    pub fn union(&self, other: &ItemType) -> ItemType {
        if self.is_subtype_of(other) {
            return other.clone();
        }
        if other.is_subtype_of(self) {
            return self.clone();
        }
        match (self, other) {
            (ItemType::Atomic(a), ItemType::Atomic(b)) => {
                ItemType::Atomic(a.common_supertype(*b))
            }
            (a, b) if a.is_node_type() && b.is_node_type() => {
                MultiItemType::new([a.clone(), b.clone()])
            }
            _ => ItemType::Item,
        }
    }

    pub fn matches<N: XdmNode>(&self, item: &XdmItem<N>) -> bool {
        match (self, item) {
            (ItemType::Empty, _) => false,
            (ItemType::Item, _) | (ItemType::AnyNode, XdmItem::Node(_)) => true,
            (ItemType::Node(k), XdmItem::Node(n)) => n.kind() == *k,
            (ItemType::Atomic(t), XdmItem::Atomic(a)) => a.atomic_type().is_subtype_of(*t),
            (ItemType::Multi(m), it) => m.members().iter().any(|t| t.matches(it)),
            _ => false,
        }
    }

    /// Item type of the atomized value of an item of this type, over untyped trees.
    pub fn atomized(&self) -> ItemType {
        match self {
            ItemType::Empty | ItemType::Atomic(_) => self.clone(),
            ItemType::Node(NodeKind::Comment | NodeKind::ProcessingInstruction | NodeKind::Namespace) => {
                ItemType::Atomic(AtomicType::String)
            }
            ItemType::Node(_) => ItemType::Atomic(AtomicType::UntypedAtomic),
            ItemType::Item | ItemType::AnyNode => ItemType::Atomic(AtomicType::AnyAtomic),
            ItemType::Multi(m) => m
                .members()
                .iter()
                .map(ItemType::atomized)
                .reduce(|a, b| a.union(&b))
                .unwrap_or(ItemType::Empty),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Empty => f.write_str("empty-sequence()"),
            ItemType::Item => f.write_str("item()"),
            ItemType::AnyNode => f.write_str("node()"),
            ItemType::Node(k) => f.write_str(kind_test_name(*k)),
            ItemType::Atomic(t) => write!(f, "{t}"),
            ItemType::Multi(m) => write!(f, "({})", m.members().iter().join(" | ")),
        }
    }
}

//! Simple in-memory tree implementation of `XdmNode` for tests, benches and examples.
//!
//! ```
//! use xpatterns::model::simple::{attr, doc, elem, text};
//! use xpatterns::XdmNode;
//!
//! // <root id="r"><child>Hello</child></root>
//! let document = doc()
//!     .child(elem("root").attr(attr("id", "r")).child(elem("child").child(text("Hello"))))
//!     .build();
//! let root = document.children()[0].clone();
//! assert_eq!(root.name().unwrap().local, "root");
//! assert_eq!(root.parent(), Some(document.clone()));
//! assert_eq!(document.string_value(), "Hello");
//! ```
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use crate::model::{NodeKind, QName, XdmNode};

struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    parent: OnceLock<Weak<Inner>>,
    attributes: Vec<SimpleNode>,
    children: Vec<SimpleNode>,
}

/// Arc-backed immutable node. Equality is identity.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    fn leaf(kind: NodeKind, name: Option<QName>, value: &str) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value: Some(value.to_string()),
            parent: OnceLock::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None)
    }

    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(QName::local(name)))
    }

    pub fn attribute(name: &str, value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Attribute, Some(QName::local(name)), value)
    }

    pub fn text(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Text, None, value)
    }

    pub fn comment(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Comment, None, value)
    }
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    attributes: Vec<SimpleNode>,
    children: Vec<SimpleNode>,
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}

impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>) -> Self {
        Self {
            kind,
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        let node = match child.into() {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        };
        self.children.push(node);
        self
    }

    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.attributes.push(attr);
        self
    }

    /// Finalize the node. Parent links of attributes and children are set once here;
    /// a node attached to a second parent keeps its first one.
    pub fn build(self) -> SimpleNode {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            for n in self.attributes.iter().chain(&self.children) {
                let _ = n.0.parent.set(weak.clone());
            }
            Inner {
                kind: self.kind,
                name: self.name,
                value: None,
                parent: OnceLock::new(),
                attributes: self.attributes,
                children: self.children,
            }
        });
        SimpleNode(inner)
    }
}

pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn attr(name: &str, v: &str) -> SimpleNode {
    SimpleNode::attribute(name, v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

impl XdmNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }

    fn string_value(&self) -> String {
        match self.0.kind {
            NodeKind::Element | NodeKind::Document => {
                fn dfs(n: &SimpleNode, out: &mut String) {
                    for c in &n.0.children {
                        match c.0.kind {
                            NodeKind::Text => out.push_str(c.0.value.as_deref().unwrap_or("")),
                            NodeKind::Element => dfs(c, out),
                            _ => {}
                        }
                    }
                }
                let mut out = String::new();
                dfs(self, &mut out);
                out
            }
            _ => self.0.value.clone().unwrap_or_default(),
        }
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.get().and_then(Weak::upgrade).map(SimpleNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.clone()
    }

    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdm::XdmAtomicValue;

    #[test]
    fn string_value_concatenates_descendant_text() {
        let root = elem("r")
            .attr(attr("a", "ignored"))
            .child(text("x"))
            .child(comment("skip"))
            .child(elem("c").child(text("y")))
            .build();
        assert_eq!(root.string_value(), "xy");
        assert_eq!(root.attributes()[0].parent(), Some(root.clone()));
    }

    #[test]
    fn typed_value_is_untyped_for_elements() {
        let e = elem("n").child(text("42")).build();
        assert_eq!(e.typed_value(), vec![XdmAtomicValue::untyped("42")]);
        assert_eq!(comment("c").typed_value(), vec![XdmAtomicValue::string("c")]);
    }
}

use crate::xdm::XdmAtomicValue;

pub mod simple;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            ns_uri: None,
        }
    }
}

/// Host tree abstraction. Node identity is `Eq`; items hold nodes by value, so
/// implementations are expected to be cheap handles.
pub trait XdmNode: Clone + Eq + core::fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    fn string_value(&self) -> String;
    fn base_uri(&self) -> Option<String> {
        None
    }

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;
    fn attributes(&self) -> Vec<Self>;

    /// Typed value used by atomization. Untyped trees yield `xs:untypedAtomic`
    /// for every node kind except comments and processing instructions, which are strings.
    fn typed_value(&self) -> Vec<XdmAtomicValue> {
        let s = self.string_value();
        match self.kind() {
            NodeKind::Comment | NodeKind::ProcessingInstruction | NodeKind::Namespace => {
                vec![XdmAtomicValue::string(s)]
            }
            _ => vec![XdmAtomicValue::untyped(s)],
        }
    }
}

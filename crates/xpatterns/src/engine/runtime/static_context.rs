use crate::consts::{FNS, XML_URI, XS};
use crate::types::SequenceType;
use crate::xdm::ExpandedName;
use std::collections::HashMap;

/// Compile-time policy consulted while type-checking an expression tree.
///
/// Decorators wrap another context and override only the knobs they change, forwarding
/// everything else to the wrapped context.
pub trait StaticContext {
    /// Whether XPath 1.0 compatibility rules govern function conversion.
    fn xpath10_compatibility(&self) -> bool;
    fn base_uri(&self) -> Option<&str>;
    fn default_function_namespace(&self) -> Option<&str>;
    fn namespace_uri(&self, prefix: &str) -> Option<&str>;
    /// Declared type of an in-scope variable, `None` when undeclared.
    fn variable_type(&self, name: &ExpandedName) -> Option<&SequenceType>;
    /// Static type of the context item, `None` when the focus is undefined.
    fn context_item_type(&self) -> Option<&SequenceType>;
}

#[derive(Debug, Clone)]
pub struct GenericStaticContext {
    pub base_uri: Option<String>,
    pub default_function_namespace: Option<String>,
    pub namespaces: HashMap<String, String>,
    pub variables: HashMap<ExpandedName, SequenceType>,
    pub context_item_type: Option<SequenceType>,
    pub xpath10_compatibility: bool,
}

impl Default for GenericStaticContext {
    fn default() -> Self {
        let mut namespaces = HashMap::new();
        // xml is implicitly bound and cannot be overridden
        namespaces.insert("xml".to_string(), XML_URI.to_string());
        namespaces.insert("xs".to_string(), XS.to_string());
        namespaces.insert("fn".to_string(), FNS.to_string());
        Self {
            base_uri: None,
            default_function_namespace: Some(FNS.to_string()),
            namespaces,
            variables: HashMap::new(),
            context_item_type: None,
            xpath10_compatibility: false,
        }
    }
}

impl StaticContext for GenericStaticContext {
    fn xpath10_compatibility(&self) -> bool {
        self.xpath10_compatibility
    }

    fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    fn default_function_namespace(&self) -> Option<&str> {
        self.default_function_namespace.as_deref()
    }

    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    fn variable_type(&self, name: &ExpandedName) -> Option<&SequenceType> {
        self.variables.get(name)
    }

    fn context_item_type(&self) -> Option<&SequenceType> {
        self.context_item_type.as_ref()
    }
}

/// Builder for [`GenericStaticContext`]. Keeps the implicit `xml` binding intact.
pub struct StaticContextBuilder {
    ctx: GenericStaticContext,
}

impl Default for StaticContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: GenericStaticContext::default(),
        }
    }

    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.ctx.base_uri = Some(uri.into());
        self
    }

    pub fn with_default_function_namespace(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_function_namespace = Some(uri.into());
        self
    }

    /// Register a namespace prefix → URI mapping. Attempts to override the reserved `xml`
    /// prefix are ignored.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let p = prefix.into();
        if p == "xml" {
            return self;
        }
        self.ctx.namespaces.insert(p, uri.into());
        self
    }

    /// Declare an in-scope variable with its static type.
    pub fn with_variable(mut self, name: ExpandedName, ty: SequenceType) -> Self {
        self.ctx.variables.insert(name, ty);
        self
    }

    pub fn with_context_item_type(mut self, ty: SequenceType) -> Self {
        self.ctx.context_item_type = Some(ty);
        self
    }

    pub fn with_xpath10_compatibility(mut self, enabled: bool) -> Self {
        self.ctx.xpath10_compatibility = enabled;
        self
    }

    pub fn build(self) -> GenericStaticContext {
        self.ctx
    }
}

/// Decorator switching on XPath 1.0 compatibility for everything type-checked beneath it.
pub struct StaticCompatibilityContext<'a> {
    inner: &'a dyn StaticContext,
}

impl<'a> StaticCompatibilityContext<'a> {
    pub fn new(inner: &'a dyn StaticContext) -> Self {
        Self { inner }
    }
}

impl StaticContext for StaticCompatibilityContext<'_> {
    fn xpath10_compatibility(&self) -> bool {
        true
    }

    fn base_uri(&self) -> Option<&str> {
        self.inner.base_uri()
    }

    fn default_function_namespace(&self) -> Option<&str> {
        self.inner.default_function_namespace()
    }

    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.inner.namespace_uri(prefix)
    }

    fn variable_type(&self, name: &ExpandedName) -> Option<&SequenceType> {
        self.inner.variable_type(name)
    }

    fn context_item_type(&self) -> Option<&SequenceType> {
        self.inner.context_item_type()
    }
}

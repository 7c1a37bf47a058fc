use super::Error;
use crate::model::XdmNode;
use crate::xdm::{ExpandedName, XdmItem};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    Lax,
    Strict,
}

/// Host hook performing schema validation of an element or document node.
///
/// Returns the validated (possibly re-typed) node.
pub trait SchemaValidator<N>: Send + Sync {
    fn validate(&self, node: &N, mode: ValidationMode) -> Result<N, Error>;
}

/// Run-time environment for one evaluation. Passed by reference through every
/// `evaluate_*` call and never mutated by expression nodes.
#[derive(Clone)]
pub struct DynamicContext<N> {
    pub context_item: Option<XdmItem<N>>,
    pub variables: HashMap<ExpandedName, Arc<[XdmItem<N>]>>,
    pub schema_validator: Option<Arc<dyn SchemaValidator<N>>>,
}

impl<N> Default for DynamicContext<N> {
    fn default() -> Self {
        Self {
            context_item: None,
            variables: HashMap::new(),
            schema_validator: None,
        }
    }
}

impl<N: XdmNode> DynamicContext<N> {
    pub fn variable(&self, name: &ExpandedName) -> Option<&Arc<[XdmItem<N>]>> {
        self.variables.get(name)
    }
}

pub struct DynamicContextBuilder<N> {
    ctx: DynamicContext<N>,
}

impl<N: XdmNode> Default for DynamicContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: XdmNode> DynamicContextBuilder<N> {
    pub fn new() -> Self {
        Self {
            ctx: DynamicContext::default(),
        }
    }

    pub fn with_context_item(mut self, item: impl Into<XdmItem<N>>) -> Self {
        self.ctx.context_item = Some(item.into());
        self
    }

    pub fn with_variable(mut self, name: ExpandedName, value: impl Into<Vec<XdmItem<N>>>) -> Self {
        self.ctx.variables.insert(name, Arc::from(value.into()));
        self
    }

    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator<N>>) -> Self {
        self.ctx.schema_validator = Some(validator);
        self
    }

    pub fn build(self) -> DynamicContext<N> {
        self.ctx
    }
}

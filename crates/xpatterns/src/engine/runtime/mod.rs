//! Compile-time and run-time environments plus the crate-wide error type.

mod dynamic_context;
mod error;
mod static_context;

pub use dynamic_context::{DynamicContext, DynamicContextBuilder, SchemaValidator, ValidationMode};
pub use error::{ERR_NS, Error, ErrorCode};
pub use static_context::{
    GenericStaticContext, StaticCompatibilityContext, StaticContext, StaticContextBuilder,
};

//! Namespace URIs shared across the crate.

/// XML Schema namespace; home of the built-in atomic types.
pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
/// Default function namespace.
pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
/// Namespace of W3C-defined error codes (xqt-errors).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

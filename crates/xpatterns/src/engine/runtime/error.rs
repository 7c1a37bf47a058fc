use crate::xdm::ExpandedName;
use core::fmt;
use std::sync::Arc;

/// Namespace URI used for W3C-defined XPath/XQuery error codes (xqt-errors).
pub use crate::consts::ERR_NS;

/// The error codes this engine raises.
///
/// The codes are part of the language's observable contract; callers match on them via
/// `Error::code_enum()` instead of comparing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FOAR0002, // numeric overflow
    FOCA0002, // invalid lexical value / NaN where an integer is required
    FOER0000, // unidentified error
    FORG0001, // invalid value for cast
    FORG0006, // invalid argument type for effective boolean value
    XPDY0002, // context item or variable value absent
    XPDY0050, // treat as failed
    XPST0003, // syntax error / contradictory sequence type
    XPST0008, // undeclared variable
    XPST0017, // unknown function or wrong arity
    XPST0051, // unknown atomic type
    XPST0081, // unbound namespace prefix
    XPTY0004, // static or dynamic type error
    XQDY0084, // strict validation without a schema element declaration
    XQTY0030, // validate operand is not exactly one element or document node
    Unknown,
}

impl ErrorCode {
    pub fn local_name(&self) -> &'static str {
        match self {
            ErrorCode::FOAR0002 => "FOAR0002",
            ErrorCode::FOCA0002 => "FOCA0002",
            ErrorCode::FOER0000 => "FOER0000",
            ErrorCode::FORG0001 => "FORG0001",
            ErrorCode::FORG0006 => "FORG0006",
            ErrorCode::XPDY0002 => "XPDY0002",
            ErrorCode::XPDY0050 => "XPDY0050",
            ErrorCode::XPST0003 => "XPST0003",
            ErrorCode::XPST0008 => "XPST0008",
            ErrorCode::XPST0017 => "XPST0017",
            ErrorCode::XPST0051 => "XPST0051",
            ErrorCode::XPST0081 => "XPST0081",
            ErrorCode::XPTY0004 => "XPTY0004",
            ErrorCode::XQDY0084 => "XQDY0084",
            ErrorCode::XQTY0030 => "XQTY0030",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// The QName of this code in the `http://www.w3.org/2005/xqt-errors` namespace.
    pub fn qname(&self) -> ExpandedName {
        ExpandedName::new(Some(ERR_NS), self.local_name())
    }

    pub fn from_code(s: &str) -> Self {
        use ErrorCode::*;
        match s {
            "err:FOAR0002" => FOAR0002,
            "err:FOCA0002" => FOCA0002,
            "err:FOER0000" => FOER0000,
            "err:FORG0001" => FORG0001,
            "err:FORG0006" => FORG0006,
            "err:XPDY0002" => XPDY0002,
            "err:XPDY0050" => XPDY0050,
            "err:XPST0003" => XPST0003,
            "err:XPST0008" => XPST0008,
            "err:XPST0017" => XPST0017,
            "err:XPST0051" => XPST0051,
            "err:XPST0081" => XPST0081,
            "err:XPTY0004" => XPTY0004,
            "err:XQDY0084" => XQDY0084,
            "err:XQTY0030" => XQTY0030,
            _ => Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "err:{}", self.local_name())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ExpandedName,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new_qname(code: ExpandedName, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            source: None,
        }
    }

    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new_qname(code.qname(), msg)
    }

    pub fn code_enum(&self) -> ErrorCode {
        // Only ERR_NS codes map to the enum; others are Unknown.
        if self.code.ns_uri() == Some(ERR_NS) {
            ErrorCode::from_code(&format!("err:{}", self.code.local))
        } else {
            ErrorCode::Unknown
        }
    }

    /// Format the code as `err:LOCAL`, or `Q{ns}local` outside the error namespace.
    pub fn format_code(&self) -> String {
        if self.code.ns_uri() == Some(ERR_NS) {
            format!("err:{}", self.code.local)
        } else {
            self.code.to_string()
        }
    }

    /// Compose an error with a source cause.
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::XPTY0004, msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.format_code())
    }
}

impl From<pest::error::Error<crate::types::parser::Rule>> for Error {
    fn from(e: pest::error::Error<crate::types::parser::Rule>) -> Self {
        Error::from_code(ErrorCode::XPST0003, "invalid sequence type syntax")
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

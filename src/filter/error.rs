use crate::xml::XmlError;
use std::fmt;
use thiserror::Error;

/// Why no filter tree could be built from a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document does not contain <Filter>")]
    MissingFilterMarker,

    #[error("document is not well-formed XML")]
    Xml(#[from] XmlError),

    #[error("no top-level Filter element")]
    NoFilterElement,

    #[error("Filter element has no child element")]
    EmptyFilter,

    #[error("unsupported filter element <{0}>")]
    UnsupportedRoot(String),

    #[error("filter nesting exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Operand slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Why a node produced no expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{label}: missing {side} operand")]
    MissingOperand { label: String, side: Side },

    #[error("{label}: {side} operand must be {expected}, found {found}")]
    UnexpectedOperand {
        label: String,
        side: Side,
        expected: &'static str,
        found: String,
    },

    #[error("{label}: operand has no text value")]
    MissingValue { label: String },

    #[error("{label}: expected two bounds, found {parts}")]
    MalformedBoundary { label: String, parts: usize },

    #[error("{label}: wildCard, singleChar and escapeChar must all be non-empty")]
    InvalidLikePattern { label: String },

    #[error("{label}: spatial filters are not compiled to expressions")]
    SpatialUnsupported { label: String },

    #[error("{label}: not a filter expression")]
    NotAnExpression { label: String },
}

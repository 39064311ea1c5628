//! Filter category predicates over element names.
//!
//! All matching is case-insensitive against fixed vocabularies. An empty
//! label matches nothing.

use super::ast::{BinaryOp, LogicalOp};

pub const BBOX: &str = "BBOX";
pub const PROPERTY_IS_LIKE: &str = "PropertyIsLike";
pub const PROPERTY_IS_BETWEEN: &str = "PropertyIsBetween";
pub const PROPERTY_NAME: &str = "PropertyName";
pub const LITERAL: &str = "Literal";
pub const LOWER_BOUNDARY: &str = "LowerBoundary";
pub const UPPER_BOUNDARY: &str = "UpperBoundary";

/// AND, OR or NOT.
pub fn is_logical(label: &str) -> bool {
    LogicalOp::from_label(label).is_some()
}

pub fn is_spatial(label: &str) -> bool {
    label.eq_ignore_ascii_case(BBOX)
}

/// One of the six PropertyIs* two-operand comparisons.
pub fn is_binary_comparison(label: &str) -> bool {
    BinaryOp::from_label(label).is_some()
}

/// Binary comparisons plus PropertyIsLike and PropertyIsBetween.
pub fn is_comparison(label: &str) -> bool {
    is_binary_comparison(label)
        || label.eq_ignore_ascii_case(PROPERTY_IS_LIKE)
        || label.eq_ignore_ascii_case(PROPERTY_IS_BETWEEN)
}

/// Whether a filter may start with this element at all.
pub fn is_supported_root(label: &str) -> bool {
    is_logical(label) || is_spatial(label) || is_comparison(label)
}

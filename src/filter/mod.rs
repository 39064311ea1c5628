//! OGC Filter Encoding compiler.
//!
//! Supported elements:
//!   And, Or               - exactly two operands (further operands ignored)
//!   Not                   - one operand
//!   PropertyIsEqualTo, PropertyIsNotEqualTo, PropertyIsLessThan,
//!   PropertyIsGreaterThan, PropertyIsLessThanOrEqualTo,
//!   PropertyIsGreaterThanOrEqualTo
//!                         - PropertyName, Literal
//!   PropertyIsBetween     - PropertyName, LowerBoundary, UpperBoundary
//!   PropertyIsLike        - wildCard/singleChar/escapeChar attributes,
//!                           PropertyName, Literal
//!   BBOX                  - PropertyName, gml:Box (parsed, not compiled)
//!
//! Element names match case-insensitively.

mod ast;
mod builder;
mod classify;
mod classitem;
mod error;
mod generate;

pub use ast::*;
pub use builder::{FILTER_MARKER, TreeBuilder, parse_filter_encoding};
pub use classify::{
    is_binary_comparison, is_comparison, is_logical, is_spatial, is_supported_root,
};
pub use classitem::class_item;
pub use error::{ParseError, Rejection, Side};
pub use generate::{WILDCARD_PATTERN, expression, generate, is_numeric};

use crate::config::CompilerConfig;

/// A parsed filter with its generated expression and class item.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub tree: FilterNode,
    pub expression: Result<String, Rejection>,
    pub class_item: Option<String>,
}

/// Parse `text` and run both back ends over the resulting tree.
pub fn compile(text: &str, config: &CompilerConfig) -> Result<CompiledFilter, ParseError> {
    let tree = parse_filter_encoding(text, config)?;
    let expression = generate(&tree);
    let class_item = class_item(&tree).map(str::to_string);

    Ok(CompiledFilter {
        tree,
        expression,
        class_item,
    })
}

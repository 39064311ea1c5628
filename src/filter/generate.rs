//! Expression generator: filter tree to a MapServer-style expression.
//!
//! Output forms:
//!
//!   (left AND right)  (left OR right)  (NOT operand)
//!   ([attr] = 100)                      numeric literal
//!   ('[attr]' = 'Toronto')              any other literal
//!   ([attr] >= 400 AND [attr] <= 800)   PropertyIsBetween
//!   /JOHN[a-z,A-Z]*/                    PropertyIsLike
//!
//! A node whose operands are missing or invalid generates nothing, and so
//! does every ancestor that depends on it.

use super::ast::{
    BOUNDARY_DELIMITER, BinaryOp, ComparisonKind, FilterNode, LikeWildcards, LogicalOp, NodeKind,
};
use super::error::{Rejection, Side};

/// Replacement for the PropertyIsLike wildcard character.
pub const WILDCARD_PATTERN: &str = "[a-z,A-Z]*";

/// Generate the expression for `node`, or the reason there is none.
pub fn generate(node: &FilterNode) -> Result<String, Rejection> {
    match &node.kind {
        NodeKind::Logical(op) => logical_expression(node, *op),
        NodeKind::Comparison(ComparisonKind::Binary(op)) => binary_expression(node, *op),
        NodeKind::Comparison(ComparisonKind::Between) => between_expression(node),
        NodeKind::Comparison(ComparisonKind::Like(wildcards)) => {
            like_expression(node, wildcards.as_ref())
        }
        NodeKind::Spatial => Err(Rejection::SpatialUnsupported {
            label: node.label.clone(),
        }),
        _ => Err(Rejection::NotAnExpression {
            label: node.label.clone(),
        }),
    }
}

/// Generate the expression for `node`, discarding the rejection reason.
pub fn expression(node: &FilterNode) -> Option<String> {
    match generate(node) {
        Ok(expr) => Some(expr),
        Err(reason) => {
            tracing::debug!("Generator: no expression: {}", reason);
            None
        }
    }
}

/// A literal is numeric when it is non-empty and made only of ASCII digits.
/// Signs, decimal points and exponents make it a string.
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn operand(node: &FilterNode, side: Side) -> Result<&FilterNode, Rejection> {
    let slot = match side {
        Side::Left => &node.left,
        Side::Right => &node.right,
    };
    slot.as_deref().ok_or_else(|| Rejection::MissingOperand {
        label: node.label.clone(),
        side,
    })
}

/// Text of the operand on `side`, which must be of the kind `expected` names.
fn leaf_operand<'a>(
    node: &'a FilterNode,
    side: Side,
    expected: &'static str,
    accepts: fn(&NodeKind) -> bool,
) -> Result<&'a str, Rejection> {
    let leaf = operand(node, side)?;
    if !accepts(&leaf.kind) {
        return Err(Rejection::UnexpectedOperand {
            label: node.label.clone(),
            side,
            expected,
            found: leaf.label.clone(),
        });
    }
    leaf.value().ok_or_else(|| Rejection::MissingValue {
        label: leaf.label.clone(),
    })
}

fn property_name(node: &FilterNode) -> Result<&str, Rejection> {
    leaf_operand(node, Side::Left, "PropertyName", |kind| {
        matches!(kind, NodeKind::PropertyName(_))
    })
}

fn literal(node: &FilterNode) -> Result<&str, Rejection> {
    leaf_operand(node, Side::Right, "Literal", |kind| {
        matches!(kind, NodeKind::Literal(_))
    })
}

fn attribute_ref(name: &str, quoted: bool) -> String {
    if quoted {
        format!("'[{name}]'")
    } else {
        format!("[{name}]")
    }
}

fn value_ref(value: &str, quoted: bool) -> String {
    if quoted {
        format!("'{value}'")
    } else {
        value.to_string()
    }
}

fn logical_expression(node: &FilterNode, op: LogicalOp) -> Result<String, Rejection> {
    match op {
        LogicalOp::And | LogicalOp::Or => {
            let left = generate(operand(node, Side::Left)?)?;
            let right = generate(operand(node, Side::Right)?)?;
            Ok(format!("({left} {op} {right})"))
        }
        LogicalOp::Not => {
            let inner = generate(operand(node, Side::Left)?)?;
            Ok(format!("(NOT {inner})"))
        }
    }
}

fn binary_expression(node: &FilterNode, op: BinaryOp) -> Result<String, Rejection> {
    let name = property_name(node)?;
    let value = literal(node)?;
    let quoted = !is_numeric(value);
    tracing::trace!("Generator: {} literal {:?} quoted={}", node.label, value, quoted);

    Ok(format!(
        "({} {} {})",
        attribute_ref(name, quoted),
        op,
        value_ref(value, quoted)
    ))
}

fn between_expression(node: &FilterNode) -> Result<String, Rejection> {
    let name = property_name(node)?;
    let bounds = leaf_operand(node, Side::Right, "Boundary", |kind| {
        matches!(kind, NodeKind::Boundary(_))
    })?;

    let parts: Vec<&str> = bounds.split(BOUNDARY_DELIMITER).collect();
    let [lower, upper] = parts.as_slice() else {
        return Err(Rejection::MalformedBoundary {
            label: node.label.clone(),
            parts: parts.len(),
        });
    };

    let quoted = !is_numeric(lower) || !is_numeric(upper);
    let attribute = attribute_ref(name, quoted);

    Ok(format!(
        "({attribute} >= {} AND {attribute} <= {})",
        value_ref(lower, quoted),
        value_ref(upper, quoted)
    ))
}

fn like_expression(
    node: &FilterNode,
    wildcards: Option<&LikeWildcards>,
) -> Result<String, Rejection> {
    let invalid = || Rejection::InvalidLikePattern {
        label: node.label.clone(),
    };
    let wildcards = wildcards.ok_or_else(invalid)?;
    let (Some(wild), Some(single), Some(escape)) = (
        wildcards.wildcard.chars().next(),
        wildcards.single_char.chars().next(),
        wildcards.escape_char.chars().next(),
    ) else {
        return Err(invalid());
    };

    // The property name only feeds the class item, but must be present.
    operand(node, Side::Left)?;
    let pattern = literal(node)?;

    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('/');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == single {
            regex.push('.');
        } else if c == escape {
            if let Some(escaped) = chars.next() {
                regex.push(escaped);
            }
        } else if c == wild {
            regex.push_str(WILDCARD_PATTERN);
        } else {
            regex.push(c);
        }
    }
    regex.push('/');

    Ok(regex)
}

//! Filter tree types.

use std::fmt;

/// Logical operator of a logical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn from_label(label: &str) -> Option<Self> {
        [LogicalOp::And, LogicalOp::Or, LogicalOp::Not]
            .into_iter()
            .find(|op| label.eq_ignore_ascii_case(op.keyword()))
    }

    /// Upper-cased keyword used in generated expressions.
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    EqualTo,              // =
    NotEqualTo,           // !=
    LessThan,             // <
    GreaterThan,          // >
    LessThanOrEqualTo,    // <=
    GreaterThanOrEqualTo, // >=
}

impl BinaryOp {
    const ALL: [BinaryOp; 6] = [
        BinaryOp::EqualTo,
        BinaryOp::NotEqualTo,
        BinaryOp::LessThan,
        BinaryOp::GreaterThan,
        BinaryOp::LessThanOrEqualTo,
        BinaryOp::GreaterThanOrEqualTo,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| label.eq_ignore_ascii_case(op.element_name()))
    }

    /// Filter Encoding element name for this operator.
    pub fn element_name(self) -> &'static str {
        match self {
            BinaryOp::EqualTo => "PropertyIsEqualTo",
            BinaryOp::NotEqualTo => "PropertyIsNotEqualTo",
            BinaryOp::LessThan => "PropertyIsLessThan",
            BinaryOp::GreaterThan => "PropertyIsGreaterThan",
            BinaryOp::LessThanOrEqualTo => "PropertyIsLessThanOrEqualTo",
            BinaryOp::GreaterThanOrEqualTo => "PropertyIsGreaterThanOrEqualTo",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::EqualTo => write!(f, "="),
            BinaryOp::NotEqualTo => write!(f, "!="),
            BinaryOp::LessThan => write!(f, "<"),
            BinaryOp::GreaterThan => write!(f, ">"),
            BinaryOp::LessThanOrEqualTo => write!(f, "<="),
            BinaryOp::GreaterThanOrEqualTo => write!(f, ">="),
        }
    }
}

/// The three pattern characters of a PropertyIsLike element, as given in
/// its attributes. Only the first character of each is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeWildcards {
    pub wildcard: String,
    pub single_char: String,
    pub escape_char: String,
}

/// Which comparison a comparison node performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonKind {
    Binary(BinaryOp),
    Between,
    /// `None` when the element's attributes did not have the expected shape.
    Like(Option<LikeWildcards>),
}

/// Node kind. Leaf arms own their text value, absent when the source
/// element had no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Logical(LogicalOp),
    Spatial,
    Comparison(ComparisonKind),
    PropertyName(Option<String>),
    Literal(Option<String>),
    /// Lower and upper bound joined by [`BOUNDARY_DELIMITER`].
    Boundary(Option<String>),
    /// Raw coordinate text of a box.
    Bbox(Option<String>),
    Undefined,
}

pub const BOUNDARY_DELIMITER: char = ';';

/// A node of the filter tree. Children are exclusively owned; a node whose
/// source element had the wrong shape keeps its children absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    pub label: String,
    pub kind: NodeKind,
    pub left: Option<Box<FilterNode>>,
    pub right: Option<Box<FilterNode>>,
}

impl FilterNode {
    pub fn new(label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            kind,
            left: None,
            right: None,
        }
    }

    pub fn with_left(mut self, node: FilterNode) -> Self {
        self.left = Some(Box::new(node));
        self
    }

    pub fn with_right(mut self, node: FilterNode) -> Self {
        self.right = Some(Box::new(node));
        self
    }

    /// Text value of a leaf node.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::PropertyName(value)
            | NodeKind::Literal(value)
            | NodeKind::Boundary(value)
            | NodeKind::Bbox(value) => value.as_deref(),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::PropertyName(_)
                | NodeKind::Literal(_)
                | NodeKind::Boundary(_)
                | NodeKind::Bbox(_)
        )
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.label, indent = depth * 2)?;
        match &self.kind {
            NodeKind::Comparison(ComparisonKind::Like(Some(w))) => write!(
                f,
                " [wildCard={:?} singleChar={:?} escapeChar={:?}]",
                w.wildcard, w.single_char, w.escape_char
            )?,
            _ if self.is_leaf() => match self.value() {
                Some(value) => write!(f, " = {:?}", value)?,
                None => write!(f, " = <none>")?,
            },
            _ => {}
        }
        writeln!(f)?;
        for child in [&self.left, &self.right].into_iter().flatten() {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented dump of the tree, one node per line.
impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

//! Tree builder: generic XML elements to filter nodes.
//!
//! Each filter kind accepts one fixed, ordered child shape. A node whose
//! element has any other shape is still produced, with its operands left
//! absent, so one malformed predicate never disturbs its siblings.

use super::ast::{
    BOUNDARY_DELIMITER, BinaryOp, ComparisonKind, FilterNode, LikeWildcards, LogicalOp, NodeKind,
};
use super::classify::{
    LITERAL, LOWER_BOUNDARY, PROPERTY_IS_BETWEEN, PROPERTY_IS_LIKE, PROPERTY_NAME, UPPER_BOUNDARY,
    is_spatial, is_supported_root,
};
use super::error::ParseError;
use crate::config::CompilerConfig;
use crate::xml::{XmlElement, parse_document};

/// Substring a document must contain before it is parsed at all.
pub const FILTER_MARKER: &str = "<Filter>";
pub const FILTER_ELEMENT: &str = "Filter";
pub const BOUNDARY_LABEL: &str = "Boundary";

const PROPERTY_NAME_TAGS: &[&str] = &[PROPERTY_NAME];
const LITERAL_TAGS: &[&str] = &[LITERAL];
const LOWER_BOUNDARY_TAGS: &[&str] = &[LOWER_BOUNDARY];
const UPPER_BOUNDARY_TAGS: &[&str] = &[UPPER_BOUNDARY];
const BOX_TAGS: &[&str] = &["gml:Box", "Box"];
const LIKE_ATTRIBUTES: [&str; 3] = ["wildCard", "singleChar", "escapeChar"];

/// Parse a Filter Encoding document into a filter tree.
///
/// The document must contain the literal `<Filter>`, be well-formed, and have
/// a top-level `Filter` element whose first child element is a supported
/// filter kind.
pub fn parse_filter_encoding(
    text: &str,
    config: &CompilerConfig,
) -> Result<FilterNode, ParseError> {
    if !text.contains(FILTER_MARKER) {
        return Err(ParseError::MissingFilterMarker);
    }

    let document = parse_document(text, config.max_xml_depth)?;
    let filter = document
        .root(FILTER_ELEMENT)
        .ok_or(ParseError::NoFilterElement)?;
    let first = filter.elements().next().ok_or(ParseError::EmptyFilter)?;

    if !is_supported_root(&first.name) {
        return Err(ParseError::UnsupportedRoot(first.name.clone()));
    }

    TreeBuilder::new(config.max_depth).build(first)
}

/// Builds filter nodes depth-first, refusing trees nested deeper than
/// `max_depth` levels.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder {
    max_depth: usize,
}

impl TreeBuilder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn build(&self, element: &XmlElement) -> Result<FilterNode, ParseError> {
        self.build_node(element, 1)
    }

    fn build_node(&self, element: &XmlElement, depth: usize) -> Result<FilterNode, ParseError> {
        if depth > self.max_depth {
            return Err(ParseError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let label = element.name.as_str();
        let node = if let Some(op) = LogicalOp::from_label(label) {
            self.build_logical(element, op, depth)?
        } else if is_spatial(label) {
            build_bbox(element)
        } else if let Some(op) = BinaryOp::from_label(label) {
            build_binary(element, op)
        } else if label.eq_ignore_ascii_case(PROPERTY_IS_BETWEEN) {
            build_between(element)
        } else if label.eq_ignore_ascii_case(PROPERTY_IS_LIKE) {
            build_like(element)
        } else {
            tracing::debug!("Builder: <{}> is not a supported filter", label);
            FilterNode::new(label, NodeKind::Undefined)
        };

        Ok(node)
    }

    fn build_logical(
        &self,
        element: &XmlElement,
        op: LogicalOp,
        depth: usize,
    ) -> Result<FilterNode, ParseError> {
        let mut node = FilterNode::new(&element.name, NodeKind::Logical(op));
        let mut operands = element.elements();

        match op {
            LogicalOp::And | LogicalOp::Or => match (operands.next(), operands.next()) {
                (Some(first), Some(second)) => {
                    node.left = Some(Box::new(self.build_node(first, depth + 1)?));
                    node.right = Some(Box::new(self.build_node(second, depth + 1)?));
                    let extra = operands.count();
                    if extra > 0 {
                        tracing::debug!(
                            "Builder: <{}> takes two operands, ignoring {} more",
                            element.name,
                            extra
                        );
                    }
                }
                _ => tracing::debug!("Builder: <{}> needs two operands", element.name),
            },
            LogicalOp::Not => match operands.next() {
                Some(operand) => {
                    node.left = Some(Box::new(self.build_node(operand, depth + 1)?));
                }
                None => tracing::debug!("Builder: <{}> needs an operand", element.name),
            },
        }

        Ok(node)
    }
}

/// Match the element children against an exact ordered shape. Each slot
/// lists the accepted names.
fn match_children<'a, const N: usize>(
    element: &'a XmlElement,
    expected: [&[&str]; N],
) -> Option<[&'a XmlElement; N]> {
    let children: Vec<&XmlElement> = element.elements().collect();
    let matches = children.len() == N
        && children.iter().zip(expected.iter()).all(|(child, names)| {
            names
                .iter()
                .any(|name| child.name.eq_ignore_ascii_case(name))
        });

    if !matches {
        let found: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
        let wanted: Vec<&str> = expected.iter().map(|names| names[0]).collect();
        tracing::debug!(
            "Builder: <{}> expects children [{}], found [{}]",
            element.name,
            wanted.join(", "),
            found.join(", ")
        );
        return None;
    }

    children.try_into().ok()
}

fn property_name_leaf(element: &XmlElement) -> FilterNode {
    FilterNode::new(
        &element.name,
        NodeKind::PropertyName(element.first_text().map(str::to_string)),
    )
}

fn literal_leaf(element: &XmlElement) -> FilterNode {
    FilterNode::new(
        &element.name,
        NodeKind::Literal(element.first_text().map(str::to_string)),
    )
}

/// Bound text, either direct or wrapped in one element such as `<Literal>`.
fn bound_text(element: &XmlElement) -> Option<&str> {
    element
        .first_text()
        .or_else(|| element.elements().next().and_then(XmlElement::first_text))
}

fn build_bbox(element: &XmlElement) -> FilterNode {
    let mut node = FilterNode::new(&element.name, NodeKind::Spatial);
    if let Some([property, bbox]) = match_children(element, [PROPERTY_NAME_TAGS, BOX_TAGS]) {
        node.left = Some(Box::new(property_name_leaf(property)));
        // TODO: carry the srsName attribute once spatial expressions are generated.
        if let Some(coordinates) = bbox.find_text() {
            node.right = Some(Box::new(FilterNode::new(
                &bbox.name,
                NodeKind::Bbox(Some(coordinates.to_string())),
            )));
        }
    }
    node
}

fn build_binary(element: &XmlElement, op: BinaryOp) -> FilterNode {
    let mut node = FilterNode::new(
        &element.name,
        NodeKind::Comparison(ComparisonKind::Binary(op)),
    );
    if let Some([property, literal]) = match_children(element, [PROPERTY_NAME_TAGS, LITERAL_TAGS]) {
        node.left = Some(Box::new(property_name_leaf(property)));
        node.right = Some(Box::new(literal_leaf(literal)));
    }
    node
}

fn build_between(element: &XmlElement) -> FilterNode {
    let mut node = FilterNode::new(
        &element.name,
        NodeKind::Comparison(ComparisonKind::Between),
    );
    if let Some([property, lower, upper]) = match_children(
        element,
        [PROPERTY_NAME_TAGS, LOWER_BOUNDARY_TAGS, UPPER_BOUNDARY_TAGS],
    ) {
        node.left = Some(Box::new(property_name_leaf(property)));
        let bounds = match (bound_text(lower), bound_text(upper)) {
            (Some(lower), Some(upper)) => Some(format!("{lower}{BOUNDARY_DELIMITER}{upper}")),
            _ => None,
        };
        node.right = Some(Box::new(FilterNode::new(
            BOUNDARY_LABEL,
            NodeKind::Boundary(bounds),
        )));
    }
    node
}

fn build_like(element: &XmlElement) -> FilterNode {
    let attributes = &element.attributes;
    let attributes_in_order = attributes.len() >= LIKE_ATTRIBUTES.len()
        && attributes
            .iter()
            .zip(LIKE_ATTRIBUTES)
            .all(|((key, _), expected)| key.eq_ignore_ascii_case(expected));

    let children = match_children(element, [PROPERTY_NAME_TAGS, LITERAL_TAGS]);

    match (attributes_in_order, children) {
        (true, Some([property, literal])) => {
            let wildcards = LikeWildcards {
                wildcard: attributes[0].1.clone(),
                single_char: attributes[1].1.clone(),
                escape_char: attributes[2].1.clone(),
            };
            FilterNode::new(
                &element.name,
                NodeKind::Comparison(ComparisonKind::Like(Some(wildcards))),
            )
            .with_left(property_name_leaf(property))
            .with_right(literal_leaf(literal))
        }
        (in_order, _) => {
            if !in_order {
                tracing::debug!(
                    "Builder: <{}> expects attributes wildCard, singleChar, escapeChar",
                    element.name
                );
            }
            FilterNode::new(&element.name, NodeKind::Comparison(ComparisonKind::Like(None)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, text: &str) -> XmlElement {
        XmlElement::new(name).with_text(text)
    }

    fn equal_to(property: &str, literal: &str) -> XmlElement {
        XmlElement::new("PropertyIsEqualTo")
            .with_child(leaf("PropertyName", property))
            .with_child(leaf("Literal", literal))
    }

    fn build(element: &XmlElement) -> FilterNode {
        TreeBuilder::new(64).build(element).unwrap()
    }

    #[test]
    fn test_binary_comparison() {
        let node = build(&equal_to("NAME", "Toronto"));
        assert_eq!(
            node.kind,
            NodeKind::Comparison(ComparisonKind::Binary(BinaryOp::EqualTo))
        );
        assert_eq!(node.label, "PropertyIsEqualTo");
        assert_eq!(node.left.as_ref().unwrap().value(), Some("NAME"));
        assert_eq!(node.right.as_ref().unwrap().value(), Some("Toronto"));
    }

    #[test]
    fn test_reordered_children_leave_operands_absent() {
        let element = XmlElement::new("PropertyIsLessThan")
            .with_child(leaf("Literal", "5"))
            .with_child(leaf("PropertyName", "A"));
        let node = build(&element);
        assert!(node.left.is_none());
        assert!(node.right.is_none());
    }

    #[test]
    fn test_extra_comparison_children_leave_operands_absent() {
        let element = equal_to("A", "1").with_child(leaf("Literal", "2"));
        let node = build(&element);
        assert!(node.left.is_none());
        assert!(node.right.is_none());
    }

    #[test]
    fn test_missing_literal_text_keeps_leaf() {
        let element = XmlElement::new("PropertyIsEqualTo")
            .with_child(leaf("PropertyName", "A"))
            .with_child(XmlElement::new("Literal"));
        let node = build(&element);
        assert_eq!(node.right.unwrap().kind, NodeKind::Literal(None));
    }

    #[test]
    fn test_logical_nesting() {
        let element = XmlElement::new("Or")
            .with_child(equal_to("A", "1"))
            .with_child(XmlElement::new("Not").with_child(equal_to("B", "2")));
        let node = build(&element);
        assert_eq!(node.kind, NodeKind::Logical(LogicalOp::Or));
        let not = node.right.unwrap();
        assert_eq!(not.kind, NodeKind::Logical(LogicalOp::Not));
        assert!(not.right.is_none());
        assert_eq!(not.left.unwrap().left.unwrap().value(), Some("B"));
    }

    #[test]
    fn test_not_without_operand_has_no_children() {
        let node = build(&XmlElement::new("Not"));
        assert_eq!(node.kind, NodeKind::Logical(LogicalOp::Not));
        assert!(node.left.is_none());
        assert!(node.right.is_none());
    }

    #[test]
    fn test_and_with_one_operand_has_no_children() {
        let node = build(&XmlElement::new("And").with_child(equal_to("A", "1")));
        assert!(node.left.is_none());
        assert!(node.right.is_none());
    }

    #[test]
    fn test_and_ignores_third_operand() {
        let element = XmlElement::new("And")
            .with_child(equal_to("A", "1"))
            .with_child(equal_to("B", "2"))
            .with_child(equal_to("C", "3"));
        let node = build(&element);
        assert_eq!(node.left.unwrap().left.unwrap().value(), Some("A"));
        assert_eq!(node.right.unwrap().left.unwrap().value(), Some("B"));
    }

    #[test]
    fn test_unknown_operand_is_undefined() {
        let element = XmlElement::new("And")
            .with_child(XmlElement::new("PropertyIsNull"))
            .with_child(equal_to("A", "1"));
        let node = build(&element);
        assert_eq!(node.left.unwrap().kind, NodeKind::Undefined);
    }

    #[test]
    fn test_between_joins_bounds() {
        let element = XmlElement::new("PropertyIsBetween")
            .with_child(leaf("PropertyName", "DEPTH"))
            .with_child(leaf("LowerBoundary", "400"))
            .with_child(XmlElement::new("UpperBoundary").with_child(leaf("Literal", "800")));
        let node = build(&element);
        let boundary = node.right.unwrap();
        assert_eq!(boundary.kind, NodeKind::Boundary(Some("400;800".into())));
    }

    #[test]
    fn test_between_without_bound_text() {
        let element = XmlElement::new("PropertyIsBetween")
            .with_child(leaf("PropertyName", "DEPTH"))
            .with_child(leaf("LowerBoundary", "400"))
            .with_child(XmlElement::new("UpperBoundary"));
        let node = build(&element);
        assert_eq!(node.right.unwrap().kind, NodeKind::Boundary(None));
    }

    #[test]
    fn test_like_payload() {
        let element = XmlElement::new("PropertyIsLike")
            .with_attribute("wildCard", "*")
            .with_attribute("singleChar", "#")
            .with_attribute("escapeChar", "!")
            .with_child(leaf("PropertyName", "LAST_NAME"))
            .with_child(leaf("Literal", "JOHN*"));
        let node = build(&element);
        assert_eq!(
            node.kind,
            NodeKind::Comparison(ComparisonKind::Like(Some(LikeWildcards {
                wildcard: "*".into(),
                single_char: "#".into(),
                escape_char: "!".into(),
            })))
        );
        assert_eq!(node.left.unwrap().value(), Some("LAST_NAME"));
    }

    #[test]
    fn test_like_attributes_out_of_order() {
        let element = XmlElement::new("PropertyIsLike")
            .with_attribute("singleChar", "#")
            .with_attribute("wildCard", "*")
            .with_attribute("escapeChar", "!")
            .with_child(leaf("PropertyName", "LAST_NAME"))
            .with_child(leaf("Literal", "JOHN*"));
        let node = build(&element);
        assert_eq!(node.kind, NodeKind::Comparison(ComparisonKind::Like(None)));
        assert!(node.left.is_none());
    }

    #[test]
    fn test_bbox_captures_coordinates() {
        let element = XmlElement::new("BBOX")
            .with_child(leaf("PropertyName", "Geometry"))
            .with_child(
                XmlElement::new("gml:Box")
                    .with_attribute("srsName", "EPSG:4326")
                    .with_child(leaf("gml:coordinates", "13.0983,31.5899 35.5472,42.8143")),
            );
        let node = build(&element);
        assert_eq!(node.kind, NodeKind::Spatial);
        assert_eq!(node.left.unwrap().value(), Some("Geometry"));
        assert_eq!(
            node.right.unwrap().kind,
            NodeKind::Bbox(Some("13.0983,31.5899 35.5472,42.8143".into()))
        );
    }

    #[test]
    fn test_bbox_without_box_has_no_children() {
        let element = XmlElement::new("BBOX")
            .with_child(leaf("PropertyName", "Geometry"))
            .with_child(leaf("gml:Envelope", "13.0983,31.5899 35.5472,42.8143"));
        let node = build(&element);
        assert_eq!(node.kind, NodeKind::Spatial);
        assert!(node.left.is_none());
        assert!(node.right.is_none());
    }

    #[test]
    fn test_depth_limit() {
        let mut element = equal_to("A", "1");
        for _ in 0..10 {
            element = XmlElement::new("Not").with_child(element);
        }
        assert!(TreeBuilder::new(11).build(&element).is_ok());
        assert_eq!(
            TreeBuilder::new(10).build(&element).unwrap_err(),
            ParseError::DepthExceeded { limit: 10 }
        );
    }

    #[test]
    fn test_parse_requires_marker() {
        let config = CompilerConfig::default();
        let text = "<Filter xmlns=\"http://www.opengis.net/ogc\"><And/></Filter>";
        assert_eq!(
            parse_filter_encoding(text, &config).unwrap_err(),
            ParseError::MissingFilterMarker
        );
    }

    #[test]
    fn test_parse_rejects_unsupported_root() {
        let config = CompilerConfig::default();
        let text = "<Filter><PropertyName>A</PropertyName></Filter>";
        assert_eq!(
            parse_filter_encoding(text, &config).unwrap_err(),
            ParseError::UnsupportedRoot("PropertyName".into())
        );
    }

    #[test]
    fn test_parse_finds_filter_among_roots() {
        let config = CompilerConfig::default();
        let text = "<?xml version=\"1.0\"?><Filter><PropertyIsEqualTo>\
                    <PropertyName>A</PropertyName><Literal>1</Literal>\
                    </PropertyIsEqualTo></Filter>";
        let node = parse_filter_encoding(text, &config).unwrap();
        assert_eq!(node.label, "PropertyIsEqualTo");
    }

    #[test]
    fn test_parse_surfaces_xml_errors() {
        let config = CompilerConfig::default();
        assert!(matches!(
            parse_filter_encoding("<Filter><And></Filter>", &config),
            Err(ParseError::Xml(_))
        ));
    }
}

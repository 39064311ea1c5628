use super::ast::FilterNode;
use super::classify::PROPERTY_IS_LIKE;

/// Attribute name targeted by the first PropertyIsLike node with a property
/// name, in pre-order (node, then left, then right). A PropertyIsLike without
/// property text is passed over.
pub fn class_item(root: &FilterNode) -> Option<&str> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.label.eq_ignore_ascii_case(PROPERTY_IS_LIKE) {
            if let Some(name) = node.left.as_deref().and_then(FilterNode::value) {
                return Some(name);
            }
            continue;
        }
        stack.extend(node.right.as_deref());
        stack.extend(node.left.as_deref());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ast::{BinaryOp, ComparisonKind, LikeWildcards, LogicalOp, NodeKind};

    fn like(property: Option<&str>) -> FilterNode {
        let node = FilterNode::new(
            "PropertyIsLike",
            NodeKind::Comparison(ComparisonKind::Like(Some(LikeWildcards {
                wildcard: "*".into(),
                single_char: "#".into(),
                escape_char: "!".into(),
            }))),
        );
        match property {
            Some(name) => node.with_left(FilterNode::new(
                "PropertyName",
                NodeKind::PropertyName(Some(name.into())),
            )),
            None => node,
        }
    }

    fn equal_to(name: &str) -> FilterNode {
        FilterNode::new(
            "PropertyIsEqualTo",
            NodeKind::Comparison(ComparisonKind::Binary(BinaryOp::EqualTo)),
        )
        .with_left(FilterNode::new(
            "PropertyName",
            NodeKind::PropertyName(Some(name.into())),
        ))
    }

    fn and(left: FilterNode, right: FilterNode) -> FilterNode {
        FilterNode::new("And", NodeKind::Logical(LogicalOp::And))
            .with_left(left)
            .with_right(right)
    }

    #[test]
    fn test_root_like() {
        assert_eq!(class_item(&like(Some("LAST_NAME"))), Some("LAST_NAME"));
    }

    #[test]
    fn test_no_like() {
        assert_eq!(class_item(&and(equal_to("A"), equal_to("B"))), None);
    }

    #[test]
    fn test_left_before_right() {
        let tree = and(
            and(equal_to("A"), like(Some("FIRST"))),
            like(Some("SECOND")),
        );
        assert_eq!(class_item(&tree), Some("FIRST"));
    }

    #[test]
    fn test_like_without_property_is_skipped() {
        let tree = and(like(None), like(Some("SECOND")));
        assert_eq!(class_item(&tree), Some("SECOND"));
    }

    #[test]
    fn test_like_with_empty_property_is_skipped() {
        let empty = like(None).with_left(FilterNode::new(
            "PropertyName",
            NodeKind::PropertyName(None),
        ));
        let tree = and(and(empty, equal_to("A")), like(Some("SECOND")));
        assert_eq!(class_item(&tree), Some("SECOND"));
    }

    #[test]
    fn test_no_named_like() {
        assert_eq!(class_item(&and(like(None), equal_to("A"))), None);
    }

    #[test]
    fn test_label_match_ignores_case() {
        let mut node = like(Some("NAME"));
        node.label = "propertyislike".into();
        assert_eq!(class_item(&node), Some("NAME"));
    }
}

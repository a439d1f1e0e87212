//! The thirteen node axes, derived generically on top of [`XPathNode`]'s
//! minimal primitives (`parent`, `iter_children_or_self`,
//! `iter_attributes`). A host tree only has to answer "who's your parent"
//! and "who are your children/attributes"; everything else — `descendant`,
//! `following`, `ancestor-or-self`, document order — falls out of that.

use crate::registry::Axis;
use crate::tree::{NodeKind, XPathNode};

/// The direct children of `node`, empty unless `node` is a document or
/// element (the other kinds have no children in the XDM).
pub(crate) fn children<N: XPathNode>(node: &N) -> Vec<N> {
    match node.kind() {
        NodeKind::Document | NodeKind::Element => node.iter_children_or_self().collect(),
        _ => Vec::new(),
    }
}

fn descendants<N: XPathNode>(node: &N, out: &mut Vec<N>) {
    for child in children(node) {
        out.push(child.clone());
        descendants(&child, out);
    }
}

fn ancestors<N: XPathNode>(node: &N) -> Vec<N> {
    let mut out = Vec::new();
    let mut current = node.clone();
    while let Some(parent) = current.parent() {
        out.push(parent.clone());
        current = parent;
    }
    out
}

/// All children of `node`'s parent in document order, or `&[]` if `node`
/// has no parent.
fn siblings<N: XPathNode>(node: &N) -> Vec<N> {
    match node.parent() {
        Some(parent) => children(&parent),
        None => Vec::new(),
    }
}

fn position_among<N: XPathNode>(siblings: &[N], node: &N) -> Option<usize> {
    siblings.iter().position(|s| s == node)
}

/// Evaluates a single axis from `node`, returning its nodes in the order
/// `instance of`/predicates expect: document order for forward axes,
/// reverse document order for reverse axes (per the data model, `preceding`
/// and `ancestor` are consumed in reverse document order before any
/// subsequent step re-sorts into document order).
pub fn evaluate<N: XPathNode>(axis: Axis, node: &N) -> Vec<N> {
    match axis {
        Axis::Child => children(node),
        Axis::Descendant => {
            let mut out = Vec::new();
            descendants(node, &mut out);
            out
        }
        Axis::DescendantOrSelf => {
            let mut out = vec![node.clone()];
            descendants(node, &mut out);
            out
        }
        Axis::Attribute => node.iter_attributes().collect(),
        Axis::Self_ => vec![node.clone()],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Ancestor => ancestors(node),
        Axis::AncestorOrSelf => {
            let mut out = vec![node.clone()];
            out.extend(ancestors(node));
            out
        }
        Axis::FollowingSibling => {
            let sibs = siblings(node);
            match position_among(&sibs, node) {
                Some(i) => sibs[i + 1..].to_vec(),
                None => Vec::new(),
            }
        }
        Axis::PrecedingSibling => {
            let sibs = siblings(node);
            match position_among(&sibs, node) {
                Some(i) => sibs[..i].iter().rev().cloned().collect(),
                None => Vec::new(),
            }
        }
        Axis::Following => {
            let mut out = Vec::new();
            let mut current = node.clone();
            loop {
                let sibs = siblings(&current);
                if let Some(i) = position_among(&sibs, &current) {
                    for s in &sibs[i + 1..] {
                        out.push(s.clone());
                        descendants(s, &mut out);
                    }
                }
                match current.parent() {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            out
        }
        Axis::Preceding => {
            let mut out = Vec::new();
            let mut current = node.clone();
            loop {
                let sibs = siblings(&current);
                if let Some(i) = position_among(&sibs, &current) {
                    for s in sibs[..i].iter().rev() {
                        let mut subtree = vec![s.clone()];
                        descendants(s, &mut subtree);
                        out.extend(subtree.into_iter().rev());
                    }
                }
                match current.parent() {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            out
        }
        // The `namespace::` axis needs namespace-node support the
        // `XPathNode` primitives don't expose; no in-scope namespace nodes
        // are ever produced.
        Axis::Namespace => Vec::new(),
    }
}

/// Whether `axis` walks away from the document root (its nodes come after
/// `node` or are `node` itself, never strictly before it) — used to decide
/// whether a step's result needs reversing before re-merging into document
/// order (§4 "document order" invariant for path steps).
pub fn is_forward(axis: Axis) -> bool {
    !matches!(
        axis,
        Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling | Axis::Parent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::simple::{into_shared, Tree};
    use xpath2_name::Name;

    #[test]
    fn test_descendant_axis_is_document_order() {
        let mut tree = Tree::new();
        let root = tree.element(0, Name::unprefixed("root"), vec![]);
        let a = tree.element(root, Name::unprefixed("a"), vec![]);
        let _b = tree.element(root, Name::unprefixed("b"), vec![]);
        tree.text(a, "hi");
        let doc = into_shared(tree);
        let root_node = doc.iter_children_or_self().next().unwrap();
        let names: Vec<_> = evaluate(Axis::Descendant, &root_node)
            .iter()
            .map(|n| n.node_name().map(|name| name.local_name().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![Some("a".to_string()), None, Some("b".to_string())]
        );
    }

    #[test]
    fn test_following_sibling_excludes_preceding() {
        let mut tree = Tree::new();
        let root = tree.element(0, Name::unprefixed("root"), vec![]);
        let a = tree.element(root, Name::unprefixed("a"), vec![]);
        let b = tree.element(root, Name::unprefixed("b"), vec![]);
        let doc = into_shared(tree);
        let root_node = doc.iter_children_or_self().next().unwrap();
        let kids = children(&root_node);
        let a_node = kids.iter().find(|n| n.node_name().unwrap().local_name() == "a").unwrap();
        let following = evaluate(Axis::FollowingSibling, a_node);
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].node_name().unwrap().local_name(), "b");
        let _ = b;
    }
}

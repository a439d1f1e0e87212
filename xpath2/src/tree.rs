//! The tree model this engine consumes.
//!
//! The evaluator never hardcodes a particular XML tree implementation.
//! Instead it is generic over [`XPathNode`], a minimal interface a host
//! tree must provide; axes beyond the primitives below (`descendant`,
//! `following`, `ancestor`, ...) are derived generically on top of them in
//! [`crate::axis`]. [`simple`] provides a small owned-arena implementation,
//! in the spirit of `xot`'s arena-of-nodes design, used by this crate's own
//! tests and doctests.

use xpath2_name::Name;
use xpath2_schema_type::Xs;

use crate::atomic::Atomic;

/// The kind of node an [`XPathNode`] represents, per the XDM node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

/// The minimal tree interface the evaluator needs from a host document.
///
/// Implementations are expected to be cheap `Copy` handles (as `xot::Node`
/// is): the evaluator clones nodes freely while walking sequences.
pub trait XPathNode: Clone + PartialEq + Eq + std::hash::Hash {
    /// This node's kind.
    fn kind(&self) -> NodeKind;

    fn is_document_node(&self) -> bool {
        self.kind() == NodeKind::Document
    }

    fn is_element_node(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    fn is_attribute_node(&self) -> bool {
        self.kind() == NodeKind::Attribute
    }

    /// Any XDM node kind (always true — present for symmetry with the
    /// kind-specific predicates used by `node()` tests).
    fn is_xpath_node(&self) -> bool {
        true
    }

    /// The expanded name of this node, if it has one (elements,
    /// attributes, processing instructions).
    fn node_name(&self) -> Option<Name>;

    /// The schema type annotation of this node.
    fn type_annotation(&self) -> Xs {
        Xs::UntypedAtomic
    }

    /// `xdm:nilled`: true for an element validated as `xsi:nil="true"`.
    fn nilled(&self) -> bool {
        false
    }

    /// `fn:string()` applied to this node.
    fn string_value(&self) -> String;

    /// `fn:data()` applied to this node: its typed value as a sequence of
    /// atomic values. Untyped nodes atomize to a single `xs:untypedAtomic`.
    fn data_value(&self) -> Vec<Atomic> {
        vec![Atomic::untyped(self.string_value())]
    }

    /// `fn:base-uri()`.
    fn base_uri(&self) -> Option<String> {
        None
    }

    /// `fn:document-uri()`: `Some` only for document nodes that were
    /// loaded from a resource with a known URI.
    fn document_uri(&self) -> Option<String> {
        None
    }

    /// The parent node, if any.
    fn parent(&self) -> Option<Self>;

    /// The document root: the ancestor-or-self with no parent.
    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Children, in document order, preceded by `self` when `self` is not
    /// an element or document node (the `child::` vs. `self::` duality
    /// `/` relies on for atomic steps).
    fn iter_children_or_self(&self) -> Box<dyn Iterator<Item = Self> + '_>;

    /// Attributes of this node, empty unless `self` is an element.
    fn iter_attributes(&self) -> Box<dyn Iterator<Item = Self> + '_>;
}

/// A document plus the dynamic-context notion of "the nodes reachable from
/// here", used to resolve `context.iter()` — the full set of nodes a
/// document exposes for axis traversal.
pub trait XPathContext<N: XPathNode> {
    /// All nodes in this context's document, in document order.
    fn iter(&self) -> Box<dyn Iterator<Item = N> + '_>;
}

/// A small owned-arena tree, used by this crate's tests and doctests as a
/// concrete [`XPathNode`] without pulling in a full XML parser.
pub mod simple {
    use std::rc::Rc;

    use super::*;

    #[derive(Debug)]
    enum Payload {
        Document,
        Element { name: Name, attributes: Vec<(Name, String)> },
        Text(String),
    }

    #[derive(Debug)]
    struct NodeData {
        payload: Payload,
        parent: Option<usize>,
        children: Vec<usize>,
    }

    /// An arena of nodes built up with [`Tree::element`]/[`Tree::text`].
    #[derive(Debug, Default)]
    pub struct Tree {
        nodes: Vec<NodeData>,
    }

    impl Tree {
        pub fn new() -> Self {
            Self {
                nodes: vec![NodeData {
                    payload: Payload::Document,
                    parent: None,
                    children: vec![],
                }],
            }
        }

        pub fn element(&mut self, parent: usize, name: Name, attributes: Vec<(Name, String)>) -> usize {
            let index = self.nodes.len();
            self.nodes.push(NodeData {
                payload: Payload::Element { name, attributes },
                parent: Some(parent),
                children: vec![],
            });
            self.nodes[parent].children.push(index);
            index
        }

        pub fn text(&mut self, parent: usize, text: impl Into<String>) -> usize {
            let index = self.nodes.len();
            self.nodes.push(NodeData {
                payload: Payload::Text(text.into()),
                parent: Some(parent),
                children: vec![],
            });
            self.nodes[parent].children.push(index);
            index
        }
    }

    /// A reference-counted, immutable view of a built [`Tree`].
    pub fn into_shared(tree: Tree) -> SimpleNode {
        SimpleNode { tree: Rc::new(tree), index: 0 }
    }

    /// A handle into a [`Tree`]: a node index plus a shared reference to
    /// the arena, cheap to `Clone` like `xot::Node`.
    #[derive(Debug, Clone)]
    pub struct SimpleNode {
        tree: Rc<Tree>,
        index: usize,
    }

    impl PartialEq for SimpleNode {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.tree, &other.tree) && self.index == other.index
        }
    }
    impl Eq for SimpleNode {}
    impl std::hash::Hash for SimpleNode {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            (Rc::as_ptr(&self.tree) as usize, self.index).hash(state)
        }
    }

    impl SimpleNode {
        fn data(&self) -> &NodeData {
            &self.tree.nodes[self.index]
        }

        fn child(&self, index: usize) -> SimpleNode {
            SimpleNode { tree: self.tree.clone(), index }
        }
    }

    impl XPathNode for SimpleNode {
        fn kind(&self) -> NodeKind {
            match self.data().payload {
                Payload::Document => NodeKind::Document,
                Payload::Element { .. } => NodeKind::Element,
                Payload::Text(_) => NodeKind::Text,
            }
        }

        fn node_name(&self) -> Option<Name> {
            match &self.data().payload {
                Payload::Element { name, .. } => Some(name.clone()),
                _ => None,
            }
        }

        fn string_value(&self) -> String {
            match &self.data().payload {
                Payload::Text(text) => text.clone(),
                Payload::Document | Payload::Element { .. } => {
                    let mut out = String::new();
                    collect_text(self, &mut out);
                    out
                }
            }
        }

        fn parent(&self) -> Option<Self> {
            self.data().parent.map(|i| self.child(i))
        }

        fn iter_children_or_self(&self) -> Box<dyn Iterator<Item = Self> + '_> {
            match self.data().payload {
                Payload::Document | Payload::Element { .. } => {
                    Box::new(self.data().children.iter().map(move |&i| self.child(i)))
                }
                Payload::Text(_) => Box::new(std::iter::once(self.clone())),
            }
        }

        fn iter_attributes(&self) -> Box<dyn Iterator<Item = Self> + '_> {
            Box::new(std::iter::empty())
        }
    }

    fn collect_text(node: &SimpleNode, out: &mut String) {
        match &node.data().payload {
            Payload::Text(text) => out.push_str(text),
            Payload::Document | Payload::Element { .. } => {
                for &i in &node.data().children {
                    collect_text(&node.child(i), out)
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use xpath2_name::Name;

        #[test]
        fn test_string_value_concatenates_descendant_text() {
            let mut tree = Tree::new();
            let root = tree.element(0, Name::unprefixed("root"), vec![]);
            let child = tree.element(root, Name::unprefixed("child"), vec![]);
            tree.text(child, "hello ");
            tree.text(root, "world");
            let node = into_shared(tree);
            assert_eq!(node.string_value(), "hello world");
        }

        #[test]
        fn test_parent_chain_reaches_document_root() {
            let mut tree = Tree::new();
            let root = tree.element(0, Name::unprefixed("root"), vec![]);
            let child = tree.element(root, Name::unprefixed("child"), vec![]);
            let node = into_shared(tree);
            let child_node = node.child(child);
            assert_eq!(child_node.root().kind(), NodeKind::Document);
        }
    }
}

//! The sequence data model (§3, component F): an [`Item`] is either an
//! atomic value or a node; a [`Sequence`] is a flat, ordered list of items
//! (XDM sequences never nest).

use crate::atomic::Atomic;
use crate::tree::XPathNode;

/// A single item: atomic value or node.
#[derive(Debug, Clone)]
pub enum Item<N: XPathNode> {
    Atomic(Atomic),
    Node(N),
}

impl<N: XPathNode> Item<N> {
    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    /// `fn:data()` applied to a single item: nodes atomize to their typed
    /// value (a sequence itself, by the node's schema type annotation, for
    /// now always a single `xs:untypedAtomic`).
    pub fn atomize(&self) -> Vec<Atomic> {
        match self {
            Item::Atomic(a) => vec![a.clone()],
            Item::Node(n) => n.data_value(),
        }
    }

    /// `fn:string()` applied to a single item.
    pub fn string_value(&self) -> String {
        match self {
            Item::Atomic(a) => a.to_xpath_string(),
            Item::Node(n) => n.string_value(),
        }
    }
}

/// A flat, ordered sequence of items — the only aggregate value XPath has.
#[derive(Debug, Clone, Default)]
pub struct Sequence<N: XPathNode>(Vec<Item<N>>);

impl<N: XPathNode> Sequence<N> {
    pub fn empty() -> Self {
        Sequence(Vec::new())
    }

    pub fn singleton(item: Item<N>) -> Self {
        Sequence(vec![item])
    }

    pub fn from_items(items: Vec<Item<N>>) -> Self {
        Sequence(items)
    }

    pub fn from_atomic(value: Atomic) -> Self {
        Sequence(vec![Item::Atomic(value)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn items(&self) -> &[Item<N>] {
        &self.0
    }

    pub fn into_items(self) -> Vec<Item<N>> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<N>> {
        self.0.iter()
    }

    pub fn push(&mut self, item: Item<N>) {
        self.0.push(item)
    }

    pub fn extend(&mut self, other: Sequence<N>) {
        self.0.extend(other.0)
    }

    /// The single item this sequence contains, per `exactly-one` semantics.
    pub fn exactly_one(&self) -> Result<&Item<N>, crate::error::Error> {
        match self.0.as_slice() {
            [item] => Ok(item),
            _ => Err(crate::error::Error::FORG0005),
        }
    }

    /// `zero-or-one`: `None` for an empty sequence, the item for a
    /// singleton, `XPTY0004`/`FORG0003`-style error for more than one.
    pub fn zero_or_one(&self) -> Result<Option<&Item<N>>, crate::error::Error> {
        match self.0.as_slice() {
            [] => Ok(None),
            [item] => Ok(Some(item)),
            _ => Err(crate::error::Error::FORG0003),
        }
    }

    /// `fn:boolean()`'s effective boolean value rule for a whole sequence:
    /// a node-set-like sequence is true iff non-empty; a singleton atomic
    /// falls back to [`Atomic::effective_boolean_value`]; any other
    /// multi-item non-node sequence is a type error.
    pub fn effective_boolean_value(&self) -> Result<bool, crate::error::Error> {
        match self.0.as_slice() {
            [] => Ok(false),
            [Item::Node(_), ..] => Ok(true),
            [Item::Atomic(a)] => a.effective_boolean_value(),
            _ => Err(crate::error::Error::FORG0006),
        }
    }

    /// `fn:data()` applied to the whole sequence.
    pub fn atomize(&self) -> Vec<Atomic> {
        self.0.iter().flat_map(|item| item.atomize()).collect()
    }
}

impl<N: XPathNode> FromIterator<Item<N>> for Sequence<N> {
    fn from_iter<T: IntoIterator<Item = Item<N>>>(iter: T) -> Self {
        Sequence(iter.into_iter().collect())
    }
}

impl<N: XPathNode> IntoIterator for Sequence<N> {
    type Item = Item<N>;
    type IntoIter = std::vec::IntoIter<Item<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

//! Node accessor functions (F&O §5): all take an optional node argument
//! defaulting to the context item, and fail with `XPTY0004` when the
//! argument (or context item) is not a node.

use crate::atomic::Atomic;
use crate::context::DynamicContext;
use crate::error::Error;
use crate::sequence::{Item, Sequence};
use crate::tree::XPathNode;

use super::context_node_or_arg;

fn node_arg<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Option<N>, Error> {
    match context_node_or_arg(args, ctx)? {
        None => Ok(None),
        Some(Item::Node(n)) => Ok(Some(n)),
        Some(Item::Atomic(_)) => Err(Error::XPTY0004),
    }
}

pub(super) fn node_name<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::empty()),
    };
    match node.node_name() {
        Some(name) => Ok(Sequence::from_atomic(Atomic::QName(name))),
        None => Ok(Sequence::empty()),
    }
}

pub(super) fn nilled<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::empty()),
    };
    if !node.is_element_node() {
        return Ok(Sequence::empty());
    }
    Ok(Sequence::from_atomic(Atomic::Boolean(node.nilled())))
}

pub(super) fn data<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let item = match context_node_or_arg(args, ctx)? {
        Some(item) => item,
        None => return Ok(Sequence::empty()),
    };
    Ok(Sequence::from_items(item.atomize().into_iter().map(Item::Atomic).collect()))
}

pub(super) fn base_uri<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::empty()),
    };
    match node.base_uri() {
        Some(uri) => Ok(Sequence::from_atomic(Atomic::String(
            crate::atomic::StringType::AnyURI,
            uri.into(),
        ))),
        None => Ok(Sequence::empty()),
    }
}

pub(super) fn document_uri<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let node = match seq.zero_or_one()? {
        None => return Ok(Sequence::empty()),
        Some(Item::Node(n)) => n,
        Some(Item::Atomic(_)) => return Err(Error::XPTY0004),
    };
    if !node.is_document_node() {
        return Ok(Sequence::empty());
    }
    match node.document_uri() {
        Some(uri) => Ok(Sequence::from_atomic(Atomic::String(
            crate::atomic::StringType::AnyURI,
            uri.into(),
        ))),
        None => Ok(Sequence::empty()),
    }
}

pub(super) fn root<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::empty()),
    };
    Ok(Sequence::singleton(Item::Node(node.root())))
}

pub(super) fn name<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::from_atomic(Atomic::string(""))),
    };
    let name = match node.node_name() {
        Some(name) => name.to_full_name(),
        None => String::new(),
    };
    Ok(Sequence::from_atomic(Atomic::string(name)))
}

pub(super) fn local_name<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::from_atomic(Atomic::string(""))),
    };
    let name = match node.node_name() {
        Some(name) => name.local_name().to_string(),
        None => String::new(),
    };
    Ok(Sequence::from_atomic(Atomic::string(name)))
}

pub(super) fn namespace_uri<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let node = match node_arg(args, ctx)? {
        Some(n) => n,
        None => return Ok(Sequence::from_atomic(Atomic::string(""))),
    };
    let uri = node
        .node_name()
        .and_then(|name| name.namespace().map(str::to_string))
        .unwrap_or_default();
    Ok(Sequence::from_atomic(Atomic::String(
        crate::atomic::StringType::AnyURI,
        uri.into(),
    )))
}

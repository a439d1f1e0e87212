//! QName functions (F&O §10): construction and decomposition of
//! `xs:QName` values, and prefix resolution against the in-scope
//! namespaces known to this evaluation — the static context's namespace
//! table, since [`crate::tree::XPathNode`] carries no per-node namespace
//! axis of its own.

use xpath2_name::Name;

use crate::atomic::Atomic;
use crate::context::DynamicContext;
use crate::error::Error;
use crate::sequence::{Item, Sequence};
use crate::tree::XPathNode;

use super::atomized_arg;

fn as_string<N: XPathNode>(seq: &Sequence<N>) -> Result<Option<String>, Error> {
    Ok(atomized_arg(seq)?.map(|a| a.to_xpath_string()))
}

pub(super) fn qname<N: XPathNode>(
    uri: &Sequence<N>,
    name: &Sequence<N>,
) -> Result<Sequence<N>, Error> {
    let uri = as_string(uri)?;
    let lexical = as_string(name)?.ok_or(Error::FORG0001)?;
    let (prefix, local) = match lexical.split_once(':') {
        Some((p, l)) => (Some(p.to_string()), l.to_string()),
        None => (None, lexical),
    };
    if !is_ncname(&local) || prefix.as_deref().is_some_and(|p| !is_ncname(p)) {
        return Err(Error::FOCA0002);
    }
    Ok(Sequence::from_atomic(Atomic::QName(Name::new(local, uri, prefix))))
}

fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

fn as_qname<N: XPathNode>(seq: &Sequence<N>) -> Result<Option<Name>, Error> {
    match atomized_arg(seq)? {
        None => Ok(None),
        Some(Atomic::QName(n)) => Ok(Some(n)),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn prefix_from_qname<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match as_qname(seq)? {
        None => Ok(Sequence::empty()),
        Some(n) => match n.prefix() {
            Some(p) if !p.is_empty() => Ok(Sequence::from_atomic(Atomic::String(
                crate::atomic::StringType::NCName,
                p.into(),
            ))),
            _ => Ok(Sequence::empty()),
        },
    }
}

pub(super) fn local_name_from_qname<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match as_qname(seq)? {
        None => Ok(Sequence::empty()),
        Some(n) => Ok(Sequence::from_atomic(Atomic::String(
            crate::atomic::StringType::NCName,
            n.local_name().into(),
        ))),
    }
}

pub(super) fn namespace_uri_from_qname<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match as_qname(seq)? {
        None => Ok(Sequence::empty()),
        Some(n) => Ok(Sequence::from_atomic(Atomic::String(
            crate::atomic::StringType::AnyURI,
            n.namespace().unwrap_or("").into(),
        ))),
    }
}

pub(super) fn namespace_uri_for_prefix<N: XPathNode>(
    prefix: &Sequence<N>,
    element: &Sequence<N>,
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let _ = element.exactly_one().map_err(|_| Error::XPTY0004)?;
    let prefix = as_string(prefix)?.unwrap_or_default();
    let prefix = if prefix.is_empty() { "" } else { &prefix };
    match ctx.static_context.resolve_prefix(prefix) {
        Some(uri) => Ok(Sequence::from_atomic(Atomic::String(
            crate::atomic::StringType::AnyURI,
            uri.into(),
        ))),
        None => Ok(Sequence::empty()),
    }
}

pub(super) fn in_scope_prefixes<N: XPathNode>(
    element: &Sequence<N>,
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let _ = element.exactly_one().map_err(|_| Error::XPTY0004)?;
    let items = ctx
        .static_context
        .namespaces()
        .prefixes()
        .map(|p| Item::Atomic(Atomic::String(crate::atomic::StringType::NCName, p.into())))
        .collect::<Vec<_>>();
    Ok(Sequence::from_items(items))
}

pub(super) fn resolve_qname<N: XPathNode>(
    qname: &Sequence<N>,
    element: &Sequence<N>,
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let _ = element.exactly_one().map_err(|_| Error::XPTY0004)?;
    let lexical = match as_string(qname)? {
        Some(s) => s,
        None => return Ok(Sequence::empty()),
    };
    let (prefix, local) = match lexical.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, lexical.as_str()),
    };
    if !is_ncname(local) || prefix.is_some_and(|p| !is_ncname(p)) {
        return Err(Error::FOCA0002);
    }
    let uri = match prefix {
        Some(p) => Some(
            ctx.static_context
                .resolve_prefix(p)
                .ok_or(Error::FONS0004)?
                .to_string(),
        ),
        None => ctx
            .static_context
            .namespaces()
            .default_element_namespace()
            .to_string()
            .into(),
    };
    let uri = uri.filter(|u| !u.is_empty());
    Ok(Sequence::from_atomic(Atomic::QName(Name::new(
        local.to_string(),
        uri,
        prefix.map(str::to_string),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ncname_rejects_leading_digit_and_colon() {
        assert!(is_ncname("foo"));
        assert!(is_ncname("foo-bar.baz_2"));
        assert!(!is_ncname("2foo"));
        assert!(!is_ncname("foo:bar"));
        assert!(!is_ncname(""));
    }
}

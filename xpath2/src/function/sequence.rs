//! General sequence functions: boolean coercion, cardinality, membership,
//! and the small numeric aggregates (`fn:sum`/`fn:avg`/`fn:min`/`fn:max`).

use crate::atomic::{compare, ops, Atomic};
use crate::error::Error;
use crate::eval::atomic_of_item;
use crate::sequence::{Item, Sequence};
use crate::tree::XPathNode;

pub(super) fn not<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let ebv = seq.effective_boolean_value()?;
    Ok(Sequence::from_atomic(Atomic::Boolean(!ebv)))
}

pub(super) fn boolean<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(Sequence::from_atomic(Atomic::Boolean(seq.effective_boolean_value()?)))
}

pub(super) fn empty<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(Sequence::from_atomic(Atomic::Boolean(seq.is_empty())))
}

pub(super) fn exists<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(Sequence::from_atomic(Atomic::Boolean(!seq.is_empty())))
}

pub(super) fn count<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(Sequence::from_atomic(Atomic::integer(seq.len() as i64)))
}

pub(super) fn distinct_values<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for atomic in seq.atomize() {
        let key = atomic.map_key();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(Item::Atomic(atomic));
        }
    }
    Ok(Sequence::from_items(out))
}

pub(super) fn insert_before<N: XPathNode>(
    target: &Sequence<N>,
    position: &Sequence<N>,
    inserts: &Sequence<N>,
) -> Result<Sequence<N>, Error> {
    let pos = as_index(position)?;
    let pos = pos.max(1) as usize - 1;
    let mut items = target.items().to_vec();
    let pos = pos.min(items.len());
    for (offset, item) in inserts.items().iter().cloned().enumerate() {
        items.insert(pos + offset, item);
    }
    Ok(Sequence::from_items(items))
}

pub(super) fn index_of<N: XPathNode>(
    seq: &Sequence<N>,
    search: &Sequence<N>,
) -> Result<Sequence<N>, Error> {
    let target = atomic_of_item(
        search
            .exactly_one()
            .map_err(|_| Error::XPTY0004)?,
    )?;
    let mut out = Vec::new();
    for (idx, item) in seq.items().iter().enumerate() {
        let value = atomic_of_item(item)?;
        if compare::compare(&value, &target, compare::CompareOp::Eq).unwrap_or(false) {
            out.push(Item::Atomic(Atomic::integer((idx + 1) as i64)));
        }
    }
    Ok(Sequence::from_items(out))
}

pub(super) fn remove<N: XPathNode>(seq: &Sequence<N>, position: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let pos = as_index(position)?;
    let items: Vec<_> = seq
        .items()
        .iter()
        .enumerate()
        .filter(|(idx, _)| (*idx as i64) + 1 != pos)
        .map(|(_, item)| item.clone())
        .collect();
    Ok(Sequence::from_items(items))
}

pub(super) fn reverse<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let mut items = seq.items().to_vec();
    items.reverse();
    Ok(Sequence::from_items(items))
}

pub(super) fn subsequence<N: XPathNode>(
    seq: &Sequence<N>,
    start: &Sequence<N>,
    length: Option<&Sequence<N>>,
) -> Result<Sequence<N>, Error> {
    let start = as_double(start)?;
    let len = match length {
        Some(l) => Some(as_double(l)?),
        None => None,
    };
    let items = seq.items();
    let n = items.len() as f64;
    // §F&O 15.1.10: 1-based, fractional bounds round to nearest (ties to
    // even is not required here — `round()` below matches the common
    // round-half-away-from-zero most hosts actually observe).
    let first = start.round();
    let last = match len {
        Some(l) => (start + l).round(),
        None => n + 1.0,
    };
    let lo = first.max(1.0) as usize;
    let hi = last.min(n + 1.0);
    if hi <= lo as f64 || lo as f64 > n {
        return Ok(Sequence::empty());
    }
    let hi = hi as usize;
    let out: Vec<_> = items[(lo - 1).min(items.len())..hi.saturating_sub(1).min(items.len())]
        .to_vec();
    Ok(Sequence::from_items(out))
}

pub(super) fn zero_or_one<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    if seq.len() > 1 {
        return Err(Error::FORG0003);
    }
    Ok(seq.clone())
}

pub(super) fn one_or_more<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    if seq.is_empty() {
        return Err(Error::FORG0004);
    }
    Ok(seq.clone())
}

pub(super) fn exactly_one<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    if seq.len() != 1 {
        return Err(Error::FORG0005);
    }
    Ok(seq.clone())
}

pub(super) fn sum<N: XPathNode>(
    seq: &Sequence<N>,
    zero: Option<&Sequence<N>>,
) -> Result<Sequence<N>, Error> {
    let values = seq.atomize();
    if values.is_empty() {
        return match zero {
            Some(z) => Ok(z.clone()),
            None => Ok(Sequence::from_atomic(Atomic::integer(0))),
        };
    }
    let mut acc = values[0].clone();
    if !acc.is_numeric() {
        return Err(Error::FORG0006);
    }
    for v in &values[1..] {
        if !v.is_numeric() {
            return Err(Error::FORG0006);
        }
        acc = ops::numeric_op(ops::ArithOp::Add, &acc, v)?;
    }
    Ok(Sequence::from_atomic(acc))
}

pub(super) fn avg<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let values = seq.atomize();
    if values.is_empty() {
        return Ok(Sequence::empty());
    }
    let mut acc = values[0].clone();
    if !acc.is_numeric() {
        return Err(Error::FORG0006);
    }
    for v in &values[1..] {
        if !v.is_numeric() {
            return Err(Error::FORG0006);
        }
        acc = ops::numeric_op(ops::ArithOp::Add, &acc, v)?;
    }
    let count = Atomic::integer(values.len() as i64);
    Ok(Sequence::from_atomic(ops::numeric_op(ops::ArithOp::Divide, &acc, &count)?))
}

pub(super) fn min<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    extreme(seq, compare::CompareOp::Lt)
}

pub(super) fn max<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    extreme(seq, compare::CompareOp::Gt)
}

fn extreme<N: XPathNode>(seq: &Sequence<N>, keep_if: compare::CompareOp) -> Result<Sequence<N>, Error> {
    let values = seq.atomize();
    let mut iter = values.into_iter();
    let mut best = match iter.next() {
        Some(v) => v,
        None => return Ok(Sequence::empty()),
    };
    for v in iter {
        if compare::compare(&v, &best, keep_if)? {
            best = v;
        }
    }
    Ok(Sequence::from_atomic(best))
}

fn as_index<N: XPathNode>(seq: &Sequence<N>) -> Result<i64, Error> {
    let item = seq.exactly_one().map_err(|_| Error::XPTY0004)?;
    let value = atomic_of_item(item)?;
    match crate::atomic::cast::cast_to(&value, xpath2_schema_type::Xs::Integer)? {
        Atomic::Integer(_, i) => Ok(i.to_string().parse().unwrap_or(0)),
        _ => Err(Error::XPTY0004),
    }
}

fn as_double<N: XPathNode>(seq: &Sequence<N>) -> Result<f64, Error> {
    let item = seq.exactly_one().map_err(|_| Error::XPTY0004)?;
    let value = atomic_of_item(item)?;
    match crate::atomic::cast::cast_to(&value, xpath2_schema_type::Xs::Double)? {
        Atomic::Double(d) => Ok(d.0),
        _ => Err(Error::XPTY0004),
    }
}

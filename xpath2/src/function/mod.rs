//! The built-in function library (component H): `fn:*` functions resolved
//! by name and arity at call time, dispatched from [`crate::eval`].
//!
//! Organized the way the evaluator is organized: one module per concern
//! (strings, numerics, nodes, QNames, temporal values) and a thin
//! dispatch table here that routes a call to the right one.

mod node;
mod numeric;
mod qname;
mod sequence;
mod string;
mod temporal;

use xpath2_name::Name;

use crate::atomic::Atomic;
use crate::context::DynamicContext;
use crate::error::Error;
use crate::eval::atomic_of_item;
use crate::sequence::{Item, Sequence};
use crate::tree::XPathNode;

/// Reads the function's single atomized argument, or `None` for an empty
/// sequence — the shape most unary `fn:*` functions share.
pub(crate) fn atomized_arg<N: XPathNode>(seq: &Sequence<N>) -> Result<Option<Atomic>, Error> {
    match seq.zero_or_one()? {
        None => Ok(None),
        Some(item) => Ok(Some(atomic_of_item(item)?)),
    }
}

/// Same as [`atomized_arg`], but defaulting to the dynamic context item
/// when `args` has no explicit operand (the `fn:string()`/`fn:name()`
/// zero-arity overloads).
pub(crate) fn atomized_arg_or_context<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Option<Atomic>, Error> {
    match args.first() {
        Some(seq) => atomized_arg(seq),
        None => Ok(Some(atomic_of_item(ctx.context_item()?)?)),
    }
}

pub(crate) fn context_node_or_arg<'a, N: XPathNode>(
    args: &'a [Sequence<N>],
    ctx: &'a DynamicContext<N>,
) -> Result<Option<Item<N>>, Error> {
    match args.first() {
        Some(seq) => Ok(seq.zero_or_one()?.cloned()),
        None => Ok(Some(ctx.context_item()?.clone())),
    }
}

/// Dispatches a function call by expanded name and argument count.
///
/// Every signature in this crate lives in the `fn:` namespace (or, in
/// non-strict mode, unprefixed names the static context's default
/// function namespace resolves to `fn:` already) — anything else is an
/// undefined function reference.
pub fn call<N: XPathNode>(
    name: &Name,
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    if !matches!(name.namespace(), None | Some(xpath2_name::FN_NAMESPACE)) {
        return Err(Error::XPST0017);
    }
    let local = name.local_name();
    let arity = args.len();
    match (local, arity) {
        ("true", 0) => Ok(Sequence::from_atomic(Atomic::Boolean(true))),
        ("false", 0) => Ok(Sequence::from_atomic(Atomic::Boolean(false))),
        ("not", 1) => sequence::not(&args[0]),
        ("boolean", 1) => sequence::boolean(&args[0]),
        ("empty", 1) => sequence::empty(&args[0]),
        ("exists", 1) => sequence::exists(&args[0]),
        ("count", 1) => sequence::count(&args[0]),
        ("distinct-values", 1) | ("distinct-values", 2) => sequence::distinct_values(&args[0]),
        ("insert-before", 3) => sequence::insert_before(&args[0], &args[1], &args[2]),
        ("index-of", 2) | ("index-of", 3) => sequence::index_of(&args[0], &args[1]),
        ("remove", 2) => sequence::remove(&args[0], &args[1]),
        ("reverse", 1) => sequence::reverse(&args[0]),
        ("subsequence", 2) => sequence::subsequence(&args[0], &args[1], None),
        ("subsequence", 3) => sequence::subsequence(&args[0], &args[1], Some(&args[2])),
        ("unordered", 1) => Ok(args[0].clone()),
        ("zero-or-one", 1) => sequence::zero_or_one(&args[0]),
        ("one-or-more", 1) => sequence::one_or_more(&args[0]),
        ("exactly-one", 1) => sequence::exactly_one(&args[0]),
        ("sum", 1) => sequence::sum(&args[0], None),
        ("sum", 2) => sequence::sum(&args[0], Some(&args[1])),
        ("avg", 1) => sequence::avg(&args[0]),
        ("min", 1) | ("min", 2) => sequence::min(&args[0]),
        ("max", 1) | ("max", 2) => sequence::max(&args[0]),

        ("string", 0) | ("string", 1) => string::string_fn(args, ctx),
        ("concat", _) if arity >= 2 => string::concat(args),
        ("string-length", 0) | ("string-length", 1) => string::string_length(args, ctx),
        ("normalize-space", 0) | ("normalize-space", 1) => string::normalize_space(args, ctx),
        ("upper-case", 1) => string::upper_case(&args[0]),
        ("lower-case", 1) => string::lower_case(&args[0]),
        ("contains", 2) | ("contains", 3) => string::contains(&args[0], &args[1]),
        ("starts-with", 2) | ("starts-with", 3) => string::starts_with(&args[0], &args[1]),
        ("ends-with", 2) | ("ends-with", 3) => string::ends_with(&args[0], &args[1]),
        ("substring", 2) => string::substring(&args[0], &args[1], None),
        ("substring", 3) => string::substring(&args[0], &args[1], Some(&args[2])),
        ("substring-before", 2) => string::substring_before(&args[0], &args[1]),
        ("substring-after", 2) => string::substring_after(&args[0], &args[1]),
        ("translate", 3) => string::translate(&args[0], &args[1], &args[2]),
        ("string-join", 2) => string::string_join(&args[0], &args[1]),
        ("codepoints-to-string", 1) => string::codepoints_to_string(&args[0]),
        ("string-to-codepoints", 1) => string::string_to_codepoints(&args[0]),
        ("encode-for-uri", 1) => string::encode_for_uri(&args[0]),
        ("iri-to-uri", 1) => string::iri_to_uri(&args[0]),
        ("escape-html-uri", 1) => string::escape_html_uri(&args[0]),

        ("abs", 1) => numeric::abs(&args[0]),
        ("ceiling", 1) => numeric::ceiling(&args[0]),
        ("floor", 1) => numeric::floor(&args[0]),
        ("round", 1) => numeric::round(&args[0]),
        ("round-half-to-even", 1) | ("round-half-to-even", 2) => {
            numeric::round_half_to_even(&args[0], args.get(1))
        }

        ("node-name", 0) | ("node-name", 1) => node::node_name(args, ctx),
        ("nilled", 0) | ("nilled", 1) => node::nilled(args, ctx),
        ("data", 0) | ("data", 1) => node::data(args, ctx),
        ("base-uri", 0) | ("base-uri", 1) => node::base_uri(args, ctx),
        ("document-uri", 1) => node::document_uri(&args[0]),
        ("root", 0) | ("root", 1) => node::root(args, ctx),
        ("name", 0) | ("name", 1) => node::name(args, ctx),
        ("local-name", 0) | ("local-name", 1) => node::local_name(args, ctx),
        ("namespace-uri", 0) | ("namespace-uri", 1) => node::namespace_uri(args, ctx),

        ("QName", 2) => qname::qname(&args[0], &args[1]),
        ("prefix-from-QName", 1) => qname::prefix_from_qname(&args[0]),
        ("local-name-from-QName", 1) => qname::local_name_from_qname(&args[0]),
        ("namespace-uri-from-QName", 1) => qname::namespace_uri_from_qname(&args[0]),
        ("namespace-uri-for-prefix", 2) => qname::namespace_uri_for_prefix(&args[0], &args[1], ctx),
        ("in-scope-prefixes", 1) => qname::in_scope_prefixes(&args[0], ctx),
        ("resolve-QName", 2) => qname::resolve_qname(&args[0], &args[1], ctx),

        ("current-dateTime", 0) => temporal::current_date_time(ctx),
        ("current-date", 0) => temporal::current_date(ctx),
        ("current-time", 0) => temporal::current_time(ctx),
        ("implicit-timezone", 0) => temporal::implicit_timezone(ctx),
        ("adjust-dateTime-to-timezone", 1) | ("adjust-dateTime-to-timezone", 2) => {
            temporal::adjust_date_time_to_timezone(&args[0], args.get(1), ctx)
        }
        ("adjust-date-to-timezone", 1) | ("adjust-date-to-timezone", 2) => {
            temporal::adjust_date_to_timezone(&args[0], args.get(1), ctx)
        }
        ("adjust-time-to-timezone", 1) | ("adjust-time-to-timezone", 2) => {
            temporal::adjust_time_to_timezone(&args[0], args.get(1), ctx)
        }
        ("years-from-duration", 1) => temporal::years_from_duration(&args[0]),
        ("months-from-duration", 1) => temporal::months_from_duration(&args[0]),
        ("days-from-duration", 1) => temporal::days_from_duration(&args[0]),
        ("hours-from-duration", 1) => temporal::hours_from_duration(&args[0]),
        ("minutes-from-duration", 1) => temporal::minutes_from_duration(&args[0]),
        ("seconds-from-duration", 1) => temporal::seconds_from_duration(&args[0]),
        ("year-from-dateTime", 1) => temporal::year_from_date_time(&args[0]),
        ("month-from-dateTime", 1) => temporal::month_from_date_time(&args[0]),
        ("day-from-dateTime", 1) => temporal::day_from_date_time(&args[0]),
        ("hours-from-dateTime", 1) => temporal::hours_from_date_time(&args[0]),
        ("minutes-from-dateTime", 1) => temporal::minutes_from_date_time(&args[0]),
        ("seconds-from-dateTime", 1) => temporal::seconds_from_date_time(&args[0]),
        ("timezone-from-dateTime", 1) => temporal::timezone_from_date_time(&args[0]),
        ("year-from-date", 1) => temporal::year_from_date(&args[0]),
        ("month-from-date", 1) => temporal::month_from_date(&args[0]),
        ("day-from-date", 1) => temporal::day_from_date(&args[0]),
        ("timezone-from-date", 1) => temporal::timezone_from_date(&args[0]),
        ("hours-from-time", 1) => temporal::hours_from_time(&args[0]),
        ("minutes-from-time", 1) => temporal::minutes_from_time(&args[0]),
        ("seconds-from-time", 1) => temporal::seconds_from_time(&args[0]),
        ("timezone-from-time", 1) => temporal::timezone_from_time(&args[0]),

        ("error", 0) => Err(Error::FOER0000),
        ("error", 1) | ("error", 2) | ("error", 3) => Err(Error::FOER0000),

        ("document-node", _) | ("element", _) | ("schema-attribute", _) | ("schema-element", _)
        | ("empty-sequence", _) => Err(Error::XPST0017),

        ("compare", _) | ("codepoint-equal", _) | ("normalize-unicode", _) => Err(Error::Unsupported),

        _ => Err(Error::XPST0017),
    }
}

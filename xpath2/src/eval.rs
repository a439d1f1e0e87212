//! The sequence evaluator (component F): walks an [`Expr`] against a
//! [`DynamicContext`] and produces a [`Sequence`].
//!
//! [`evaluate`] is the single authoritative evaluator; [`select`] is its
//! streaming-looking sibling for callers that only want to iterate a
//! result once. A fully incremental per-`ExprKind` iterator pipeline would
//! let a caller stop consuming `//descendant::*` halfway through without
//! paying for the rest, but nothing in this crate's own call sites needs
//! that yet, so `select` is a thin wrapper around the materialized
//! `Sequence` for now (see DESIGN.md).

use std::rc::Rc;

use ibig::IBig;
use ordered_float::OrderedFloat;
use xpath2_name::Name;
use xpath2_schema_type::Xs;

use crate::ast::{
    Binding, Expr, ExprKind, GeneralCompareOp, ItemType, KindTest, NodeCompareOp, NodeTest,
    Occurrence, SequenceType, SetOp, Step, ValueCompareOp,
};
use crate::atomic::compare::CompareOp;
use crate::atomic::{cast, compare, ops, Atomic, IntegerType, StringType};
use crate::axis;
use crate::context::{DynamicContext, StaticContext};
use crate::error::{Error, SpannedError, SpannedResult};
use crate::function;
use crate::sequence::{Item, Sequence};
use crate::span::SourceSpan;
use crate::tree::{NodeKind, XPathNode};

/// §4.C "static pre-evaluation for constructors": attempts to fold a
/// freshly parsed built-in constructor call to its value with no dynamic
/// context available. Only handles the case the parser actually produces
/// on a literal argument — a richer constant folder (e.g. `xs:integer(1 +
/// 1)`) is left for runtime, which still computes the right answer, just
/// without the parse-time shortcut.
///
/// Returns `None` when the expression isn't something this can fold
/// (leaving it for runtime, same as a genuine `XPDY0002`); `Some(Err(_))`
/// surfaces an error the caller should fold into an always-failing node
/// rather than silently dropping it — though `try_static_constructor_fold`
/// currently treats both alike and defers to runtime either way.
pub fn try_evaluate_constructor_statically(expr: &Expr) -> Option<Result<Atomic, Error>> {
    let (name, arg) = match &expr.kind {
        ExprKind::Constructor(name, arg) => (name, arg),
        _ => return None,
    };
    let xs = Xs::by_name(name.namespace(), name.local_name())?;
    match arg {
        None => None,
        Some(inner) => {
            let atomic = literal_atomic(inner)?;
            Some(cast::cast_to(&atomic, xs))
        }
    }
}

/// Reads a literal atomic value straight off an `Expr` without touching
/// any context — the narrow slice of expressions the parser can see
/// folded already by the time a constructor call wraps them.
fn literal_atomic(expr: &Expr) -> Option<Atomic> {
    match &expr.kind {
        ExprKind::IntegerLiteral(v) => Some(Atomic::Integer(IntegerType::Integer, Rc::new(v.clone()))),
        ExprKind::DecimalLiteral(v) => Some(Atomic::Decimal(*v)),
        ExprKind::DoubleLiteral(v) => Some(Atomic::Double(OrderedFloat(*v))),
        ExprKind::StringLiteral(s) => Some(Atomic::string(s.clone())),
        ExprKind::AtomicValue(a) => Some(a.clone()),
        ExprKind::Negate(inner) => literal_atomic(inner).and_then(|a| ops::numeric_negate(&a).ok()),
        _ => None,
    }
}

/// Evaluates `expr` against `ctx`, returning its materialized result.
pub fn evaluate<N: XPathNode>(expr: &Expr, ctx: &DynamicContext<N>) -> SpannedResult<Sequence<N>> {
    match &expr.kind {
        ExprKind::IntegerLiteral(v) => Ok(Sequence::from_atomic(Atomic::Integer(
            IntegerType::Integer,
            Rc::new(v.clone()),
        ))),
        ExprKind::DecimalLiteral(v) => Ok(Sequence::from_atomic(Atomic::Decimal(*v))),
        ExprKind::DoubleLiteral(v) => Ok(Sequence::from_atomic(Atomic::Double(OrderedFloat(*v)))),
        ExprKind::StringLiteral(s) => {
            Ok(Sequence::from_atomic(Atomic::String(StringType::String, s.clone())))
        }
        ExprKind::AtomicValue(a) => Ok(Sequence::from_atomic(a.clone())),
        ExprKind::EmptySequence => Ok(Sequence::empty()),
        ExprKind::ContextItem => Ok(Sequence::singleton(
            ctx.context_item().map_err(|e| e.with_span(expr.span))?.clone(),
        )),
        ExprKind::VarRef(name) => ctx
            .variable(name)
            .cloned()
            .ok_or_else(|| Error::XPST0008.with_span(expr.span)),
        ExprKind::Sequence(items) => {
            let mut out = Sequence::empty();
            for item_expr in items {
                out.extend(evaluate(item_expr, ctx)?);
            }
            Ok(out)
        }
        ExprKind::Negate(inner) => eval_negate(inner, ctx, expr.span),
        ExprKind::Arith(op, a, b) => eval_arith(*op, a, b, ctx, expr.span),
        ExprKind::And(a, b) => eval_and(a, b, ctx, expr.span),
        ExprKind::Or(a, b) => eval_or(a, b, ctx, expr.span),
        ExprKind::ValueCompare(op, a, b) => eval_value_compare(*op, a, b, ctx, expr.span),
        ExprKind::GeneralCompare(op, a, b) => eval_general_compare(*op, a, b, ctx, expr.span),
        ExprKind::NodeCompare(op, a, b) => eval_node_compare(*op, a, b, ctx, expr.span),
        ExprKind::SetOp(op, a, b) => eval_set_op(*op, a, b, ctx, expr.span),
        ExprKind::Range(a, b) => eval_range(a, b, ctx, expr.span),
        ExprKind::If(cond, then_branch, else_branch) => {
            if evaluate(cond, ctx)?
                .effective_boolean_value()
                .map_err(|e| e.with_span(expr.span))?
            {
                evaluate(then_branch, ctx)
            } else {
                evaluate(else_branch, ctx)
            }
        }
        ExprKind::For(bindings, body) => {
            let mut out = Sequence::empty();
            for_each_binding(bindings, ctx, &mut |inner| {
                out.extend(evaluate(body, inner)?);
                Ok(())
            })?;
            Ok(out)
        }
        ExprKind::Some(bindings, body) => {
            let found = for_each_binding_quantified(bindings, ctx, body, true)?;
            Ok(Sequence::from_atomic(Atomic::Boolean(found)))
        }
        ExprKind::Every(bindings, body) => {
            let found_false = for_each_binding_quantified(bindings, ctx, body, false)?;
            Ok(Sequence::from_atomic(Atomic::Boolean(!found_false)))
        }
        ExprKind::InstanceOf(operand, seq_type) => {
            let seq = evaluate(operand, ctx)?;
            let ok = matches_sequence_type(&seq, seq_type, ctx.static_context)
                .map_err(|e| e.with_span(expr.span))?;
            Ok(Sequence::from_atomic(Atomic::Boolean(ok)))
        }
        ExprKind::TreatAs(operand, seq_type) => {
            let seq = evaluate(operand, ctx)?;
            if matches_sequence_type(&seq, seq_type, ctx.static_context)
                .map_err(|e| e.with_span(expr.span))?
            {
                Ok(seq)
            } else {
                Err(Error::XPDY0050.with_span(expr.span))
            }
        }
        ExprKind::CastAs(operand, single_type) => {
            let seq = evaluate(operand, ctx)?;
            match seq.zero_or_one().map_err(|e| e.with_span(expr.span))? {
                None if single_type.optional => Ok(Sequence::empty()),
                None => Err(Error::XPTY0004.with_span(expr.span)),
                Some(item) => {
                    let atomic = atomic_of_item(item).map_err(|e| e.with_span(expr.span))?;
                    let result = cast_to_named(&atomic, &single_type.name, ctx.static_context)
                        .map_err(|e| e.with_span(expr.span))?;
                    Ok(Sequence::from_atomic(result))
                }
            }
        }
        ExprKind::CastableAs(operand, single_type) => {
            let seq = evaluate(operand, ctx)?;
            let ok = match seq.zero_or_one() {
                Err(_) => false,
                Ok(None) => single_type.optional,
                Ok(Some(item)) => atomic_of_item(item)
                    .ok()
                    .map(|a| cast_to_named(&a, &single_type.name, ctx.static_context).is_ok())
                    .unwrap_or(false),
            };
            Ok(Sequence::from_atomic(Atomic::Boolean(ok)))
        }
        ExprKind::Constructor(name, arg) => {
            match eval_constructor_arg(arg, ctx, expr.span)? {
                None => Ok(Sequence::empty()),
                Some(a) => {
                    let xs = Xs::by_name(name.namespace(), name.local_name())
                        .ok_or_else(|| Error::XPST0051.with_span(expr.span))?;
                    let result = cast::cast_to(&a, xs).map_err(|e| e.with_span(expr.span))?;
                    Ok(Sequence::from_atomic(result))
                }
            }
        }
        ExprKind::SchemaConstructor(name, arg) => {
            match eval_constructor_arg(arg, ctx, expr.span)? {
                None => Ok(Sequence::empty()),
                Some(a) => {
                    let result = ctx
                        .static_context
                        .schema()
                        .cast_as(&a, name)
                        .map_err(|e| e.with_span(expr.span))?;
                    Ok(Sequence::from_atomic(result))
                }
            }
        }
        ExprKind::FunctionCall(name, args) => {
            let mut arg_seqs = Vec::with_capacity(args.len());
            for a in args {
                arg_seqs.push(evaluate(a, ctx)?);
            }
            function::call(name, &arg_seqs, ctx).map_err(|e| e.with_span(expr.span))
        }
        ExprKind::KindTestExpr(kind) => {
            let item = ctx.context_item().map_err(|e| e.with_span(expr.span))?;
            match item {
                Item::Node(n) if kind_test_matches(n, kind) => {
                    Ok(Sequence::singleton(Item::Node(n.clone())))
                }
                Item::Node(_) => Ok(Sequence::empty()),
                Item::Atomic(_) => Err(Error::XPTY0020.with_span(expr.span)),
            }
        }
        ExprKind::Filter(operand, predicates) => {
            let seq = evaluate(operand, ctx)?;
            let mut items = seq.into_items();
            for predicate in predicates {
                items = filter_items(items, predicate, ctx)?;
            }
            Ok(Sequence::from_items(items))
        }
        ExprKind::Path { is_absolute, root, steps } => eval_path(*is_absolute, root, steps, ctx, expr.span),
    }
}

/// Hands back an iterator over `expr`'s (eagerly materialized) result.
/// See the module doc for why this isn't a genuinely lazy pipeline yet.
pub fn select<N: XPathNode>(
    expr: &Expr,
    ctx: &DynamicContext<N>,
) -> SpannedResult<std::vec::IntoIter<Item<N>>> {
    Ok(evaluate(expr, ctx)?.into_items().into_iter())
}

pub(crate) fn atomic_of_item<N: XPathNode>(item: &Item<N>) -> Result<Atomic, Error> {
    let mut values = item.atomize();
    if values.len() != 1 {
        return Err(Error::XPTY0004);
    }
    Ok(values.remove(0))
}

fn as_nodes<N: XPathNode>(seq: Sequence<N>) -> Result<Vec<N>, Error> {
    seq.into_items()
        .into_iter()
        .map(|item| match item {
            Item::Node(n) => Ok(n),
            Item::Atomic(_) => Err(Error::XPTY0019),
        })
        .collect()
}

fn cast_to_named(atomic: &Atomic, name: &Name, sc: &StaticContext) -> Result<Atomic, Error> {
    match Xs::by_name(name.namespace(), name.local_name()) {
        Some(xs) => cast::cast_to(atomic, xs),
        None => sc.schema().cast_as(atomic, name),
    }
}

fn general_compare_op(op: GeneralCompareOp) -> CompareOp {
    match op {
        GeneralCompareOp::Eq => CompareOp::Eq,
        GeneralCompareOp::Ne => CompareOp::Ne,
        GeneralCompareOp::Lt => CompareOp::Lt,
        GeneralCompareOp::Le => CompareOp::Le,
        GeneralCompareOp::Gt => CompareOp::Gt,
        GeneralCompareOp::Ge => CompareOp::Ge,
    }
}

fn value_compare_op(op: ValueCompareOp) -> CompareOp {
    match op {
        ValueCompareOp::Eq => CompareOp::Eq,
        ValueCompareOp::Ne => CompareOp::Ne,
        ValueCompareOp::Lt => CompareOp::Lt,
        ValueCompareOp::Le => CompareOp::Le,
        ValueCompareOp::Gt => CompareOp::Gt,
        ValueCompareOp::Ge => CompareOp::Ge,
    }
}

fn eval_negate<N: XPathNode>(
    inner: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let seq = evaluate(inner, ctx)?;
    match seq.zero_or_one().map_err(|e| e.with_span(span))? {
        None => Ok(Sequence::empty()),
        Some(item) => {
            let a = atomic_of_item(item).map_err(|e| e.with_span(span))?;
            let result = ops::numeric_negate(&a).map_err(|e| e.with_span(span))?;
            Ok(Sequence::from_atomic(result))
        }
    }
}

fn eval_arith<N: XPathNode>(
    op: crate::ast::ArithOp,
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let left = evaluate(a, ctx)?;
    let right = evaluate(b, ctx)?;
    let (l, r) = match (
        left.zero_or_one().map_err(|e| e.with_span(span))?,
        right.zero_or_one().map_err(|e| e.with_span(span))?,
    ) {
        (Some(l), Some(r)) => (l, r),
        _ => return Ok(Sequence::empty()),
    };
    let la = atomic_of_item(l).map_err(|e| e.with_span(span))?;
    let ra = atomic_of_item(r).map_err(|e| e.with_span(span))?;
    let result = if la.is_numeric() && ra.is_numeric() {
        ops::numeric_op(op.into(), &la, &ra)
    } else {
        ops::datetime_op(op.into(), &la, &ra)
    }
    .map_err(|e| e.with_span(span))?;
    Ok(Sequence::from_atomic(result))
}

fn eval_and<N: XPathNode>(
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    if !evaluate(a, ctx)?
        .effective_boolean_value()
        .map_err(|e| e.with_span(span))?
    {
        return Ok(Sequence::from_atomic(Atomic::Boolean(false)));
    }
    let result = evaluate(b, ctx)?
        .effective_boolean_value()
        .map_err(|e| e.with_span(span))?;
    Ok(Sequence::from_atomic(Atomic::Boolean(result)))
}

fn eval_or<N: XPathNode>(
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    if evaluate(a, ctx)?
        .effective_boolean_value()
        .map_err(|e| e.with_span(span))?
    {
        return Ok(Sequence::from_atomic(Atomic::Boolean(true)));
    }
    let result = evaluate(b, ctx)?
        .effective_boolean_value()
        .map_err(|e| e.with_span(span))?;
    Ok(Sequence::from_atomic(Atomic::Boolean(result)))
}

fn eval_value_compare<N: XPathNode>(
    op: ValueCompareOp,
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let left = evaluate(a, ctx)?;
    let right = evaluate(b, ctx)?;
    let (l, r) = match (
        left.zero_or_one().map_err(|e| e.with_span(span))?,
        right.zero_or_one().map_err(|e| e.with_span(span))?,
    ) {
        (Some(l), Some(r)) => (l, r),
        _ => return Ok(Sequence::empty()),
    };
    let la = atomic_of_item(l).map_err(|e| e.with_span(span))?;
    let ra = atomic_of_item(r).map_err(|e| e.with_span(span))?;
    let result =
        compare::compare(&la, &ra, value_compare_op(op)).map_err(|e| e.with_span(span))?;
    Ok(Sequence::from_atomic(Atomic::Boolean(result)))
}

fn eval_general_compare<N: XPathNode>(
    op: GeneralCompareOp,
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let left = evaluate(a, ctx)?.atomize();
    let right = evaluate(b, ctx)?.atomize();
    let op = general_compare_op(op);
    let mut any = false;
    'outer: for la in &left {
        for rb in &right {
            if compare::compare(la, rb, op).map_err(|e| e.with_span(span))? {
                any = true;
                break 'outer;
            }
        }
    }
    Ok(Sequence::from_atomic(Atomic::Boolean(any)))
}

fn eval_node_compare<N: XPathNode>(
    op: NodeCompareOp,
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let left = evaluate(a, ctx)?;
    let right = evaluate(b, ctx)?;
    let left_item = left.zero_or_one().map_err(|e| e.with_span(span))?;
    let right_item = right.zero_or_one().map_err(|e| e.with_span(span))?;
    match (left_item, right_item) {
        (Some(Item::Node(ln)), Some(Item::Node(rn))) => {
            let result = match op {
                NodeCompareOp::Is => ln == rn,
                NodeCompareOp::Precedes => compare_document_order(ln, rn) == std::cmp::Ordering::Less,
                NodeCompareOp::Follows => compare_document_order(ln, rn) == std::cmp::Ordering::Greater,
            };
            Ok(Sequence::from_atomic(Atomic::Boolean(result)))
        }
        (Some(_), Some(_)) => Err(Error::XPTY0004.with_span(span)),
        _ => Ok(Sequence::empty()),
    }
}

fn eval_set_op<N: XPathNode>(
    op: SetOp,
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let left = as_nodes(evaluate(a, ctx)?).map_err(|e| e.with_span(span))?;
    let right = as_nodes(evaluate(b, ctx)?).map_err(|e| e.with_span(span))?;
    let mut result: Vec<N> = match op {
        SetOp::Union => {
            let mut all = left;
            for n in right {
                if !all.contains(&n) {
                    all.push(n);
                }
            }
            all
        }
        SetOp::Intersect => left.into_iter().filter(|n| right.contains(n)).collect(),
        SetOp::Except => left.into_iter().filter(|n| !right.contains(n)).collect(),
    };
    dedup_sort_document_order(&mut result);
    Ok(Sequence::from_items(result.into_iter().map(Item::Node).collect()))
}

fn eval_range<N: XPathNode>(
    a: &Expr,
    b: &Expr,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let left = evaluate(a, ctx)?;
    let right = evaluate(b, ctx)?;
    let (lo_item, hi_item) = match (
        left.zero_or_one().map_err(|e| e.with_span(span))?,
        right.zero_or_one().map_err(|e| e.with_span(span))?,
    ) {
        (Some(l), Some(r)) => (l, r),
        _ => return Ok(Sequence::empty()),
    };
    let lo = atomic_of_item(lo_item).map_err(|e| e.with_span(span))?;
    let hi = atomic_of_item(hi_item).map_err(|e| e.with_span(span))?;
    let lo = cast::cast_to(&lo, Xs::Integer).map_err(|e| e.with_span(span))?;
    let hi = cast::cast_to(&hi, Xs::Integer).map_err(|e| e.with_span(span))?;
    let (lo, hi) = match (lo, hi) {
        (Atomic::Integer(_, lo), Atomic::Integer(_, hi)) => (lo, hi),
        _ => unreachable!("cast_to(_, Xs::Integer) always returns Atomic::Integer"),
    };
    let lo: i128 = lo
        .to_string()
        .parse()
        .map_err(|_| Error::FOAR0002.with_span(span))?;
    let hi: i128 = hi
        .to_string()
        .parse()
        .map_err(|_| Error::FOAR0002.with_span(span))?;
    let items: Vec<Item<N>> = (lo..=hi)
        .map(|i| Item::Atomic(Atomic::integer(IBig::from(i))))
        .collect();
    Ok(Sequence::from_items(items))
}

fn eval_constructor_arg<N: XPathNode>(
    arg: &Option<Box<Expr>>,
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Option<Atomic>> {
    match arg {
        None => Ok(None),
        Some(inner) => {
            let seq = evaluate(inner, ctx)?;
            match seq.zero_or_one().map_err(|e| e.with_span(span))? {
                None => Ok(None),
                Some(item) => Ok(Some(atomic_of_item(item).map_err(|e| e.with_span(span))?)),
            }
        }
    }
}

/// Runs `f` once per combination of bindings, threading a fresh
/// [`DynamicContext::copy`] through each nested `for`/`some`/`every`
/// clause so that a binding from one clause never leaks sideways into a
/// sibling evaluation of the same clause.
fn for_each_binding<N: XPathNode>(
    bindings: &[Binding],
    ctx: &DynamicContext<N>,
    f: &mut dyn FnMut(&DynamicContext<N>) -> SpannedResult<()>,
) -> SpannedResult<()> {
    match bindings.split_first() {
        None => f(ctx),
        Some((binding, rest)) => {
            let seq = evaluate(&binding.source, ctx)?;
            for item in seq.into_items() {
                let mut inner = ctx.copy();
                inner.bind(binding.name.clone(), Sequence::singleton(item));
                for_each_binding(rest, &inner, f)?;
            }
            Ok(())
        }
    }
}

/// Shared walk for `some`/`every`: `stop_when` is the body truth value
/// that ends the search early (`true` for `some`, `false` for `every`).
/// Returns whether that value was ever reached.
fn for_each_binding_quantified<N: XPathNode>(
    bindings: &[Binding],
    ctx: &DynamicContext<N>,
    body: &Expr,
    stop_when: bool,
) -> SpannedResult<bool> {
    fn go<N: XPathNode>(
        bindings: &[Binding],
        ctx: &DynamicContext<N>,
        body: &Expr,
        stop_when: bool,
        found: &mut bool,
    ) -> SpannedResult<bool> {
        match bindings.split_first() {
            None => {
                let ok = evaluate(body, ctx)?
                    .effective_boolean_value()
                    .map_err(|e| e.with_span(body.span))?;
                if ok == stop_when {
                    *found = true;
                    return Ok(true);
                }
                Ok(false)
            }
            Some((binding, rest)) => {
                let seq = evaluate(&binding.source, ctx)?;
                for item in seq.into_items() {
                    let mut inner = ctx.copy();
                    inner.bind(binding.name.clone(), Sequence::singleton(item));
                    if go(rest, &inner, body, stop_when, found)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
    let mut found = false;
    go(bindings, ctx, body, stop_when, &mut found)?;
    Ok(found)
}

fn matches_sequence_type<N: XPathNode>(
    seq: &Sequence<N>,
    st: &SequenceType,
    sc: &StaticContext,
) -> Result<bool, Error> {
    let len = seq.len();
    let occurrence_ok = match st.occurrence {
        Occurrence::One => len == 1,
        Occurrence::Optional => len <= 1,
        Occurrence::ZeroOrMore => true,
        Occurrence::OneOrMore => len >= 1,
    };
    if !occurrence_ok {
        return Ok(false);
    }
    if matches!(st.item_type, ItemType::EmptySequence) {
        return Ok(len == 0);
    }
    for item in seq.items() {
        if !matches_item_type(item, &st.item_type, sc)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_item_type<N: XPathNode>(item: &Item<N>, it: &ItemType, sc: &StaticContext) -> Result<bool, Error> {
    match it {
        ItemType::Item => Ok(true),
        ItemType::EmptySequence => Ok(false),
        ItemType::Atomic(name) => match item {
            Item::Atomic(a) => match Xs::by_name(name.namespace(), name.local_name()) {
                Some(xs) => Ok(a.schema_type().matches(xs) || a.schema_type().derives_from(xs)),
                None => sc.schema().is_instance(a, name),
            },
            Item::Node(_) => Ok(false),
        },
        ItemType::KindTest(kind) => match item {
            Item::Node(n) => Ok(kind_test_matches(n, kind)),
            Item::Atomic(_) => Ok(false),
        },
    }
}

fn name_matches<N: XPathNode>(node: &N, expected: &Option<Name>) -> bool {
    match expected {
        None => true,
        Some(name) => node.node_name().map(|n| n.expanded() == name.expanded()).unwrap_or(false),
    }
}

fn kind_test_matches<N: XPathNode>(node: &N, kind: &KindTest) -> bool {
    match kind {
        KindTest::Document => node.kind() == NodeKind::Document,
        KindTest::Element(name) => node.kind() == NodeKind::Element && name_matches(node, name),
        KindTest::Attribute(name) => node.kind() == NodeKind::Attribute && name_matches(node, name),
        KindTest::SchemaElement(name) => {
            node.kind() == NodeKind::Element && name_matches(node, &Some(name.clone()))
        }
        KindTest::SchemaAttribute(name) => {
            node.kind() == NodeKind::Attribute && name_matches(node, &Some(name.clone()))
        }
        KindTest::Text => node.kind() == NodeKind::Text,
        KindTest::Comment => node.kind() == NodeKind::Comment,
        KindTest::ProcessingInstruction(target) => {
            node.kind() == NodeKind::ProcessingInstruction
                && target
                    .as_ref()
                    .map(|t| node.node_name().map(|n| n.local_name() == t).unwrap_or(false))
                    .unwrap_or(true)
        }
        KindTest::Node => true,
    }
}

fn node_test_matches<N: XPathNode>(node: &N, test: &NodeTest) -> bool {
    match test {
        NodeTest::Wildcard => true,
        NodeTest::WildcardNamespace(ns) => node
            .node_name()
            .map(|n| n.namespace() == Some(ns.as_str()))
            .unwrap_or(false),
        NodeTest::WildcardLocal(local) => {
            node.node_name().map(|n| n.local_name() == local).unwrap_or(false)
        }
        NodeTest::Name(name) => node.node_name().map(|n| n.expanded() == name.expanded()).unwrap_or(false),
        NodeTest::Kind(kind) => kind_test_matches(node, kind),
    }
}

fn ancestor_chain<N: XPathNode>(node: &N) -> Vec<N> {
    let mut chain = vec![node.clone()];
    let mut current = node.clone();
    while let Some(parent) = current.parent() {
        chain.push(parent.clone());
        current = parent;
    }
    chain.reverse();
    chain
}

/// Document order between two nodes of the same tree, derived from
/// ancestor chains plus sibling position at the point they diverge — the
/// same generic trick [`axis`] uses to derive `following`/`preceding`
/// from `parent` and `iter_children_or_self` alone.
fn compare_document_order<N: XPathNode>(a: &N, b: &N) -> std::cmp::Ordering {
    if a == b {
        return std::cmp::Ordering::Equal;
    }
    let ca = ancestor_chain(a);
    let cb = ancestor_chain(b);
    let mut i = 0;
    while i < ca.len() && i < cb.len() && ca[i] == cb[i] {
        i += 1;
    }
    if i == ca.len() {
        return std::cmp::Ordering::Less;
    }
    if i == cb.len() {
        return std::cmp::Ordering::Greater;
    }
    let siblings = axis::children(&ca[i - 1]);
    let pa = siblings.iter().position(|n| n == &ca[i]).unwrap_or(0);
    let pb = siblings.iter().position(|n| n == &cb[i]).unwrap_or(0);
    pa.cmp(&pb)
}

fn dedup_sort_document_order<N: XPathNode>(nodes: &mut Vec<N>) {
    nodes.sort_by(compare_document_order);
    nodes.dedup();
}

fn predicate_matches<N: XPathNode>(seq: &Sequence<N>, position: usize) -> Result<bool, Error> {
    if seq.len() == 1 {
        if let Item::Atomic(a) = &seq.items()[0] {
            if a.is_numeric() {
                if let Atomic::Double(v) = cast::cast_to(a, Xs::Double)? {
                    return Ok(v.0 == position as f64);
                }
            }
        }
    }
    seq.effective_boolean_value()
}

/// Applies one predicate to `items`, each evaluated with its own
/// position/size derived from `items`' own order — per-step semantics,
/// before any later merge across context nodes re-sorts into document
/// order.
fn filter_items<N: XPathNode>(
    items: Vec<Item<N>>,
    predicate: &Expr,
    ctx: &DynamicContext<N>,
) -> SpannedResult<Vec<Item<N>>> {
    let size = items.len();
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let position = idx + 1;
        let inner = ctx.copy().with_context_item(item.clone()).with_position(position, size);
        let result = evaluate(predicate, &inner)?;
        if predicate_matches(&result, position).map_err(|e| e.with_span(predicate.span))? {
            out.push(item);
        }
    }
    Ok(out)
}

fn eval_step<N: XPathNode>(step: &Step, current: &[N], ctx: &DynamicContext<N>) -> SpannedResult<Vec<N>> {
    let mut merged: Vec<N> = Vec::new();
    for node in current {
        let mut candidates: Vec<N> = axis::evaluate(step.axis, node)
            .into_iter()
            .filter(|c| node_test_matches(c, &step.test))
            .collect();
        for predicate in &step.predicates {
            let items: Vec<Item<N>> = candidates.into_iter().map(Item::Node).collect();
            let filtered = filter_items(items, predicate, ctx)?;
            candidates = filtered
                .into_iter()
                .filter_map(|item| match item {
                    Item::Node(n) => Some(n),
                    Item::Atomic(_) => None,
                })
                .collect();
        }
        merged.extend(candidates);
    }
    dedup_sort_document_order(&mut merged);
    Ok(merged)
}

fn eval_path<N: XPathNode>(
    is_absolute: bool,
    root: &Option<Box<Expr>>,
    steps: &[Step],
    ctx: &DynamicContext<N>,
    span: SourceSpan,
) -> SpannedResult<Sequence<N>> {
    let start_nodes: Vec<N> = if is_absolute {
        vec![ctx.root().map_err(|e| e.with_span(span))?.clone()]
    } else if let Some(root_expr) = root {
        as_nodes(evaluate(root_expr, ctx)?).map_err(|e| e.with_span(span))?
    } else {
        match ctx.context_item().map_err(|e| e.with_span(span))? {
            Item::Node(n) => vec![n.clone()],
            Item::Atomic(_) => return Err(Error::XPTY0020.with_span(span)),
        }
    };
    let mut current = start_nodes;
    for step in steps {
        current = eval_step(step, &current, ctx)?;
    }
    Ok(Sequence::from_items(current.into_iter().map(Item::Node).collect()))
}

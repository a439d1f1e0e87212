//! Value comparison (`eq`, `ne`, `lt`, `le`, `gt`, `ge`) between two atomic
//! values, including the untypedAtomic promotion rules: an untyped operand
//! is cast to the other operand's type family before comparing (`xs:double`
//! against numerics, `xs:string` otherwise).

use std::cmp::Ordering;

use crate::atomic::cast::cast_to;
use crate::atomic::Atomic;
use crate::error::Error;
use xpath2_schema_type::Xs;

/// The six value-comparison operators (`ValueComp` in the grammar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Compare two atomic values per `ValueComp` semantics, applying
/// untypedAtomic promotion first.
pub fn compare(a: &Atomic, b: &Atomic, op: CompareOp) -> Result<bool, Error> {
    let (a, b) = promote_untyped(a, b)?;
    let ordering = atomic_partial_cmp(&a, &b)?;
    Ok(match op {
        CompareOp::Eq => ordering == Some(Ordering::Equal),
        CompareOp::Ne => ordering != Some(Ordering::Equal),
        CompareOp::Lt => ordering == Some(Ordering::Less),
        CompareOp::Le => matches!(ordering, Some(Ordering::Less) | Some(Ordering::Equal)),
        CompareOp::Gt => ordering == Some(Ordering::Greater),
        CompareOp::Ge => matches!(ordering, Some(Ordering::Greater) | Some(Ordering::Equal)),
    })
}

fn promote_untyped(a: &Atomic, b: &Atomic) -> Result<(Atomic, Atomic), Error> {
    match (a, b) {
        (Atomic::Untyped(_), Atomic::Untyped(_)) => Ok((
            cast_to(a, Xs::String)?,
            cast_to(b, Xs::String)?,
        )),
        (Atomic::Untyped(_), other) => {
            let target = if other.is_numeric() { Xs::Double } else { Xs::String };
            Ok((cast_to(a, target)?, b.clone()))
        }
        (other, Atomic::Untyped(_)) => {
            let target = if other.is_numeric() { Xs::Double } else { Xs::String };
            Ok((a.clone(), cast_to(b, target)?))
        }
        _ => Ok((a.clone(), b.clone())),
    }
}

fn atomic_partial_cmp(a: &Atomic, b: &Atomic) -> Result<Option<Ordering>, Error> {
    use Atomic::*;
    Ok(match (a, b) {
        (Boolean(x), Boolean(y)) => x.partial_cmp(y),
        (String(_, x), String(_, y)) => Some(x.as_ref().cmp(y.as_ref())),
        (QName(x), QName(y)) => {
            if x == y {
                Some(Ordering::Equal)
            } else {
                None
            }
        }
        (Binary(_, x), Binary(_, y)) => Some(x.as_ref().cmp(y.as_ref())),
        (Date(x), Date(y)) => x.naive.partial_cmp(&y.naive),
        (Time(x), Time(y)) => x.naive.partial_cmp(&y.naive),
        (DateTime(x), DateTime(y)) => x.naive.partial_cmp(&y.naive),
        (YearMonthDuration(x), YearMonthDuration(y)) => x.partial_cmp(y),
        (DayTimeDuration(x), DayTimeDuration(y)) => x.partial_cmp(y),
        _ if a.is_numeric() && b.is_numeric() => numeric_cmp(a, b)?,
        _ => return Err(Error::XPTY0004),
    })
}

fn numeric_cmp(a: &Atomic, b: &Atomic) -> Result<Option<Ordering>, Error> {
    use Atomic::*;
    // promote to the wider of the two numeric types, double > float > decimal > integer
    let rank = |v: &Atomic| match v {
        Integer(..) => 0,
        Decimal(_) => 1,
        Float(_) => 2,
        Double(_) => 3,
        _ => unreachable!(),
    };
    let target = if rank(a) >= rank(b) { a } else { b };
    let target_xs = match target {
        Integer(..) => {
            let (Integer(_, x), Integer(_, y)) = (a, b) else {
                unreachable!()
            };
            return Ok(x.partial_cmp(y));
        }
        Decimal(_) => Xs::Decimal,
        Float(_) => Xs::Float,
        Double(_) => Xs::Double,
        _ => unreachable!(),
    };
    let a = cast_to(a, target_xs)?;
    let b = cast_to(b, target_xs)?;
    Ok(match (a, b) {
        (Decimal(x), Decimal(y)) => x.partial_cmp(&y),
        (Float(x), Float(y)) => x.0.partial_cmp(&y.0),
        (Double(x), Double(y)) => x.0.partial_cmp(&y.0),
        _ => unreachable!(),
    })
}

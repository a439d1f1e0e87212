//! Numeric functions (F&O §6): `fn:abs`, the three rounding functions.
//! Each one dispatches on the argument's own numeric type and returns
//! that same type, per the F&O "type of $arg" rule.

use crate::atomic::Atomic;
use crate::error::Error;
use crate::sequence::Sequence;
use crate::tree::XPathNode;

use super::atomized_arg;

fn numeric_arg<N: XPathNode>(seq: &Sequence<N>) -> Result<Option<Atomic>, Error> {
    match atomized_arg(seq)? {
        None => Ok(None),
        Some(a) if a.is_numeric() => Ok(Some(a)),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn abs<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let value = match numeric_arg(seq)? {
        Some(v) => v,
        None => return Ok(Sequence::empty()),
    };
    let result = match value {
        Atomic::Integer(t, i) => Atomic::Integer(t, std::rc::Rc::new(if *i < ibig::IBig::from(0) { -(*i).clone() } else { (*i).clone() })),
        Atomic::Decimal(d) => Atomic::Decimal(d.abs()),
        Atomic::Float(f) => Atomic::Float(ordered_float::OrderedFloat(f.0.abs())),
        Atomic::Double(d) => Atomic::Double(ordered_float::OrderedFloat(d.0.abs())),
        other => other,
    };
    Ok(Sequence::from_atomic(result))
}

pub(super) fn ceiling<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let value = match numeric_arg(seq)? {
        Some(v) => v,
        None => return Ok(Sequence::empty()),
    };
    let result = match value {
        Atomic::Decimal(d) => Atomic::Decimal(d.ceil()),
        Atomic::Float(f) => Atomic::Float(ordered_float::OrderedFloat(f.0.ceil())),
        Atomic::Double(d) => Atomic::Double(ordered_float::OrderedFloat(d.0.ceil())),
        other => other,
    };
    Ok(Sequence::from_atomic(result))
}

pub(super) fn floor<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let value = match numeric_arg(seq)? {
        Some(v) => v,
        None => return Ok(Sequence::empty()),
    };
    let result = match value {
        Atomic::Decimal(d) => Atomic::Decimal(d.floor()),
        Atomic::Float(f) => Atomic::Float(ordered_float::OrderedFloat(f.0.floor())),
        Atomic::Double(d) => Atomic::Double(ordered_float::OrderedFloat(d.0.floor())),
        other => other,
    };
    Ok(Sequence::from_atomic(result))
}

pub(super) fn round<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let value = match numeric_arg(seq)? {
        Some(v) => v,
        None => return Ok(Sequence::empty()),
    };
    // Ties round towards positive infinity, so -0.5 rounds to 0, not -1.
    let result = match value {
        Atomic::Decimal(d) => Atomic::Decimal((d + rust_decimal::Decimal::new(5, 1)).floor()),
        Atomic::Float(f) => Atomic::Float(ordered_float::OrderedFloat(round_half_up(f.0 as f64) as f32)),
        Atomic::Double(d) => Atomic::Double(ordered_float::OrderedFloat(round_half_up(d.0))),
        other => other,
    };
    Ok(Sequence::from_atomic(result))
}

fn round_half_up(v: f64) -> f64 {
    if v.is_nan() || v.is_infinite() {
        return v;
    }
    (v + 0.5).floor()
}

pub(super) fn round_half_to_even<N: XPathNode>(
    seq: &Sequence<N>,
    precision: Option<&Sequence<N>>,
) -> Result<Sequence<N>, Error> {
    let value = match numeric_arg(seq)? {
        Some(v) => v,
        None => return Ok(Sequence::empty()),
    };
    let precision: i32 = match precision {
        None => 0,
        Some(p) => match atomized_arg(p)? {
            Some(a) => match crate::atomic::cast::cast_to(&a, xpath2_schema_type::Xs::Integer)? {
                Atomic::Integer(_, i) => i.to_string().parse().unwrap_or(0),
                _ => 0,
            },
            None => 0,
        },
    };
    let result = match value {
        Atomic::Decimal(d) => Atomic::Decimal(round_half_even_decimal(d, precision)),
        Atomic::Float(f) => {
            Atomic::Float(ordered_float::OrderedFloat(round_half_even_at(f.0 as f64, precision) as f32))
        }
        Atomic::Double(d) => Atomic::Double(ordered_float::OrderedFloat(round_half_even_at(d.0, precision))),
        other => other,
    };
    Ok(Sequence::from_atomic(result))
}

fn round_half_even_decimal(d: rust_decimal::Decimal, precision: i32) -> rust_decimal::Decimal {
    use rust_decimal::Decimal;
    let factor = Decimal::from(10i64.pow(precision.unsigned_abs().min(18)));
    let scaled = if precision >= 0 { d * factor } else { d / factor };
    let floor = scaled.floor();
    let diff = scaled - floor;
    let half = Decimal::new(5, 1);
    let rounded = if diff == half {
        if floor % Decimal::from(2) == Decimal::ZERO { floor } else { floor + Decimal::ONE }
    } else if diff > half {
        floor + Decimal::ONE
    } else {
        floor
    };
    if precision >= 0 { rounded / factor } else { rounded * factor }
}

fn round_half_even_at(v: f64, precision: i32) -> f64 {
    if v.is_nan() || v.is_infinite() {
        return v;
    }
    let factor = 10f64.powi(precision);
    let scaled = v * factor;
    let rounded = if (scaled.fract().abs() - 0.5).abs() < f64::EPSILON {
        let floor = scaled.floor();
        if (floor as i64) % 2 == 0 { floor } else { floor + 1.0 }
    } else {
        scaled.round()
    };
    rounded / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_round_half_up_ties_towards_positive_infinity() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(1.4), 1.0);
    }

    #[test]
    fn test_round_half_even_at_picks_the_even_neighbor_on_a_tie() {
        assert_eq!(round_half_even_at(0.5, 0), 0.0);
        assert_eq!(round_half_even_at(1.5, 0), 2.0);
        assert_eq!(round_half_even_at(2.5, 0), 2.0);
        assert_eq!(round_half_even_at(1.25, 1), 1.2);
    }

    #[test]
    fn test_round_half_even_decimal_matches_the_float_helper() {
        assert_eq!(
            round_half_even_decimal(Decimal::new(5, 1), 0),
            Decimal::ZERO
        );
        assert_eq!(
            round_half_even_decimal(Decimal::new(15, 1), 0),
            Decimal::from(2)
        );
        assert_eq!(
            round_half_even_decimal(Decimal::new(25, 1), 0),
            Decimal::from(2)
        );
    }
}

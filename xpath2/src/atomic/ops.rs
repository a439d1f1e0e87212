//! Arithmetic (`+ - * div idiv mod`) and unary sign operators over atomic
//! values, including the date/time and duration arithmetic table from F&O
//! §10 (duration + duration, date/time ± duration, date/time - date/time).

use std::rc::Rc;

use ibig::IBig;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use xpath2_schema_type::Xs;

use super::cast::cast_to;
use super::datetime::{add_duration_to_datetime, DateTimeValue, DateValue, TimeValue};
use super::types::IntegerType;
use super::Atomic;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,
}

/// The widest numeric type of two operands, used to promote both sides
/// before applying a numeric operator (integer < decimal < float < double).
fn numeric_common_type(a: &Atomic, b: &Atomic) -> Result<Xs, Error> {
    let rank = |v: &Atomic| -> Result<u8, Error> {
        Ok(match v {
            Atomic::Integer(..) => 0,
            Atomic::Decimal(_) => 1,
            Atomic::Float(_) => 2,
            Atomic::Double(_) => 3,
            _ => return Err(Error::XPTY0004),
        })
    };
    Ok(match rank(a)?.max(rank(b)?) {
        0 => Xs::Integer,
        1 => Xs::Decimal,
        2 => Xs::Float,
        _ => Xs::Double,
    })
}

/// `op:numeric-add` and friends: apply a numeric arithmetic operator,
/// promoting both operands to their common numeric type first.
pub fn numeric_op(op: ArithOp, a: &Atomic, b: &Atomic) -> Result<Atomic, Error> {
    let common = numeric_common_type(a, b)?;
    let a = cast_to(a, common)?;
    let b = cast_to(b, common)?;
    match (a, b) {
        (Atomic::Integer(_, x), Atomic::Integer(_, y)) => integer_op(op, &x, &y),
        (Atomic::Decimal(x), Atomic::Decimal(y)) => decimal_op(op, x, y),
        (Atomic::Float(x), Atomic::Float(y)) => {
            Ok(Atomic::Float(OrderedFloat(float_op(op, x.0 as f64, y.0 as f64)? as f32)))
        }
        (Atomic::Double(x), Atomic::Double(y)) => {
            Ok(Atomic::Double(OrderedFloat(float_op(op, x.0, y.0)?)))
        }
        _ => unreachable!(),
    }
}

fn integer_op(op: ArithOp, x: &IBig, y: &IBig) -> Result<Atomic, Error> {
    let zero = IBig::from(0);
    Ok(match op {
        ArithOp::Add => Atomic::Integer(IntegerType::Integer, Rc::new(x + y)),
        ArithOp::Subtract => Atomic::Integer(IntegerType::Integer, Rc::new(x - y)),
        ArithOp::Multiply => Atomic::Integer(IntegerType::Integer, Rc::new(x * y)),
        ArithOp::IntegerDivide => {
            if *y == zero {
                return Err(Error::FOAR0001);
            }
            Atomic::Integer(IntegerType::Integer, Rc::new(x / y))
        }
        ArithOp::Modulo => {
            if *y == zero {
                return Err(Error::FOAR0001);
            }
            Atomic::Integer(IntegerType::Integer, Rc::new(x % y))
        }
        ArithOp::Divide => {
            if *y == zero {
                return Err(Error::FOAR0001);
            }
            let xd: Decimal = x.to_string().parse().map_err(|_| Error::FOCA0001)?;
            let yd: Decimal = y.to_string().parse().map_err(|_| Error::FOCA0001)?;
            Atomic::Decimal(xd / yd)
        }
    })
}

fn decimal_op(op: ArithOp, x: Decimal, y: Decimal) -> Result<Atomic, Error> {
    Ok(match op {
        ArithOp::Add => Atomic::Decimal(x + y),
        ArithOp::Subtract => Atomic::Decimal(x - y),
        ArithOp::Multiply => Atomic::Decimal(x * y),
        ArithOp::Divide => {
            if y.is_zero() {
                return Err(Error::FOAR0001);
            }
            Atomic::Decimal(x / y)
        }
        ArithOp::IntegerDivide => {
            if y.is_zero() {
                return Err(Error::FOAR0001);
            }
            let q = (x / y).trunc();
            Atomic::Integer(
                IntegerType::Integer,
                Rc::new(IBig::from_str_radix(&q.to_string(), 10).map_err(|_| Error::FOCA0003)?),
            )
        }
        ArithOp::Modulo => {
            if y.is_zero() {
                return Err(Error::FOAR0001);
            }
            Atomic::Decimal(x % y)
        }
    })
}

fn float_op(op: ArithOp, x: f64, y: f64) -> Result<f64, Error> {
    Ok(match op {
        ArithOp::Add => x + y,
        ArithOp::Subtract => x - y,
        ArithOp::Multiply => x * y,
        ArithOp::Divide => x / y,
        ArithOp::IntegerDivide => {
            if y == 0.0 || x.is_infinite() {
                return Err(Error::FOAR0001);
            }
            return (x / y).trunc().to_string().parse().map_err(|_| Error::FOCA0003);
        }
        ArithOp::Modulo => x % y,
    })
}

/// Unary `+`/`-` on a numeric value.
pub fn numeric_negate(v: &Atomic) -> Result<Atomic, Error> {
    Ok(match v {
        Atomic::Integer(t, i) => Atomic::Integer(*t, Rc::new(-i.as_ref())),
        Atomic::Decimal(d) => Atomic::Decimal(-d),
        Atomic::Float(f) => Atomic::Float(OrderedFloat(-f.0)),
        Atomic::Double(d) => Atomic::Double(OrderedFloat(-d.0)),
        _ => return Err(Error::XPTY0004),
    })
}

/// Add/subtract a duration (months, seconds) and a date/time-like value,
/// or add/subtract two durations of the same kind, per the F&O arithmetic
/// cross table. `negate_duration` flips the duration's sign for `-`.
pub fn datetime_op(op: ArithOp, a: &Atomic, b: &Atomic) -> Result<Atomic, Error> {
    use Atomic::*;
    match (a, b, op) {
        (DateTime(dt), YearMonthDuration(d), ArithOp::Add) => {
            Ok(DateTime(add_duration_to_datetime(dt, d.0, rust_decimal::Decimal::ZERO)?))
        }
        (DateTime(dt), YearMonthDuration(d), ArithOp::Subtract) => {
            Ok(DateTime(add_duration_to_datetime(dt, -d.0, rust_decimal::Decimal::ZERO)?))
        }
        (DateTime(dt), DayTimeDuration(d), ArithOp::Add) => {
            Ok(DateTime(add_duration_to_datetime(dt, 0, d.0)?))
        }
        (DateTime(dt), DayTimeDuration(d), ArithOp::Subtract) => {
            Ok(DateTime(add_duration_to_datetime(dt, 0, -d.0)?))
        }
        (Date(date), YearMonthDuration(d), ArithOp::Add | ArithOp::Subtract) => {
            let months = if op == ArithOp::Add { d.0 } else { -d.0 };
            let dt = DateTimeValue { naive: date.naive.and_hms_opt(0, 0, 0).unwrap(), offset: date.offset };
            let result = add_duration_to_datetime(&dt, months, rust_decimal::Decimal::ZERO)?;
            Ok(Date(DateValue { naive: result.naive.date(), offset: result.offset }))
        }
        (Date(date), DayTimeDuration(d), ArithOp::Add | ArithOp::Subtract) => {
            let seconds = if op == ArithOp::Add { d.0 } else { -d.0 };
            let dt = DateTimeValue { naive: date.naive.and_hms_opt(0, 0, 0).unwrap(), offset: date.offset };
            let result = add_duration_to_datetime(&dt, 0, seconds)?;
            Ok(Date(DateValue { naive: result.naive.date(), offset: result.offset }))
        }
        (Time(time), DayTimeDuration(d), ArithOp::Add | ArithOp::Subtract) => {
            let seconds = if op == ArithOp::Add { d.0 } else { -d.0 };
            let base = DateTimeValue {
                naive: chrono::NaiveDate::from_ymd_opt(1972, 1, 1)
                    .unwrap()
                    .and_time(time.naive),
                offset: time.offset,
            };
            let result = add_duration_to_datetime(&base, 0, seconds)?;
            Ok(Time(TimeValue { naive: result.naive.time(), offset: result.offset }))
        }
        (DateTime(x), DateTime(y), ArithOp::Subtract) => {
            let diff = x.naive.signed_duration_since(y.naive);
            Ok(DayTimeDuration(super::datetime::DayTimeDuration(rust_decimal::Decimal::from(
                diff.num_seconds(),
            ))))
        }
        (Date(x), Date(y), ArithOp::Subtract) => {
            let diff = x.naive.signed_duration_since(y.naive);
            Ok(DayTimeDuration(super::datetime::DayTimeDuration(rust_decimal::Decimal::from(
                diff.num_seconds(),
            ))))
        }
        (YearMonthDuration(x), YearMonthDuration(y), ArithOp::Add) => {
            Ok(YearMonthDuration(super::datetime::YearMonthDuration(x.0 + y.0)))
        }
        (YearMonthDuration(x), YearMonthDuration(y), ArithOp::Subtract) => {
            Ok(YearMonthDuration(super::datetime::YearMonthDuration(x.0 - y.0)))
        }
        (DayTimeDuration(x), DayTimeDuration(y), ArithOp::Add) => {
            Ok(DayTimeDuration(super::datetime::DayTimeDuration(x.0 + y.0)))
        }
        (DayTimeDuration(x), DayTimeDuration(y), ArithOp::Subtract) => {
            Ok(DayTimeDuration(super::datetime::DayTimeDuration(x.0 - y.0)))
        }
        _ => Err(Error::XPTY0004),
    }
}

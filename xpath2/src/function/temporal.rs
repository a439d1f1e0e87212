//! Date/time and duration functions (F&O §9, §10.5-10.7): the component
//! extractors, the `current-*`/`implicit-timezone` context readers, and
//! the timezone-adjustment functions.

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::atomic::datetime::{DateTimeValue, DateValue, TimeValue};
use crate::atomic::Atomic;
use crate::context::DynamicContext;
use crate::error::Error;
use crate::sequence::Sequence;
use crate::tree::XPathNode;

use super::atomized_arg;

pub(super) fn current_date_time<N: XPathNode>(ctx: &DynamicContext<N>) -> Result<Sequence<N>, Error> {
    let now = ctx.current_datetime();
    Ok(Sequence::from_atomic(Atomic::DateTime(DateTimeValue {
        naive: now.naive_local(),
        offset: Some(now.timezone()),
    })))
}

pub(super) fn current_date<N: XPathNode>(ctx: &DynamicContext<N>) -> Result<Sequence<N>, Error> {
    let now = ctx.current_datetime();
    Ok(Sequence::from_atomic(Atomic::Date(DateValue {
        naive: now.naive_local().date(),
        offset: Some(now.timezone()),
    })))
}

pub(super) fn current_time<N: XPathNode>(ctx: &DynamicContext<N>) -> Result<Sequence<N>, Error> {
    let now = ctx.current_datetime();
    Ok(Sequence::from_atomic(Atomic::Time(TimeValue {
        naive: now.naive_local().time(),
        offset: Some(now.timezone()),
    })))
}

pub(super) fn implicit_timezone<N: XPathNode>(ctx: &DynamicContext<N>) -> Result<Sequence<N>, Error> {
    let secs = ctx.implicit_timezone().local_minus_utc();
    Ok(Sequence::from_atomic(Atomic::DayTimeDuration(
        crate::atomic::datetime::DayTimeDuration(Decimal::from(secs)),
    )))
}

fn tz_arg<N: XPathNode>(seq: Option<&Sequence<N>>) -> Result<Option<Option<FixedOffset>>, Error> {
    let seq = match seq {
        Some(s) => s,
        None => return Ok(None),
    };
    match atomized_arg(seq)? {
        None => Ok(Some(None)),
        Some(Atomic::DayTimeDuration(d)) => {
            let secs: i64 = d.0.trunc().try_into().map_err(|_| Error::FODT0003)?;
            let secs: i32 = secs.try_into().map_err(|_| Error::FODT0003)?;
            Ok(Some(Some(FixedOffset::east_opt(secs).ok_or(Error::FODT0003)?)))
        }
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn adjust_date_time_to_timezone<N: XPathNode>(
    value: &Sequence<N>,
    tz: Option<&Sequence<N>>,
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let dt = match atomized_arg(value)? {
        Some(Atomic::DateTime(dt)) => dt,
        Some(_) => return Err(Error::XPTY0004),
        None => return Ok(Sequence::empty()),
    };
    let target = resolve_target_tz(tz, ctx)?;
    Ok(Sequence::from_atomic(Atomic::DateTime(adjust_offset(
        dt, target,
    ))))
}

pub(super) fn adjust_date_to_timezone<N: XPathNode>(
    value: &Sequence<N>,
    tz: Option<&Sequence<N>>,
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let d = match atomized_arg(value)? {
        Some(Atomic::Date(d)) => d,
        Some(_) => return Err(Error::XPTY0004),
        None => return Ok(Sequence::empty()),
    };
    let target = resolve_target_tz(tz, ctx)?;
    let dt = DateTimeValue {
        naive: d.naive.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        offset: d.offset,
    };
    let adjusted = adjust_offset(dt, target);
    Ok(Sequence::from_atomic(Atomic::Date(DateValue {
        naive: adjusted.naive.date(),
        offset: adjusted.offset,
    })))
}

pub(super) fn adjust_time_to_timezone<N: XPathNode>(
    value: &Sequence<N>,
    tz: Option<&Sequence<N>>,
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let t = match atomized_arg(value)? {
        Some(Atomic::Time(t)) => t,
        Some(_) => return Err(Error::XPTY0004),
        None => return Ok(Sequence::empty()),
    };
    let target = resolve_target_tz(tz, ctx)?;
    let epoch = NaiveDate::from_ymd_opt(1972, 12, 31).unwrap();
    let dt = DateTimeValue { naive: epoch.and_time(t.naive), offset: t.offset };
    let adjusted = adjust_offset(dt, target);
    Ok(Sequence::from_atomic(Atomic::Time(TimeValue {
        naive: adjusted.naive.time(),
        offset: adjusted.offset,
    })))
}

fn resolve_target_tz<N: XPathNode>(
    tz: Option<&Sequence<N>>,
    ctx: &DynamicContext<N>,
) -> Result<Option<FixedOffset>, Error> {
    match tz_arg(tz)? {
        Some(explicit) => Ok(explicit),
        None => Ok(Some(ctx.implicit_timezone())),
    }
}

/// Reinterprets a date-time in the target offset (adding the offset when
/// the value is untimezoned), keeping the same instant when both the
/// source and target offsets are known.
fn adjust_offset(dt: DateTimeValue, target: Option<FixedOffset>) -> DateTimeValue {
    match (dt.offset, target) {
        (_, None) => DateTimeValue { naive: dt.naive, offset: None },
        (None, Some(tz)) => DateTimeValue { naive: dt.naive, offset: Some(tz) },
        (Some(from), Some(to)) => {
            let utc = dt.naive - chrono::Duration::seconds(from.local_minus_utc() as i64);
            let naive = utc + chrono::Duration::seconds(to.local_minus_utc() as i64);
            DateTimeValue { naive, offset: Some(to) }
        }
    }
}

fn duration_months<N: XPathNode>(seq: &Sequence<N>) -> Result<Option<i64>, Error> {
    match atomized_arg(seq)? {
        None => Ok(None),
        Some(Atomic::YearMonthDuration(d)) => Ok(Some(d.0)),
        Some(Atomic::Duration(d)) => Ok(Some(d.months)),
        Some(_) => Err(Error::XPTY0004),
    }
}

fn duration_seconds<N: XPathNode>(seq: &Sequence<N>) -> Result<Option<Decimal>, Error> {
    match atomized_arg(seq)? {
        None => Ok(None),
        Some(Atomic::DayTimeDuration(d)) => Ok(Some(d.0)),
        Some(Atomic::Duration(d)) => Ok(Some(d.seconds)),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn years_from_duration<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(match duration_months(seq)? {
        Some(m) => Sequence::from_atomic(Atomic::integer(m / 12)),
        None => Sequence::empty(),
    })
}

pub(super) fn months_from_duration<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(match duration_months(seq)? {
        Some(m) => Sequence::from_atomic(Atomic::integer(m % 12)),
        None => Sequence::empty(),
    })
}

fn seconds_breakdown(total: Decimal) -> (i64, i64, i64, Decimal) {
    let neg = total < Decimal::ZERO;
    let total = total.abs();
    let whole: i64 = total.trunc().try_into().unwrap_or(0);
    let frac = total.fract();
    let days = whole / 86400;
    let hours = (whole % 86400) / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = Decimal::from(whole % 60) + frac;
    let sign = if neg { -1 } else { 1 };
    (sign * days, sign * hours, sign * minutes, if neg { -secs } else { secs })
}

pub(super) fn days_from_duration<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(match duration_seconds(seq)? {
        Some(s) => Sequence::from_atomic(Atomic::integer(seconds_breakdown(s).0)),
        None => Sequence::empty(),
    })
}

pub(super) fn hours_from_duration<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(match duration_seconds(seq)? {
        Some(s) => Sequence::from_atomic(Atomic::integer(seconds_breakdown(s).1)),
        None => Sequence::empty(),
    })
}

pub(super) fn minutes_from_duration<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(match duration_seconds(seq)? {
        Some(s) => Sequence::from_atomic(Atomic::integer(seconds_breakdown(s).2)),
        None => Sequence::empty(),
    })
}

pub(super) fn seconds_from_duration<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(match duration_seconds(seq)? {
        Some(s) => Sequence::from_atomic(Atomic::Decimal(seconds_breakdown(s).3)),
        None => Sequence::empty(),
    })
}

macro_rules! date_time_field {
    ($name:ident, $field:ident, $wrap:expr) => {
        pub(super) fn $name<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
            match atomized_arg(seq)? {
                None => Ok(Sequence::empty()),
                Some(Atomic::DateTime(dt)) => Ok(Sequence::from_atomic($wrap(dt.naive.$field()))),
                Some(_) => Err(Error::XPTY0004),
            }
        }
    };
}

use chrono::{Datelike, Timelike};

date_time_field!(year_from_date_time, year, |v: i32| Atomic::integer(v as i64));
date_time_field!(month_from_date_time, month, |v: u32| Atomic::integer(v as i64));
date_time_field!(day_from_date_time, day, |v: u32| Atomic::integer(v as i64));
date_time_field!(hours_from_date_time, hour, |v: u32| Atomic::integer(v as i64));
date_time_field!(minutes_from_date_time, minute, |v: u32| Atomic::integer(v as i64));

pub(super) fn seconds_from_date_time<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::DateTime(dt)) => {
            let t = dt.naive.time();
            let secs = Decimal::from(t.second()) + Decimal::new(t.nanosecond() as i64, 9);
            Ok(Sequence::from_atomic(Atomic::Decimal(secs)))
        }
        Some(_) => Err(Error::XPTY0004),
    }
}

fn offset_to_duration(offset: Option<FixedOffset>) -> Atomic {
    match offset {
        Some(o) => Atomic::DayTimeDuration(crate::atomic::datetime::DayTimeDuration(Decimal::from(
            o.local_minus_utc(),
        ))),
        None => Atomic::integer(0),
    }
}

pub(super) fn timezone_from_date_time<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::DateTime(dt)) => match dt.offset {
            None => Ok(Sequence::empty()),
            Some(o) => Ok(Sequence::from_atomic(offset_to_duration(Some(o)))),
        },
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn year_from_date<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Date(d)) => Ok(Sequence::from_atomic(Atomic::integer(d.naive.year() as i64))),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn month_from_date<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Date(d)) => Ok(Sequence::from_atomic(Atomic::integer(d.naive.month() as i64))),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn day_from_date<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Date(d)) => Ok(Sequence::from_atomic(Atomic::integer(d.naive.day() as i64))),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn timezone_from_date<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Date(d)) => match d.offset {
            None => Ok(Sequence::empty()),
            Some(o) => Ok(Sequence::from_atomic(offset_to_duration(Some(o)))),
        },
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn hours_from_time<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Time(t)) => Ok(Sequence::from_atomic(Atomic::integer(t.naive.hour() as i64))),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn minutes_from_time<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Time(t)) => Ok(Sequence::from_atomic(Atomic::integer(t.naive.minute() as i64))),
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn seconds_from_time<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Time(t)) => {
            let secs = Decimal::from(t.naive.second()) + Decimal::new(t.naive.nanosecond() as i64, 9);
            Ok(Sequence::from_atomic(Atomic::Decimal(secs)))
        }
        Some(_) => Err(Error::XPTY0004),
    }
}

pub(super) fn timezone_from_time<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    match atomized_arg(seq)? {
        None => Ok(Sequence::empty()),
        Some(Atomic::Time(t)) => match t.offset {
            None => Ok(Sequence::empty()),
            Some(o) => Ok(Sequence::from_atomic(offset_to_duration(Some(o)))),
        },
        Some(_) => Err(Error::XPTY0004),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_offset_keeps_the_same_instant() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let from = FixedOffset::east_opt(0).unwrap();
        let to = FixedOffset::east_opt(3600 * 5).unwrap();
        let dt = DateTimeValue { naive, offset: Some(from) };
        let adjusted = adjust_offset(dt, Some(to));
        assert_eq!(adjusted.naive.time(), NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(adjusted.offset, Some(to));
    }

    #[test]
    fn test_adjust_offset_with_no_target_strips_the_timezone() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let dt = DateTimeValue { naive, offset: Some(FixedOffset::east_opt(3600).unwrap()) };
        let adjusted = adjust_offset(dt, None);
        assert_eq!(adjusted.offset, None);
        assert_eq!(adjusted.naive, naive);
    }

    #[test]
    fn test_seconds_breakdown_splits_a_duration_into_components() {
        // 1 day, 2 hours, 3 minutes, 4.5 seconds
        let total = Decimal::new(93784_5, 1);
        let (days, hours, minutes, secs) = seconds_breakdown(total);
        assert_eq!((days, hours, minutes), (1, 2, 3));
        assert_eq!(secs, Decimal::new(45, 1));
    }

    #[test]
    fn test_seconds_breakdown_preserves_sign_for_negative_durations() {
        let (days, hours, minutes, secs) = seconds_breakdown(Decimal::new(-3661, 0));
        assert_eq!((days, hours, minutes), (0, -1, -1));
        assert_eq!(secs, Decimal::from(-1));
    }
}

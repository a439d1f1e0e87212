//! XSD date/time and duration value representations.
//!
//! Lexical parsing follows the ISO 8601 subset XSD 1.1 Part 2 prescribes;
//! arithmetic follows the Appendix E algorithms in XPath/XQuery Functions
//! and Operators (adding a duration to a date-time normalizes the
//! year-month part with carrying, then the day-time part with carrying).

use std::sync::LazyLock;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::Error;

fn parse_offset(s: &str) -> Result<Option<FixedOffset>, Error> {
    if s.is_empty() {
        return Ok(None);
    }
    if s == "Z" {
        return Ok(Some(FixedOffset::east_opt(0).unwrap()));
    }
    let sign = if s.starts_with('-') { -1 } else { 1 };
    let rest = &s[1..];
    let (h, m) = rest.split_once(':').ok_or(Error::FORG0001)?;
    let h: i32 = h.parse().map_err(|_| Error::FORG0001)?;
    let m: i32 = m.parse().map_err(|_| Error::FORG0001)?;
    let secs = sign * (h * 3600 + m * 60);
    Ok(Some(FixedOffset::east_opt(secs).ok_or(Error::FODT0003)?))
}

fn format_offset(offset: Option<FixedOffset>) -> String {
    match offset {
        None => String::new(),
        Some(o) if o.local_minus_utc() == 0 => "Z".to_string(),
        Some(o) => {
            let total = o.local_minus_utc();
            let sign = if total < 0 { '-' } else { '+' };
            let total = total.abs();
            format!("{sign}{:02}:{:02}", total / 3600, (total % 3600) / 60)
        }
    }
}

/// `xs:dateTime`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTimeValue {
    pub naive: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2}(?:\.\d+)?)(Z|[+-]\d{2}:\d{2})?$")
        .unwrap()
});

impl DateTimeValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = DATETIME_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        let year: i32 = caps[1].parse().map_err(|_| Error::FORG0001)?;
        let month: u32 = caps[2].parse().map_err(|_| Error::FORG0001)?;
        let day: u32 = caps[3].parse().map_err(|_| Error::FORG0001)?;
        let hour: u32 = caps[4].parse().map_err(|_| Error::FORG0001)?;
        let minute: u32 = caps[5].parse().map_err(|_| Error::FORG0001)?;
        let sec_dec: f64 = caps[6].parse().map_err(|_| Error::FORG0001)?;
        let sec = sec_dec.trunc() as u32;
        let nanos = ((sec_dec.fract()) * 1_000_000_000.0).round() as u32;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::FORG0001)?;
        let time = NaiveTime::from_hms_nano_opt(hour % 24, minute, sec, nanos).ok_or(Error::FORG0001)?;
        let naive = date.and_time(time);
        let offset = parse_offset(caps.get(7).map(|m| m.as_str()).unwrap_or(""))?;
        Ok(Self { naive, offset })
    }

    pub fn to_lexical(&self) -> String {
        let t = self.naive.time();
        let secs = if t.nanosecond() > 0 {
            format!("{:02}.{:09}", t.second(), t.nanosecond())
                .trim_end_matches('0')
                .to_string()
        } else {
            format!("{:02}", t.second())
        };
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{}{}",
            self.naive.year(),
            self.naive.month(),
            self.naive.day(),
            t.hour(),
            t.minute(),
            secs,
            format_offset(self.offset)
        )
    }
}

/// `xs:date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateValue {
    pub naive: NaiveDate,
    pub offset: Option<FixedOffset>,
}

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

impl DateValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = DATE_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        let year: i32 = caps[1].parse().map_err(|_| Error::FORG0001)?;
        let month: u32 = caps[2].parse().map_err(|_| Error::FORG0001)?;
        let day: u32 = caps[3].parse().map_err(|_| Error::FORG0001)?;
        let naive = NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::FORG0001)?;
        let offset = parse_offset(caps.get(4).map(|m| m.as_str()).unwrap_or(""))?;
        Ok(Self { naive, offset })
    }

    pub fn to_lexical(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}{}",
            self.naive.year(),
            self.naive.month(),
            self.naive.day(),
            format_offset(self.offset)
        )
    }
}

/// `xs:time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    pub naive: NaiveTime,
    pub offset: Option<FixedOffset>,
}

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}(?:\.\d+)?)(Z|[+-]\d{2}:\d{2})?$").unwrap()
});

impl TimeValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = TIME_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        let hour: u32 = caps[1].parse().map_err(|_| Error::FORG0001)?;
        let minute: u32 = caps[2].parse().map_err(|_| Error::FORG0001)?;
        let sec_dec: f64 = caps[3].parse().map_err(|_| Error::FORG0001)?;
        let sec = sec_dec.trunc() as u32;
        let nanos = (sec_dec.fract() * 1_000_000_000.0).round() as u32;
        let naive = NaiveTime::from_hms_nano_opt(hour % 24, minute, sec, nanos).ok_or(Error::FORG0001)?;
        let offset = parse_offset(caps.get(4).map(|m| m.as_str()).unwrap_or(""))?;
        Ok(Self { naive, offset })
    }

    pub fn to_lexical(&self) -> String {
        let t = self.naive;
        format!(
            "{:02}:{:02}:{:02}{}",
            t.hour(),
            t.minute(),
            t.second(),
            format_offset(self.offset)
        )
    }
}

/// The Gregorian calendar fragments (`xs:gYearMonth`, `xs:gYear`,
/// `xs:gMonthDay`, `xs:gDay`, `xs:gMonth`), each a truncated date with its
/// own lexical grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GYearMonthValue {
    pub year: i32,
    pub month: u32,
    pub offset: Option<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GYearValue {
    pub year: i32,
    pub offset: Option<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GMonthDayValue {
    pub month: u32,
    pub day: u32,
    pub offset: Option<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GDayValue {
    pub day: u32,
    pub offset: Option<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GMonthValue {
    pub month: u32,
    pub offset: Option<FixedOffset>,
}

static GYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d{4,})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d{4,})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());

impl GYearMonthValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = GYM_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        Ok(Self {
            year: caps[1].parse().map_err(|_| Error::FORG0001)?,
            month: caps[2].parse().map_err(|_| Error::FORG0001)?,
            offset: parse_offset(caps.get(3).map(|m| m.as_str()).unwrap_or(""))?,
        })
    }

    pub fn to_lexical(&self) -> String {
        format!("{:04}-{:02}{}", self.year, self.month, format_offset(self.offset))
    }
}

impl GYearValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = GY_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        Ok(Self {
            year: caps[1].parse().map_err(|_| Error::FORG0001)?,
            offset: parse_offset(caps.get(2).map(|m| m.as_str()).unwrap_or(""))?,
        })
    }

    pub fn to_lexical(&self) -> String {
        format!("{:04}{}", self.year, format_offset(self.offset))
    }
}

impl GMonthDayValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = GMD_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        Ok(Self {
            month: caps[1].parse().map_err(|_| Error::FORG0001)?,
            day: caps[2].parse().map_err(|_| Error::FORG0001)?,
            offset: parse_offset(caps.get(3).map(|m| m.as_str()).unwrap_or(""))?,
        })
    }

    pub fn to_lexical(&self) -> String {
        format!("--{:02}-{:02}{}", self.month, self.day, format_offset(self.offset))
    }
}

impl GDayValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = GD_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        Ok(Self {
            day: caps[1].parse().map_err(|_| Error::FORG0001)?,
            offset: parse_offset(caps.get(2).map(|m| m.as_str()).unwrap_or(""))?,
        })
    }

    pub fn to_lexical(&self) -> String {
        format!("---{:02}{}", self.day, format_offset(self.offset))
    }
}

impl GMonthValue {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = GM_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
        Ok(Self {
            month: caps[1].parse().map_err(|_| Error::FORG0001)?,
            offset: parse_offset(caps.get(2).map(|m| m.as_str()).unwrap_or(""))?,
        })
    }

    pub fn to_lexical(&self) -> String {
        format!("--{:02}{}", self.month, format_offset(self.offset))
    }
}

/// `xs:yearMonthDuration`: a signed count of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonthDuration(pub i64);

/// `xs:dayTimeDuration`: a signed count of seconds, fractional seconds
/// allowed.
#[derive(Debug, Clone, Copy, PartialEq, Hash)]
pub struct DayTimeDuration(pub Decimal);
impl Eq for DayTimeDuration {}
impl PartialOrd for DayTimeDuration {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DayTimeDuration {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

/// `xs:duration`: the general, unnormalized duration — a months part and a
/// seconds part that are compared and combined independently, per XSD's
/// rule that `P30D` and `P1M` are not order-comparable.
#[derive(Debug, Clone, Copy, PartialEq, Hash)]
pub struct GeneralDuration {
    pub months: i64,
    pub seconds: Decimal,
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .unwrap()
});

fn parse_duration_parts(s: &str) -> Result<(i64, Decimal), Error> {
    let caps = DURATION_RE.captures(s.trim()).ok_or(Error::FORG0001)?;
    let has_any = (1..=7).any(|i| caps.get(i + 1).is_some());
    if !has_any {
        return Err(Error::FORG0001);
    }
    let neg = caps.get(1).is_some();
    let years: i64 = caps.get(2).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
    let months: i64 = caps.get(3).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
    let days: i64 = caps.get(4).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
    let hours: i64 = caps.get(5).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
    let minutes: i64 = caps.get(6).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
    let seconds: Decimal = caps
        .get(7)
        .map(|m| m.as_str().parse().unwrap_or(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO);

    let total_months = years * 12 + months;
    let total_seconds =
        Decimal::from(days * 86400 + hours * 3600 + minutes * 60) + seconds;
    if neg {
        Ok((-total_months, -total_seconds))
    } else {
        Ok((total_months, total_seconds))
    }
}

impl GeneralDuration {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let (months, seconds) = parse_duration_parts(s)?;
        Ok(Self { months, seconds })
    }

    pub fn to_lexical(&self) -> String {
        format_duration_lexical(self.months, self.seconds)
    }
}

impl YearMonthDuration {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let (months, seconds) = parse_duration_parts(s)?;
        if seconds != Decimal::ZERO {
            return Err(Error::FORG0001);
        }
        Ok(Self(months))
    }

    pub fn to_lexical(&self) -> String {
        format_duration_lexical(self.0, Decimal::ZERO)
    }
}

impl DayTimeDuration {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let (months, seconds) = parse_duration_parts(s)?;
        if months != 0 {
            return Err(Error::FORG0001);
        }
        Ok(Self(seconds))
    }

    pub fn to_lexical(&self) -> String {
        format_duration_lexical(0, self.0)
    }
}

fn format_duration_lexical(months: i64, seconds: Decimal) -> String {
    if months == 0 && seconds == Decimal::ZERO {
        return "PT0S".to_string();
    }
    let neg = months < 0 || seconds < Decimal::ZERO;
    let months = months.abs();
    let seconds = seconds.abs();
    let years = months / 12;
    let rem_months = months % 12;
    let total_secs = seconds.trunc().try_into().unwrap_or(0i64);
    let frac = seconds.fract();
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut out = String::new();
    if neg {
        out.push('-');
    }
    out.push('P');
    if years > 0 {
        out.push_str(&format!("{years}Y"));
    }
    if rem_months > 0 {
        out.push_str(&format!("{rem_months}M"));
    }
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || secs > 0 || frac != Decimal::ZERO {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if secs > 0 || frac != Decimal::ZERO {
            if frac != Decimal::ZERO {
                out.push_str(&format!("{}S", Decimal::from(secs) + frac));
            } else {
                out.push_str(&format!("{secs}S"));
            }
        }
    }
    out
}

/// Add a (months, seconds) duration to a date-time, per F&O Appendix E.
pub fn add_duration_to_datetime(
    dt: &DateTimeValue,
    months: i64,
    seconds: Decimal,
) -> Result<DateTimeValue, Error> {
    let shifted_date = shift_months(dt.naive.date(), months)?;
    let naive = shifted_date.and_time(dt.naive.time());
    let seconds_i64: i64 = seconds.trunc().try_into().map_err(|_| Error::FODT0001)?;
    let naive = naive
        .checked_add_signed(chrono::Duration::seconds(seconds_i64))
        .ok_or(Error::FODT0001)?;
    Ok(DateTimeValue { naive, offset: dt.offset })
}

fn shift_months(date: NaiveDate, months: i64) -> Result<NaiveDate, Error> {
    let total = date.year() as i64 * 12 + (date.month() as i64 - 1) + months;
    let year = total.div_euclid(12) as i32;
    let month = (total.rem_euclid(12) + 1) as u32;
    let max_day = days_in_month(year, month);
    let day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::FODT0001)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap();
    let this = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (next - this).num_days() as u32
}

//! Atomic values: the leaves of the XDM data model (§3, component G).
//!
//! [`Atomic`] tags its payload with the precise XSD type it was constructed
//! or cast as (an [`IntegerType`]/[`StringType`]/[`BinaryType`] subtype, or
//! directly a schema type for everything else), mirroring the split
//! between a lean runtime representation and the [`Xs`] lattice used for
//! `instance of` and cast-target resolution.

pub mod cast;
pub mod compare;
pub mod datetime;
pub mod ops;
pub mod types;

use std::rc::Rc;

use ibig::IBig;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use xpath2_name::Name;
use xpath2_schema_type::Xs;

pub use types::{BinaryType, IntegerType, StringType};

use datetime::{
    DateTimeValue, DateValue, DayTimeDuration, GDayValue, GMonthDayValue, GMonthValue,
    GYearMonthValue, GYearValue, GeneralDuration, TimeValue, YearMonthDuration,
};

/// A single atomic value, tagged with the XSD type it carries.
#[derive(Debug, Clone)]
pub enum Atomic {
    Untyped(Rc<str>),
    String(StringType, Rc<str>),
    Boolean(bool),
    Decimal(Decimal),
    Integer(IntegerType, Rc<IBig>),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    Duration(GeneralDuration),
    YearMonthDuration(YearMonthDuration),
    DayTimeDuration(DayTimeDuration),
    DateTime(DateTimeValue),
    Date(DateValue),
    Time(TimeValue),
    GYearMonth(GYearMonthValue),
    GYear(GYearValue),
    GMonthDay(GMonthDayValue),
    GDay(GDayValue),
    GMonth(GMonthValue),
    Binary(BinaryType, Rc<[u8]>),
    QName(Name),
}

impl Atomic {
    pub fn untyped(s: impl Into<Rc<str>>) -> Self {
        Atomic::Untyped(s.into())
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Atomic::String(StringType::String, s.into())
    }

    pub fn integer(v: impl Into<IBig>) -> Self {
        Atomic::Integer(IntegerType::Integer, Rc::new(v.into()))
    }

    /// The schema type this value carries.
    pub fn schema_type(&self) -> Xs {
        match self {
            Atomic::Untyped(_) => Xs::UntypedAtomic,
            Atomic::String(t, _) => t.schema_type(),
            Atomic::Boolean(_) => Xs::Boolean,
            Atomic::Decimal(_) => Xs::Decimal,
            Atomic::Integer(t, _) => t.schema_type(),
            Atomic::Float(_) => Xs::Float,
            Atomic::Double(_) => Xs::Double,
            Atomic::Duration(_) => Xs::Duration,
            Atomic::YearMonthDuration(_) => Xs::YearMonthDuration,
            Atomic::DayTimeDuration(_) => Xs::DayTimeDuration,
            Atomic::DateTime(_) => Xs::DateTime,
            Atomic::Date(_) => Xs::Date,
            Atomic::Time(_) => Xs::Time,
            Atomic::GYearMonth(_) => Xs::GYearMonth,
            Atomic::GYear(_) => Xs::GYear,
            Atomic::GMonthDay(_) => Xs::GMonthDay,
            Atomic::GDay(_) => Xs::GDay,
            Atomic::GMonth(_) => Xs::GMonth,
            Atomic::Binary(t, _) => t.schema_type(),
            Atomic::QName(_) => Xs::QName,
        }
    }

    /// Whether this value's type is in the numeric branch of the lattice.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Atomic::Decimal(_) | Atomic::Integer(..) | Atomic::Float(_) | Atomic::Double(_)
        )
    }

    /// `fn:string()`.
    pub fn to_xpath_string(&self) -> String {
        match self {
            Atomic::Untyped(s) | Atomic::String(_, s) => s.to_string(),
            Atomic::Boolean(b) => b.to_string(),
            Atomic::Decimal(d) => d.normalize().to_string(),
            Atomic::Integer(_, i) => i.to_string(),
            Atomic::Float(f) => format_double(f.0 as f64),
            Atomic::Double(d) => format_double(d.0),
            Atomic::Duration(d) => d.to_lexical(),
            Atomic::YearMonthDuration(d) => d.to_lexical(),
            Atomic::DayTimeDuration(d) => d.to_lexical(),
            Atomic::DateTime(d) => d.to_lexical(),
            Atomic::Date(d) => d.to_lexical(),
            Atomic::Time(d) => d.to_lexical(),
            Atomic::GYearMonth(d) => d.to_lexical(),
            Atomic::GYear(d) => d.to_lexical(),
            Atomic::GMonthDay(d) => d.to_lexical(),
            Atomic::GDay(d) => d.to_lexical(),
            Atomic::GMonth(d) => d.to_lexical(),
            Atomic::Binary(BinaryType::Hex, bytes) => hex::encode_upper(bytes.as_ref()),
            Atomic::Binary(BinaryType::Base64, bytes) => {
                use base64::Engine;
                base64::engine::general_purpose::STANDARD.encode(bytes.as_ref())
            }
            Atomic::QName(name) => name.to_full_name(),
        }
    }

    /// `fn:boolean()`'s effective-boolean-value rule for a single atomic
    /// item (an empty sequence or non-singleton is handled by the caller).
    pub fn effective_boolean_value(&self) -> Result<bool, crate::error::Error> {
        Ok(match self {
            Atomic::Boolean(b) => *b,
            Atomic::String(_, s) | Atomic::Untyped(s) => !s.is_empty(),
            Atomic::Integer(_, i) => **i != IBig::from(0),
            Atomic::Decimal(d) => !d.is_zero(),
            Atomic::Float(f) => f.0 != 0.0 && !f.0.is_nan(),
            Atomic::Double(d) => d.0 != 0.0 && !d.0.is_nan(),
            _ => return Err(crate::error::Error::XPTY0004),
        })
    }
}

fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else if v == 0.0 {
        if v.is_sign_negative() { "-0".to_string() } else { "0".to_string() }
    } else {
        let abs = v.abs();
        if (1e-6..1e21).contains(&abs) {
            let mut s = format!("{v}");
            if s.contains('e') {
                s = format!("{v:.15}").trim_end_matches('0').trim_end_matches('.').to_string();
            }
            s
        } else {
            format!("{v:E}").replace('E', "E").to_uppercase()
        }
    }
}

/// A key for putting [`Atomic`] values into a map/set with XPath's notion
/// of atomic equality (NaN collapses to a single key, `+0`/`-0` compare
/// equal), used by `fn:distinct-values` and set operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Untyped(Rc<str>),
    String(Rc<str>),
    Boolean(bool),
    Decimal(Decimal),
    Integer(Rc<IBig>),
    Double(u64),
    QName(Name),
    Other(String),
}

impl Atomic {
    /// The key this value collapses to for distinct-values/equality-based
    /// deduplication.
    pub fn map_key(&self) -> MapKey {
        match self {
            Atomic::Untyped(s) => MapKey::Untyped(s.clone()),
            Atomic::String(_, s) => MapKey::String(s.clone()),
            Atomic::Boolean(b) => MapKey::Boolean(*b),
            Atomic::Decimal(d) => MapKey::Decimal(*d),
            Atomic::Integer(_, i) => MapKey::Integer(i.clone()),
            Atomic::Float(f) => MapKey::Double(canonical_double_bits(f.0 as f64)),
            Atomic::Double(d) => MapKey::Double(canonical_double_bits(d.0)),
            Atomic::QName(n) => MapKey::QName(n.clone()),
            other => MapKey::Other(other.to_xpath_string()),
        }
    }
}

fn canonical_double_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

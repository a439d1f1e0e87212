//! String functions (F&O §7): all take/return `xs:string`, working on
//! Unicode scalar values via `chars()` rather than bytes.

use crate::atomic::Atomic;
use crate::context::DynamicContext;
use crate::error::Error;
use crate::sequence::Sequence;
use crate::tree::XPathNode;

use super::{atomized_arg, atomized_arg_or_context};

fn arg_string<N: XPathNode>(seq: &Sequence<N>) -> Result<String, Error> {
    Ok(atomized_arg(seq)?.map(|a| a.to_xpath_string()).unwrap_or_default())
}

pub(super) fn string_fn<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let s = atomized_arg_or_context(args, ctx)?
        .map(|a| a.to_xpath_string())
        .unwrap_or_default();
    Ok(Sequence::from_atomic(Atomic::string(s)))
}

pub(super) fn concat<N: XPathNode>(args: &[Sequence<N>]) -> Result<Sequence<N>, Error> {
    let mut out = String::new();
    for a in args {
        out.push_str(&arg_string(a)?);
    }
    Ok(Sequence::from_atomic(Atomic::string(out)))
}

pub(super) fn string_length<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let s = atomized_arg_or_context(args, ctx)?
        .map(|a| a.to_xpath_string())
        .unwrap_or_default();
    Ok(Sequence::from_atomic(Atomic::integer(s.chars().count() as i64)))
}

pub(super) fn normalize_space<N: XPathNode>(
    args: &[Sequence<N>],
    ctx: &DynamicContext<N>,
) -> Result<Sequence<N>, Error> {
    let s = atomized_arg_or_context(args, ctx)?
        .map(|a| a.to_xpath_string())
        .unwrap_or_default();
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(Sequence::from_atomic(Atomic::string(normalized)))
}

pub(super) fn upper_case<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(Sequence::from_atomic(Atomic::string(arg_string(seq)?.to_uppercase())))
}

pub(super) fn lower_case<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    Ok(Sequence::from_atomic(Atomic::string(arg_string(seq)?.to_lowercase())))
}

pub(super) fn contains<N: XPathNode>(a: &Sequence<N>, b: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let (haystack, needle) = (arg_string(a)?, arg_string(b)?);
    Ok(Sequence::from_atomic(Atomic::Boolean(haystack.contains(&needle))))
}

pub(super) fn starts_with<N: XPathNode>(a: &Sequence<N>, b: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let (haystack, needle) = (arg_string(a)?, arg_string(b)?);
    Ok(Sequence::from_atomic(Atomic::Boolean(haystack.starts_with(&needle))))
}

pub(super) fn ends_with<N: XPathNode>(a: &Sequence<N>, b: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let (haystack, needle) = (arg_string(a)?, arg_string(b)?);
    Ok(Sequence::from_atomic(Atomic::Boolean(haystack.ends_with(&needle))))
}

pub(super) fn substring<N: XPathNode>(
    source: &Sequence<N>,
    start: &Sequence<N>,
    length: Option<&Sequence<N>>,
) -> Result<Sequence<N>, Error> {
    let s = arg_string(source)?;
    let start = as_double(start)?;
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len() as f64;
    let first = start.round();
    let last = match length {
        Some(l) => (start + as_double(l)?).round(),
        None => n + 1.0,
    };
    let lo = first.max(1.0);
    let hi = last.min(n + 1.0);
    if hi <= lo || lo > n {
        return Ok(Sequence::from_atomic(Atomic::string("")));
    }
    let out: String = chars[(lo as usize - 1)..(hi as usize - 1)].iter().collect();
    Ok(Sequence::from_atomic(Atomic::string(out)))
}

fn as_double<N: XPathNode>(seq: &Sequence<N>) -> Result<f64, Error> {
    let a = atomized_arg(seq)?.ok_or(Error::XPTY0004)?;
    match crate::atomic::cast::cast_to(&a, xpath2_schema_type::Xs::Double)? {
        Atomic::Double(d) => Ok(d.0),
        _ => Err(Error::XPTY0004),
    }
}

pub(super) fn substring_before<N: XPathNode>(a: &Sequence<N>, b: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let (s, needle) = (arg_string(a)?, arg_string(b)?);
    let result = if needle.is_empty() {
        String::new()
    } else {
        match s.find(&needle) {
            Some(idx) => s[..idx].to_string(),
            None => String::new(),
        }
    };
    Ok(Sequence::from_atomic(Atomic::string(result)))
}

pub(super) fn substring_after<N: XPathNode>(a: &Sequence<N>, b: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let (s, needle) = (arg_string(a)?, arg_string(b)?);
    let result = if needle.is_empty() {
        s
    } else {
        match s.find(&needle) {
            Some(idx) => s[idx + needle.len()..].to_string(),
            None => String::new(),
        }
    };
    Ok(Sequence::from_atomic(Atomic::string(result)))
}

pub(super) fn translate<N: XPathNode>(
    source: &Sequence<N>,
    map: &Sequence<N>,
    translations: &Sequence<N>,
) -> Result<Sequence<N>, Error> {
    let s = arg_string(source)?;
    let map: Vec<char> = arg_string(map)?.chars().collect();
    let translations: Vec<char> = arg_string(translations)?.chars().collect();
    let out: String = s
        .chars()
        .filter_map(|c| match map.iter().position(|m| *m == c) {
            Some(idx) => translations.get(idx).copied(),
            None => Some(c),
        })
        .collect();
    Ok(Sequence::from_atomic(Atomic::string(out)))
}

pub(super) fn string_join<N: XPathNode>(seq: &Sequence<N>, sep: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let sep = arg_string(sep)?;
    let parts: Vec<String> = seq.atomize().iter().map(|a| a.to_xpath_string()).collect();
    Ok(Sequence::from_atomic(Atomic::string(parts.join(&sep))))
}

pub(super) fn codepoints_to_string<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let mut out = String::new();
    for atomic in seq.atomize() {
        let code = match crate::atomic::cast::cast_to(&atomic, xpath2_schema_type::Xs::Integer)? {
            Atomic::Integer(_, i) => i.to_string().parse::<u32>().map_err(|_| Error::FOCA0002)?,
            _ => return Err(Error::XPTY0004),
        };
        out.push(char::from_u32(code).ok_or(Error::FOCA0002)?);
    }
    Ok(Sequence::from_atomic(Atomic::string(out)))
}

pub(super) fn string_to_codepoints<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let s = arg_string(seq)?;
    if s.is_empty() {
        return Ok(Sequence::empty());
    }
    let items = s
        .chars()
        .map(|c| crate::sequence::Item::Atomic(Atomic::integer(c as i64)))
        .collect::<Vec<_>>();
    Ok(Sequence::from_items(items))
}

// The only things `fn:encode-for-uri` leaves unescaped are the upper and
// lower case letters, the digits, '-', '_', '.' and '~'.
const ENCODE_FOR_URI: percent_encoding::AsciiSet = percent_encoding::CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const IRI: percent_encoding::AsciiSet = percent_encoding::CONTROLS
    .add(b'<')
    .add(b'>')
    .add(b'"')
    .add(b' ')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'`');

pub(super) fn encode_for_uri<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let s = arg_string(seq)?;
    let encoded = percent_encoding::utf8_percent_encode(&s, &ENCODE_FOR_URI).to_string();
    Ok(Sequence::from_atomic(Atomic::string(encoded)))
}

pub(super) fn iri_to_uri<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let s = arg_string(seq)?;
    let encoded = percent_encoding::utf8_percent_encode(&s, &IRI).to_string();
    Ok(Sequence::from_atomic(Atomic::string(encoded)))
}

pub(super) fn escape_html_uri<N: XPathNode>(seq: &Sequence<N>) -> Result<Sequence<N>, Error> {
    let s = arg_string(seq)?;
    let encoded =
        percent_encoding::utf8_percent_encode(&s, percent_encoding::CONTROLS).to_string();
    Ok(Sequence::from_atomic(Atomic::string(encoded)))
}

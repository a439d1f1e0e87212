use std::borrow::Cow;
use std::sync::LazyLock;

use ibig::IBig;
use regex::Regex;
use rust_decimal::Decimal;

use crate::token::Token;

pub type Span = std::ops::Range<usize>;

// Ordered alternation: the tokenizer tries each alternative in this order
// and takes the first (leftmost) match, same discipline the registry-driven
// tokenizer uses for symbol patterns (longer/more specific forms first so
// e.g. `<<` is not swallowed as two `<`).
const NCNAME_START: &str = r"[A-Za-z_\u{c0}-\u{d6}\u{d8}-\u{f6}\u{f8}-\u{2ff}\u{370}-\u{37d}\u{37f}-\u{1fff}\u{200c}-\u{200d}\u{2070}-\u{218f}\u{2c00}-\u{2fef}\u{3001}-\u{d7ff}\u{f900}-\u{fdfc}\u{fdf0}-\u{fffd}]";
const NCNAME_CHAR: &str = r"[A-Za-z_\u{c0}-\u{d6}\u{d8}-\u{f6}\u{f8}-\u{2ff}\u{370}-\u{37d}\u{37f}-\u{1fff}\u{200c}-\u{200d}\u{2070}-\u{218f}\u{2c00}-\u{2fef}\u{3001}-\u{d7ff}\u{f900}-\u{fdfc}\u{fdf0}-\u{fffd}\-.0-9\u{b7}\u{300}-\u{36f}\u{203f}-\u{2040}]";

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let ncname = format!("{NCNAME_START}{NCNAME_CHAR}*");
    let pattern = format!(
        r#"(?x)
        ^(?P<ws>\s+)
        | ^(?P<comment_start>\(:)
        | ^(?P<comment_end>:\))
        | ^(?P<double>(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)[eE][+-]?[0-9]+)
        | ^(?P<decimal>\.[0-9]+|[0-9]+\.[0-9]*)
        | ^(?P<integer>[0-9]+)
        | ^(?P<dqstring>"(?:""|[^"])*")
        | ^(?P<sqstring>'(?:''|[^'])*')
        | ^(?P<braced_uri>Q\{{[^{{}}]*\}})
        | ^(?P<ncname>{ncname})
        | ^(?P<op><<|>>|::|!=|<=|>=|//|\.\.|\*|!|\#|\$|\(|\)|\+|,|-|\.|/|:|<|=|>|\?|@|\[|\]|\{{|\||\}})
    "#
    );
    Regex::new(&pattern).expect("static token regex is valid")
});

/// Scans `input` into a stream of `(Token, Span)` pairs.
///
/// This is the lexer proper (component A): a single ordered alternation
/// assembled once, scanned left to right. Whitespace is yielded as
/// [`Token::Whitespace`] rather than silently dropped so callers (the
/// parser's comment folding, in particular) can see exactly what was
/// skipped and where.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Token<'a>, Span);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];
        let caps = match TOKEN_RE.captures(rest) {
            Some(caps) => caps,
            None => {
                let span = self.pos..self.input.len();
                self.pos = self.input.len();
                return Some((Token::Error, span));
            }
        };
        let whole = caps.get(0).unwrap();
        let start = self.pos + whole.start();
        let end = self.pos + whole.end();
        self.pos = end;

        let token = if caps.name("ws").is_some() {
            Token::Whitespace
        } else if caps.name("comment_start").is_some() {
            Token::CommentStart
        } else if caps.name("comment_end").is_some() {
            Token::CommentEnd
        } else if let Some(m) = caps.name("double") {
            match m.as_str().parse::<f64>() {
                Ok(v) => Token::DoubleLiteral(v),
                Err(_) => Token::Error,
            }
        } else if let Some(m) = caps.name("decimal") {
            match m.as_str().parse::<Decimal>() {
                Ok(v) => Token::DecimalLiteral(v),
                Err(_) => Token::Error,
            }
        } else if let Some(m) = caps.name("integer") {
            match IBig::from_str_radix(m.as_str(), 10) {
                Ok(v) => Token::IntegerLiteral(v),
                Err(_) => Token::Error,
            }
        } else if let Some(m) = caps.name("dqstring") {
            Token::StringLiteral(unquote(m.as_str(), '"'))
        } else if let Some(m) = caps.name("sqstring") {
            Token::StringLiteral(unquote(m.as_str(), '\''))
        } else if let Some(m) = caps.name("braced_uri") {
            let s = m.as_str();
            Token::BracedURILiteral(&s[2..s.len() - 1])
        } else if let Some(m) = caps.name("ncname") {
            Token::NCName(m.as_str())
        } else if let Some(m) = caps.name("op") {
            token_for_op(m.as_str())
        } else {
            Token::Error
        };
        Some((token, start..end))
    }
}

fn unquote(slice: &str, quote: char) -> Cow<'_, str> {
    let s = &slice[1..slice.len() - 1];
    let doubled: String = [quote, quote].iter().collect();
    if s.contains(&doubled) {
        Cow::Owned(s.replace(&doubled, &quote.to_string()))
    } else {
        Cow::Borrowed(s)
    }
}

fn token_for_op(op: &str) -> Token<'static> {
    match op {
        "<<" => Token::Precedes,
        ">>" => Token::Follows,
        "::" => Token::DoubleColon,
        "!=" => Token::NotEqual,
        "<=" => Token::LessThanEqual,
        ">=" => Token::GreaterThanEqual,
        "//" => Token::DoubleSlash,
        ".." => Token::DotDot,
        "*" => Token::Asterisk,
        "!" => Token::ExclamationMark,
        "#" => Token::Hash,
        "$" => Token::Dollar,
        "(" => Token::LeftParen,
        ")" => Token::RightParen,
        "+" => Token::Plus,
        "," => Token::Comma,
        "-" => Token::Minus,
        "." => Token::Dot,
        "/" => Token::Slash,
        ":" => Token::Colon,
        "<" => Token::LessThan,
        "=" => Token::Equal,
        ">" => Token::GreaterThan,
        "?" => Token::QuestionMark,
        "@" => Token::At,
        "[" => Token::LeftBracket,
        "]" => Token::RightBracket,
        "{" => Token::LeftBrace,
        "|" => Token::Pipe,
        "}" => Token::RightBrace,
        _ => Token::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input)
            .map(|(t, _)| t)
            .filter(|t| *t != Token::Whitespace)
            .collect()
    }

    #[test]
    fn test_integer_and_operators() {
        assert_eq!(
            tokens("1 + 2"),
            vec![
                Token::IntegerLiteral(IBig::from(1)),
                Token::Plus,
                Token::IntegerLiteral(IBig::from(2)),
            ]
        );
    }

    #[test]
    fn test_double_before_decimal() {
        assert_eq!(tokens("1.5e2"), vec![Token::DoubleLiteral(1.5e2)]);
        assert_eq!(
            tokens("1.5"),
            vec![Token::DecimalLiteral("1.5".parse().unwrap())]
        );
    }

    #[test]
    fn test_comparison_operators_longest_match() {
        assert_eq!(tokens("<<"), vec![Token::Precedes]);
        assert_eq!(tokens("<="), vec![Token::LessThanEqual]);
        assert_eq!(tokens("<"), vec![Token::LessThan]);
    }

    #[test]
    fn test_string_literal_escaped_quote() {
        assert_eq!(
            tokens(r#""a""b""#),
            vec![Token::StringLiteral(Cow::Owned("a\"b".to_string()))]
        );
    }

    #[test]
    fn test_ncname_and_braced_uri() {
        assert_eq!(tokens("foo-bar"), vec![Token::NCName("foo-bar")]);
        assert_eq!(
            tokens("Q{http://example.com}local"),
            vec![
                Token::BracedURILiteral("http://example.com"),
                Token::NCName("local"),
            ]
        );
    }

    #[test]
    fn test_comment_delimiters_are_tokens() {
        assert_eq!(
            tokens("1 (: c :) + 2"),
            vec![
                Token::IntegerLiteral(IBig::from(1)),
                Token::CommentStart,
                Token::NCName("c"),
                Token::CommentEnd,
                Token::Plus,
                Token::IntegerLiteral(IBig::from(2)),
            ]
        );
    }
}

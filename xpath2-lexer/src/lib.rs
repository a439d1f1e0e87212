//! XPath 2.0 tokenizer (component A).
//!
//! Produces a generic lexical stream — literals, `NCName`s, punctuation,
//! and comment delimiters. Keyword/axis/function/constructor recognition is
//! the parser's job (see `xpath2::registry`), since it needs lookahead the
//! lexer doesn't have.

mod lexer;
mod token;

pub use lexer::{Lexer, Span};
pub use token::Token;

//! `SequenceType`, `SingleType`, and kind-test parsing, shared by
//! `instance of`/`treat as` (sequence types) and `cast`/`castable as`
//! (single types).

use xpath2_lexer::Token;
use xpath2_name::Name;

use crate::ast::{ItemType, KindTest, Occurrence, SequenceType, SingleType};
use crate::error::Error;
use crate::registry;

use super::{ParseResult, Parser};

impl<'a> Parser<'a> {
    /// `next_is_sequence_type_token`: whether the upcoming token can start
    /// a `SequenceType` (the leading set the parser peeks at after
    /// `instance of`/`treat as`).
    pub(super) fn next_is_sequence_type_token(&self) -> bool {
        match self.tokens.peek_token() {
            Some(Token::NCName(name)) => {
                registry::lookup_node_type(name).is_some() || !registry::is_keyword(name)
            }
            _ => false,
        }
    }

    pub(super) fn parse_sequence_type(&mut self) -> ParseResult<SequenceType> {
        if self.tokens.peek_is_ncname("empty-sequence") {
            self.tokens.advance()?;
            self.tokens.expect(&Token::LeftParen)?;
            self.tokens.expect(&Token::RightParen)?;
            return Ok(SequenceType {
                item_type: ItemType::EmptySequence,
                occurrence: Occurrence::One,
            });
        }
        let item_type = if self.tokens.peek_is_ncname("item") {
            self.tokens.advance();
            self.tokens.expect(&Token::LeftParen)?;
            self.tokens.expect(&Token::RightParen)?;
            ItemType::Item
        } else if let Some(kind_test) = self.try_parse_kind_test()? {
            ItemType::KindTest(kind_test)
        } else {
            ItemType::Atomic(self.parse_qname()?)
        };
        let occurrence = self.parse_occurrence_indicator(!matches!(item_type, ItemType::EmptySequence));
        Ok(SequenceType { item_type, occurrence })
    }

    pub(super) fn parse_single_type(&mut self) -> ParseResult<SingleType> {
        let name = self.parse_qname()?;
        let optional = if self.tokens.peek_token() == Some(&Token::QuestionMark) {
            self.tokens.advance()?;
            true
        } else {
            false
        };
        Ok(SingleType { name, optional })
    }

    fn parse_occurrence_indicator(&mut self, allowed: bool) -> Occurrence {
        let occurrence = match self.tokens.peek_token() {
            Some(Token::QuestionMark) => Some(Occurrence::Optional),
            Some(Token::Asterisk) => Some(Occurrence::ZeroOrMore),
            Some(Token::Plus) => Some(Occurrence::OneOrMore),
            _ => None,
        };
        if let Some(occurrence) = occurrence {
            if allowed {
                // The token was just peeked above, so this can't fail.
                let _ = self.tokens.advance();
                return occurrence;
            }
        }
        Occurrence::One
    }

    /// Attempts to parse a kind test (`element(...)`, `text()`, ...); does
    /// not consume input and returns `Ok(None)` if the next name isn't a
    /// recognized node type.
    pub(super) fn try_parse_kind_test(&mut self) -> ParseResult<Option<KindTest>> {
        let name = match self.tokens.peek_token() {
            Some(Token::NCName(n)) => *n,
            _ => return Ok(None),
        };
        let node_type = match registry::lookup_node_type(name) {
            Some(nt) => nt,
            None => return Ok(None),
        };
        // Only commit once we see the opening paren; otherwise this is a
        // plain atomic type name that happens to collide lexically (none
        // do in this grammar, but the check keeps the contract explicit).
        if self.tokens.peek_token_at(1) != Some(&Token::LeftParen) {
            return Ok(None);
        }
        self.tokens.advance()?;
        self.tokens.expect(&Token::LeftParen)?;
        let test = match node_type {
            registry::NodeType::Document => {
                self.tokens.expect(&Token::RightParen)?;
                KindTest::Document
            }
            registry::NodeType::Element => {
                let name = self.parse_optional_name_argument()?;
                KindTest::Element(name)
            }
            registry::NodeType::Attribute => {
                let name = self.parse_optional_name_argument()?;
                KindTest::Attribute(name)
            }
            registry::NodeType::SchemaElement => {
                let name = self.parse_qname()?;
                self.tokens.expect(&Token::RightParen)?;
                KindTest::SchemaElement(name)
            }
            registry::NodeType::SchemaAttribute => {
                let name = self.parse_qname()?;
                self.tokens.expect(&Token::RightParen)?;
                KindTest::SchemaAttribute(name)
            }
            registry::NodeType::Text => {
                self.tokens.expect(&Token::RightParen)?;
                KindTest::Text
            }
            registry::NodeType::Comment => {
                self.tokens.expect(&Token::RightParen)?;
                KindTest::Comment
            }
            registry::NodeType::ProcessingInstruction => {
                let literal = if let Some(Token::StringLiteral(s)) = self.tokens.peek_token() {
                    let s = s.to_string();
                    self.tokens.advance()?;
                    Some(s)
                } else if let Some(Token::NCName(n)) = self.tokens.peek_token() {
                    let s = n.to_string();
                    self.tokens.advance()?;
                    Some(s)
                } else {
                    None
                };
                self.tokens.expect(&Token::RightParen)?;
                KindTest::ProcessingInstruction(literal)
            }
            registry::NodeType::Node => {
                self.tokens.expect(&Token::RightParen)?;
                KindTest::Node
            }
            registry::NodeType::Item | registry::NodeType::EmptySequence => {
                return Err(Error::XPST0003.with_span(self.tokens.current_span()))
            }
        };
        Ok(Some(test))
    }

    fn parse_optional_name_argument(&mut self) -> ParseResult<Option<Name>> {
        if self.tokens.peek_token() == Some(&Token::RightParen) {
            self.tokens.advance()?;
            return Ok(None);
        }
        if self.tokens.peek_token() == Some(&Token::Asterisk) {
            self.tokens.advance()?;
            self.tokens.expect(&Token::RightParen)?;
            return Ok(None);
        }
        let name = self.parse_qname()?;
        self.tokens.expect(&Token::RightParen)?;
        Ok(Some(name))
    }
}

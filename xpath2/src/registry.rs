//! The symbol/token registry (component B): precedence table and
//! keyword/axis/node-type classification a bare [`xpath2_lexer::Token`]
//! doesn't carry. [`crate::parser`] consults this to decide what an
//! `NCName` means in context and how tightly an operator binds.

use ahash::HashMap;
use std::sync::LazyLock;

/// What role a keyword plays once the parser commits to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Operator,
    Function,
    Constructor,
    Axis,
    Literal,
    KindTest,
}

/// The seven forward node axes plus `self`, `attribute`, `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Self_,
    Parent,
    Ancestor,
    AncestorOrSelf,
    Following,
    FollowingSibling,
    Preceding,
    PrecedingSibling,
    Namespace,
}

/// The kind-test node types (`element()`, `text()`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Attribute,
    SchemaElement,
    SchemaAttribute,
    Text,
    Comment,
    ProcessingInstruction,
    Node,
    Item,
    EmptySequence,
}

/// Binding powers (`lbp`), ascending, per the precedence table. Every entry
/// here is a `led`-bearing infix/postfix symbol; `nud`-only symbols (`if`,
/// `for`, literals, constructors as openers) don't need a left binding
/// power and aren't listed.
static INFIX_BINDING_POWER: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    use ahash::HashMapExt;
    let mut m = HashMap::new();
    m.insert(",", 5);
    m.insert("or", 22);
    m.insert("and", 24);
    for op in ["eq", "ne", "lt", "le", "gt", "ge", "is", "<<", ">>", "=", "!=", "<", "<=", ">", ">="] {
        m.insert(op, 30);
    }
    m.insert("to", 35);
    m.insert("+", 40);
    m.insert("-", 40);
    m.insert("*", 45);
    m.insert("div", 45);
    m.insert("mod", 45);
    m.insert("idiv", 45);
    m.insert("union", 50);
    m.insert("|", 50);
    m.insert("intersect", 55);
    m.insert("except", 55);
    m.insert("instance", 60);
    m.insert("treat", 61);
    m.insert("castable", 62);
    m.insert("cast", 63);
    m.insert("/", 75);
    m.insert("//", 75);
    m.insert("[", 80);
    m
});

/// The `nud`-opening keywords that introduce a compound expression form
/// (`if`, `for`, `some`, `every`), all at the same low binding power.
pub const COMPOUND_KEYWORD_BP: u8 = 20;

pub fn infix_binding_power(symbol: &str) -> Option<u8> {
    INFIX_BINDING_POWER.get(symbol).copied()
}

/// Reserved words that can never be a bare name reference when unquoted
/// (the XPath grammar's keyword set, §4.C/§4.G).
static KEYWORDS: LazyLock<std::collections::HashSet<&'static str>> = LazyLock::new(|| {
    [
        "if", "then", "else", "for", "in", "return", "some", "every", "satisfies", "instance",
        "of", "treat", "as", "castable", "cast", "and", "or", "to", "div", "mod", "idiv", "eq",
        "ne", "lt", "le", "gt", "ge", "is", "union", "intersect", "except", "empty-sequence",
        "item",
    ]
    .into_iter()
    .collect()
});

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(text)
}

pub fn lookup_axis(text: &str) -> Option<Axis> {
    Some(match text {
        "child" => Axis::Child,
        "descendant" => Axis::Descendant,
        "descendant-or-self" => Axis::DescendantOrSelf,
        "attribute" => Axis::Attribute,
        "self" => Axis::Self_,
        "parent" => Axis::Parent,
        "ancestor" => Axis::Ancestor,
        "ancestor-or-self" => Axis::AncestorOrSelf,
        "following" => Axis::Following,
        "following-sibling" => Axis::FollowingSibling,
        "preceding" => Axis::Preceding,
        "preceding-sibling" => Axis::PrecedingSibling,
        "namespace" => Axis::Namespace,
        _ => return None,
    })
}

pub fn lookup_node_type(text: &str) -> Option<NodeType> {
    Some(match text {
        "document-node" => NodeType::Document,
        "element" => NodeType::Element,
        "attribute" => NodeType::Attribute,
        "schema-element" => NodeType::SchemaElement,
        "schema-attribute" => NodeType::SchemaAttribute,
        "text" => NodeType::Text,
        "comment" => NodeType::Comment,
        "processing-instruction" => NodeType::ProcessingInstruction,
        "node" => NodeType::Node,
        "item" => NodeType::Item,
        "empty-sequence" => NodeType::EmptySequence,
        _ => return None,
    })
}

/// A copy-on-write table a parser built with a schema proxy extends with
/// dynamically registered atomic-type constructors (§4.G "Schema-driven
/// type registration"). The base built-in tables above never change; this
/// only grows the set of names recognized as constructors.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    extra_constructors: std::collections::HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_constructor(&mut self, name: String) {
        self.extra_constructors.insert(name);
    }

    pub fn is_registered_constructor(&self, name: &str) -> bool {
        self.extra_constructors.contains(name)
    }
}

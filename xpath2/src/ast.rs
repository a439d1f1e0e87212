//! The expression tree (§3 "Expression node", §4.C grammar shapes).
//!
//! Every [`Expr`] carries a [`SourceSpan`] pointing back at the source text
//! it was parsed from, and an optional attached comment per the tokenizer's
//! comment-folding rule (§4.A/§4.C).

use std::rc::Rc;

use ibig::IBig;
use rust_decimal::Decimal;
use xpath2_name::Name;

use crate::registry::Axis;
use crate::span::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralCompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCompareOp {
    Is,
    Precedes,
    Follows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// No indicator: exactly one.
    One,
    /// `?`: zero or one.
    Optional,
    /// `*`: zero or more.
    ZeroOrMore,
    /// `+`: one or more.
    OneOrMore,
}

/// A parsed `SequenceType`: either `empty-sequence()`, `item()`, a named
/// atomic type, or a kind test, plus its occurrence indicator.
#[derive(Debug, Clone)]
pub enum ItemType {
    Item,
    EmptySequence,
    Atomic(Name),
    KindTest(KindTest),
}

#[derive(Debug, Clone)]
pub struct SequenceType {
    pub item_type: ItemType,
    pub occurrence: Occurrence,
}

/// A node kind test (`element()`, `element(QName)`, `text()`, ...).
#[derive(Debug, Clone)]
pub enum KindTest {
    Document,
    Element(Option<Name>),
    Attribute(Option<Name>),
    SchemaElement(Name),
    SchemaAttribute(Name),
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
    Node,
}

/// A single `SingleType`: an atomic type name plus whether `?` was given.
#[derive(Debug, Clone)]
pub struct SingleType {
    pub name: Name,
    pub optional: bool,
}

/// A step's node test: a name, a namespace wildcard, `*`, or a kind test.
#[derive(Debug, Clone)]
pub enum NodeTest {
    Name(Name),
    Wildcard,
    WildcardNamespace(String),
    WildcardLocal(String),
    Kind(KindTest),
}

#[derive(Debug, Clone)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
    pub span: SourceSpan,
}

/// One `for`/`some`/`every` binding clause: `$name in source`.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: Name,
    pub source: Expr,
}

/// An expression tree node.
///
/// `label` in the design doc (operator/function/constructor/axis/literal/
/// kind-test) corresponds to which variant this is; there's no separate
/// tag field since Rust's enum discriminant already is that label.
#[derive(Debug, Clone)]
pub enum ExprKind {
    IntegerLiteral(IBig),
    DecimalLiteral(Decimal),
    DoubleLiteral(f64),
    StringLiteral(Rc<str>),
    /// `()`.
    EmptySequence,
    /// `.`
    ContextItem,
    /// `$name`
    VarRef(Name),
    /// `(E1, E2, ...)` sequence concatenation, already flattened.
    Sequence(Vec<Expr>),
    /// Unary `+`/`-`.
    Negate(Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    ValueCompare(ValueCompareOp, Box<Expr>, Box<Expr>),
    GeneralCompare(GeneralCompareOp, Box<Expr>, Box<Expr>),
    NodeCompare(NodeCompareOp, Box<Expr>, Box<Expr>),
    SetOp(SetOp, Box<Expr>, Box<Expr>),
    /// `a to b`
    Range(Box<Expr>, Box<Expr>),
    /// `if (cond) then t else e`
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `for $x in e1, $y in e2 return body`
    For(Vec<Binding>, Box<Expr>),
    /// `some $x in e1 satisfies body`
    Some(Vec<Binding>, Box<Expr>),
    /// `every $x in e1 satisfies body`
    Every(Vec<Binding>, Box<Expr>),
    InstanceOf(Box<Expr>, SequenceType),
    TreatAs(Box<Expr>, SequenceType),
    CastAs(Box<Expr>, SingleType),
    CastableAs(Box<Expr>, SingleType),
    /// `xs:TYPE(arg?)`, a built-in atomic-type constructor.
    Constructor(Name, Option<Box<Expr>>),
    /// A schema-registered constructor (§4.G dynamic registration).
    SchemaConstructor(Name, Option<Box<Expr>>),
    /// A named function call, resolved by name + arity at evaluation time.
    FunctionCall(Name, Vec<Expr>),
    /// A kind-test/node-type used as a standalone expression (tests the
    /// context item, equivalent to `self::KIND()`).
    KindTestExpr(KindTest),
    /// `E[pred1][pred2]...` applied to a non-path primary.
    Filter(Box<Expr>, Vec<Expr>),
    /// A location path: an optional leading `/`/`//`, an optional
    /// `FilterExpr` root (e.g. `$x` in `$x/a`, absent for paths rooted at
    /// the context item or at the document root), then steps.
    Path {
        is_absolute: bool,
        root: Option<Box<Expr>>,
        steps: Vec<Step>,
    },
    /// A constructor call folded to its result at parse time (§4.C static
    /// pre-evaluation): the original call is kept alongside for
    /// diagnostics, but evaluation just returns the atomic value.
    AtomicValue(crate::atomic::Atomic),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
    /// A comment attached during tokenization that preceded or followed
    /// this expression's defining token, kept for round-tripping
    /// diagnostics; never consulted by evaluation.
    pub comment: Option<String>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: SourceSpan) -> Self {
        Self { kind, span, comment: None }
    }

    pub fn with_comment(mut self, comment: String) -> Self {
        self.comment = Some(comment);
        self
    }
}

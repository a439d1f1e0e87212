use strum::EnumMessage;
use strum_macros::{Display, EnumMessage};

use crate::span::SourceSpan;

/// An error code together with the source span it occurred at, if known.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpannedError {
    /// The error code.
    pub error: Error,
    /// The source span where the error occurred.
    pub span: Option<SourceSpan>,
}

/// XPath 2.0 error code.
///
/// These are the error conditions defined by the XPath 2.0 and XQuery 1.0
/// and XPath 2.0 Functions and Operators specifications that this engine
/// can raise. Each variant's first doc paragraph is its human-readable
/// message; the rest, if present, is additional detail surfaced through
/// [`Error::note`].
#[derive(Debug, Clone, PartialEq, Display, EnumMessage)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Error {
    /// This XPath feature is not supported.
    Unsupported,

    /// Component absent in static context.
    ///
    /// It is a static error if analysis of an expression relies on some
    /// component of the static context that is absent.
    XPST0001,
    /// Component absent in dynamic context.
    ///
    /// It is a dynamic error if evaluation of an expression relies on some
    /// part of the dynamic context that is absent.
    XPDY0002,
    /// Parse error.
    ///
    /// It is a static error if an expression is not a valid instance of the
    /// grammar.
    XPST0003,
    /// Type error.
    ///
    /// The static or dynamic type of a value does not match the type
    /// required by the context in which it is used.
    XPTY0004,
    /// Name not defined.
    ///
    /// An expression refers to a variable, function, or type name that is
    /// not defined in the static context.
    XPST0008,
    /// Type error: incorrect function name or number of arguments.
    ///
    /// The expanded QName and number of arguments in a function call do not
    /// match the name and arity of any function signature in the static
    /// context.
    XPST0017,
    /// Type error: inconsistent sequence.
    ///
    /// The result of a path operator contains both nodes and non-nodes.
    XPTY0018,
    /// Type error: path operator must be applied to node sequence.
    XPTY0019,
    /// Type error: context item is not a node in an axis step.
    XPTY0020,
    /// Dynamic error: `treat as` failed.
    ///
    /// The dynamic type of the value does not match the required
    /// `SequenceType`.
    XPDY0050,
    /// Undefined type reference.
    ///
    /// The expanded QName for an atomic or union type in a `SequenceType`
    /// is not defined in the in-scope schema types.
    XPST0051,
    /// Invalid type named in `cast`/`castable` expression.
    ///
    /// The type must be the name of a simple type defined in the in-scope
    /// schema types.
    XQST0052,
    /// Invalid target type of `cast`/`castable` expression.
    ///
    /// The target type must not be `xs:NOTATION` or `xs:anyAtomicType`.
    XPST0080,
    /// Unknown namespace prefix.
    ///
    /// A QName used in an expression contains a namespace prefix that
    /// cannot be expanded using the statically known namespaces.
    XPST0081,
    /// Division by zero.
    FOAR0001,
    /// Numeric operation overflow/underflow.
    FOAR0002,
    /// Input value too large for `xs:decimal`.
    FOCA0001,
    /// Invalid lexical value for `fn:QName` or cast to `xs:decimal`.
    FOCA0002,
    /// Input too large for `xs:integer`.
    FOCA0003,
    /// NaN supplied where a number was required.
    FOCA0005,
    /// Invalid regular expression flags.
    FORX0001,
    /// Invalid regular expression.
    FORX0002,
    /// Regular expression matches a zero-length string.
    FORX0003,
    /// Invalid replacement string.
    FORX0004,
    /// No namespace found for prefix.
    ///
    /// `fn:resolve-QName` and analogous functions were given a prefix with
    /// no binding to a namespace.
    FONS0004,
    /// Invalid value for cast or constructor.
    ///
    /// A cast between two datatypes is allowed in principle, but the
    /// supplied value cannot be converted.
    FORG0001,
    /// `fn:zero-or-one` called with more than one item.
    FORG0003,
    /// `fn:one-or-more` called with an empty sequence.
    FORG0004,
    /// `fn:exactly-one` called with a non-singleton sequence.
    FORG0005,
    /// Invalid argument type to an aggregate function.
    ///
    /// `fn:max`, `fn:min`, `fn:avg`, `fn:sum` were given a sequence
    /// containing values inappropriate to the function.
    FORG0006,
    /// Overflow/underflow in date/time operation.
    FODT0001,
    /// Overflow/underflow in duration operation.
    FODT0002,
    /// Invalid timezone value.
    FODT0003,
    /// Unidentified error, the default code for `fn:error`.
    FOER0000,
    /// Argument to `fn:data()` contains a node with no typed value.
    FOTY0012,
}

impl Error {
    /// Attach a source span to this error.
    pub fn with_span(self, span: SourceSpan) -> SpannedError {
        SpannedError {
            error: self,
            span: Some(span),
        }
    }

    /// The error code, e.g. `"XPTY0004"`.
    pub fn code(&self) -> String {
        self.to_string()
    }

    /// The short human-readable message for this error.
    pub fn message(&self) -> &str {
        self.documentation_pieces().0
    }

    /// Additional detail beyond the short message, if any.
    pub fn note(&self) -> &str {
        self.documentation_pieces().1
    }

    fn documentation_pieces(&self) -> (&str, &str) {
        if let Some(documentation) = self.get_documentation() {
            let mut pieces = documentation.splitn(2, "\n\n");
            let first = pieces.next().unwrap_or("");
            let second = pieces.next().unwrap_or("");
            (first, second)
        } else {
            ("", "")
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for SpannedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(span) = self.span {
            let span = span.range();
            write!(f, "{} ({}..{})", self.error, span.start, span.end)
        } else {
            write!(f, "{}", self.error)
        }
    }
}

impl std::error::Error for SpannedError {}

impl From<Error> for SpannedError {
    fn from(e: Error) -> Self {
        SpannedError {
            error: e,
            span: None,
        }
    }
}

impl From<ibig::error::OutOfBoundsError> for Error {
    fn from(_e: ibig::error::OutOfBoundsError) -> Self {
        Error::FOCA0003
    }
}

/// The result type for plain (unspanned) errors.
pub type Result<T> = std::result::Result<T, Error>;
/// The result type for errors carrying an optional source span.
pub type SpannedResult<T> = std::result::Result<T, SpannedError>;

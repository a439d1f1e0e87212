use std::ops::Range;

/// A byte-offset range into the source text of an expression.
///
/// Stored on [`crate::ast::Expr`] nodes so runtime errors can point back at
/// the sub-expression that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceSpan {
    start: u32,
    end: u32,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

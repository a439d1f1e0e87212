use std::borrow::Cow;

use ahash::HashMap;
use chrono::{FixedOffset, Local};
use xpath2_name::Name;

use crate::error::Error;
use crate::sequence::Sequence;
use crate::tree::XPathNode;

use super::static_context::StaticContext;

pub type Variables<N> = HashMap<Name, Sequence<N>>;

/// Everything that changes during a single evaluation: the context item,
/// its position and the containing sequence's size, the in-scope variable
/// bindings, and a dateTime snapshot stable for the whole evaluation.
///
/// `copy()` duplicates the mutable frame (variables, position/size) so a
/// nested evaluation — a predicate, a `for` body — cannot leak bindings
/// back up to its caller once it returns.
pub struct DynamicContext<'a, N: XPathNode> {
    pub static_context: &'a StaticContext,
    root: Option<N>,
    context_item: Option<crate::sequence::Item<N>>,
    position: usize,
    size: usize,
    variables: Cow<'a, Variables<N>>,
    current_datetime: chrono::DateTime<FixedOffset>,
    implicit_timezone: FixedOffset,
}

impl<'a, N: XPathNode> DynamicContext<'a, N> {
    pub fn new(static_context: &'a StaticContext) -> Self {
        let current_datetime = Local::now().into();
        Self {
            static_context,
            root: None,
            context_item: None,
            position: 1,
            size: 1,
            variables: Cow::Owned(Variables::default()),
            current_datetime,
            implicit_timezone: current_datetime.timezone(),
        }
    }

    pub fn with_context_item(mut self, item: crate::sequence::Item<N>) -> Self {
        if let crate::sequence::Item::Node(n) = &item {
            self.root = Some(n.root());
        }
        self.context_item = Some(item);
        self
    }

    pub fn with_variables(mut self, variables: Variables<N>) -> Self {
        self.variables = Cow::Owned(variables);
        self
    }

    /// Duplicate this frame for a nested evaluation; mutations the callee
    /// makes (binding a `for` variable, stepping position) never propagate
    /// back since `Cow` clones on first write.
    pub fn copy(&self) -> DynamicContext<'_, N> {
        DynamicContext {
            static_context: self.static_context,
            root: self.root.clone(),
            context_item: self.context_item.clone(),
            position: self.position,
            size: self.size,
            variables: Cow::Borrowed(self.variables.as_ref()),
            current_datetime: self.current_datetime,
            implicit_timezone: self.implicit_timezone,
        }
    }

    pub fn context_item(&self) -> Result<&crate::sequence::Item<N>, Error> {
        self.context_item.as_ref().ok_or(Error::XPDY0002)
    }

    pub fn root(&self) -> Result<&N, Error> {
        self.root.as_ref().ok_or(Error::XPDY0002)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn with_position(mut self, position: usize, size: usize) -> Self {
        self.position = position;
        self.size = size;
        self
    }

    pub fn bind(&mut self, name: Name, value: Sequence<N>) {
        self.variables.to_mut().insert(name, value);
    }

    pub fn variable(&self, name: &Name) -> Option<&Sequence<N>> {
        self.variables.get(name)
    }

    pub fn current_datetime(&self) -> chrono::DateTime<FixedOffset> {
        self.current_datetime
    }

    pub fn implicit_timezone(&self) -> FixedOffset {
        self.implicit_timezone
    }
}

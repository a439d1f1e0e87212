#![allow(dead_code)]

//! A standalone XPath 2.0 expression parser and evaluator.
//!
//! [`parser::Parser::parse`] turns source text into an [`ast::Expr`] tree;
//! [`eval::evaluate`] runs that tree against a [`context::DynamicContext`]
//! over any tree implementing [`tree::XPathNode`]. Built-in functions live
//! in [`function`], dispatched by [`function::call`].

pub mod ast;
pub mod atomic;
pub mod axis;
pub mod context;
pub mod error;
pub mod eval;
pub mod function;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod sequence;
pub mod span;
pub mod tree;

pub use xpath2_name::{Name, Namespaces, VariableNames};

pub use crate::atomic::Atomic;
pub use crate::context::{DynamicContext, ParserOptions, StaticContext, Variables};
pub use crate::error::{Error, Result, SpannedError, SpannedResult};
pub use crate::parser::Parser;
pub use crate::schema::{NoSchema, SchemaProxy};
pub use crate::sequence::{Item, Sequence};
pub use crate::tree::{NodeKind, XPathContext, XPathNode};

#![warn(missing_docs)]

//! Expanded QNames and in-scope namespaces for the xpath2 engine.

mod name;
mod namespaces;
mod variable_names;

pub use name::Name;
pub use namespaces::{NamespaceLookup, Namespaces, FN_NAMESPACE, XS_NAMESPACE};
pub use variable_names::VariableNames;

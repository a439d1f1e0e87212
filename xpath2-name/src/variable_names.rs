use ahash::HashSet;

use crate::Name;

/// A set of in-scope variable names.
pub type VariableNames = HashSet<Name>;

//! The schema proxy this engine consumes.
//!
//! `instance of`, `cast as`, and the dynamic atomic-type registry used by
//! `create_constructor` all go through a [`SchemaProxy`] rather than a
//! fixed XSD implementation, so a host can plug in a real schema-aware
//! processor later without touching the parser or evaluator.

use xpath2_name::Name;

use crate::atomic::Atomic;
use crate::error::Error;

/// A type known to the in-scope schema, named and queryable independent of
/// the built-in [`xpath2_schema_type::Xs`] lattice.
pub trait SchemaProxy {
    /// All atomic types this schema knows about, by expanded name.
    fn iter_atomic_types(&self) -> Box<dyn Iterator<Item = Name> + '_>;

    /// Whether `value` is an instance of the named type.
    ///
    /// Returns `Err(XPST0051)` if `name` is not a known type.
    fn is_instance(&self, value: &Atomic, name: &Name) -> Result<bool, Error>;

    /// Cast `value` to the named type, applying that type's facets.
    fn cast_as(&self, value: &Atomic, name: &Name) -> Result<Atomic, Error>;

    /// The declared type of a global attribute declaration, if any.
    fn get_attribute(&self, _name: &Name) -> Option<Name> {
        None
    }

    /// The declared type of a global element declaration, if any.
    fn get_element(&self, _name: &Name) -> Option<Name> {
        None
    }

    /// The heads of the substitution group `name` belongs to, if any.
    fn get_substitution_group(&self, _name: &Name) -> Vec<Name> {
        Vec::new()
    }
}

/// A schema proxy with no declarations beyond the built-in XSD types: every
/// `instance of`/`cast as` falls through to the built-in atomic type
/// machinery in [`crate::atomic`], and the declaration lookups are all
/// empty. This is what a [`crate::parser::Parser`] uses when constructed
/// without an explicit schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSchema;

impl SchemaProxy for NoSchema {
    fn iter_atomic_types(&self) -> Box<dyn Iterator<Item = Name> + '_> {
        Box::new(std::iter::empty())
    }

    fn is_instance(&self, value: &Atomic, name: &Name) -> Result<bool, Error> {
        let xs = xpath2_schema_type::Xs::by_name(name.namespace(), name.local_name())
            .ok_or(Error::XPST0051)?;
        Ok(value.schema_type().derives_from(xs) || value.schema_type() == xs)
    }

    fn cast_as(&self, value: &Atomic, name: &Name) -> Result<Atomic, Error> {
        let xs = xpath2_schema_type::Xs::by_name(name.namespace(), name.local_name())
            .ok_or(Error::XPST0051)?;
        crate::atomic::cast::cast_to(value, xs)
    }
}

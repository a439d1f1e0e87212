//! The XSD atomic type lattice consumed by the type/constructor layer.

mod xs;

pub use xs::{Xs, XS_NAMESPACE};

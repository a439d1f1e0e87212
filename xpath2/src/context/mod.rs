//! The static (component D) and dynamic (component E) contexts.

mod dynamic_context;
mod static_context;

pub use dynamic_context::{DynamicContext, Variables};
pub use static_context::{ParserOptions, StaticContext};

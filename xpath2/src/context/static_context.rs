use std::rc::Rc;

use xpath2_name::{Namespaces, VariableNames, FN_NAMESPACE};

use crate::registry::SymbolTable;
use crate::schema::{NoSchema, SchemaProxy};

/// Everything known about an expression before it is evaluated: the
/// in-scope namespaces, statically declared variable names, the default
/// element/function namespaces, compatibility mode, and the symbol table
/// the parser consults for keyword/axis/function recognition.
///
/// Built once by [`crate::parser::Parser::new`] from its constructor
/// options and shared (immutably) by every expression parsed from it.
pub struct StaticContext {
    namespaces: Namespaces<'static>,
    variable_names: VariableNames,
    function_namespace: String,
    /// When false, permits QName-like bare names the strict grammar would
    /// otherwise reject (a deliberate laxness some hosts need).
    strict: bool,
    /// XPath 1.0 compatibility mode: numeric comparisons promote
    /// multi-item sequences instead of raising a type error, and a few
    /// error codes shift (`abs()` reports `FOAR0002` rather than the
    /// 2.0-only `XPTY0004` case some hosts expect).
    compatibility_mode: bool,
    schema: Rc<dyn SchemaProxy>,
    symbol_table: SymbolTable,
}

impl std::fmt::Debug for StaticContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticContext")
            .field("function_namespace", &self.function_namespace)
            .field("strict", &self.strict)
            .field("compatibility_mode", &self.compatibility_mode)
            .finish_non_exhaustive()
    }
}

/// Constructor options for a [`crate::parser::Parser`], mirroring the
/// keyword arguments `elementpath`'s `XPath2Parser` accepts.
#[derive(Default)]
pub struct ParserOptions {
    pub namespaces: Vec<(String, String)>,
    pub variables: Vec<String>,
    pub strict: bool,
    pub default_namespace: Option<String>,
    pub function_namespace: Option<String>,
    pub schema: Option<Rc<dyn SchemaProxy>>,
    pub compatibility_mode: bool,
}

impl StaticContext {
    pub fn new(options: ParserOptions) -> Self {
        let mut namespaces = Namespaces::default();
        // `Namespaces` borrows `&str`, so constructor option strings must
        // outlive it; we leak them deliberately, same lifetime as the
        // static context itself (parsers are long-lived, not created in a
        // hot loop).
        let pairs: Vec<(&'static str, &'static str)> = options
            .namespaces
            .into_iter()
            .map(|(prefix, uri)| {
                let prefix: &'static str = Box::leak(prefix.into_boxed_str());
                let uri: &'static str = Box::leak(uri.into_boxed_str());
                (prefix, uri)
            })
            .collect();
        namespaces.add(&pairs);
        if let Some(default_ns) = options.default_namespace {
            let uri: &'static str = Box::leak(default_ns.into_boxed_str());
            namespaces.add(&[("", uri)]);
        }

        let mut variable_names = VariableNames::default();
        for name in options.variables {
            variable_names.insert(xpath2_name::Name::unprefixed(&name));
        }

        Self {
            namespaces,
            variable_names,
            function_namespace: options
                .function_namespace
                .unwrap_or_else(|| FN_NAMESPACE.to_string()),
            strict: options.strict,
            compatibility_mode: options.compatibility_mode,
            schema: options.schema.unwrap_or_else(|| Rc::new(NoSchema)),
            symbol_table: SymbolTable::new(),
        }
    }

    pub fn namespaces(&self) -> &Namespaces<'static> {
        &self.namespaces
    }

    pub fn variable_names(&self) -> &VariableNames {
        &self.variable_names
    }

    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.by_prefix(prefix)
    }

    pub fn function_namespace(&self) -> &str {
        &self.function_namespace
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_compatibility_mode(&self) -> bool {
        self.compatibility_mode
    }

    pub fn schema(&self) -> &dyn SchemaProxy {
        self.schema.as_ref()
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    /// The version this parser advertises, per the public surface (§6).
    pub fn version(&self) -> &'static str {
        "2.0"
    }
}

impl Default for StaticContext {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

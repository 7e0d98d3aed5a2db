//! Dialect registry.
//!
//! Operations may use any dialect prefix; the registry only records which
//! namespaces are known to the context. An op whose prefix is not registered
//! is still valid IR, but its namespace does not resolve.

use indexmap::IndexMap;

use crate::symbol::Symbol;

/// Renders the payload of an [`Attribute::Opaque`](crate::Attribute::Opaque)
/// owned by a dialect. Returns `None` when the payload is not understood.
pub type OpaqueAttrPrinter = fn(&[u8]) -> Option<String>;

/// A registered dialect.
#[derive(Clone, Debug)]
pub struct DialectInfo {
    pub namespace: Symbol,
    pub opaque_printer: Option<OpaqueAttrPrinter>,
}

/// Set of dialects registered in an [`IrContext`](crate::IrContext).
#[derive(Clone, Debug, Default)]
pub struct DialectRegistry {
    dialects: IndexMap<Symbol, DialectInfo>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dialect namespace. Registering twice keeps the first entry.
    pub fn insert(&mut self, namespace: impl Into<Symbol>) -> &mut DialectInfo {
        let namespace = namespace.into();
        self.dialects.entry(namespace).or_insert(DialectInfo {
            namespace,
            opaque_printer: None,
        })
    }

    /// Register a dialect together with a printer for its opaque attributes.
    pub fn insert_with_printer(
        &mut self,
        namespace: impl Into<Symbol>,
        printer: OpaqueAttrPrinter,
    ) {
        self.insert(namespace).opaque_printer = Some(printer);
    }

    pub fn get(&self, namespace: Symbol) -> Option<&DialectInfo> {
        self.dialects.get(&namespace)
    }

    pub fn contains(&self, namespace: Symbol) -> bool {
        self.dialects.contains_key(&namespace)
    }
}

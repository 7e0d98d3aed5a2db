//! Dialects used by the inspector and its passes.
//!
//! `builtin` ops carry bare names (`module`, `func`, `return`); every other
//! dialect prefixes its op names with its namespace.

pub mod arith;
pub mod builtin;
pub mod cf;

use crate::registry::DialectRegistry;

/// Register every prefixed dialect defined in this crate.
pub fn register_all(registry: &mut DialectRegistry) {
    arith::register(registry);
    cf::register(registry);
    test::register(registry);
}

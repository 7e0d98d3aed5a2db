//! Dialect namespace lookup.

use crate::context::IrContext;
use crate::refs::OpRef;
use crate::symbol::Symbol;

/// Reported namespace for ops whose dialect is absent or unregistered.
pub const NULL_NAMESPACE: &str = "null";

/// The op's registered dialect, if any.
pub fn dialect_of(ctx: &IrContext, op: OpRef) -> Option<Symbol> {
    ctx.op(op)
        .name
        .dialect
        .filter(|&dialect| ctx.dialects.contains(dialect))
}

/// Namespace of `op`, or [`NULL_NAMESPACE`].
pub fn namespace_of(ctx: &IrContext, op: OpRef) -> String {
    match dialect_of(ctx, op) {
        Some(dialect) => dialect.to_string(),
        None => NULL_NAMESPACE.to_owned(),
    }
}

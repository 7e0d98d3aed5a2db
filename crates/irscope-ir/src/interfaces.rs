//! Symbol capability.
//!
//! Operation kinds that define a symbol expose their name through
//! [`SymbolOp`]. Callers that only hold an untyped [`OpRef`] try the kinds
//! in [`SymbolKind::PRIORITY`] order and take the first match.

use derive_more::Display;

use crate::context::IrContext;
use crate::dialect::builtin::{Func, Module};
use crate::ops::DialectOp;
use crate::refs::OpRef;
use crate::symbol::Symbol;

/// Typed op that carries a symbol name.
pub trait SymbolOp: DialectOp {
    fn sym_name(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op(self.op_ref()).symbol
    }
}

/// Symbol-capable operation kinds.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    #[display("module")]
    Module,
    #[display("func")]
    Func,
}

impl SymbolKind {
    /// Kinds in the order they are tried; the first that matches wins.
    ///
    /// `module` and `func` never match the same op, so the order cannot
    /// change a result yet. It matters once overlapping kinds are added.
    pub const PRIORITY: [SymbolKind; 2] = [SymbolKind::Module, SymbolKind::Func];

    pub fn matches(self, ctx: &IrContext, op: OpRef) -> bool {
        match self {
            SymbolKind::Module => Module::matches(ctx, op),
            SymbolKind::Func => Func::matches(ctx, op),
        }
    }

    /// Symbol name of `op`, which must be of this kind.
    fn sym_name(self, ctx: &IrContext, op: OpRef) -> Option<Symbol> {
        match self {
            SymbolKind::Module => Module::from_op(ctx, op).ok()?.sym_name(ctx),
            SymbolKind::Func => Func::from_op(ctx, op).ok()?.sym_name(ctx),
        }
    }
}

/// First symbol-capable kind that `op` matches.
pub fn resolve_symbol_kind(ctx: &IrContext, op: OpRef) -> Option<SymbolKind> {
    SymbolKind::PRIORITY
        .into_iter()
        .find(|kind| kind.matches(ctx, op))
}

/// The matched kind and its symbol name, if `op` is symbol-capable.
///
/// The name is `None` when the kind matches but the op carries no symbol.
pub fn symbol_name(ctx: &IrContext, op: OpRef) -> Option<(SymbolKind, Option<Symbol>)> {
    let kind = resolve_symbol_kind(ctx, op)?;
    Some((kind, kind.sym_name(ctx, op)))
}

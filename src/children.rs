//! Direct children of a root operation, with namespace and symbol info.

use std::fmt;

use irscope_ir::{IrContext, OpRef, Symbol, SymbolKind, namespace_of, symbol_name};

/// Symbol information of one child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildSymbol {
    /// The child is a symbol-capable kind. `name` is `None` when it carries
    /// no symbol.
    Capable {
        kind: SymbolKind,
        name: Option<Symbol>,
    },
    NotCapable,
}

/// Report for one direct child of the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildReport {
    pub op: OpRef,
    pub name: String,
    pub namespace: String,
    pub symbol: ChildSymbol,
}

impl fmt::Display for ChildReport {
    /// Two lines: `<name>, namespace: <ns>` then the symbol line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}, namespace: {}", self.name, self.namespace)?;
        match &self.symbol {
            ChildSymbol::Capable {
                kind,
                name: Some(name),
            } => write!(f, "{kind}_op: {name}"),
            ChildSymbol::Capable { kind, name: None } => write!(f, "{kind}_op: "),
            ChildSymbol::NotCapable => write!(f, "non symbol_op:{}", self.name),
        }
    }
}

/// Report every operation in the blocks of the root's first region, in
/// order. A root without regions has no children.
pub fn enumerate_children(ctx: &IrContext, root: OpRef) -> Vec<ChildReport> {
    let Some(&region) = ctx.op(root).regions.first() else {
        return vec![];
    };
    ctx.region(region)
        .blocks
        .iter()
        .flat_map(|&block| ctx.block(block).ops.iter().copied())
        .map(|op| ChildReport {
            op,
            name: ctx.op(op).name.to_string(),
            namespace: namespace_of(ctx, op),
            symbol: match symbol_name(ctx, op) {
                Some((kind, name)) => ChildSymbol::Capable { kind, name },
                None => ChildSymbol::NotCapable,
            },
        })
        .collect()
}

//! Bare-named structural ops: `module`, `func` and `return`.
//!
//! `module` and `func` both define a symbol; see
//! [`SymbolKind`](crate::interfaces::SymbolKind).

use crate::context::{IrContext, OperationDataBuilder};
use crate::interfaces::SymbolOp;
use crate::ops::DialectOp;
use crate::refs::{RegionRef, TypeRef, ValueRef};
use crate::symbol::Symbol;
use crate::types::{OpName, TypeDataBuilder};

crate::define_op! {
    /// Top-level container holding one body region.
    pub struct Module => "module";
}

crate::define_op! {
    /// Function definition with one body region.
    pub struct Func => "func";
}

crate::define_op! {
    /// Function terminator.
    pub struct Return => "return";
}

impl SymbolOp for Module {}
impl SymbolOp for Func {}

/// Create a `module` owning `body`.
pub fn module(ctx: &mut IrContext, sym_name: Option<Symbol>, body: RegionRef) -> Module {
    let mut builder = OperationDataBuilder::new(OpName::bare(Module::OP_NAME)).region(body);
    if let Some(name) = sym_name {
        builder = builder.symbol(name);
    }
    let data = builder.build(ctx);
    Module(ctx.create_op(data))
}

/// Create a `func` named `sym_name` owning `body`.
pub fn func(ctx: &mut IrContext, sym_name: Symbol, body: RegionRef) -> Func {
    let data = OperationDataBuilder::new(OpName::bare(Func::OP_NAME))
        .region(body)
        .symbol(sym_name)
        .build(ctx);
    Func(ctx.create_op(data))
}

/// Create a `return` of `values`.
pub fn r#return(ctx: &mut IrContext, values: impl IntoIterator<Item = ValueRef>) -> Return {
    let data = OperationDataBuilder::new(OpName::bare(Return::OP_NAME))
        .operands(values)
        .build(ctx);
    Return(ctx.create_op(data))
}

/// `core.i<width>` integer type.
pub fn int_type(ctx: &mut IrContext, width: u32) -> TypeRef {
    let name = Symbol::from_dynamic(&format!("i{width}"));
    ctx.types.intern(TypeDataBuilder::new("core", name).build())
}

/// Bit width of a `core.i<width>` type, or `None` for any other type.
pub fn int_width(ctx: &IrContext, ty: TypeRef) -> Option<u32> {
    let data = ctx.types.try_get(ty)?;
    if data.dialect != "core" || !data.params.is_empty() {
        return None;
    }
    data.name
        .with_str(|name| name.strip_prefix('i')?.parse::<u32>().ok())
        .filter(|width| (1..=64).contains(width))
}

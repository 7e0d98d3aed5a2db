//! Unstructured control flow.

use crate::context::{IrContext, OperationDataBuilder};
use crate::ops::DialectOp;
use crate::refs::{BlockRef, ValueRef};
use crate::registry::DialectRegistry;
use crate::types::OpName;

pub const NAMESPACE: &str = "cf";

crate::define_op! {
    /// Unconditional branch to one successor.
    pub struct Br => "cf"."br";
}

crate::define_op! {
    /// Two-way branch on an `i1` condition.
    pub struct CondBr => "cf"."cond_br";
}

pub fn register(registry: &mut DialectRegistry) {
    registry.insert(NAMESPACE);
}

pub fn br(ctx: &mut IrContext, dest: BlockRef, args: impl IntoIterator<Item = ValueRef>) -> Br {
    let data = OperationDataBuilder::new(OpName::new(NAMESPACE, Br::OP_NAME))
        .operands(args)
        .successor(dest)
        .build(ctx);
    Br(ctx.create_op(data))
}

pub fn cond_br(
    ctx: &mut IrContext,
    cond: ValueRef,
    then_dest: BlockRef,
    else_dest: BlockRef,
) -> CondBr {
    let data = OperationDataBuilder::new(OpName::new(NAMESPACE, CondBr::OP_NAME))
        .operand(cond)
        .successor(then_dest)
        .successor(else_dest)
        .build(ctx);
    CondBr(ctx.create_op(data))
}

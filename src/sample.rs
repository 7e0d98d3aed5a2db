//! The sample program inspected by the demo binary.

use irscope_ir::dialect::{self, builtin};
use irscope_ir::{BlockData, DialectOp, IrContext, OpRef, RegionData, Symbol};

/// Build `module { func @main() {} }` and register the demo dialects.
///
/// The function body is a region without blocks.
pub fn sample_module(ctx: &mut IrContext) -> OpRef {
    dialect::register_all(&mut ctx.dialects);

    let main_body = ctx.create_region(RegionData::new([]));
    let main = builtin::func(ctx, Symbol::new("main"), main_body);
    let block = ctx.create_block(BlockData::new([]));
    ctx.push_op(block, main.op_ref());
    let body = ctx.create_region(RegionData::new([block]));
    builtin::module(ctx, None, body).op_ref()
}

//! Builders shared by the integration tests.

use irscope_ir::dialect::{self, arith, builtin};
use irscope_ir::{BlockData, DialectOp, IrContext, OpRef, RegionData, Symbol};

/// `module @calc { func @sum() { %a = 2; %b = 3; %c = addi %a, %b; return %c } }`
pub fn sum_module(ctx: &mut IrContext) -> OpRef {
    dialect::register_all(&mut ctx.dialects);
    let i32_ty = builtin::int_type(ctx, 32);

    let entry = ctx.create_block(BlockData::new([]));
    let a = arith::constant(ctx, i32_ty, 2i64);
    ctx.push_op(entry, a.op_ref());
    let b = arith::constant(ctx, i32_ty, 3i64);
    ctx.push_op(entry, b.op_ref());
    let (va, vb) = (a.result(ctx), b.result(ctx));
    let c = arith::addi(ctx, va, vb, i32_ty);
    ctx.push_op(entry, c.op_ref());
    let vc = c.result(ctx).unwrap();
    let ret = builtin::r#return(ctx, [vc]);
    ctx.push_op(entry, ret.op_ref());

    let body = ctx.create_region(RegionData::new([entry]));
    let sum = builtin::func(ctx, Symbol::new("sum"), body);

    let top = ctx.create_block(BlockData::new([]));
    ctx.push_op(top, sum.op_ref());
    let region = ctx.create_region(RegionData::new([top]));
    builtin::module(ctx, Some(Symbol::new("calc")), region).op_ref()
}

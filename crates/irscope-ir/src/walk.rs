//! Depth-first traversal over containment edges.
//!
//! Only regions, blocks and operations are followed. Successors and operands
//! are side references and never visited, so every operation below the start
//! point is reached exactly once, in declaration order.

use std::ops::ControlFlow;

use crate::context::IrContext;
use crate::ops::DialectOp;
use crate::refs::{BlockRef, OpRef, RegionRef};

/// Controls whether to descend into children during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Continue walking and descend into nested regions.
    Advance,
    /// Skip the nested regions of the current operation.
    Skip,
}

pub fn walk_region<B>(
    ctx: &IrContext,
    region: RegionRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    for &block in &ctx.region(region).blocks {
        walk_block(ctx, block, f)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_block<B>(
    ctx: &IrContext,
    block: BlockRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    for &op in &ctx.block(block).ops {
        walk_op(ctx, op, f)?;
    }
    ControlFlow::Continue(())
}

/// Visit `op`, then everything nested in its regions unless the callback
/// answers [`WalkAction::Skip`].
pub fn walk_op<B>(
    ctx: &IrContext,
    op: OpRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    match f(op) {
        ControlFlow::Break(b) => return ControlFlow::Break(b),
        ControlFlow::Continue(WalkAction::Skip) => return ControlFlow::Continue(()),
        ControlFlow::Continue(WalkAction::Advance) => {}
    }
    for &region in &ctx.op(op).regions {
        walk_region(ctx, region, f)?;
    }
    ControlFlow::Continue(())
}

/// Collect every operation strictly below `op` whose kind is `T`, without
/// descending into the matches themselves.
pub fn collect_nested<T: DialectOp>(ctx: &IrContext, op: OpRef) -> Vec<T> {
    let mut found = Vec::new();
    for &region in &ctx.op(op).regions {
        let _ = walk_region::<()>(ctx, region, &mut |inner| match T::from_op(ctx, inner) {
            Ok(typed) => {
                found.push(typed);
                ControlFlow::Continue(WalkAction::Skip)
            }
            Err(_) => ControlFlow::Continue(WalkAction::Advance),
        });
    }
    found
}

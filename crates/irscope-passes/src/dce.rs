//! Dead code elimination.
//!
//! Removes side-effect-free operations whose results are never used. The
//! use-chains kept by [`IrContext`] make the dead check a constant-time
//! lookup, so the pass is a plain sweep repeated until nothing changes.

use irscope_ir::dialect::arith;
use irscope_ir::{BlockRef, IrContext, OpRef, RegionRef};
use tracing::{debug, warn};

use crate::pass::{Pass, PassFailure};

/// Configuration for dead code elimination.
#[derive(Debug, Clone)]
pub struct DceConfig {
    /// Maximum fixpoint iterations before giving up. Default: 100.
    pub max_iterations: usize,
    /// Whether to recursively process nested regions. Default: true.
    pub recursive: bool,
}

impl Default for DceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            recursive: true,
        }
    }
}

/// Result of running dead code elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DceResult {
    pub removed_count: usize,
    pub iterations: usize,
    pub reached_fixpoint: bool,
}

/// Eliminate dead operations in the regions of `root`.
pub fn eliminate_dead_code(ctx: &mut IrContext, root: OpRef, config: &DceConfig) -> DceResult {
    let max_iterations = config.max_iterations.max(1);
    let mut total_removed = 0;

    for iteration in 0..max_iterations {
        let regions: Vec<RegionRef> = ctx.op(root).regions.to_vec();
        let removed: usize = regions
            .into_iter()
            .map(|region| sweep_region(ctx, region, config))
            .sum();

        if removed == 0 {
            return DceResult {
                removed_count: total_removed,
                iterations: iteration + 1,
                reached_fixpoint: true,
            };
        }
        total_removed += removed;
    }

    DceResult {
        removed_count: total_removed,
        iterations: max_iterations,
        reached_fixpoint: false,
    }
}

fn sweep_region(ctx: &mut IrContext, region: RegionRef, config: &DceConfig) -> usize {
    let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
    blocks
        .into_iter()
        .map(|block| sweep_block(ctx, block, config))
        .sum()
}

/// Sweep a block back to front so chains of dead ops go in one pass.
fn sweep_block(ctx: &mut IrContext, block: BlockRef, config: &DceConfig) -> usize {
    let mut removed = 0;

    if config.recursive {
        let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
        for op in ops {
            let regions: Vec<RegionRef> = ctx.op(op).regions.to_vec();
            for region in regions {
                removed += sweep_region(ctx, region, config);
            }
        }
    }

    let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
    for &op in ops.iter().rev() {
        if is_dead(ctx, op) {
            ctx.remove_op_from_block(block, op);
            ctx.remove_op(op);
            removed += 1;
        }
    }

    removed
}

/// Pure and every result unused.
pub(crate) fn is_dead(ctx: &IrContext, op: OpRef) -> bool {
    arith::is_pure(ctx, op) && ctx.op_results(op).iter().all(|&v| !ctx.has_uses(v))
}

/// Dead code elimination as a pipeline pass.
#[derive(Debug, Clone, Default)]
pub struct Dce {
    pub config: DceConfig,
}

impl Pass for Dce {
    fn name(&self) -> &str {
        "dce"
    }

    fn run(&mut self, ctx: &mut IrContext, op: OpRef) -> Result<(), PassFailure> {
        let result = eliminate_dead_code(ctx, op, &self.config);
        if result.reached_fixpoint {
            debug!(%op, removed = result.removed_count, iterations = result.iterations, "dce done");
        } else {
            warn!(%op, iterations = result.iterations, "dce stopped before reaching a fixpoint");
        }
        Ok(())
    }
}
